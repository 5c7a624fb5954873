//! Owned, mutable HTML tree
//!
//! `scraper` gives a tolerant but read-only parse. The auto-fix engine needs to
//! insert and rewrite nodes, so the parse is copied into an arena of nodes
//! addressed by [`NodeId`] with explicit parent/child links, and serialized back
//! to text after mutation. Detached nodes stay in the arena but are never
//! reachable from the root.

use crate::error::DomError;
use scraper::node::Doctype;
use scraper::{ElementRef, Html, Node};
use std::fmt::Write as FmtWrite;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Index of a node inside a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Doctype(DoctypeData),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct DoctypeData {
    name: String,
    public_id: String,
    system_id: String,
}

impl DoctypeData {
    fn from_parsed(doctype: &Doctype) -> Self {
        Self {
            name: doctype.name().to_string(),
            public_id: doctype.public_id().to_string(),
            system_id: doctype.system_id().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    name: String,
    /// Attributes in source order, keyed by qualified name (`xlink:href`)
    attrs: Vec<(String, String)>,
    /// False for SVG and MathML content
    html: bool,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML document stored as an arena of nodes
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse HTML into an owned tree.
    ///
    /// Parsing is as tolerant as the browser algorithm behind `scraper`; the
    /// only rejected inputs are blank documents and text with no markup at all.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        if html.trim().is_empty() {
            return Err(DomError::Empty);
        }
        if !html.contains('<') {
            return Err(DomError::NoMarkup);
        }

        let parsed = Html::parse_document(html);
        let mut document = Document {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        let root = document.root();

        for child in parsed.tree.root().children() {
            match child.value() {
                Node::Doctype(doctype) => {
                    let id = document.push(NodeKind::Doctype(DoctypeData::from_parsed(doctype)));
                    document.append_child(root, id);
                }
                Node::Comment(comment) => {
                    let id = document.push(NodeKind::Comment(comment.to_string()));
                    document.append_child(root, id);
                }
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        let id = document.push_element(element);
                        document.append_child(root, id);
                        document.copy_children(id, element);
                    }
                }
                _ => {}
            }
        }

        Ok(document)
    }

    fn copy_children(&mut self, parent: NodeId, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let id = self.push(NodeKind::Text(text.to_string()));
                    self.append_child(parent, id);
                }
                Node::Comment(comment) => {
                    let id = self.push(NodeKind::Comment(comment.to_string()));
                    self.append_child(parent, id);
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let id = self.push_element(child_element);
                        self.append_child(parent, id);
                        self.copy_children(id, child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn push_element(&mut self, element: ElementRef<'_>) -> NodeId {
        let value = element.value();
        self.push(NodeKind::Element(ElementData {
            name: value.name().to_string(),
            attrs: value
                .attrs
                .iter()
                .map(|(name, value)| {
                    let qualified = match &name.prefix {
                        Some(prefix) => format!("{prefix}:{}", name.local),
                        None => name.local.to_string(),
                    };
                    (qualified, value.to_string())
                })
                .collect(),
            html: &*value.name.ns == HTML_NAMESPACE,
        }))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn html_element(&self) -> Option<NodeId> {
        self.first_by_tag("html")
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_by_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Attached nodes below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// HTML elements named `tag`, skipping SVG and MathML content
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.is_html_tag(*id, tag))
            .collect()
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.is_html_tag(*id, tag))
    }

    fn is_html_tag(&self, id: NodeId, tag: &str) -> bool {
        matches!(&self.nodes[id.0].kind, NodeKind::Element(data) if data.html && data.name == tag)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data.name.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => data
                .attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set or replace an attribute; no-op on non-element nodes
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(data) = &mut self.nodes[id.0].kind {
            match data
                .attrs
                .iter_mut()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
            {
                Some(entry) => entry.1 = value.to_string(),
                None => data.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let NodeKind::Element(data) = &mut self.nodes[id.0].kind {
            data.name = tag.to_ascii_lowercase();
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let NodeKind::Text(own) = &self.nodes[id.0].kind {
            text.push_str(own);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(part) = &self.nodes[node.0].kind {
                text.push_str(part);
            }
        }
        text
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let old: Vec<NodeId> = self.nodes[id.0].children.drain(..).collect();
        for child in old {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.append_child(id, text_node);
    }

    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            name: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            html: true,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    /// Insert `new` immediately before `reference` under the same parent.
    ///
    /// Falls back to appending at the root when `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        match self.nodes[reference.0].parent {
            Some(parent) => {
                let index = self.nodes[parent.0]
                    .children
                    .iter()
                    .position(|c| *c == reference)
                    .unwrap_or(0);
                self.nodes[new.0].parent = Some(parent);
                self.nodes[parent.0].children.insert(index, new);
            }
            None => {
                let root = self.root();
                self.append_child(root, new);
            }
        }
    }

    /// Insert `new` immediately after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        let next = self.parent(reference).and_then(|parent| {
            let siblings = self.children(parent);
            siblings
                .iter()
                .position(|c| *c == reference)
                .and_then(|index| siblings.get(index + 1).copied())
        });
        match (next, self.parent(reference)) {
            (Some(next), _) => self.insert_before(next, new),
            (None, Some(parent)) => self.append_child(parent, new),
            (None, None) => {
                let root = self.root();
                self.append_child(root, new);
            }
        }
    }

    /// Serialize the attached tree back to HTML text
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_node(&mut out, *child, false);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, raw_text: bool) {
        match &self.nodes[id.0].kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    self.write_node(out, *child, false);
                }
            }
            NodeKind::Doctype(doctype) => write_doctype(out, doctype),
            NodeKind::Comment(comment) => {
                let _ = write!(out, "<!--{comment}-->");
            }
            NodeKind::Text(text) => {
                if raw_text {
                    out.push_str(text);
                } else {
                    escape_text(out, text);
                }
            }
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.name);
                for (name, value) in &data.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(out, value);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&data.name.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&data.name.as_str());
                for child in self.children(id) {
                    self.write_node(out, *child, raw);
                }
                let _ = write!(out, "</{}>", data.name);
            }
        }
    }
}

fn write_doctype(out: &mut String, doctype: &DoctypeData) {
    let _ = write!(out, "<!DOCTYPE {}", doctype.name);
    match (doctype.public_id.is_empty(), doctype.system_id.is_empty()) {
        (false, true) => {
            let _ = write!(out, " PUBLIC \"{}\"", doctype.public_id);
        }
        (false, false) => {
            let _ = write!(
                out,
                " PUBLIC \"{}\" \"{}\"",
                doctype.public_id, doctype.system_id
            );
        }
        (true, false) => {
            let _ = write!(out, " SYSTEM \"{}\"", doctype.system_id);
        }
        (true, true) => {}
    }
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
