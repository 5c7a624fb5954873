//! Configuration for the optimizer, the auto-fix engine and the content improver
//!
//! Values are validated when they are set or loaded; an invalid tunable never
//! reaches a running session.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_MIN_SCORE: &str = "SEOLENS_MIN_SCORE";
pub const ENV_CYCLES_LIMIT: &str = "SEOLENS_CYCLES_LIMIT";
pub const ENV_AI_THRESHOLD: &str = "SEOLENS_AI_THRESHOLD";
pub const ENV_AUTOFIX_CRITICAL: &str = "SEOLENS_AUTOFIX_CRITICAL";
pub const ENV_DEFAULT_LANG: &str = "SEOLENS_DEFAULT_LANG";
pub const ENV_LLM_PROVIDER: &str = "SEOLENS_LLM_PROVIDER";
pub const ENV_LLM_MODEL: &str = "SEOLENS_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "SEOLENS_LLM_BASE_URL";

const MAX_CYCLES: i64 = 20;

/// Tunables of the optimization loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptimizerConfigFile", into = "OptimizerConfigFile")]
pub struct OptimizerConfig {
    min_score_threshold: u8,
    optimization_cycles_limit: u32,
    ai_suggestions_threshold: u8,
    critical_issues_auto_fix_enabled: bool,
    ai_timeout_secs: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 70,
            optimization_cycles_limit: 3,
            ai_suggestions_threshold: 60,
            critical_issues_auto_fix_enabled: true,
            ai_timeout_secs: 60,
        }
    }
}

impl OptimizerConfig {
    /// Score at or above which a page only gets a minor-improvements pass
    pub fn min_score_threshold(&self) -> u8 {
        self.min_score_threshold
    }

    pub fn optimization_cycles_limit(&self) -> u32 {
        self.optimization_cycles_limit
    }

    /// Post-fix score below which the AI rewrite step runs
    pub fn ai_suggestions_threshold(&self) -> u8 {
        self.ai_suggestions_threshold
    }

    pub fn critical_issues_auto_fix_enabled(&self) -> bool {
        self.critical_issues_auto_fix_enabled
    }

    pub fn ai_timeout_secs(&self) -> u64 {
        self.ai_timeout_secs
    }

    pub fn set_min_score_threshold(&mut self, value: i64) -> Result<(), ConfigError> {
        self.min_score_threshold = percent("min_score_threshold", value)?;
        Ok(())
    }

    pub fn set_optimization_cycles_limit(&mut self, value: i64) -> Result<(), ConfigError> {
        self.optimization_cycles_limit = in_range("optimization_cycles_limit", value, 1, MAX_CYCLES)? as u32;
        Ok(())
    }

    pub fn set_ai_suggestions_threshold(&mut self, value: i64) -> Result<(), ConfigError> {
        self.ai_suggestions_threshold = percent("ai_suggestions_threshold", value)?;
        Ok(())
    }

    pub fn set_critical_issues_auto_fix_enabled(&mut self, enabled: bool) {
        self.critical_issues_auto_fix_enabled = enabled;
    }

    pub fn set_ai_timeout_secs(&mut self, value: i64) -> Result<(), ConfigError> {
        self.ai_timeout_secs = in_range("ai_timeout_secs", value, 1, 3600)? as u64;
        Ok(())
    }
}

/// On-disk shape of [`OptimizerConfig`]; signed so that negative values are
/// reported as range errors instead of type errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct OptimizerConfigFile {
    min_score_threshold: i64,
    optimization_cycles_limit: i64,
    ai_suggestions_threshold: i64,
    critical_issues_auto_fix_enabled: bool,
    ai_timeout_secs: i64,
}

impl Default for OptimizerConfigFile {
    fn default() -> Self {
        OptimizerConfig::default().into()
    }
}

impl TryFrom<OptimizerConfigFile> for OptimizerConfig {
    type Error = ConfigError;

    fn try_from(file: OptimizerConfigFile) -> Result<Self, Self::Error> {
        let mut config = OptimizerConfig::default();
        config.set_min_score_threshold(file.min_score_threshold)?;
        config.set_optimization_cycles_limit(file.optimization_cycles_limit)?;
        config.set_ai_suggestions_threshold(file.ai_suggestions_threshold)?;
        config.set_critical_issues_auto_fix_enabled(file.critical_issues_auto_fix_enabled);
        config.set_ai_timeout_secs(file.ai_timeout_secs)?;
        Ok(config)
    }
}

impl From<OptimizerConfig> for OptimizerConfigFile {
    fn from(config: OptimizerConfig) -> Self {
        Self {
            min_score_threshold: config.min_score_threshold.into(),
            optimization_cycles_limit: config.optimization_cycles_limit.into(),
            ai_suggestions_threshold: config.ai_suggestions_threshold.into(),
            critical_issues_auto_fix_enabled: config.critical_issues_auto_fix_enabled,
            ai_timeout_secs: config.ai_timeout_secs as i64,
        }
    }
}

/// Defaults used by the auto-fix engine when it has to invent content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFixConfig {
    /// Written to `<html lang>` when the attribute is missing
    pub default_lang: String,
    pub viewport: String,
    pub charset: String,
    pub fallback_title: String,
    pub fallback_h1: String,
    pub fallback_image_alt: String,
    /// Prefix keyword-free H2-H6 headings with a target keyword
    pub optimize_heading_keywords: bool,
    /// JSON-LD, Open Graph, link rel and breadcrumb injection
    pub enhancements_enabled: bool,
}

impl Default for AutoFixConfig {
    fn default() -> Self {
        Self {
            default_lang: "ru".to_string(),
            viewport: "width=device-width, initial-scale=1.0".to_string(),
            charset: "UTF-8".to_string(),
            fallback_title: "Untitled page".to_string(),
            fallback_h1: "Main heading".to_string(),
            fallback_image_alt: "Image".to_string(),
            optimize_heading_keywords: false,
            enhancements_enabled: true,
        }
    }
}

impl AutoFixConfig {
    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Result<Self, ConfigError> {
        self.default_lang = lang.into();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let lang = self.default_lang.trim();
        let well_formed = !lang.is_empty()
            && lang.len() <= 35
            && lang.split('-').all(|part| {
                !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric())
            });
        if !well_formed {
            return Err(ConfigError::Invalid {
                field: "default_lang",
                reason: format!("'{}' is not a language tag", self.default_lang),
            });
        }
        if self.charset.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "charset",
                reason: "must not be empty".to_string(),
            });
        }
        if self.viewport.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "viewport",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Which chat-completion backend serves the content improver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Disabled,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Local,
}

impl ProviderKind {
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Local => Some("http://localhost:11434/v1"),
            Self::Disabled => None,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::DeepSeek => "deepseek-chat",
            Self::Local => "llama3",
            Self::Disabled => "",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::Local | Self::Disabled => None,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" | "" => Ok(Self::Disabled),
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::Invalid {
                field: "provider",
                reason: format!("unknown provider '{other}'"),
            }),
        }
    }
}

/// Content improver selection and request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImproverConfig {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ImproverConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Disabled,
            model: None,
            base_url: None,
            api_key_env: None,
            temperature: 0.3,
            max_tokens: 4096,
        }
    }
}

impl ImproverConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.provider.default_base_url())
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.provider.default_api_key_env())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid {
                field: "temperature",
                reason: format!("{} is outside 0.0..=2.0", self.temperature),
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tokens",
                reason: "must be positive".to_string(),
            });
        }
        if let Some(base) = self.base_url.as_deref() {
            url::Url::parse(base).map_err(|e| ConfigError::Invalid {
                field: "base_url",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeolensConfig {
    pub optimizer: OptimizerConfig,
    pub autofix: AutoFixConfig,
    pub improver: ImproverConfig,
}

impl SeolensConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: SeolensConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.autofix.validate()?;
        self.improver.validate()
    }

    /// Apply `SEOLENS_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Either every override is applied or, on error, none is.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut next = self.clone();
        next.apply_overrides(&lookup)?;
        *self = next;
        Ok(())
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MIN_SCORE) {
            self.optimizer
                .set_min_score_threshold(parse_int(ENV_MIN_SCORE, &raw)?)?;
        }
        if let Some(raw) = lookup(ENV_CYCLES_LIMIT) {
            self.optimizer
                .set_optimization_cycles_limit(parse_int(ENV_CYCLES_LIMIT, &raw)?)?;
        }
        if let Some(raw) = lookup(ENV_AI_THRESHOLD) {
            self.optimizer
                .set_ai_suggestions_threshold(parse_int(ENV_AI_THRESHOLD, &raw)?)?;
        }
        if let Some(raw) = lookup(ENV_AUTOFIX_CRITICAL) {
            let enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        field: ENV_AUTOFIX_CRITICAL,
                        reason: format!("'{raw}' is not a boolean"),
                    });
                }
            };
            self.optimizer.set_critical_issues_auto_fix_enabled(enabled);
        }
        if let Some(lang) = lookup(ENV_DEFAULT_LANG) {
            self.autofix = self.autofix.clone().with_default_lang(lang)?;
        }
        if let Some(provider) = lookup(ENV_LLM_PROVIDER) {
            self.improver.provider = provider.parse()?;
        }
        if let Some(model) = lookup(ENV_LLM_MODEL) {
            self.improver.model = Some(model);
        }
        if let Some(base_url) = lookup(ENV_LLM_BASE_URL) {
            self.improver.base_url = Some(base_url);
        }
        self.validate()
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("'{raw}' is not an integer"),
    })
}

fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn percent(field: &'static str, value: i64) -> Result<u8, ConfigError> {
    in_range(field, value, 0, 100).map(|v| v as u8)
}
