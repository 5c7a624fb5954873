//! seolens: score, fix and optimize HTML pages for search engines

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use seolens_cli::render::{self, FixSummary};
use seolens_cli::{ProgressBarSink, input_url, load_config, load_context, load_input, write_output};
use seolens_core::{
    AnalysisOptions, AutoFixEngine, FixRequest, OptimizationLoop, OptimizationRequest, analyze,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "seolens",
    version,
    about = "Score, fix and optimize HTML pages for search engines"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Score a page and list recommendations
    Analyze(AnalyzeArgs),
    /// Apply deterministic fixes for critical issues
    Fix(FixArgs),
    /// Run the full fix-and-improve loop
    Optimize(OptimizeArgs),
}

#[derive(Args)]
struct PageArgs {
    /// HTML file, `-` for stdin, or an http(s) URL
    input: String,

    /// Target keyword (repeatable)
    #[arg(short = 'k', long = "keyword")]
    keywords: Vec<String>,

    /// Intended audience, passed to the analyzers
    #[arg(long)]
    audience: Option<String>,

    /// Base URL for classifying links (defaults to the input URL)
    #[arg(long)]
    base_url: Option<Url>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl PageArgs {
    fn options(&self) -> AnalysisOptions {
        let mut options = AnalysisOptions::default().with_keywords(&self.keywords);
        if let Some(audience) = &self.audience {
            options = options.with_audience(audience);
        }
        if let Some(base) = self.base_url.clone().or_else(|| input_url(&self.input)) {
            options = options.with_base_url(base);
        }
        options
    }
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct FixArgs {
    #[command(flatten)]
    page: PageArgs,

    /// JSON file with page metadata (title, description, url, ...)
    #[arg(long)]
    context: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the fixed HTML here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct OptimizeArgs {
    #[command(flatten)]
    page: PageArgs,

    /// JSON file with page metadata (title, description, url, ...)
    #[arg(long)]
    context: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the optimized HTML here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Session id (generated when omitted)
    #[arg(long)]
    session_id: Option<String>,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Fix(args) => run_fix(args).await,
        Command::Optimize(args) => run_optimize(args).await,
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let html = load_input(&args.page.input).await?;
    let report = analyze(&html, &args.page.options());
    info!(score = report.overall_score, "analysis finished");

    if args.page.json {
        print!("{}", render::to_json(&report.summary())?);
    } else {
        print!("{}", render::render_analysis(&report));
    }
    Ok(())
}

async fn run_fix(args: FixArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let context = load_context(args.context.as_deref())?;
    let html = load_input(&args.page.input).await?;
    let options = args.page.options();

    let engine = AutoFixEngine::new(config.autofix)?;
    let before = analyze(&html, &options);
    let outcome = engine.apply(
        &html,
        &FixRequest::new(&before.recommendations)
            .with_context(context.as_ref())
            .with_keywords(&options.keywords),
    );
    let after = analyze(&outcome.html, &options);

    if let Some(path) = &args.output {
        write_output(path, &outcome.html)?;
        info!(path = %path.display(), "wrote fixed HTML");
    }

    if args.page.json {
        let summary = FixSummary::new(&outcome, &before, &after, args.output.is_none());
        print!("{}", render::to_json(&summary)?);
    } else if args.output.is_some() {
        print!("{}", render::render_fix(&outcome, &before, &after));
    } else {
        eprint!("{}", render::render_fix(&outcome, &before, &after));
        print!("{}", outcome.html);
    }
    Ok(())
}

async fn run_optimize(args: OptimizeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let context = load_context(args.context.as_deref())?;
    let html = load_input(&args.page.input).await?;

    let session_id = args
        .session_id
        .clone()
        .unwrap_or_else(|| format!("cli-{}", std::process::id()));
    let mut request = OptimizationRequest::new(html)
        .with_session_id(session_id.clone())
        .with_options(args.page.options());
    if let Some(context) = context {
        request = request.with_context(context);
    }

    let progress = if args.progress {
        Some(Arc::new(ProgressBarSink::new()?))
    } else {
        None
    };
    let mut optimizer = OptimizationLoop::from_config(&config)?;
    if let Some(sink) = &progress {
        optimizer = optimizer.with_sink(sink.clone());
    }
    let optimizer = Arc::new(optimizer);

    let interrupt = {
        let optimizer = Arc::clone(&optimizer);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(%session_id, "interrupt received, cancelling optimization");
                optimizer.cancel(&session_id);
            }
        })
    };
    let outcome = optimizer.start_optimization(request).await;
    interrupt.abort();
    if let Some(sink) = &progress {
        sink.finish();
    }
    let outcome = outcome?;

    if let (Some(path), Some(report)) = (&args.output, outcome.report()) {
        write_output(path, &report.optimized_html)?;
        info!(path = %path.display(), "wrote optimized HTML");
    }

    if args.page.json {
        print!("{}", render::to_json(&outcome)?);
        return Ok(());
    }

    match (outcome.report(), &args.output) {
        (Some(report), None) => {
            eprint!("{}", render::render_optimization(&outcome));
            print!("{}", report.optimized_html);
        }
        _ => print!("{}", render::render_optimization(&outcome)),
    }
    Ok(())
}
