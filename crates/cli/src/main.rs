use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use regsum_outline::{
    outline_from_annotated_markup, render_markdown, MarkupParser, Normalizer, OutlineNode,
    OutlineParser,
};
use regsum_scheduler::{BoundedExecutor, MAX_CONCURRENCY};
use regsum_summarize::{
    JsonFileCache, MemoryCache, OpenAiSummarizer, Orchestrator, SummarizationService,
    SummaryCache,
};
use settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod settings;

#[derive(Parser)]
#[command(name = "regsum")]
#[command(about = "Rebuild and summarize the outline of numbered regulatory documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the outline tree of a document
    Parse(ParseArgs),

    /// Summarize an outline tree produced by `parse`
    Summarize(SummarizeArgs),

    /// Render an outline tree as markdown with path-annotated headings
    Render(RenderArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Plain text, one heading or body line per line
    Text,
    /// Transcribed HTML pages; headings are relevelled by their numbering
    Html,
    /// HTML previously rewritten by `--format html`
    Annotated,
}

#[derive(Args)]
struct ParseArgs {
    /// Input files, concatenated in order (e.g. one file per transcribed page)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Text)]
    format: InputFormat,

    /// Write the tree JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the relevelled markup here (html format only)
    #[arg(long)]
    html_output: Option<PathBuf>,

    /// Regex removed from text input before parsing (repeatable)
    #[arg(long = "strip-pattern")]
    strip_patterns: Vec<String>,

    /// Mark footnotes and format paragraphs after parsing
    #[arg(long)]
    normalize: bool,

    /// Last footnote number seen before this document
    #[arg(long, default_value_t = 0)]
    footnote_start: u32,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct SummarizeArgs {
    /// Outline tree JSON produced by `parse`
    tree: PathBuf,

    /// Write the summarized tree here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Summarize only the node at this path, e.g. `3` or `3,1`
    #[arg(long, value_delimiter = ',')]
    node: Vec<usize>,

    /// Maximum concurrent service requests (overrides REGSUM_CONCURRENCY)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Summary cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Keep summaries in memory only
    #[arg(long, conflicts_with = "cache")]
    memory_cache: bool,

    /// Subtrees up to this many characters are summarized in one request
    #[arg(long)]
    threshold: Option<usize>,

    /// Also summarize descendants of subtrees summarized in one request
    #[arg(long)]
    every_node: bool,

    /// Chat model (overrides REGSUM_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Outline tree JSON
    tree: PathBuf,

    /// Write markdown here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Parse(args) => run_parse(args, settings)?,
        Commands::Summarize(args) => run_summarize(args, settings).await?,
        Commands::Render(args) => run_render(args)?,
    }

    Ok(())
}

fn run_parse(args: ParseArgs, mut settings: Settings) -> Result<()> {
    settings
        .parser
        .strip_patterns
        .extend(args.strip_patterns.iter().cloned());
    settings.validate()?;

    let content = read_inputs(&args.inputs)?;
    let mut tree = match args.format {
        InputFormat::Text => OutlineParser::new(settings.parser.clone())?.parse_str(&content),
        InputFormat::Html => {
            let outline = MarkupParser::new(settings.parser.clone())?.parse_str(&content)?;
            if let Some(path) = &args.html_output {
                write_output(Some(path.as_path()), &outline.html)?;
            }
            outline.into_tree()
        }
        InputFormat::Annotated => outline_from_annotated_markup(&content)?,
    };
    if args.html_output.is_some() && args.format != InputFormat::Html {
        log::warn!("--html-output only applies to --format html; ignored");
    }

    if args.normalize {
        let normalizer = Normalizer::new(settings.normalizer);
        let last = normalizer.normalize_tree(&mut tree, args.footnote_start);
        log::info!("Normalized body text (last footnote {last})");
    }

    log::info!(
        "Parsed {} nodes, {} at the top level",
        tree.count(),
        tree.children.len()
    );
    write_output(args.output.as_deref(), &to_json(&tree, args.pretty)?)
}

async fn run_summarize(args: SummarizeArgs, mut settings: Settings) -> Result<()> {
    if let Some(limit) = args.concurrency {
        settings.concurrency = limit.clamp(1, MAX_CONCURRENCY);
    }
    if let Some(path) = args.cache {
        settings.cache_path = path;
    }
    if let Some(threshold) = args.threshold {
        settings.orchestrator.threshold = threshold;
    }
    if args.every_node {
        settings.orchestrator.summarize_every_node = true;
    }
    if let Some(model) = args.model {
        settings.openai.model = model;
    }
    settings.validate()?;

    let mut tree = read_tree(&args.tree)?;

    let cache: Arc<dyn SummaryCache> = if args.memory_cache {
        Arc::new(MemoryCache::new())
    } else {
        let cache = JsonFileCache::open(&settings.cache_path)
            .await
            .with_context(|| format!("Cannot open cache {}", settings.cache_path.display()))?;
        log::info!(
            "Using summary cache {} ({} entries)",
            cache.path().display(),
            cache.len()
        );
        Arc::new(cache)
    };
    let service: Arc<dyn SummarizationService> =
        Arc::new(OpenAiSummarizer::new(settings.openai.clone())?);
    let executor = BoundedExecutor::new(settings.concurrency, settings.retry)?;
    let orchestrator = Orchestrator::new(service, cache, executor, settings.orchestrator)?;

    let target = tree
        .get_mut(&args.node)
        .with_context(|| format!("No node at path {:?}", args.node))?;
    orchestrator.summarize_tree(target).await;

    let stats = orchestrator.stats();
    if stats.failures > 0 {
        log::warn!("{} node(s) could not be summarized", stats.failures);
    }
    write_output(args.output.as_deref(), &to_json(&tree, args.pretty)?)
}

fn run_render(args: RenderArgs) -> Result<()> {
    let tree = read_tree(&args.tree)?;
    write_output(args.output.as_deref(), &render_markdown(&tree))
}

fn read_inputs(paths: &[PathBuf]) -> Result<String> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let part = fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        parts.push(part);
    }
    Ok(parts.join("\n"))
}

fn read_tree(path: &Path) -> Result<OutlineNode> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid outline tree {}", path.display()))
}

fn to_json(tree: &OutlineNode, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    Ok(json)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create {}", parent.display()))?;
            }
            fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
