//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use nizam_docs_core::pipeline::{BuildReport, ProgressReporter};
use nizam_docs_core::{SiteContext, ViewState, catalog, load_overview, run_build, validate_manifest};
use nizam_docs_fetcher::FetchOptions;
use nizam_docs_markdown::{
    RenderOptions, extract_front_matter, normalize_document, render, render_document,
};
use nizam_docs_shared::{AppConfig, CONFIG_FILE_NAME, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nizam-docs: documentation catalog builder and renderer for the nizam website.
#[derive(Parser)]
#[command(
    name = "nizam-docs",
    version,
    about = "Build the nizam documentation catalog and render docs as the website shows them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file (defaults to ./nizam-docs.toml when present).
    #[arg(long, global = true, env = "NIZAM_DOCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch every manifest entry and write the catalog.
    Build {
        /// Catalog output path (defaults to output.catalog_path).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List manifest entries and the slugs they map to.
    Manifest,

    /// Render a local Markdown file to HTML.
    Render {
        /// Markdown file to render.
        file: PathBuf,

        /// Write HTML here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip syntax highlighting of code blocks.
        #[arg(long)]
        no_highlight: bool,

        /// Do not wrap headings in self-links.
        #[arg(long)]
        no_heading_links: bool,
    },

    /// Render one document from a persisted catalog.
    Show {
        /// Document slug.
        slug: String,

        /// Catalog path (defaults to output.catalog_path).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Load the live overview document the way the docs page does.
    View {
        /// Location fragment to navigate to, e.g. `#install`.
        #[arg(long)]
        fragment: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nizam_docs=info",
        1 => "nizam_docs=debug",
        _ => "nizam_docs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build { out } => cmd_build(config_path, out.as_deref()).await,
        Command::Manifest => cmd_manifest(config_path),
        Command::Render {
            file,
            out,
            no_highlight,
            no_heading_links,
        } => {
            let opts = RenderOptions {
                highlight: !no_highlight,
                heading_links: !no_heading_links,
                ..RenderOptions::default()
            };
            cmd_render(&file, out.as_deref(), &opts)
        }
        Command::Show { slug, catalog } => cmd_show(config_path, &slug, catalog.as_deref()),
        Command::View { fragment } => cmd_view(config_path, fragment.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    info!(
        base = %config.source.base_url,
        entries = config.manifest.len(),
        "building documentation catalog"
    );

    let reporter = CliProgress::new();
    let report = run_build(&config, out, &reporter).await.map_err(|e| {
        reporter.spinner.finish_and_clear();
        if e.is_io() {
            eyre!("catalog was not written: {e}")
        } else {
            e.into()
        }
    })?;

    println!();
    println!("  Catalog written!");
    println!("  Path:     {}", report.catalog_path.display());
    println!("  Docs:     {}", report.doc_count);
    println!("  Skipped:  {}", report.skipped.len());
    for skipped in &report.skipped {
        println!("    - {} ({})", skipped.path, skipped.reason);
    }
    println!("  Categories:");
    for (category, count) in &report.categories {
        println!("    {category}: {count}");
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_manifest(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let slugs = validate_manifest(&config.manifest)?;

    println!("{:>5}  {:<14} {:<32} {:<32} TITLE", "ORDER", "CATEGORY", "PATH", "SLUG");
    for (entry, slug) in config.manifest.iter().zip(&slugs) {
        println!(
            "{:>5}  {:<14} {:<32} {:<32} {}",
            entry.order,
            entry.category,
            entry.path,
            slug,
            entry.title.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn cmd_render(file: &Path, out: Option<&Path>, opts: &RenderOptions) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let doc = normalize_document(&name, &raw)?;
    let (_, body) = extract_front_matter(&raw);
    let rendered = render(body, opts)?;

    info!(
        file = %file.display(),
        title = %doc.title,
        headings = rendered.headings.len(),
        "rendered markdown"
    );
    let html = format!("<!-- {} ({}) -->\n{}", doc.title, doc.category, rendered.html);
    emit(&html, out)
}

fn cmd_show(config_path: Option<&Path>, slug: &str, catalog_path: Option<&Path>) -> Result<()> {
    let path = match catalog_path {
        Some(path) => path.to_path_buf(),
        None => load_config(config_path)?.output.catalog_path,
    };

    let catalog = catalog::load(&path)?;
    let doc = catalog
        .get(slug)
        .ok_or_else(|| eyre!("no document with slug '{slug}' in {}", path.display()))?;

    let rendered = render_document(doc, &RenderOptions::default())?;
    println!("<!-- {} ({}) -->", doc.title, doc.category);
    print!("{}", rendered.html);
    Ok(())
}

async fn cmd_view(config_path: Option<&Path>, fragment: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let site = SiteContext::initialize(&config.site);
    let fetch = FetchOptions {
        timeout_secs: config.source.timeout_secs,
    };

    let (view, scroll) =
        load_overview(&config.site, &fetch, &RenderOptions::default(), fragment).await?;
    print!("{}", view.to_page(&site));

    match (fragment, scroll) {
        (_, Some(request)) => eprintln!(
            "scroll: #{} ({:?}, {:?})",
            request.target_id, request.behavior, request.block
        ),
        (Some(fragment), None) => eprintln!("scroll: none ({fragment} not on page)"),
        (None, None) => {}
    }

    if let ViewState::Failed(message) = view.state() {
        return Err(eyre!("documentation view failed: {message}"));
    }
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.unwrap_or(Path::new(CONFIG_FILE_NAME));
    let written = init_config(path)?;
    println!("Config initialized at: {}", written.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn emit(html: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, html)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn entry_started(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {path}"));
    }

    fn entry_skipped(&self, path: &str, reason: &str) {
        self.spinner.println(format!("  skipped {path}: {reason}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}
