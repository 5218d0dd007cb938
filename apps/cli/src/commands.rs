//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use rankscout_core::pipeline;
use rankscout_shared::{
    AppConfig, ProgressReporter, config_file_path, load_config, load_config_from,
    write_default_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RankScout: keyword discovery and search ranking monitor.
#[derive(Parser)]
#[command(
    name = "rankscout",
    version,
    about = "Discover keywords for a site, track its search rankings and find optimization opportunities.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.rankscout/rankscout.toml).
    #[arg(long, global = true)]
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
    /// Expand seed keywords through suggestion sources and templates.
    Collect {
        /// Seed keywords (defaults to the configured seeds).
        seeds: Vec<String>,
    },

    /// Check the site's ranking for the top keywords on every enabled engine.
    Monitor,

    /// Analyze stored keywords and rankings, and list opportunities.
    Analyze,

    /// Print the highest-scored stored keywords.
    Keywords {
        /// Number of keywords to print.
        #[arg(short, long, default_value = "20")]
        limit: usize,
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
    /// Write a config file with defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. `RUST_LOG` takes precedence.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rankscout=info",
        1 => "rankscout=debug",
        _ => "rankscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Collect { seeds } => cmd_collect(config_path, seeds).await,
        Command::Monitor => cmd_monitor(config_path).await,
        Command::Analyze => cmd_analyze(config_path).await,
        Command::Keywords { limit } => cmd_keywords(config_path, limit),
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(config_path, force),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Stage commands
// ---------------------------------------------------------------------------

async fn cmd_collect(config_path: Option<PathBuf>, seeds: Vec<String>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let seeds = (!seeds.is_empty()).then_some(seeds);
    info!(
        seeds = seeds.as_ref().map_or(config.collection.seeds.len(), Vec::len),
        "collecting keywords"
    );

    let reporter = CliProgress::new();
    let outcome = pipeline::run_collection(&config, seeds, &reporter).await?;
    let stats = &outcome.stats;

    println!();
    println!("  Keyword collection finished");
    println!("  Seeds:       {}", stats.seeds_processed);
    println!("  Collected:   {}", stats.total_collected);
    println!("  New:         {}", stats.new_keywords);
    println!("  Duplicates:  {}", stats.duplicates);
    println!("  Filtered:    {} (+{} irrelevant)", stats.filtered, stats.irrelevant);
    println!("  Errors:      {}", stats.errors);
    println!("  Total:       {}", outcome.total_keywords);
    print_tail(outcome.report_path.as_ref(), &outcome.persistence_errors);
    Ok(())
}

async fn cmd_monitor(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    if config.enabled_engines().next().is_none() {
        return Err(eyre!("no search engines are enabled in the configuration"));
    }

    let reporter = CliProgress::new();
    let outcome = pipeline::run_monitoring(&config, &reporter).await?;
    let stats = &outcome.stats;

    println!();
    println!("  Ranking monitoring finished");
    println!("  Keywords:   {}", outcome.monitored);
    println!("  Checks:     {}", stats.total_checks);
    println!("  Found:      {}", stats.found);
    println!("  Not found:  {}", stats.not_found);
    println!("  Errors:     {}", stats.errors);
    for (engine, counter) in &stats.engines {
        println!(
            "    {engine:<8} {}/{} ({}%)",
            counter.found,
            counter.checked,
            counter.success_rate()
        );
    }
    print_opportunities(&outcome.opportunities, 10);
    print_tail(outcome.report_path.as_ref(), &outcome.persistence_errors);
    Ok(())
}

async fn cmd_analyze(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;

    let reporter = CliProgress::new();
    let outcome = pipeline::run_analysis(&config, &reporter).await?;

    println!();
    println!("  Keyword analysis ({} keywords)", outcome.analyses.len());
    for a in outcome.analyses.iter().take(10) {
        let best = a
            .ranking
            .best_rank
            .map_or_else(|| "-".to_string(), |r| format!("#{r}"));
        println!(
            "    {:>5.1}  {:<6} {:<11} {:<5} {}",
            a.overall_score,
            a.priority.as_str(),
            format!("{:?}", a.category).to_lowercase(),
            best,
            a.keyword
        );
    }
    print_opportunities(&outcome.opportunities, 10);
    print_tail(outcome.report_path.as_ref(), &outcome.persistence_errors);
    Ok(())
}

fn cmd_keywords(config_path: Option<PathBuf>, limit: usize) -> Result<()> {
    let config = resolve_config(config_path)?;
    let top = pipeline::top_keywords(&config, limit)?;
    if top.is_empty() {
        println!("No keywords stored yet. Run `rankscout collect` first.");
        return Ok(());
    }

    for (keyword, record) in top {
        println!("{:>6.1}  {:<40} {}", record.score, keyword, record.sources.join(","));
    }
    Ok(())
}

fn print_opportunities(opportunities: &[rankscout_shared::Opportunity], limit: usize) {
    if opportunities.is_empty() {
        return;
    }
    println!();
    println!("  Opportunities ({} total)", opportunities.len());
    for o in opportunities.iter().take(limit) {
        let engine = o.engine.as_deref().unwrap_or("-");
        println!(
            "    {:<7} {:<16} {:<7} {}: {}",
            o.priority.as_str(),
            o.kind.as_str(),
            engine,
            o.keyword,
            o.rationale
        );
    }
}

fn print_tail(report: Option<&PathBuf>, persistence_errors: &[String]) {
    if let Some(path) = report {
        println!("  Report:     {}", path.display());
    }
    for e in persistence_errors {
        println!("  Warning:    {e}");
    }
    println!();
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

    fn step(&self, label: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {label}"));
    }

    fn finish(&self, summary: &str) {
        self.spinner.finish_and_clear();
        info!(summary, "stage complete");
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => config_file_path()?,
    };
    if path.exists() && !force {
        return Err(eyre!(
            "config file already exists at '{}' (use --force to overwrite)",
            path.display()
        ));
    }
    write_default_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
