use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use incident_dashboard::{Dashboard, DashboardConfig, DashboardView};
use incident_llm::{
    render_snapshots, LlmError, OpenAiStreamingClient, RequestSlot, TextGenerationClient,
    TextGenerationConfig,
};
use incident_protocol::{serialize_json, serialize_json_pretty, ChatPrompt, Dimension};
use serde::Serialize;
use std::path::{Path, PathBuf};

mod terminal;

use terminal::SnapshotPrinter;

#[derive(Parser)]
#[command(name = "incident-lens")]
#[command(about = "Incident analysis: cascading filters, flow and network views, LLM summaries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Dashboard settings (TOML); an `[llm]` table configures the text-generation endpoint
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the recomputed view-model (filters, flow diagram, network graph)
    View(ViewArgs),

    /// Print only the filter panels
    Filters(SelectionArgs),

    /// Print the structured summary payload for the selected categories
    Payload(SelectionArgs),

    /// Stream a summary of the selected categories
    Summarize(GenerateArgs),

    /// Stream an answer to a question about the filtered data
    Ask(AskArgs),
}

#[derive(Args)]
struct SelectionArgs {
    /// Incident table (CSV or JSON)
    #[arg(long)]
    incidents: PathBuf,

    /// Relation table (CSV or JSON)
    #[arg(long)]
    relations: PathBuf,

    /// Set every option of a key, e.g. `--select-all Group`
    #[arg(long = "select-all", value_parser = parse_dimension)]
    select_all: Vec<Dimension>,

    /// Clear every option of a key
    #[arg(long, value_parser = parse_dimension)]
    clear: Vec<Dimension>,

    /// Flip one option, e.g. `--toggle "Category=Network"`
    #[arg(long, value_parser = parse_toggle)]
    toggle: Vec<(Dimension, String)>,

    /// Narrow the driver key to the configured allow-list
    #[arg(long)]
    allow_list: bool,

    /// Duration (hours) shown as yellow
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Print the request instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question about the filtered incidents
    question: String,

    #[command(flatten)]
    generate: GenerateArgs,
}

fn parse_dimension(raw: &str) -> std::result::Result<Dimension, String> {
    raw.parse::<Dimension>().map_err(|err| err.to_string())
}

fn parse_toggle(raw: &str) -> std::result::Result<(Dimension, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((parse_dimension(key)?, value.trim().to_string()))
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

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    match cli.command {
        Commands::View(args) => {
            let (_, view) = open_dashboard(config, &args.selection)?;
            print_json(&view, args.pretty)?;
        }
        Commands::Filters(args) => {
            let (_, view) = open_dashboard(config, &args)?;
            print_json(&view.filters, true)?;
        }
        Commands::Payload(args) => {
            let (dashboard, _) = open_dashboard(config, &args)?;
            print_json(&dashboard.summary_payload()?, true)?;
        }
        Commands::Summarize(args) => {
            let (dashboard, _) = open_dashboard(config, &args.selection)?;
            let prompt = dashboard.summary_request()?;
            generate(prompt, args.dry_run, cli.config.as_deref()).await?;
        }
        Commands::Ask(args) => {
            let (dashboard, _) = open_dashboard(config, &args.generate.selection)?;
            let prompt = dashboard.ask_request(&args.question)?;
            generate(prompt, args.generate.dry_run, cli.config.as_deref()).await?;
        }
    }

    Ok(())
}

/// Load both tables, then apply mutations in order: select-all, clear,
/// toggles, allow-list, threshold.
fn open_dashboard(
    config: DashboardConfig,
    args: &SelectionArgs,
) -> Result<(Dashboard, DashboardView)> {
    let mut dashboard = Dashboard::new(config)?;
    dashboard
        .load_incidents(&args.incidents)
        .with_context(|| format!("Failed to load incidents {}", args.incidents.display()))?;
    dashboard
        .load_relations(&args.relations)
        .with_context(|| format!("Failed to load relations {}", args.relations.display()))?;

    for &key in &args.select_all {
        dashboard.select_all(key, true)?;
    }
    for &key in &args.clear {
        dashboard.select_all(key, false)?;
    }
    for (key, value) in &args.toggle {
        dashboard
            .toggle(*key, value)
            .with_context(|| format!("Failed to toggle {key}={value}"))?;
    }
    if args.allow_list {
        dashboard.apply_allow_list(true)?;
    }
    if let Some(threshold) = args.threshold {
        dashboard.set_threshold(threshold)?;
    }

    let view = dashboard.recompute().ok_or_else(|| {
        let missing: Vec<String> = dashboard
            .awaiting()
            .iter()
            .map(|table| format!("{table:?}").to_lowercase())
            .collect();
        anyhow!("Awaiting the {} table", missing.join(" and "))
    })?;
    Ok((dashboard, view))
}

async fn generate(prompt: ChatPrompt, dry_run: bool, config: Option<&Path>) -> Result<()> {
    if dry_run {
        return print_json(&prompt, true);
    }

    let llm = match config {
        Some(path) => TextGenerationConfig::from_config_file(path)?,
        None => TextGenerationConfig::from_env()?,
    };
    let client = OpenAiStreamingClient::from_config(&llm)?;

    let mut slot = RequestSlot::new();
    slot.start(async move {
        let mut printer = SnapshotPrinter::new(std::io::stdout());
        let content = render_snapshots(client.stream(&prompt), |snapshot| {
            if let Err(err) = printer.show(snapshot) {
                log::warn!("Failed to write to stdout: {err}");
            }
        })
        .await?;
        if let Err(err) = printer.finish() {
            log::warn!("Failed to write to stdout: {err}");
        }
        Ok::<_, LlmError>(content)
    });

    let content = slot.wait().await.context("Text generation failed")?;
    log::debug!("Received {} chars", content.len());
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serialize_json_pretty(value)?
    } else {
        serialize_json(value)?
    };
    println!("{output}");
    Ok(())
}
