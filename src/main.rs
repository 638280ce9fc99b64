mod app;
mod engine;
mod graph;
mod svg;
mod util;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use engine::ForceSettings;
use graph::{GraphSource, themed_sample};
use svg::StaticConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive graph window (default).
    View(ViewArgs),
    /// Write a static SVG rendering of the graph.
    Render(RenderArgs),
}

#[derive(Debug, Default, Args)]
struct ViewArgs {
    /// Graph JSON payload; the built-in sample graph when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// JSON file overriding force settings (camelCase keys).
    #[arg(long)]
    forces: Option<PathBuf>,
    /// Start fully bloomed.
    #[arg(long)]
    expanded: bool,
    /// Prefix joined to relative node links before opening them.
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[arg(long)]
    data: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long, default_value_t = 1200.0)]
    width: f32,
    #[arg(long, default_value_t = 300.0)]
    height: f32,
    /// Seed for the layout jitter.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 30)]
    max_nodes: usize,
    #[arg(long, default_value_t = 1)]
    min_degree: u32,
    #[arg(long, default_value_t = 50)]
    label_iterations: usize,
    #[arg(long, default_value_t = 20.0)]
    label_padding: f32,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn view(args: ViewArgs) -> Result<()> {
    let settings = match &args.forces {
        Some(path) => ForceSettings::load(path)?,
        None => ForceSettings::default(),
    };
    let source = match args.data {
        Some(path) => GraphSource::File(path),
        None => GraphSource::Literal(themed_sample()),
    };
    info!(source = %source.describe(), expanded = args.expanded, "starting viewer");

    let options = app::ViewOptions {
        source,
        settings,
        expanded: args.expanded,
        base_url: args.base_url,
    };
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Athanor",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::GraphViewerApp::new(cc, options)))),
    )
    .map_err(|error| anyhow!("graph viewer failed: {error}"))
}

fn render(args: RenderArgs) -> Result<()> {
    let raw = GraphSource::File(args.data.clone()).load()?;
    let config = StaticConfig {
        width: args.width,
        height: args.height,
        seed: args.seed,
        max_nodes: args.max_nodes,
        min_degree: args.min_degree,
        label_iterations: args.label_iterations,
        label_padding: args.label_padding,
        ..StaticConfig::default()
    };

    let document = svg::render(&raw, &config);
    fs::write(&args.output, document)
        .with_context(|| format!("failed to write SVG to {}", args.output.display()))?;
    info!(output = %args.output.display(), "wrote static graph");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Render(args)) => render(args),
        Some(Command::View(args)) => view(args),
        None => view(ViewArgs::default()),
    }
}
