mod app;
mod config;
mod engine;
mod payload;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use eframe::egui::vec2;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use engine::Scene;
use engine::labels::EstimatedMeasure;
use engine::metrics::SizeMetric;
use engine::palette::Palettes;

#[derive(Debug, Parser)]
#[command(author, version, about = "Force-directed layout of investor and company graphs")]
struct Args {
    /// Graph payload: `{nodes, links}` or `{companies, vcs, investments}` JSON
    #[arg(long)]
    data: PathBuf,

    /// TOML file overriding physics and sizing defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Attribute driving node radius (picked from the data when omitted)
    #[arg(long, value_enum)]
    metric: Option<SizeMetric>,

    /// Run the layout to convergence and print the final frame as JSON
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if args.headless {
        return run_headless(&args, &config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let source = args.data.clone();
    let metric = args.metric;
    eframe::run_native(
        "venture-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::GraphViewApp::new(
                cc,
                source.clone(),
                config,
                metric,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to start the viewer: {error}"))
}

fn run_headless(args: &Args, config: &Config) -> Result<()> {
    if !(args.width > 0.0 && args.height > 0.0) {
        return Err(anyhow!(
            "viewport must be positive, got {}x{}",
            args.width,
            args.height
        ));
    }

    let payload = payload::load_payload(&args.data)?;
    let mut scene = Scene::build(
        &payload,
        vec2(args.width, args.height),
        config,
        args.metric,
        &mut Palettes::default(),
    );
    scene.assign_labels(&EstimatedMeasure::default());

    let ticks = scene.simulation.run_to_convergence();
    tracing::info!(ticks, alpha = scene.simulation.alpha(), "layout converged");

    let frame = scene.frame();
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}
