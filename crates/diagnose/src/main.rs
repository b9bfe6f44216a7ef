//! Plant Disease Pipeline - command-line entry point
//!
//! Loads the model once, classifies each image given on the command line
//! and prints one JSON diagnosis per image on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pipeline::{Backend, ClassificationPipeline, PipelineConfig};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "plant-diagnose", version, about = "Classify leaf images with a plant disease model")]
struct Args {
    /// Pipeline config file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model artifact, overrides the config file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Runtime (tract or onnxruntime), overrides the config file
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Plant type reported alongside each prediction
    #[arg(short, long, default_value = "Tomato")]
    plant_type: String,

    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Images to classify
    #[arg(default_values = ["test_images/sample1.jpg", "test_images/sample2.jpg", "test_images/sample3.jpg"])]
    images: Vec<PathBuf>,
}

/// Initialize logging on stderr so stdout only carries results
fn init_logging(level: Level, json: bool) -> anyhow::Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
    .context("Failed to set tracing subscriber")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level, args.json_logs)?;

    info!("=== Plant Disease Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = PipelineConfig::load(args.config.as_deref()).context("Failed to load pipeline config")?;
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }

    let pipeline = ClassificationPipeline::from_config(&config)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let mut failed = 0;
    for image in &args.images {
        if !image.is_file() {
            warn!("Sample image not found: {}", image.display());
            continue;
        }

        info!("Testing: {}", image.display());
        match pipeline.diagnose(image, &args.plant_type) {
            Ok(diagnosis) => {
                for (rank, entry) in diagnosis.prediction.ranked_list().iter().enumerate() {
                    info!("  {}. {}: {:.4}", rank + 1, entry.label, entry.confidence);
                }
                println!("{}", serde_json::to_string_pretty(&diagnosis)?);
            }
            Err(e) => {
                failed += 1;
                error!(kind = ?e.kind(), "Prediction failed for {}: {}", image.display(), e);
            }
        }
    }

    info!("Done: {} image(s), {} failed", args.images.len(), failed);
    Ok(())
}
