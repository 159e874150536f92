use clap::{Parser, Subcommand};
use cli::{config_from_file, config_schema, read_text};
use color_eyre::eyre::Result;
use floorplan::{
    PlanDocument, RecognitionOutcome, Recognizer, RecognizerConfig, load_plan_image, parse_metadata,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize walls and rooms on a plan raster and print the result as JSON
    Recognize {
        /// Path to the plan image (PNG, JPEG, TIFF)
        #[arg(short, long)]
        image: PathBuf,
        /// Text extracted from the plan (OCR output or PDF text layer)
        #[arg(short, long)]
        text: Option<PathBuf>,
        /// Recognizer configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pixel to meter factor used when the text has no scale notation
        #[arg(short, long)]
        scale: Option<f64>,
        /// Also write walls and rooms as GeoJSON to this path
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Recognize several plans in parallel
    Batch {
        /// Plan images
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Recognizer configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Parse plan text and print the recognised metadata as JSON
    Metadata {
        /// Text file to parse
        #[arg(short, long)]
        text: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Recognize {
            image,
            text,
            config,
            scale,
            geojson,
        } => {
            recognize(image, text.as_deref(), config.as_deref(), *scale, geojson.as_deref())?;
        }
        Commands::Batch { images, config } => {
            batch(images, config.as_deref())?;
        }
        Commands::Schema => {
            println!("{}", config_schema()?);
        }
        Commands::Metadata { text } => {
            let content = std::fs::read_to_string(text)?;
            println!("{}", serde_json::to_string_pretty(&parse_metadata(&content))?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RecognizerConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Ok(config_from_file(path)?)
        }
        None => Ok(RecognizerConfig::default()),
    }
}

fn recognize(
    image_path: &Path,
    text_path: Option<&Path>,
    config_path: Option<&Path>,
    scale: Option<f64>,
    geojson_path: Option<&Path>,
) -> Result<()> {
    let mut builder = Recognizer::builder().with_config(load_config(config_path)?);
    if let Some(scale) = scale {
        builder = builder.with_scale(scale);
    }
    let recognizer = builder.build();
    info!("{}", recognizer.info());

    let mut document = PlanDocument::new(load_plan_image(image_path)?);
    if let Some(text) = read_text(text_path)? {
        document = document.with_text(text);
    }

    let outcome = match recognizer.analyze(&document) {
        Ok(plan) => {
            if let Some(path) = geojson_path {
                plan.geometry.save_geojson(path, plan.scale)?;
                info!("GeoJSON saved to: {:?}", path);
            }
            if !plan.unmatched.is_empty() {
                warn!("{} OCR rooms were not matched to detected rooms", plan.unmatched.len());
            }
            RecognitionOutcome::Success(plan.to_result())
        }
        Err(e) => RecognitionOutcome::Failure { error: e.to_string() },
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn batch(image_paths: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let recognizer = Recognizer::builder().with_config(load_config(config_path)?).build();

    let documents = image_paths
        .iter()
        .map(|path| load_plan_image(path).map(PlanDocument::new))
        .collect::<floorplan::Result<Vec<_>>>()?;

    let outcomes = recognizer.recognize_batch(&documents);
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!("Recognized {}/{} plans", succeeded, outcomes.len());

    let report: Vec<_> = image_paths
        .iter()
        .zip(&outcomes)
        .map(|(path, outcome)| serde_json::json!({ "image": path, "outcome": outcome }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
