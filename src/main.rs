//! Text Region Overlay - classical text detection with OCR relabelling
//!
//! Boxes probable text regions in an image, or replaces them with the text an
//! OCR engine recognizes inside them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use text_region_overlay::config::{self, AppConfig, TextDecisionPolicy};
use text_region_overlay::input::{load_frame, save_image};
use text_region_overlay::storage;
use text_region_overlay::{Pipeline, TesseractOcr};

/// Text Region Overlay - box or relabel text regions in an image
#[derive(Parser, Debug)]
#[command(name = "text-region-overlay")]
#[command(about = "Detect text regions with edge heuristics and overlay OCR results")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Outline candidate text regions
    Detect {
        input: PathBuf,
        /// Output image (defaults to <stem>_boxes.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recognize candidate regions and replace them with their text
    Recognize {
        input: PathBuf,
        /// Output image (defaults to <stem>_labelled.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Tesseract language code(s)
        #[arg(short, long)]
        language: Option<String>,
        /// Text presence decision policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Write the recognized regions as JSON
        #[arg(long)]
        regions_json: Option<PathBuf>,
    },
    /// Print candidate regions as JSON
    Regions { input: PathBuf },
    /// List installed Tesseract languages
    Languages,
    /// Write the default configuration
    InitConfig { path: Option<PathBuf> },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    NonEmptyText,
    ConfidenceAboveZero,
}

impl From<PolicyArg> for TextDecisionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::NonEmptyText => TextDecisionPolicy::NonEmptyText,
            PolicyArg::ConfidenceAboveZero => TextDecisionPolicy::ConfidenceAboveZero,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        Command::Detect { input, output } => {
            let config = load_or_default_config(args.config.as_deref())?;
            run_detect(config, &input, output)
        }
        Command::Recognize {
            input,
            output,
            language,
            policy,
            regions_json,
        } => {
            let mut config = load_or_default_config(args.config.as_deref())?;
            if let Some(language) = language {
                config.ocr.language = language;
            }
            if let Some(policy) = policy {
                config.ocr.decision_policy = policy.into();
            }
            run_recognize(config, &input, output, regions_json)
        }
        Command::Regions { input } => {
            let config = load_or_default_config(args.config.as_deref())?;
            run_regions(config, &input)
        }
        Command::Languages => {
            let config = load_or_default_config(args.config.as_deref())?;
            let ocr = TesseractOcr::new(config.ocr);
            let languages = ocr
                .available_languages()
                .context("Failed to query Tesseract languages")?;
            for language in languages {
                println!("{}", language);
            }
            Ok(())
        }
        Command::InitConfig { path } => init_config(path.or(args.config)),
    }
}

/// Load configuration from the given file, the user config file, or defaults
fn load_or_default_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        let config = config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            let config = config::load_config(&config_path)
                .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

fn run_detect(config: AppConfig, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let frame = load_frame(input)?;

    let boxed = pipeline.detect_and_box(&frame);
    let output = output.unwrap_or_else(|| storage::derived_output_path(input, "boxes"));
    save_image(&boxed, &output)
}

fn run_recognize(
    config: AppConfig,
    input: &Path,
    output: Option<PathBuf>,
    regions_json: Option<PathBuf>,
) -> Result<()> {
    let ocr = TesseractOcr::new(config.ocr.clone());
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let frame = load_frame(input)?;
    info!("Recognizing {:?} with Tesseract language '{}'", input, ocr.language());

    let (labelled, recognition) = pipeline
        .recognize_and_overlay_cancellable(&frame, &ocr, &Default::default())
        .context("Recognition failed")?;

    info!(
        "{} of {} candidate regions contain text",
        recognition.text_regions().count(),
        recognition.regions.len()
    );

    let output = output.unwrap_or_else(|| storage::derived_output_path(input, "labelled"));
    save_image(&labelled, &output)?;

    if let Some(path) = regions_json {
        let json = serde_json::to_string_pretty(&recognition)?;
        std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Wrote regions to {:?}", path);
    }

    Ok(())
}

fn run_regions(config: AppConfig, input: &Path) -> Result<()> {
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let frame = load_frame(input)?;

    let rects = pipeline.detect(&frame);
    println!("{}", serde_json::to_string_pretty(&rects)?);
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => storage::default_config_path()?,
    };
    config::save_config(&AppConfig::default(), &path)
        .with_context(|| format!("Failed to write configuration to {:?}", path))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
