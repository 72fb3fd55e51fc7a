//! Detect command - find word boxes in a single page image.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use hocr_core::{Document, GeometryRecognizer, HocrEncoder, Recognizer};

use super::{load_config, write_output};

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input image (PNG, JPEG, TIFF, ...)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "hocr")]
    format: OutputFormat,

    /// Show word and line counts
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// hOCR markup
    Hocr,
    /// JSON word list
    Json,
    /// Plain text, one line per row
    Text,
}

/// Detection result for one image.
pub struct Detection {
    pub hocr: String,
    pub document: Document,
}

/// Run word detection on an image file and decode the result into a document.
pub fn detect_file(
    path: &Path,
    recognizer: &GeometryRecognizer,
    encoder: &HocrEncoder,
) -> anyhow::Result<Detection> {
    let image = image::open(path)?;
    let page = recognizer.recognize(&image)?;

    let hocr = encoder.encode_page(&page);
    let document = Document::from_markup(&hocr)?;

    Ok(Detection { hocr, document })
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Detecting words...");

    let recognizer = GeometryRecognizer::from_config(&config);
    let encoder = HocrEncoder::with_config(config.markup.clone());
    let detection = detect_file(&args.input, &recognizer, &encoder)?;

    pb.finish_and_clear();

    let output = match args.format {
        OutputFormat::Hocr => detection.hocr,
        OutputFormat::Json => serde_json::to_string_pretty(detection.document.words())?,
        OutputFormat::Text => detection.document.plain_text(),
    };

    write_output(args.output.as_ref(), &output)?;

    if args.stats {
        eprintln!(
            "{} {} words in {} lines ({}x{})",
            style("ℹ").blue(),
            detection.document.len(),
            detection.document.lines().len(),
            detection.document.width(),
            detection.document.height()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
