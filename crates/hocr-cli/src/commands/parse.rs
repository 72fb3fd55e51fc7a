//! Parse command - decode an hOCR file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use hocr_core::{parse_lines, parse_words, plain_text};

use super::write_output;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input hOCR file
    #[arg(required = true)]
    input: PathBuf,

    /// Group words by line
    #[arg(long, conflicts_with = "text")]
    lines: bool,

    /// Print plain text instead of JSON
    #[arg(long)]
    text: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let markup = fs::read_to_string(&args.input)?;

    let output = if args.lines {
        let lines = parse_lines(&markup)?;
        info!("Decoded {} lines", lines.len());
        serde_json::to_string_pretty(&lines)?
    } else {
        let words = parse_words(&markup)?;
        info!("Decoded {} words", words.len());
        if args.text {
            plain_text(&words)
        } else {
            serde_json::to_string_pretty(&words)?
        }
    };

    write_output(args.output.as_ref(), &output)
}
