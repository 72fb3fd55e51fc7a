//! Score command - compare a transcript against the original text.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;

use hocr_core::metrics::{calculate_accuracy, edit_script, AccuracyResult, EditOp};
use hocr_core::{parse_words, plain_text};

use super::write_output;

/// Arguments for the score command.
#[derive(Args)]
pub struct ScoreArgs {
    /// Original (reference) text file
    #[arg(required = true)]
    original: PathBuf,

    /// Transcribed text file
    #[arg(required = true)]
    transcribed: PathBuf,

    /// Treat both inputs as hOCR and compare their text content
    #[arg(long)]
    markup: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ScoreFormat,

    /// List word-level edits (an `edits` array in JSON output)
    #[arg(long)]
    show_edits: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ScoreFormat {
    /// JSON accuracy report
    Json,
    /// Human-readable summary
    Text,
}

/// JSON report with the edit list alongside the accuracy fields.
#[derive(Serialize)]
struct ScoreReport<'a> {
    #[serde(flatten)]
    result: &'a AccuracyResult,
    edits: Vec<EditOp>,
}

fn read_text(path: &Path, markup: bool) -> anyhow::Result<String> {
    let content = fs::read_to_string(path)?;
    if markup {
        Ok(plain_text(&parse_words(&content)?))
    } else {
        Ok(content)
    }
}

pub async fn run(args: ScoreArgs) -> anyhow::Result<()> {
    let original = read_text(&args.original, args.markup)?;
    let transcribed = read_text(&args.transcribed, args.markup)?;

    let result = calculate_accuracy(&original, &transcribed);

    let output = match args.format {
        ScoreFormat::Json if args.show_edits => {
            let edits = edit_script(&original, &transcribed)
                .into_iter()
                .filter(EditOp::is_edit)
                .collect();
            serde_json::to_string_pretty(&ScoreReport {
                result: &result,
                edits,
            })?
        }
        ScoreFormat::Json => serde_json::to_string_pretty(&result)?,
        ScoreFormat::Text => {
            let mut text = format_text(&result);
            if args.show_edits {
                text.push_str(&format_edits(&edit_script(&original, &transcribed)));
            }
            text
        }
    };

    write_output(args.output.as_ref(), &output)
}

fn format_text(result: &AccuracyResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Character similarity: {:.2}%\n",
        result.character_similarity * 100.0
    ));
    output.push_str(&format!(
        "Word similarity:      {:.2}%\n",
        result.word_similarity * 100.0
    ));
    output.push_str(&format!(
        "Word accuracy:        {:.2}%\n",
        result.word_accuracy * 100.0
    ));
    output.push_str(&format!(
        "Word error rate:      {:.2}%\n",
        result.word_error_rate * 100.0
    ));
    output.push('\n');
    output.push_str(&format!(
        "Words: {} original, {} transcribed, {} correct\n",
        result.total_words_original, result.total_words_transcribed, result.correct_words
    ));
    output.push_str(&format!(
        "Edits: {} substitutions, {} deletions, {} insertions\n",
        result.substitutions, result.deletions, result.insertions
    ));

    output
}

fn format_edits(ops: &[EditOp]) -> String {
    let mut output = String::from("\n");

    for op in ops {
        let line = match op {
            EditOp::Match { .. } => continue,
            EditOp::Substitute {
                original,
                transcribed,
            } => format!("{} {} -> {}", style("~").yellow(), original, transcribed),
            EditOp::Delete { original } => format!("{} {}", style("-").red(), original),
            EditOp::Insert { transcribed } => format!("{} {}", style("+").green(), transcribed),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}
