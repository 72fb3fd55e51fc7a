//! Transcript accuracy scoring.

mod accuracy;
mod alignment;

pub use accuracy::{calculate_accuracy, character_similarity, edit_script, normalize, AccuracyResult};
pub use alignment::{align, EditCounts, EditOp};
