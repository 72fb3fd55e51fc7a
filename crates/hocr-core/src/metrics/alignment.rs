//! Word-level alignment by minimum edit distance.

use serde::{Deserialize, Serialize};

/// One step of a word-level edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Word present in both sequences.
    Match { word: String },
    /// Original word replaced by a different transcribed word.
    Substitute { original: String, transcribed: String },
    /// Original word missing from the transcript.
    Delete { original: String },
    /// Transcribed word with no counterpart in the original.
    Insert { transcribed: String },
}

impl EditOp {
    /// True for every operation except [`EditOp::Match`].
    pub fn is_edit(&self) -> bool {
        !matches!(self, EditOp::Match { .. })
    }
}

/// Counts of each operation kind in an edit script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    pub matches: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

impl EditCounts {
    /// Tally an edit script.
    pub fn from_ops(ops: &[EditOp]) -> Self {
        let mut counts = Self::default();
        for op in ops {
            match op {
                EditOp::Match { .. } => counts.matches += 1,
                EditOp::Substitute { .. } => counts.substitutions += 1,
                EditOp::Delete { .. } => counts.deletions += 1,
                EditOp::Insert { .. } => counts.insertions += 1,
            }
        }
        counts
    }

    /// Substitutions + deletions + insertions.
    pub fn edits(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }
}

/// Align two word sequences, returning the edit script in original order.
///
/// Ties between equally cheap paths are broken by preferring, in order, a
/// match, a substitution, a deletion and an insertion while walking back from
/// the end of both sequences.
pub fn align<S: AsRef<str>>(original: &[S], transcribed: &[S]) -> Vec<EditOp> {
    let (m, n) = (original.len(), transcribed.len());
    let word = |seq: &[S], i: usize| seq[i].as_ref().to_string();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if original[i - 1].as_ref() == transcribed[j - 1].as_ref() {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && original[i - 1].as_ref() == transcribed[j - 1].as_ref() {
            ops.push(EditOp::Match {
                word: word(original, i - 1),
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && dp[i][j] == dp[i - 1][j - 1] + 1 {
            ops.push(EditOp::Substitute {
                original: word(original, i - 1),
                transcribed: word(transcribed, j - 1),
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && dp[i][j] == dp[i - 1][j] + 1 {
            ops.push(EditOp::Delete {
                original: word(original, i - 1),
            });
            i -= 1;
        } else {
            ops.push(EditOp::Insert {
                transcribed: word(transcribed, j - 1),
            });
            j -= 1;
        }
    }

    ops.reverse();
    ops
}
