//! Reproduction bundle for debugging conformance mismatches.

use super::TestVector;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Everything needed to replay a failed corpus vector.
#[derive(Debug, Clone, Serialize)]
pub struct ReproBundle {
    /// Vector id that failed.
    pub test_id: String,
    /// Operation that was being tested (e.g., "hash").
    pub op: String,
    /// Vector input, verbatim from the corpus.
    pub input: Value,
    /// Expected result as rendered by the runner.
    pub expected: String,
    /// What this implementation produced.
    pub actual: String,
}

impl ReproBundle {
    /// Build a bundle from a failed vector.
    pub fn from_failure(vector: &TestVector, expected: &str, actual: &str) -> Self {
        Self {
            test_id: vector.id.clone(),
            op: vector.op.clone(),
            input: vector.input.clone(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        format!(
            r#"=== Conformance Mismatch Report ===
Test: {}
Operation: {}
Input: {}

Expected: {}
Actual:   {}

To reproduce:
  keccak-oracle corpus <corpus.json>
"#,
            self.test_id, self.op, self.input, self.expected, self.actual,
        )
    }

    /// Format as JSON for machine parsing.
    pub fn to_json(&self) -> String {
        // Only strings and an already-parsed Value; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Report file name: the vector id as a single path component, plus `.txt`.
    ///
    /// Characters outside `[A-Za-z0-9_.-]` become `_`, and ids that would
    /// read as `.` or `..` are prefixed so they cannot name a directory.
    pub fn file_name(&self) -> String {
        let mut name: String = self
            .test_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() || name.chars().all(|c| c == '.') {
            name.insert(0, '_');
        }
        format!("{}.txt", name)
    }

    /// Save the report to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_report())
    }
}
