//! Corpus-driven conformance testing.
//!
//! A corpus is a JSON file of test vectors (permutation states, sponge
//! parameters, digests). The runner executes every vector against this
//! implementation and compares raw hex output, never parsed structures.
//! Failures can be turned into repro bundles for offline debugging.

pub mod corpus;
mod repro;

pub use corpus::{Corpus, CorpusManifest, CorpusResults, CorpusRunner, TestResult, TestVector};
pub use repro::ReproBundle;

/// Result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors that can occur while loading or reporting on a corpus.
#[derive(Debug)]
pub enum ConformanceError {
    /// Corpus file could not be read
    CorpusUnreadable(String),
    /// Corpus file is not valid corpus JSON
    CorpusParseError(String),
    /// I/O error while writing reports
    IoError(String),
}

impl std::fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorpusUnreadable(msg) => write!(f, "Failed to read corpus file: {}", msg),
            Self::CorpusParseError(msg) => write!(f, "Failed to parse corpus JSON: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ConformanceError {}

impl From<std::io::Error> for ConformanceError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
