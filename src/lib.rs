//! Keccak Oracle - Keccak-f[1600] sponge hashing with SHA3 and legacy Keccak padding.
//!
//! This crate reproduces the Keccak permutation and the fixed-output sponge
//! bit for bit, at 256, 384 and 512 bits of output.
//!
//! # Architecture
//!
//! - [`keccak`] - permutation, sponge state machine and digest type
//! - [`conformance`] - JSON test-vector corpus runner and repro bundles
//! - [`error`] - numbered error codes shared by the library and CLI
//!
//! # Example
//!
//! ```
//! use keccak_oracle::keccak::{OutputBits, PaddingRule, Sponge};
//!
//! let mut sponge = Sponge::new(OutputBits::B256, PaddingRule::Sha3);
//! sponge.absorb(b"ab");
//! sponge.absorb(b"c");
//! assert_eq!(
//!     sponge.finalize().to_hex(),
//!     "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
//! );
//! ```

// Library code must not abort the caller on bad input.
// Tests are checked separately with `cargo test`.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod conformance;
pub mod error;
pub mod keccak;

// Re-export commonly used types
pub use conformance::{CorpusResults, CorpusRunner, ReproBundle};
pub use error::{ErrorCode, OracleResult};
pub use keccak::{hash, Digest, OutputBits, PaddingRule, Sponge, State};
