//! Keccak-f[1600] permutation and fixed-output sponge.
//!
//! # Layout
//!
//! - [`permute`] - the 24-round permutation over 25 64-bit lanes
//! - [`Sponge`] - incremental absorb/finalize state machine
//! - [`Digest`] - the `B/8`-byte output, read little-endian from the rate lanes
//!
//! Only the two padding rules (SHA3 and legacy Keccak) and three widths
//! (256, 384, 512 bits) are supported. Extendable output is not.

mod digest;
mod params;
mod permute;
mod sponge;

pub use digest::Digest;
pub use params::{
    LANE_BYTES, PI_LANES, RATE_TERMINATOR, ROTATION_OFFSETS, ROUNDS, ROUND_CONSTANTS, STATE_WORDS,
};
pub use permute::{permute, permute_with_trace};
pub use sponge::{
    hash, hash_reader, keccak_256, keccak_384, keccak_512, sha3_256, sha3_384, sha3_512,
    OutputBits, PaddingRule, Sponge,
};

/// The full permutation state: lane `x + 5y` of the 5x5 grid.
pub type State = [u64; STATE_WORDS];
