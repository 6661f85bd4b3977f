//! Keccak sponge construction.
//!
//! Absorbs a byte stream one 64-bit lane at a time into the rate portion of
//! the state and permutes whenever the rate fills. Output widths never exceed
//! the rate, so squeezing is a single read after the final permutation.

use super::permute::keccak_f;
use super::{Digest, State, LANE_BYTES, RATE_TERMINATOR, STATE_WORDS};
use crate::error::{ErrorCode, OracleResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;
use tracing::{debug, instrument, trace};

/// Supported digest widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputBits {
    /// 256-bit digest, 17 rate lanes
    B256,
    /// 384-bit digest, 13 rate lanes
    B384,
    /// 512-bit digest, 9 rate lanes
    B512,
}

impl OutputBits {
    /// All supported widths, smallest first.
    pub const ALL: [OutputBits; 3] = [OutputBits::B256, OutputBits::B384, OutputBits::B512];

    /// Width in bits.
    pub const fn bits(self) -> u64 {
        match self {
            OutputBits::B256 => 256,
            OutputBits::B384 => 384,
            OutputBits::B512 => 512,
        }
    }

    /// Digest length in bytes (`B/8`).
    pub const fn digest_len(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Lanes reserved for capacity (`2B/64`).
    pub const fn capacity_words(self) -> usize {
        (2 * self.bits() / 64) as usize
    }

    /// Lanes that absorb input (`25 - capacity_words`).
    pub const fn rate_words(self) -> usize {
        STATE_WORDS - self.capacity_words()
    }

    /// Rate in bytes.
    pub const fn rate_bytes(self) -> usize {
        self.rate_words() * LANE_BYTES
    }
}

impl TryFrom<u64> for OutputBits {
    type Error = ErrorCode;

    fn try_from(bits: u64) -> OracleResult<Self> {
        match bits {
            256 => Ok(OutputBits::B256),
            384 => Ok(OutputBits::B384),
            512 => Ok(OutputBits::B512),
            other => Err(ErrorCode::E200_InvalidConfiguration(other)),
        }
    }
}

impl fmt::Display for OutputBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for OutputBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for OutputBits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u64::deserialize(deserializer)?;
        OutputBits::try_from(bits).map_err(serde::de::Error::custom)
    }
}

/// Domain-separation rule applied at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingRule {
    /// Original Keccak submission: pad starts with a single `1` bit.
    Keccak,
    /// FIPS 202: domain bits `01`, then the pad `1` bit.
    #[default]
    Sha3,
}

impl PaddingRule {
    /// Suffix byte XORed in right after the last message byte.
    pub const fn suffix(self) -> u64 {
        match self {
            PaddingRule::Keccak => 0x01,
            PaddingRule::Sha3 => 0x06,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            PaddingRule::Keccak => "keccak",
            PaddingRule::Sha3 => "sha3",
        }
    }
}

impl FromStr for PaddingRule {
    type Err = ErrorCode;

    fn from_str(s: &str) -> OracleResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keccak" => Ok(PaddingRule::Keccak),
            "sha3" => Ok(PaddingRule::Sha3),
            _ => Err(ErrorCode::E201_UnknownPaddingRule(s.to_string())),
        }
    }
}

impl fmt::Display for PaddingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sponge state for incremental hashing.
///
/// Created fresh per message. `finalize` consumes the sponge, so absorbing
/// after finalization cannot be expressed.
#[derive(Debug, Clone)]
pub struct Sponge {
    /// Permutation state
    state: State,
    /// Bytes of a not-yet-complete lane, packed little-endian
    pending: u64,
    /// Number of bytes in `pending`, always < 8
    pending_len: usize,
    /// Rate lane that receives the next full word, always < rate_words
    lane: usize,
    width: OutputBits,
    padding: PaddingRule,
}

impl Sponge {
    /// Create a new sponge with a zero state.
    pub fn new(width: OutputBits, padding: PaddingRule) -> Self {
        Self {
            state: [0u64; STATE_WORDS],
            pending: 0,
            pending_len: 0,
            lane: 0,
            width,
            padding,
        }
    }

    /// Create a sponge from a raw bit width.
    ///
    /// Fails with `E200_InvalidConfiguration` unless `bits` is 256, 384 or 512.
    pub fn with_bits(bits: u64, padding: PaddingRule) -> OracleResult<Self> {
        Ok(Self::new(OutputBits::try_from(bits)?, padding))
    }

    /// 256-bit sponge.
    pub fn new_256(padding: PaddingRule) -> Self {
        Self::new(OutputBits::B256, padding)
    }

    /// 384-bit sponge.
    pub fn new_384(padding: PaddingRule) -> Self {
        Self::new(OutputBits::B384, padding)
    }

    /// 512-bit sponge.
    pub fn new_512(padding: PaddingRule) -> Self {
        Self::new(OutputBits::B512, padding)
    }

    /// Configured output width.
    pub fn width(&self) -> OutputBits {
        self.width
    }

    /// Configured padding rule.
    pub fn padding(&self) -> PaddingRule {
        self.padding
    }

    /// Number of rate lanes.
    pub fn rate_words(&self) -> usize {
        self.width.rate_words()
    }

    /// Number of capacity lanes.
    pub fn capacity_words(&self) -> usize {
        self.width.capacity_words()
    }

    /// Append bytes to the pending partial lane.
    #[inline]
    fn buffer(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.pending |= u64::from(b) << (8 * self.pending_len);
            self.pending_len += 1;
        }
        debug_assert!(self.pending_len <= LANE_BYTES);
    }

    /// XOR a complete lane into the rate and permute once the rate is full.
    #[inline]
    fn absorb_lane(&mut self, word: u64) {
        self.state[self.lane] ^= word;
        self.lane += 1;
        if self.lane == self.rate_words() {
            keccak_f(&mut self.state);
            self.lane = 0;
            trace!(width = self.width.bits(), "absorbed rate block");
        }
    }

    /// Absorb bytes. Any chunking of the same message gives the same digest.
    pub fn absorb(&mut self, mut input: &[u8]) {
        debug_assert!(self.pending_len < LANE_BYTES);
        debug_assert!(self.lane < self.rate_words());

        // Free slots in the partial lane; zero when nothing is pending.
        let free = (LANE_BYTES - self.pending_len) % LANE_BYTES;

        if input.len() < free {
            self.buffer(input);
            return;
        }

        if free != 0 {
            let (head, rest) = input.split_at(free);
            self.buffer(head);
            let word = std::mem::take(&mut self.pending);
            self.pending_len = 0;
            self.absorb_lane(word);
            input = rest;
        }

        let mut words = input.chunks_exact(LANE_BYTES);
        for chunk in &mut words {
            let mut bytes = [0u8; LANE_BYTES];
            bytes.copy_from_slice(chunk);
            self.absorb_lane(u64::from_le_bytes(bytes));
        }

        self.buffer(words.remainder());
        debug_assert!(self.pending_len < LANE_BYTES);
    }

    /// Apply padding, permute, and return the full 25-lane state.
    pub fn finalize_state(mut self) -> State {
        let suffix = self.padding.suffix() << (8 * self.pending_len);
        self.state[self.lane] ^= self.pending ^ suffix;
        self.state[self.rate_words() - 1] ^= RATE_TERMINATOR;
        keccak_f(&mut self.state);
        debug!(
            width = self.width.bits(),
            padding = self.padding.as_str(),
            "sponge finalized"
        );
        self.state
    }

    /// Apply padding, permute, and return the `B/8`-byte digest.
    pub fn finalize(self) -> Digest {
        let len = self.width.digest_len();
        Digest::from_state(&self.finalize_state(), len)
    }
}

impl Write for Sponge {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.absorb(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hash a complete message in one call.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn hash(bytes: &[u8], width: OutputBits, padding: PaddingRule) -> Digest {
    let mut sponge = Sponge::new(width, padding);
    sponge.absorb(bytes);
    sponge.finalize()
}

/// Hash everything a reader yields.
pub fn hash_reader<R: Read>(
    mut reader: R,
    width: OutputBits,
    padding: PaddingRule,
) -> io::Result<Digest> {
    let mut sponge = Sponge::new(width, padding);
    io::copy(&mut reader, &mut sponge)?;
    Ok(sponge.finalize())
}

fn fixed<const N: usize>(bytes: &[u8], width: OutputBits, padding: PaddingRule) -> [u8; N] {
    debug_assert_eq!(N, width.digest_len());
    let mut out = [0u8; N];
    let state = {
        let mut sponge = Sponge::new(width, padding);
        sponge.absorb(bytes);
        sponge.finalize_state()
    };
    for (dst, lane) in out.chunks_mut(LANE_BYTES).zip(state.iter()) {
        dst.copy_from_slice(&lane.to_le_bytes()[..dst.len()]);
    }
    out
}

/// SHA3-256.
pub fn sha3_256(bytes: &[u8]) -> [u8; 32] {
    fixed(bytes, OutputBits::B256, PaddingRule::Sha3)
}

/// SHA3-384.
pub fn sha3_384(bytes: &[u8]) -> [u8; 48] {
    fixed(bytes, OutputBits::B384, PaddingRule::Sha3)
}

/// SHA3-512.
pub fn sha3_512(bytes: &[u8]) -> [u8; 64] {
    fixed(bytes, OutputBits::B512, PaddingRule::Sha3)
}

/// Legacy Keccak-256 (pre-FIPS padding).
pub fn keccak_256(bytes: &[u8]) -> [u8; 32] {
    fixed(bytes, OutputBits::B256, PaddingRule::Keccak)
}

/// Legacy Keccak-384.
pub fn keccak_384(bytes: &[u8]) -> [u8; 48] {
    fixed(bytes, OutputBits::B384, PaddingRule::Keccak)
}

/// Legacy Keccak-512.
pub fn keccak_512(bytes: &[u8]) -> [u8; 64] {
    fixed(bytes, OutputBits::B512, PaddingRule::Keccak)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(width: OutputBits, padding: PaddingRule, msg: &[u8]) -> String {
        hash(msg, width, padding).to_hex()
    }

    #[test]
    fn test_config_table() {
        assert_eq!(OutputBits::B256.capacity_words(), 8);
        assert_eq!(OutputBits::B256.rate_words(), 17);
        assert_eq!(OutputBits::B384.capacity_words(), 12);
        assert_eq!(OutputBits::B384.rate_words(), 13);
        assert_eq!(OutputBits::B512.capacity_words(), 16);
        assert_eq!(OutputBits::B512.rate_words(), 9);
        assert_eq!(OutputBits::B256.rate_bytes(), 136);
    }

    #[test]
    fn test_invalid_width_rejected() {
        for bits in [0u64, 224, 255, 257, 1024] {
            assert_eq!(
                Sponge::with_bits(bits, PaddingRule::Sha3).err(),
                Some(ErrorCode::E200_InvalidConfiguration(bits))
            );
        }
        assert!(Sponge::with_bits(384, PaddingRule::Keccak).is_ok());
    }

    #[test]
    fn test_padding_rule_parse() {
        assert_eq!("sha3".parse::<PaddingRule>(), Ok(PaddingRule::Sha3));
        assert_eq!("Keccak".parse::<PaddingRule>(), Ok(PaddingRule::Keccak));
        assert_eq!(
            "shake".parse::<PaddingRule>(),
            Err(ErrorCode::E201_UnknownPaddingRule("shake".to_string()))
        );
        assert_eq!(PaddingRule::default(), PaddingRule::Sha3);
    }

    #[test]
    fn test_sha3_256_empty() {
        assert_eq!(
            hex_of(OutputBits::B256, PaddingRule::Sha3, b""),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_sha3_256_abc() {
        assert_eq!(
            hex_of(OutputBits::B256, PaddingRule::Sha3, b"abc"),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn test_keccak_256_abc_lanes() {
        let mut sponge = Sponge::new_256(PaddingRule::Keccak);
        sponge.absorb(b"abc");
        let state = sponge.finalize_state();
        assert_eq!(state[0], 0x4fa9_45ea_7a65_034e);
        assert_eq!(state[1], 0x67d6_c826_a87b_d4c7);
        assert_eq!(state[2], 0x36a0_643a_e3e6_d1c0);
        assert_eq!(state[3], 0x456c_2da1_8ff5_44ec);
    }

    #[test]
    fn test_partial_lane_stays_buffered() {
        let mut sponge = Sponge::new_256(PaddingRule::Sha3);
        sponge.absorb(b"abc");
        sponge.absorb(b"de");
        assert_eq!(sponge.state, [0u64; STATE_WORDS]);
        assert_eq!(sponge.pending_len, 5);
        assert_eq!(sponge.lane, 0);

        // three more bytes complete the lane exactly
        sponge.absorb(b"fgh");
        assert_eq!(sponge.pending_len, 0);
        assert_eq!(sponge.lane, 1);
        assert_eq!(sponge.state[0], u64::from_le_bytes(*b"abcdefgh"));
    }

    #[test]
    fn test_full_rate_triggers_permutation() {
        let mut sponge = Sponge::new_512(PaddingRule::Sha3);
        sponge.absorb(&[0u8; 71]);
        assert_eq!(sponge.lane, 8);
        assert_eq!(sponge.pending_len, 7);
        sponge.absorb(&[0u8; 1]);
        assert_eq!(sponge.lane, 0);
        assert_eq!(sponge.pending_len, 0);
        // zero input + one permutation of the zero state
        assert_eq!(sponge.state[0], 0xF125_8F79_40E1_DDE7);
    }

    #[test]
    fn test_suffix_and_terminator_share_last_lane() {
        // 135 bytes leave the sponge at lane 16 with 7 pending bytes
        let msg = [0x5au8; 135];
        let mut sponge = Sponge::new_256(PaddingRule::Sha3);
        sponge.absorb(&msg);
        assert_eq!(sponge.lane, sponge.rate_words() - 1);
        assert_eq!(sponge.pending_len, 7);
        assert_eq!(sponge.finalize(), hash(&msg, OutputBits::B256, PaddingRule::Sha3));
    }

    #[test]
    fn test_domain_separation() {
        for width in OutputBits::ALL {
            assert_ne!(
                hash(b"abc", width, PaddingRule::Sha3),
                hash(b"abc", width, PaddingRule::Keccak)
            );
        }
    }

    #[test]
    fn test_digest_lengths() {
        for width in OutputBits::ALL {
            assert_eq!(hash(b"", width, PaddingRule::Sha3).len(), width.digest_len());
        }
        assert_eq!(sha3_384(b"").len(), 48);
        assert_eq!(keccak_512(b"").len(), 64);
    }

    #[test]
    fn test_fixed_helpers_match_sponge() {
        let msg = b"The quick brown fox jumps over the lazy dog";
        assert_eq!(
            &sha3_256(msg)[..],
            hash(msg, OutputBits::B256, PaddingRule::Sha3).as_bytes()
        );
        assert_eq!(
            &keccak_384(msg)[..],
            hash(msg, OutputBits::B384, PaddingRule::Keccak).as_bytes()
        );
    }

    #[test]
    fn test_write_impl_streams() {
        let msg = vec![0xa3u8; 200];
        let mut sponge = Sponge::new_256(PaddingRule::Sha3);
        for chunk in msg.chunks(13) {
            sponge.write_all(chunk).unwrap();
        }
        sponge.flush().unwrap();
        assert_eq!(sponge.finalize(), hash(&msg, OutputBits::B256, PaddingRule::Sha3));
    }

    #[test]
    fn test_hash_reader() {
        let msg = b"abc".to_vec();
        let digest = hash_reader(&msg[..], OutputBits::B256, PaddingRule::Sha3).unwrap();
        assert_eq!(digest, hash(b"abc", OutputBits::B256, PaddingRule::Sha3));
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sponge>();
        assert_send_sync::<Digest>();
        assert_send_sync::<OutputBits>();
        assert_send_sync::<PaddingRule>();
    }

    #[test]
    fn test_serde_config() {
        assert_eq!(serde_json::to_string(&OutputBits::B384).unwrap(), "384");
        assert_eq!(serde_json::to_string(&PaddingRule::Keccak).unwrap(), "\"keccak\"");
        let bits: OutputBits = serde_json::from_str("512").unwrap();
        assert_eq!(bits, OutputBits::B512);
        assert!(serde_json::from_str::<OutputBits>("128").is_err());
    }
}
