//! Digest output type.

use super::{State, LANE_BYTES};
use crate::error::{ErrorCode, OracleResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A finished hash value: the first `B/8` bytes of the final state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(Vec<u8>);

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Digest {
    /// Serialize lanes `0, 1, 2, ...` little-endian and keep the first `len` bytes.
    pub fn from_state(state: &State, len: usize) -> Self {
        debug_assert!(len <= state.len() * LANE_BYTES);
        let bytes = state
            .iter()
            .flat_map(|lane| lane.to_le_bytes())
            .take(len)
            .collect();
        Digest(bytes)
    }

    /// Create from a hex string (`0x` prefix tolerated).
    pub fn from_hex(hex_str: &str) -> OracleResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str).map_err(|_| ErrorCode::E103_InvalidHex)?;
        Ok(Digest(bytes))
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Digest length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length digest (never produced by a sponge).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Digest(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keccak::STATE_WORDS;

    #[test]
    fn test_from_state_little_endian_lanes() {
        let mut state = [0u64; STATE_WORDS];
        state[0] = 0x0807_0605_0403_0201;
        state[1] = 0x100f_0e0d_0c0b_0a09;
        let digest = Digest::from_state(&state, 12);
        assert_eq!(digest.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_hex_roundtrip_with_prefix() {
        let digest = Digest::from_hex("0xA7ffc6f8").unwrap();
        assert_eq!(digest.to_hex(), "a7ffc6f8");
        assert_eq!(digest.len(), 4);
    }

    #[test]
    fn test_invalid_hex() {
        assert_eq!(Digest::from_hex("zz"), Err(ErrorCode::E103_InvalidHex));
        assert_eq!(Digest::from_hex("abc"), Err(ErrorCode::E103_InvalidHex));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = Digest::from(vec![0xde, 0xad]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, "\"dead\"");
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
