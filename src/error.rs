//! Error handling for the Keccak oracle.
//!
//! Every failure the library or CLI can report maps to one numbered
//! `ErrorCode`. The numeric codes are part of the CLI output format and must
//! stay stable.
//!
//! - 1xx: input decoding (JSON, hex, lengths, I/O)
//! - 2xx: sponge configuration

use thiserror::Error;

/// All error codes reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    /// E100_InvalidJSON (code 100)
    #[error("E100_InvalidJSON")]
    E100_InvalidJSON,

    /// E101_InputUnreadable (code 101)
    #[error("E101_InputUnreadable({0})")]
    E101_InputUnreadable(/* reason */ String),

    /// E102_InputTooLarge (code 102): a requested size exceeds its limit
    #[error("E102_InputTooLarge({0}, {1})")]
    E102_InputTooLarge(/* what */ String, /* limit */ u64),

    /// E103_InvalidHex (code 103)
    #[error("E103_InvalidHex")]
    E103_InvalidHex,

    /// E104_WrongLength (code 104)
    #[error("E104_WrongLength({0}, {1})")]
    E104_WrongLength(/* expected */ String, /* got */ u64),

    /// E200_InvalidConfiguration (code 200): output width not in {256, 384, 512}
    #[error("E200_InvalidConfiguration({0})")]
    E200_InvalidConfiguration(/* width */ u64),

    /// E201_UnknownPaddingRule (code 201)
    #[error("E201_UnknownPaddingRule({0})")]
    E201_UnknownPaddingRule(/* name */ String),
}

impl ErrorCode {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            ErrorCode::E100_InvalidJSON => 100,
            ErrorCode::E101_InputUnreadable(_) => 101,
            ErrorCode::E102_InputTooLarge(_, _) => 102,
            ErrorCode::E103_InvalidHex => 103,
            ErrorCode::E104_WrongLength(_, _) => 104,
            ErrorCode::E200_InvalidConfiguration(_) => 200,
            ErrorCode::E201_UnknownPaddingRule(_) => 201,
        }
    }

    /// Get the error name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::E100_InvalidJSON => "E100_InvalidJSON",
            ErrorCode::E101_InputUnreadable(_) => "E101_InputUnreadable",
            ErrorCode::E102_InputTooLarge(_, _) => "E102_InputTooLarge",
            ErrorCode::E103_InvalidHex => "E103_InvalidHex",
            ErrorCode::E104_WrongLength(_, _) => "E104_WrongLength",
            ErrorCode::E200_InvalidConfiguration(_) => "E200_InvalidConfiguration",
            ErrorCode::E201_UnknownPaddingRule(_) => "E201_UnknownPaddingRule",
        }
    }
}

impl From<std::io::Error> for ErrorCode {
    fn from(err: std::io::Error) -> Self {
        ErrorCode::E101_InputUnreadable(err.to_string())
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, ErrorCode>;
