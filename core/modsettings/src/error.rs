use std::io;
use thiserror::Error;

use crate::settings::Version;

#[derive(Error, Debug)]
pub enum ModSettingsError {
    // === External Errors ===
    #[error("IO Error: {0}")]
    Io(io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 Error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    // === Wire Format Errors ===
    #[error("Unexpected end of input")]
    TruncatedInput,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Cannot load settings from version {0}: settings version too low")]
    UnsupportedVersion(Version),

    #[error("Nesting exceeds the maximum depth of {0}")]
    DepthLimit(usize),

    #[error("Length {0} does not fit in a u32 length field")]
    LengthOverflow(usize),

    // === Textual Conversion Errors ===
    #[error("Dictionary entry has a null key")]
    NullKey,

    #[error("Number {0} has no JSON representation")]
    NonFiniteNumber(f64),
}

impl From<io::Error> for ModSettingsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ModSettingsError::TruncatedInput,
            _ => ModSettingsError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModSettingsError>;
