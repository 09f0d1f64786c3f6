use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// STORE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    /// The key file could not be read or written. Fatal to startup.
    #[error("key file {path} is not accessible: {source}")]
    KeyIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key file holds the wrong number of bytes, so nothing can be
    /// encrypted with it.
    #[error("key file {path} holds {len} bytes, expected 32")]
    InvalidKey { path: PathBuf, len: usize },

    /// The entry list cannot be written in the record format.
    #[error("entries could not be encoded: {0}")]
    Encode(#[source] FormatError),

    /// An existing blob failed to decrypt or decode.
    #[error("saved entries are corrupt: {0}")]
    Corrupt(#[from] CorruptReason),

    /// The blob file could not be read or written.
    #[error("entry file {path} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt(_))
    }
}

#[derive(Debug, Error)]
pub enum CorruptReason {
    #[error("key file is missing")]
    MissingKey,
    #[error("blob is not valid base64")]
    Base64,
    #[error("blob is shorter than one cipher block")]
    TooShort,
    #[error("key has {0} bytes, expected 32")]
    InvalidKeyLength(usize),
    #[error("ciphertext could not be decrypted")]
    Decrypt,
    #[error(transparent)]
    Format(#[from] FormatError),
}

// ============================================================================
// RECORD FORMAT ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("missing record header")]
    BadMagic,
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),
    #[error("record data truncated while reading {0}")]
    Truncated(&'static str),
    #[error("unknown entry kind tag {0}")]
    UnknownKind(u8),
    #[error("unknown payload format {0:?}")]
    UnknownFormat(String),
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
    #[error("{0} unexpected bytes after the last record")]
    TrailingBytes(usize),
    #[error("text entry carries a payload format")]
    UnexpectedFormat,
    #[error("{0} is too large for the record format")]
    TooLarge(&'static str),
}

// ============================================================================
// PIN, THEME AND CLIPBOARD ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PinError {
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("PIN file is malformed")]
    Malformed,
    #[error("PIN file {path} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),
    #[error("theme file {path} could not be parsed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("theme file {path} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),
    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },
    #[error("image payload could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("could not export payload to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("{0:?} is not a supported image or audio file")]
    UnsupportedFile(PathBuf),
    #[error("file {path} could not be read: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file {0:?} is empty")]
    EmptyFile(PathBuf),
}
