// error.rs - Error handling types
use crate::status::{DecoderStatus, EncoderStatus};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AacError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Unexpected end of stream while reading {0}")]
    UnexpectedEndOfStream(&'static str),
    #[error("Invalid WAV container: {0}")]
    InvalidContainer(String),
    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),
    #[error("Malformed WAV: data chunk found before fmt chunk")]
    MalformedOrder,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Buffer too small: expected at least {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("Input buffer is empty")]
    EmptyInput,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Codec handle is not initialized")]
    NotInitialized,
    #[error("Stream info not available: no frame has been decoded yet")]
    NotYetAvailable,
    #[error("Failed to open codec handle: {0}")]
    HandleOpen(String),
    #[error("Decoder error: {0}")]
    Decoder(DecoderStatus),
    #[error("Encoder error: {0}")]
    Encoder(EncoderStatus),
}

impl AacError {
    /// Map a failed `read_exact` onto the stream-level error taxonomy.
    pub(crate) fn from_read(err: io::Error, context: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            AacError::UnexpectedEndOfStream(context)
        } else {
            AacError::Io(err)
        }
    }

    /// Raw codec status code, when the error came from the codec boundary.
    pub fn status_code(&self) -> Option<u32> {
        match self {
            AacError::Decoder(status) => Some(status.code()),
            AacError::Encoder(status) => Some(status.code()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AacError>;
