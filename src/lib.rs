// lib.rs - Main AAC/WAV streaming library
//! Streaming conversion between 16-bit PCM WAV and AAC.
//!
//! The library parses WAV containers incrementally, drives a stateful AAC codec
//! frame by frame and keeps partial input across calls so streams can be fed in
//! arbitrary chunks. The codec itself sits behind the [`backend`] traits; the
//! `fdk` feature provides native backends on top of libfdk-aac.

pub mod backend;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod status;
pub mod stream;
pub mod utils;
pub mod wav;

#[cfg(feature = "fdk")]
pub mod fdk;


// Re-export main public API
pub use backend::{DecoderBackend, EncoderBackend, EncoderInfo, StreamInfo};
pub use config::{AudioObjectType, BitrateMode, DecoderConfig, EncoderConfig, TransportType};
pub use decoder::Decoder;
pub use encoder::{EncodedChunk, Encoder};
pub use error::{AacError, Result};
pub use status::{DecoderStatus, EncoderStatus};
pub use stream::{decode_stream, decode_to_wav, encode_wav_stream, DecodeSummary, EncodeSummary};
pub use wav::{parse_wav_header, WavFormat, WavHeader, WavParseOptions, WavReader, WavWriter};

#[cfg(feature = "fdk")]
pub use fdk::{FdkDecoder, FdkEncoder};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LIBRARY_NAME: &str = "AAC WAV Stream";

/// Get library version and build information
pub fn version_info() -> String {
    format!("{} v{}", LIBRARY_NAME, VERSION)
}
