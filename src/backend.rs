// backend.rs - Codec boundary
//! Traits implemented by the external codec library bindings.
//!
//! A backend owns exactly one native handle. Opening acquires it and dropping
//! the backend releases it. The adapters in [`crate::decoder`] and
//! [`crate::encoder`] never expose the backend to callers.

use crate::config::{AudioObjectType, DecoderParam, EncoderConfig, TransportType};
use crate::error::Result;

/// Snapshot of the decoder's view of the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per channel in one decoded frame.
    pub frame_length: usize,
    /// Bytes of one decoded frame across all channels.
    pub frame_bytes: usize,
    pub channels: u16,
    /// Core sample rate without SBR.
    pub aac_sample_rate: u32,
    pub profile: i32,
    pub aot: Option<AudioObjectType>,
    pub channel_config: i32,
    pub bit_rate: u32,
    pub aac_samples_per_frame: usize,
    pub aac_channels: u16,
    pub ext_aot: Option<AudioObjectType>,
    pub ext_sample_rate: u32,
    /// Extra samples the output is delayed by.
    pub output_delay: u32,
    pub flags: u32,
    pub ep_config: i8,
    pub lost_access_units: i64,
    pub total_bytes: u64,
    pub bad_bytes: u64,
    pub total_access_units: u64,
    pub bad_access_units: u64,
    pub drc_prog_ref_level: i8,
    pub drc_pres_mode: i8,
}

impl StreamInfo {
    /// Derive the per-frame byte size from 16-bit output samples.
    pub fn with_frame_bytes(mut self) -> Self {
        self.frame_bytes = self.frame_length * self.channels as usize * 2;
        self
    }
}

/// Outcome of pulling one frame out of the decoder's internal buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame of `n` PCM bytes was written.
    Decoded(usize),
    /// No complete frame is buffered.
    NeedMoreInput,
}

/// External stateful AAC decode primitive.
pub trait DecoderBackend {
    /// Acquire a native decoder handle for `transport`.
    fn open(transport: TransportType) -> Result<Self>
    where
        Self: Sized;

    fn set_param(&mut self, param: DecoderParam, value: i32) -> Result<()>;

    /// Supply an out-of-band AudioSpecificConfig.
    fn config_raw(&mut self, asc: &[u8]) -> Result<()>;

    /// Copy as much of `input` as fits into the internal buffer.
    /// Returns the number of trailing bytes that were not taken.
    fn fill(&mut self, input: &[u8]) -> Result<usize>;

    /// Decode the next buffered frame into `output` as interleaved LE i16.
    fn decode_frame(&mut self, output: &mut [u8]) -> Result<FrameOutcome>;

    /// Live stream info, `None` while the library has none.
    fn stream_info(&self) -> Option<StreamInfo>;
}

/// Static information about an opened encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderInfo {
    /// Samples per channel consumed per frame.
    pub frame_length: usize,
    pub channels: u16,
    /// Upper bound of one encoded frame in bytes.
    pub max_out_buf_bytes: usize,
    /// Encoder delay in samples.
    pub delay: u32,
    pub audio_specific_config: Vec<u8>,
}

/// Progress of one call into the encode primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeProgress {
    /// Input samples (not bytes) consumed.
    pub input_consumed: usize,
    /// Encoded bytes written.
    pub output_bytes: usize,
}

/// External stateful AAC encode primitive.
pub trait EncoderBackend {
    fn open(config: &EncoderConfig) -> Result<Self>
    where
        Self: Sized;

    fn info(&self) -> &EncoderInfo;

    /// Encode interleaved samples, emitting at most one access unit.
    fn encode(&mut self, pcm: &[i16], output: &mut [u8]) -> Result<EncodeProgress>;

    /// Emit one buffered access unit after end of input; `output_bytes == 0` when drained.
    fn flush(&mut self, output: &mut [u8]) -> Result<EncodeProgress>;
}
