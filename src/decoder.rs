// decoder.rs - Streaming AAC decoder adapter
use crate::backend::{DecoderBackend, FrameOutcome, StreamInfo};
use crate::config::{DecoderConfig, DecoderParam};
use crate::error::{AacError, Result};
use tracing::{debug, trace, warn};

/// Frames of headroom the caller's output buffer must provide per `decode` call.
pub const ESTIMATE_FRAMES: usize = 10;

const MAX_FRAME_LENGTH: usize = 1024;
const MAX_OUTPUT_CHANNELS: usize = 8;
const MAX_FRAME_BYTES: usize = MAX_FRAME_LENGTH * MAX_OUTPUT_CHANNELS * 2;

/// Streaming AAC decoder.
///
/// Bytes handed to [`Decoder::decode`] that the codec could not take yet are kept
/// in a carry-over buffer and submitted first on the next call, so a stream can be
/// fed in arbitrary chunks.
pub struct Decoder<B: DecoderBackend> {
    backend: Option<B>,
    info: Option<StreamInfo>,
    carry_over: Vec<u8>,
}

impl<B: DecoderBackend> Decoder<B> {
    pub fn new(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;

        // Dropping `backend` on an early return releases the handle.
        let mut backend = B::open(config.transport)?;
        for (param, value) in config.params() {
            backend.set_param(param, value)?;
        }
        debug!(transport = ?config.transport, "opened AAC decoder");

        Ok(Self::from_backend(backend))
    }

    /// Wrap an already configured backend.
    pub fn from_backend(backend: B) -> Self {
        Self {
            backend: Some(backend),
            info: None,
            carry_over: Vec::new(),
        }
    }

    /// Output buffer size able to hold `n_frames` decoded frames of any layout.
    pub fn estimate_out_buf_bytes(n_frames: usize) -> usize {
        MAX_FRAME_BYTES * n_frames
    }

    /// Decode `input` into `output`, returning the number of PCM bytes written.
    ///
    /// `output` must hold at least `estimate_out_buf_bytes(ESTIMATE_FRAMES)` bytes.
    /// The size check runs before anything is submitted to the codec, so a
    /// rejected call leaves the carry-over untouched. A failed fill does too.
    ///
    /// A codec status from a frame ends the call with that error. PCM already
    /// written to `output` by earlier frames of the same call is not counted and
    /// should be treated as lost. The access unit behind a concealed status has
    /// been consumed, so the next call resumes at the following one.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if self.backend.is_none() {
            return Err(AacError::NotInitialized);
        }
        if input.is_empty() {
            return Err(AacError::EmptyInput);
        }
        let required = Self::estimate_out_buf_bytes(ESTIMATE_FRAMES);
        if output.len() < required {
            return Err(AacError::BufferTooSmall {
                expected: required,
                actual: output.len(),
            });
        }

        self.run(input, output)
    }

    /// Decode what is still buffered without new input, e.g. at end of stream.
    /// Returns 0 once no further frame can be produced.
    pub fn drain(&mut self, output: &mut [u8]) -> Result<usize> {
        if self.backend.is_none() {
            return Err(AacError::NotInitialized);
        }
        let required = Self::estimate_out_buf_bytes(ESTIMATE_FRAMES);
        if output.len() < required {
            return Err(AacError::BufferTooSmall {
                expected: required,
                actual: output.len(),
            });
        }

        self.run(&[], output)
    }

    fn run(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let backend = self.backend.as_mut().ok_or(AacError::NotInitialized)?;

        let previous_len = self.carry_over.len();
        self.carry_over.extend_from_slice(input);

        if !self.carry_over.is_empty() {
            let left = match backend.fill(&self.carry_over) {
                Ok(left) => left,
                Err(err) => {
                    self.carry_over.truncate(previous_len);
                    return Err(err);
                }
            };
            let consumed = self.carry_over.len() - left.min(self.carry_over.len());
            self.carry_over.drain(..consumed);
        }

        let mut written = 0;
        while output.len() - written >= MAX_FRAME_BYTES {
            match backend.decode_frame(&mut output[written..]) {
                Ok(FrameOutcome::Decoded(n)) => written += n,
                Ok(FrameOutcome::NeedMoreInput) => break,
                Err(AacError::Decoder(status)) if status.is_concealed() => {
                    warn!(%status, written, "AAC frame concealed");
                    return Err(AacError::Decoder(status));
                }
                Err(err) => return Err(err),
            }
        }

        if self.info.is_none() && written > 0 {
            if let Some(info) = backend.stream_info() {
                debug!(
                    sample_rate = info.sample_rate,
                    channels = info.channels,
                    frame_length = info.frame_length,
                    "AAC stream info available"
                );
                self.info = Some(info);
            }
        }

        trace!(
            input = input.len(),
            written,
            carry_over = self.carry_over.len(),
            "decode call"
        );
        Ok(written)
    }

    /// Drop buffered input, both here and inside the codec. Use before seeking or
    /// switching to an unrelated stream.
    pub fn clear_buffer(&mut self) -> Result<()> {
        let backend = self.backend.as_mut().ok_or(AacError::NotInitialized)?;
        self.carry_over.clear();
        backend.set_param(DecoderParam::TpdecClearBuffer, 1)
    }

    /// Configure the decoder with a raw AudioSpecificConfig (raw transport).
    pub fn config_raw(&mut self, asc: &[u8]) -> Result<()> {
        let backend = self.backend.as_mut().ok_or(AacError::NotInitialized)?;
        if asc.is_empty() {
            return Err(AacError::InvalidInput(
                "raw config should not be empty".to_string(),
            ));
        }
        backend.config_raw(asc)
    }

    /// Stream info cached after the first call that produced output.
    pub fn stream_info(&self) -> Result<&StreamInfo> {
        if self.backend.is_none() {
            return Err(AacError::NotInitialized);
        }
        self.info.as_ref().ok_or(AacError::NotYetAvailable)
    }

    /// Query the codec directly, e.g. right after [`Decoder::config_raw`].
    pub fn raw_stream_info(&self) -> Result<StreamInfo> {
        let backend = self.backend.as_ref().ok_or(AacError::NotInitialized)?;
        backend.stream_info().ok_or(AacError::NotYetAvailable)
    }

    /// Bytes held in the carry-over buffer.
    pub fn buffered_len(&self) -> usize {
        self.carry_over.len()
    }

    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Release the codec handle. Later calls fail with `NotInitialized`.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            debug!("closed AAC decoder");
        }
        self.carry_over = Vec::new();
        self.info = None;
    }
}
