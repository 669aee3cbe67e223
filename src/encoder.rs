// encoder.rs - Streaming AAC encoder adapter
use crate::backend::{EncoderBackend, EncoderInfo};
use crate::config::EncoderConfig;
use crate::error::{AacError, Result};
use crate::status::EncoderStatus;
use crate::utils::pcm;
use tracing::{debug, trace};

/// Result of one `encode` or `flush` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Encoded bytes written to the output buffer.
    pub bytes: usize,
    /// Complete access units those bytes represent.
    pub frames: usize,
}

// Main AAC encoder adapter
pub struct Encoder<B: EncoderBackend> {
    backend: Option<B>,
    config: EncoderConfig,
    frame_size: usize,
    samples: Vec<i16>,
    flushed: bool,
}

impl<B: EncoderBackend> Encoder<B> {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;

        let backend = B::open(&config)?;
        let info = backend.info();
        let frame_size = info.frame_length * info.channels as usize * 2;
        if frame_size == 0 || info.max_out_buf_bytes == 0 {
            return Err(AacError::InvalidConfig(format!(
                "encoder reported an empty frame layout: {:?}",
                info
            )));
        }
        debug!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            frame_length = info.frame_length,
            "opened AAC encoder"
        );

        Ok(Self {
            backend: Some(backend),
            config,
            frame_size,
            samples: Vec::new(),
            flushed: false,
        })
    }

    fn info(&self) -> Result<&EncoderInfo> {
        self.backend
            .as_ref()
            .map(|backend| backend.info())
            .ok_or(AacError::NotInitialized)
    }

    pub fn get_config(&self) -> &EncoderConfig {
        &self.config
    }

    /// PCM bytes making up one input frame (all channels, 16-bit).
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Samples per channel in one frame.
    pub fn frame_length(&self) -> Result<usize> {
        Ok(self.info()?.frame_length)
    }

    pub fn channels(&self) -> Result<u16> {
        Ok(self.info()?.channels)
    }

    pub fn delay(&self) -> Result<u32> {
        Ok(self.info()?.delay)
    }

    pub fn audio_specific_config(&self) -> Result<&[u8]> {
        Ok(&self.info()?.audio_specific_config)
    }

    /// Output buffer size that encoding `input_len` PCM bytes, or flushing, cannot overrun.
    pub fn estimate_out_buf_bytes(&self, input_len: usize) -> usize {
        let (frame_length, max_out, delay) = match self.info() {
            Ok(info) => (info.frame_length, info.max_out_buf_bytes, info.delay as usize),
            Err(_) => return 0,
        };
        let input_frames = (input_len + self.frame_size - 1) / self.frame_size;
        let delay_frames = (delay + frame_length - 1) / frame_length;
        (input_frames + delay_frames + 1) * max_out
    }

    /// Encode interleaved little-endian 16-bit PCM.
    pub fn encode(&mut self, input: &[u8], output: &mut [u8]) -> Result<EncodedChunk> {
        if self.backend.is_none() {
            return Err(AacError::NotInitialized);
        }
        if self.flushed {
            return Err(AacError::Encoder(EncoderStatus::EncodeEof));
        }
        if input.is_empty() {
            return Err(AacError::EmptyInput);
        }
        if input.len() % 2 != 0 {
            return Err(AacError::InvalidInput(format!(
                "PCM input of {} bytes is not a whole number of 16-bit samples",
                input.len()
            )));
        }
        let required = self.estimate_out_buf_bytes(input.len());
        if output.len() < required {
            return Err(AacError::BufferTooSmall {
                expected: required,
                actual: output.len(),
            });
        }

        pcm::bytes_to_samples(input, &mut self.samples);
        let backend = self.backend.as_mut().ok_or(AacError::NotInitialized)?;

        let mut consumed = 0;
        let mut chunk = EncodedChunk::default();
        while consumed < self.samples.len() {
            let progress = backend.encode(&self.samples[consumed..], &mut output[chunk.bytes..])?;
            consumed += progress.input_consumed;
            if progress.output_bytes > 0 {
                chunk.bytes += progress.output_bytes;
                chunk.frames += 1;
            }
            if progress.input_consumed == 0 && progress.output_bytes == 0 {
                break;
            }
        }

        trace!(input = input.len(), bytes = chunk.bytes, frames = chunk.frames, "encode call");
        Ok(chunk)
    }

    /// Drain samples the codec still holds. Call once, after the last `encode`.
    ///
    /// Backends without a native end-of-input signal may pad the tail; see
    /// `FdkEncoder` for the libfdk-aac case.
    pub fn flush(&mut self, output: &mut [u8]) -> Result<EncodedChunk> {
        if self.backend.is_none() {
            return Err(AacError::NotInitialized);
        }
        if self.flushed {
            return Err(AacError::Encoder(EncoderStatus::EncodeEof));
        }
        let required = self.estimate_out_buf_bytes(0);
        if output.len() < required {
            return Err(AacError::BufferTooSmall {
                expected: required,
                actual: output.len(),
            });
        }
        self.flushed = true;

        let backend = self.backend.as_mut().ok_or(AacError::NotInitialized)?;
        let max_out = backend.info().max_out_buf_bytes;
        let mut chunk = EncodedChunk::default();
        while output.len() - chunk.bytes >= max_out {
            let progress = match backend.flush(&mut output[chunk.bytes..]) {
                Ok(progress) => progress,
                Err(AacError::Encoder(status)) if status.is_eof() => break,
                Err(err) => return Err(err),
            };
            if progress.output_bytes == 0 {
                break;
            }
            chunk.bytes += progress.output_bytes;
            chunk.frames += 1;
        }

        debug!(bytes = chunk.bytes, frames = chunk.frames, "flushed AAC encoder");
        Ok(chunk)
    }

    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Release the codec handle. Later calls fail with `NotInitialized`.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            debug!("closed AAC encoder");
        }
        self.samples = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EncodeProgress;

    /// Emits one 4-byte access unit per full frame; holds `delay` frames back.
    struct FrameCounter {
        info: EncoderInfo,
        pending: usize,
        held: usize,
        flushes: usize,
    }

    impl EncoderBackend for FrameCounter {
        fn open(config: &EncoderConfig) -> Result<Self> {
            Ok(Self {
                info: EncoderInfo {
                    frame_length: 4,
                    channels: config.channels,
                    max_out_buf_bytes: 16,
                    delay: 4,
                    audio_specific_config: vec![0x12, 0x10],
                },
                pending: 0,
                held: 0,
                flushes: 0,
            })
        }

        fn info(&self) -> &EncoderInfo {
            &self.info
        }

        fn encode(&mut self, pcm: &[i16], output: &mut [u8]) -> Result<EncodeProgress> {
            let per_frame = self.info.frame_length * self.info.channels as usize;
            let take = (per_frame - self.pending).min(pcm.len());
            self.pending += take;
            let mut progress = EncodeProgress {
                input_consumed: take,
                output_bytes: 0,
            };
            if self.pending == per_frame {
                self.pending = 0;
                if self.held == 1 {
                    output[..4].copy_from_slice(b"AAC!");
                    progress.output_bytes = 4;
                } else {
                    self.held += 1;
                }
            }
            Ok(progress)
        }

        fn flush(&mut self, output: &mut [u8]) -> Result<EncodeProgress> {
            self.flushes += 1;
            if self.held == 0 {
                return Ok(EncodeProgress::default());
            }
            self.held -= 1;
            output[..4].copy_from_slice(b"AAC!");
            Ok(EncodeProgress {
                input_consumed: 0,
                output_bytes: 4,
            })
        }
    }

    fn encoder() -> Encoder<FrameCounter> {
        Encoder::new(EncoderConfig::new(8000, 2, 32_000).unwrap()).unwrap()
    }

    #[test]
    fn test_frame_size_and_estimate() {
        let encoder = encoder();
        assert_eq!(encoder.frame_size(), 16);
        assert_eq!(encoder.frame_length().unwrap(), 4);
        // one input frame + one delay frame + one spare
        assert_eq!(encoder.estimate_out_buf_bytes(16), 48);
        assert_eq!(encoder.audio_specific_config().unwrap(), &[0x12, 0x10]);
    }

    #[test]
    fn test_encode_counts_frames_across_delay() {
        let mut encoder = encoder();
        let mut out = vec![0u8; 256];
        let first = encoder.encode(&[0u8; 16], &mut out).unwrap();
        assert_eq!(first, EncodedChunk { bytes: 0, frames: 0 });

        let second = encoder.encode(&[0u8; 32], &mut out).unwrap();
        assert_eq!(second, EncodedChunk { bytes: 8, frames: 2 });

        let tail = encoder.flush(&mut out).unwrap();
        assert_eq!(tail, EncodedChunk { bytes: 4, frames: 1 });
    }

    #[test]
    fn test_flush_only_once() {
        let mut encoder = encoder();
        let mut out = vec![0u8; 256];
        encoder.flush(&mut out).unwrap();
        assert_eq!(encoder.backend.as_ref().unwrap().flushes, 1);
        assert!(matches!(
            encoder.flush(&mut out),
            Err(AacError::Encoder(EncoderStatus::EncodeEof))
        ));
        assert!(matches!(
            encoder.encode(&[0u8; 16], &mut out),
            Err(AacError::Encoder(EncoderStatus::EncodeEof))
        ));
    }

    #[test]
    fn test_rejects_odd_input_and_small_output() {
        let mut encoder = encoder();
        let mut out = vec![0u8; 256];
        assert!(matches!(
            encoder.encode(&[0u8; 3], &mut out),
            Err(AacError::InvalidInput(_))
        ));
        let mut small = vec![0u8; 8];
        assert!(matches!(
            encoder.encode(&[0u8; 16], &mut small),
            Err(AacError::BufferTooSmall { expected: 48, actual: 8 })
        ));
    }

    #[test]
    fn test_closed_encoder() {
        let mut encoder = encoder();
        encoder.close();
        assert!(!encoder.is_open());
        assert!(matches!(
            encoder.encode(&[0u8; 16], &mut [0u8; 64]),
            Err(AacError::NotInitialized)
        ));
        assert!(matches!(encoder.delay(), Err(AacError::NotInitialized)));
    }
}
