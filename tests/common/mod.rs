// common/mod.rs - Deterministic codec stubs shared by the integration tests
#![allow(dead_code)]

use aac_wav_stream::backend::{
    DecoderBackend, EncodeProgress, EncoderBackend, EncoderInfo, FrameOutcome, StreamInfo,
};
use aac_wav_stream::config::{DecoderParam, EncoderConfig, TransportType};
use aac_wav_stream::Result;
use std::cell::Cell;
use std::io::{self, Write};

pub const STUB_FRAME_LENGTH: usize = 4;
pub const STUB_SAMPLE_RATE: u32 = 8000;

thread_local! {
    pub static ENCODE_CALLS: Cell<usize> = Cell::new(0);
    pub static FLUSH_CALLS: Cell<usize> = Cell::new(0);
    /// Samples the stub encoder had consumed when `flush` was first called.
    pub static CONSUMED_AT_FLUSH: Cell<Option<usize>> = Cell::new(None);
    pub static FILL_CALLS: Cell<usize> = Cell::new(0);
}

pub fn reset_counters() {
    ENCODE_CALLS.with(|c| c.set(0));
    FLUSH_CALLS.with(|c| c.set(0));
    CONSUMED_AT_FLUSH.with(|c| c.set(None));
    FILL_CALLS.with(|c| c.set(0));
}

/// Encoder stub: one access unit per full frame, no delay.
/// Each access unit is `[0xA5, frame_index, first_sample_lo, first_sample_hi]`.
pub struct StubEncoder {
    info: EncoderInfo,
    frame: Vec<i16>,
    frames: u8,
    consumed: usize,
}

impl EncoderBackend for StubEncoder {
    fn open(config: &EncoderConfig) -> Result<Self> {
        Ok(Self {
            info: EncoderInfo {
                frame_length: STUB_FRAME_LENGTH,
                channels: config.channels,
                max_out_buf_bytes: 8,
                delay: 0,
                audio_specific_config: vec![0x15, 0x88],
            },
            frame: Vec::new(),
            frames: 0,
            consumed: 0,
        })
    }

    fn info(&self) -> &EncoderInfo {
        &self.info
    }

    fn encode(&mut self, pcm: &[i16], output: &mut [u8]) -> Result<EncodeProgress> {
        ENCODE_CALLS.with(|c| c.set(c.get() + 1));
        let per_frame = self.info.frame_length * self.info.channels as usize;
        let take = (per_frame - self.frame.len()).min(pcm.len());
        self.frame.extend_from_slice(&pcm[..take]);
        self.consumed += take;

        let mut progress = EncodeProgress {
            input_consumed: take,
            output_bytes: 0,
        };
        if self.frame.len() == per_frame {
            let first = self.frame[0].to_le_bytes();
            output[..4].copy_from_slice(&[0xA5, self.frames, first[0], first[1]]);
            self.frames = self.frames.wrapping_add(1);
            self.frame.clear();
            progress.output_bytes = 4;
        }
        Ok(progress)
    }

    fn flush(&mut self, output: &mut [u8]) -> Result<EncodeProgress> {
        FLUSH_CALLS.with(|c| c.set(c.get() + 1));
        CONSUMED_AT_FLUSH.with(|c| {
            if c.get().is_none() {
                c.set(Some(self.consumed));
            }
        });
        // A trailing partial frame is emitted zero-padded.
        if self.frame.is_empty() {
            return Ok(EncodeProgress::default());
        }
        let first = self.frame[0].to_le_bytes();
        output[..4].copy_from_slice(&[0xA5, self.frames, first[0], first[1]]);
        self.frame.clear();
        Ok(EncodeProgress {
            input_consumed: 0,
            output_bytes: 4,
        })
    }
}

/// Decoder stub over a toy bitstream of length-prefixed access units:
/// `[n][b0 .. b(n-1)]` decodes to `n` mono samples `b_i as i16`.
pub struct StubDecoder {
    buffer: Vec<u8>,
    capacity: usize,
    last_frame_len: usize,
}

impl DecoderBackend for StubDecoder {
    fn open(_transport: TransportType) -> Result<Self> {
        Ok(Self {
            buffer: Vec::new(),
            capacity: 16,
            last_frame_len: 0,
        })
    }

    fn set_param(&mut self, param: DecoderParam, _value: i32) -> Result<()> {
        if param == DecoderParam::TpdecClearBuffer {
            self.buffer.clear();
        }
        Ok(())
    }

    fn config_raw(&mut self, _asc: &[u8]) -> Result<()> {
        Ok(())
    }

    fn fill(&mut self, input: &[u8]) -> Result<usize> {
        FILL_CALLS.with(|c| c.set(c.get() + 1));
        let room = self.capacity - self.buffer.len();
        let take = room.min(input.len());
        self.buffer.extend_from_slice(&input[..take]);
        Ok(input.len() - take)
    }

    fn decode_frame(&mut self, output: &mut [u8]) -> Result<FrameOutcome> {
        let Some(&len) = self.buffer.first() else {
            return Ok(FrameOutcome::NeedMoreInput);
        };
        let len = len as usize;
        if self.buffer.len() < len + 1 {
            return Ok(FrameOutcome::NeedMoreInput);
        }
        let unit: Vec<u8> = self.buffer.drain(..len + 1).skip(1).collect();
        for (i, byte) in unit.iter().enumerate() {
            output[i * 2..i * 2 + 2].copy_from_slice(&(*byte as i16).to_le_bytes());
        }
        self.last_frame_len = len;
        Ok(FrameOutcome::Decoded(len * 2))
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        (self.last_frame_len > 0).then(|| {
            StreamInfo {
                sample_rate: STUB_SAMPLE_RATE,
                frame_length: self.last_frame_len,
                channels: 1,
                ..Default::default()
            }
            .with_frame_bytes()
        })
    }
}

/// Build a toy bitstream from payloads, one access unit each.
pub fn toy_stream(units: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        out.push(unit.len() as u8);
        out.extend_from_slice(unit);
    }
    out
}

/// Writer that accepts `limit` bytes and fails afterwards.
pub struct FailingWriter {
    pub written: Vec<u8>,
    pub limit: usize,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            written: Vec::new(),
            limit,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.limit {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

pub fn fmt_body(audio_format: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let mut body = Vec::new();
    body.extend_from_slice(&audio_format.to_le_bytes());
    body.extend_from_slice(&channels.to_le_bytes());
    body.extend_from_slice(&sample_rate.to_le_bytes());
    body.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    body.extend_from_slice(&block_align.to_le_bytes());
    body.extend_from_slice(&bits.to_le_bytes());
    body
}

pub fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&body);
    out
}

/// A 16-bit PCM WAV file around `pcm`.
pub fn wav_file(sample_rate: u32, channels: u16, pcm: &[u8]) -> Vec<u8> {
    riff(&[
        chunk(b"fmt ", &fmt_body(1, channels, sample_rate, 16)),
        chunk(b"data", pcm),
    ])
}
