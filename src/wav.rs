// wav.rs - Minimal RIFF/WAVE reader and writer
//! Reads the header of a 16-bit PCM WAV stream incrementally and hands back the
//! `data` payload as a bounded reader; writes canonical 44-byte headers.
//!
//! Only the `fmt ` and `data` chunks are interpreted. Any other chunk is skipped
//! by its declared size without buffering.

use crate::error::{AacError, Result};
use std::io::{self, Read, Seek, SeekFrom, Take, Write};
use tracing::{debug, trace};

/// The only supported sample depth.
pub const SAMPLE_BIT_DEPTH: u16 = 16;

/// Widest channel layout an AAC stream can carry.
pub const MAX_CHANNELS: u16 = 8;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const FMT_CHUNK_MIN_LEN: u32 = 16;

/// Length of the header produced by [`write_wav_header`].
pub const WAV_HEADER_LEN: u64 = 44;

/// Format parameters from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub audio_format: u16,
}

impl WavFormat {
    /// 16-bit linear PCM format.
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: SAMPLE_BIT_DEPTH,
            audio_format: WAVE_FORMAT_PCM,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }

    fn validate(&self) -> Result<()> {
        if self.audio_format != WAVE_FORMAT_PCM {
            return Err(AacError::UnsupportedFormat(format!(
                "audio format {} (only PCM supported)",
                self.audio_format
            )));
        }
        if self.bits_per_sample != SAMPLE_BIT_DEPTH {
            return Err(AacError::UnsupportedFormat(format!(
                "{} bits per sample (only 16-bit supported)",
                self.bits_per_sample
            )));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(AacError::UnsupportedFormat(format!(
                "{} channels (1 to {} supported)",
                self.channels, MAX_CHANNELS
            )));
        }
        Ok(())
    }
}

/// Result of parsing everything up to the start of the `data` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: WavFormat,
    /// Declared size of the `data` chunk in bytes.
    pub data_len: u32,
}

/// Parser knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WavParseOptions {
    /// Skip the RIFF pad byte that follows odd-sized chunks.
    pub pad_odd_chunks: bool,
}

#[derive(Debug, Clone, Copy)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

impl ChunkHeader {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; CHUNK_HEADER_LEN];
        reader
            .read_exact(&mut buf)
            .map_err(|e| AacError::from_read(e, "chunk header"))?;
        Ok(Self {
            id: [buf[0], buf[1], buf[2], buf[3]],
            size: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    fn padded(&self, options: &WavParseOptions) -> bool {
        options.pad_odd_chunks && self.size % 2 == 1
    }
}

/// Parse a WAV header with the default options.
pub fn parse_wav_header<R: Read>(reader: &mut R) -> Result<WavHeader> {
    parse_wav_header_with(reader, &WavParseOptions::default())
}

/// Parse a WAV header, leaving `reader` positioned at the first payload byte.
pub fn parse_wav_header_with<R: Read>(
    reader: &mut R,
    options: &WavParseOptions,
) -> Result<WavHeader> {
    let mut riff = [0u8; RIFF_HEADER_LEN];
    reader
        .read_exact(&mut riff)
        .map_err(|e| AacError::from_read(e, "RIFF header"))?;
    if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
        return Err(AacError::InvalidContainer("missing RIFF/WAVE".to_string()));
    }

    let mut format: Option<WavFormat> = None;

    loop {
        let chunk = ChunkHeader::read(reader)?;

        match &chunk.id {
            b"fmt " => {
                if chunk.size < FMT_CHUNK_MIN_LEN {
                    return Err(AacError::InvalidContainer(format!(
                        "invalid fmt chunk size: {}",
                        chunk.size
                    )));
                }
                let mut body = [0u8; FMT_CHUNK_MIN_LEN as usize];
                reader
                    .read_exact(&mut body)
                    .map_err(|e| AacError::from_read(e, "fmt chunk"))?;
                let extra = u64::from(chunk.size - FMT_CHUNK_MIN_LEN) + u64::from(chunk.padded(options));
                skip_bytes(reader, extra, "fmt chunk")?;

                let parsed = WavFormat {
                    audio_format: u16::from_le_bytes([body[0], body[1]]),
                    channels: u16::from_le_bytes([body[2], body[3]]),
                    sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
                    bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
                };
                parsed.validate()?;
                debug!(
                    sample_rate = parsed.sample_rate,
                    channels = parsed.channels,
                    "parsed WAV fmt chunk"
                );
                format = Some(parsed);
            }
            b"data" => {
                let format = format.ok_or(AacError::MalformedOrder)?;
                debug!(data_len = chunk.size, "found WAV data chunk");
                return Ok(WavHeader {
                    format,
                    data_len: chunk.size,
                });
            }
            other => {
                let extra = u64::from(chunk.padded(options));
                trace!(
                    chunk = %String::from_utf8_lossy(other),
                    size = chunk.size,
                    "skipping WAV chunk"
                );
                skip_bytes(reader, chunk.size as u64 + extra, "skipped chunk")?;
            }
        }
    }
}

fn skip_bytes<R: Read>(reader: &mut R, len: u64, context: &'static str) -> Result<()> {
    let skipped = io::copy(&mut reader.take(len), &mut io::sink())?;
    if skipped < len {
        return Err(AacError::UnexpectedEndOfStream(context));
    }
    Ok(())
}

/// A WAV stream whose payload reader stops exactly at the end of the `data` chunk.
#[derive(Debug)]
pub struct WavReader<R> {
    header: WavHeader,
    payload: Take<R>,
}

impl<R: Read> WavReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, &WavParseOptions::default())
    }

    pub fn with_options(mut reader: R, options: &WavParseOptions) -> Result<Self> {
        let header = parse_wav_header_with(&mut reader, options)?;
        Ok(Self {
            header,
            payload: reader.take(header.data_len as u64),
        })
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    pub fn format(&self) -> &WavFormat {
        &self.header.format
    }

    /// Payload bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.payload.limit()
    }

    pub fn into_inner(self) -> R {
        self.payload.into_inner()
    }
}

impl<R: Read> Read for WavReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.payload.read(buf)
    }
}

/// Write a canonical 44-byte PCM header announcing `data_len` payload bytes.
pub fn write_wav_header<W: Write>(writer: &mut W, format: &WavFormat, data_len: u32) -> Result<()> {
    let mut header = Vec::with_capacity(WAV_HEADER_LEN as usize);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&36u32.saturating_add(data_len).to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&FMT_CHUNK_MIN_LEN.to_le_bytes());
    header.extend_from_slice(&format.audio_format.to_le_bytes());
    header.extend_from_slice(&format.channels.to_le_bytes());
    header.extend_from_slice(&format.sample_rate.to_le_bytes());
    header.extend_from_slice(&format.byte_rate().to_le_bytes());
    header.extend_from_slice(&format.block_align().to_le_bytes());
    header.extend_from_slice(&format.bits_per_sample.to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&data_len.to_le_bytes());
    writer.write_all(&header)?;
    Ok(())
}

/// Streaming WAV writer. The header is rewritten with the real sizes on `finalize`.
pub struct WavWriter<W: Write + Seek> {
    writer: W,
    format: WavFormat,
    data_len: u64,
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(mut writer: W, format: WavFormat) -> Result<Self> {
        format.validate()?;
        write_wav_header(&mut writer, &format, 0)?;
        Ok(Self {
            writer,
            format,
            data_len: 0,
        })
    }

    pub fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        self.writer.write_all(pcm)?;
        self.data_len += pcm.len() as u64;
        Ok(())
    }

    /// Replace the format announced in the header; takes effect on `finalize`.
    pub fn set_format(&mut self, format: WavFormat) -> Result<()> {
        format.validate()?;
        self.format = format;
        Ok(())
    }

    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Patch the header sizes and return the underlying writer.
    pub fn finalize(mut self) -> Result<W> {
        let data_len = u32::try_from(self.data_len).map_err(|_| {
            AacError::InvalidConfig(format!("PCM payload too large for WAV: {}", self.data_len))
        })?;
        let end = self.writer.stream_position()?;
        self.writer.seek(SeekFrom::Start(end - self.data_len - WAV_HEADER_LEN))?;
        write_wav_header(&mut self.writer, &self.format, data_len)?;
        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
