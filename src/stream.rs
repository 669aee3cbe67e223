// stream.rs - Whole-stream WAV/AAC conversion
//! Glue between the WAV container and the codec adapters.
//!
//! Each function converts a complete stream and reports totals only on success.
//! The first read, codec or write failure aborts the conversion.

use crate::backend::{DecoderBackend, EncoderBackend};
use crate::config::{DecoderConfig, EncoderConfig};
use crate::decoder::{Decoder, ESTIMATE_FRAMES};
use crate::encoder::Encoder;
use crate::error::Result;
use crate::wav::{WavFormat, WavReader, WavWriter};
use std::io::{self, Read, Seek, Write};
use tracing::{debug, warn};

/// Bytes read from the AAC source per decode call.
pub const DECODE_READ_CHUNK: usize = 2048;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub total_bytes: u64,
    pub total_frames: u64,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub total_bytes: u64,
    /// Samples per channel.
    pub total_samples: u64,
    pub sample_rate: u32,
}

/// Read until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encode a WAV stream into AAC access units written to `writer`.
///
/// The WAV `fmt ` chunk is authoritative: its sample rate and channel count
/// overwrite the ones in `config` before the encoder is opened. A payload that
/// ends mid-sample has its trailing byte dropped.
pub fn encode_wav_stream<B, R, W>(
    reader: R,
    mut writer: W,
    config: &mut EncoderConfig,
) -> Result<EncodeSummary>
where
    B: EncoderBackend,
    R: Read,
    W: Write,
{
    let mut wav = WavReader::new(reader)?;
    let format = *wav.format();
    config.sample_rate = format.sample_rate;
    config.channels = format.channels;

    let mut encoder = Encoder::<B>::new(config.clone())?;
    let frame_size = encoder.frame_size();
    let mut pcm = vec![0u8; frame_size];
    let mut out = vec![0u8; encoder.estimate_out_buf_bytes(frame_size)];

    let mut summary = EncodeSummary {
        sample_rate: format.sample_rate,
        ..Default::default()
    };
    loop {
        let mut n = read_full(&mut wav, &mut pcm)?;
        if n % 2 != 0 {
            warn!(payload_tail = n, "WAV payload ends mid-sample, dropping last byte");
            n -= 1;
        }
        if n == 0 {
            break;
        }
        let chunk = encoder.encode(&pcm[..n], &mut out)?;
        if chunk.bytes > 0 {
            writer.write_all(&out[..chunk.bytes])?;
        }
        summary.total_bytes += chunk.bytes as u64;
        summary.total_frames += chunk.frames as u64;
    }

    let tail = encoder.flush(&mut out)?;
    if tail.bytes > 0 {
        writer.write_all(&out[..tail.bytes])?;
    }
    summary.total_bytes += tail.bytes as u64;
    summary.total_frames += tail.frames as u64;
    writer.flush()?;
    encoder.close();

    debug!(
        total_bytes = summary.total_bytes,
        total_frames = summary.total_frames,
        sample_rate = summary.sample_rate,
        "encoded WAV stream"
    );
    Ok(summary)
}

/// Decode an AAC byte stream into raw interleaved PCM written to `writer`.
///
/// The source is read in [`DECODE_READ_CHUNK`] pieces; end of input drains the
/// decoder. Returns the total PCM bytes written.
pub fn decode_stream<B, R, W>(mut reader: R, mut writer: W, decoder: &mut Decoder<B>) -> Result<u64>
where
    B: DecoderBackend,
    R: Read,
    W: Write,
{
    decode_into(&mut reader, decoder, |pcm| Ok(writer.write_all(pcm)?))
}

fn decode_into<B, R, F>(reader: &mut R, decoder: &mut Decoder<B>, mut sink: F) -> Result<u64>
where
    B: DecoderBackend,
    R: Read,
    F: FnMut(&[u8]) -> Result<()>,
{
    let mut input = vec![0u8; DECODE_READ_CHUNK];
    let mut out = vec![0u8; Decoder::<B>::estimate_out_buf_bytes(ESTIMATE_FRAMES)];
    let mut total = 0u64;

    loop {
        let n = read_full(reader, &mut input)?;
        if n == 0 {
            break;
        }
        let written = decoder.decode(&input[..n], &mut out)?;
        if written > 0 {
            sink(&out[..written])?;
            total += written as u64;
        }
    }
    loop {
        let written = decoder.drain(&mut out)?;
        if written == 0 {
            break;
        }
        sink(&out[..written])?;
        total += written as u64;
    }
    Ok(total)
}

/// Decode an AAC stream into a WAV file whose header matches the decoded format.
pub fn decode_to_wav<B, R, W>(mut reader: R, writer: W, config: &DecoderConfig) -> Result<DecodeSummary>
where
    B: DecoderBackend,
    R: Read,
    W: Write + Seek,
{
    let mut decoder = Decoder::<B>::new(config)?;
    // Placeholder format until the first frame reveals the real one.
    let mut wav = WavWriter::new(writer, WavFormat::pcm16(44100, 2))?;

    let total_bytes = decode_into(&mut reader, &mut decoder, |pcm| wav.write_pcm(pcm))?;
    // Fails with `NotYetAvailable` when the source held no decodable frame.
    let info = decoder.stream_info()?.clone();
    wav.set_format(WavFormat::pcm16(info.sample_rate, info.channels))?;
    wav.finalize()?;
    decoder.close();

    let summary = DecodeSummary {
        total_bytes,
        total_samples: total_bytes / (info.channels.max(1) as u64 * 2),
        sample_rate: info.sample_rate,
    };
    debug!(
        total_bytes = summary.total_bytes,
        total_samples = summary.total_samples,
        sample_rate = summary.sample_rate,
        "decoded AAC stream to WAV"
    );
    Ok(summary)
}
