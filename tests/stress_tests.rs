// tests/stress_tests.rs - Chunking stress tests and edge case validation
//
// This file feeds the decoder adapter the same byte sequence under many different
// chunkings and checks that carry-over never loses or duplicates a byte.

mod common;

use aac_wav_stream::decoder::ESTIMATE_FRAMES;
use aac_wav_stream::*;
use common::*;

fn out_buffer() -> Vec<u8> {
    vec![0u8; Decoder::<StubDecoder>::estimate_out_buf_bytes(ESTIMATE_FRAMES)]
}

fn decoder() -> Decoder<StubDecoder> {
    Decoder::new(&DecoderConfig::default()).expect("stub decoder opens")
}

/// Feed `stream` split at `cuts`, then drain. Returns the concatenated PCM.
fn decode_chunked(stream: &[u8], cuts: &[usize]) -> Vec<u8> {
    let mut decoder = decoder();
    let mut out = out_buffer();
    let mut pcm = Vec::new();

    let mut start = 0;
    for &end in cuts.iter().chain(std::iter::once(&stream.len())) {
        if end > start {
            let n = decoder.decode(&stream[start..end], &mut out).unwrap();
            pcm.extend_from_slice(&out[..n]);
            start = end;
        }
    }
    loop {
        let n = decoder.drain(&mut out).unwrap();
        if n == 0 {
            break;
        }
        pcm.extend_from_slice(&out[..n]);
    }
    assert_eq!(decoder.buffered_len(), 0);
    pcm
}

fn sample_stream(units: usize) -> Vec<u8> {
    let payloads: Vec<Vec<u8>> = (0..units)
        .map(|i| (0..(i * 7 % 13 + 1)).map(|b| (b * 3 + i) as u8).collect())
        .collect();
    let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
    toy_stream(&refs)
}

#[test]
fn test_single_split_at_every_offset() {
    let stream = sample_stream(12);
    let whole = decode_chunked(&stream, &[]);
    assert!(!whole.is_empty());

    for offset in 1..stream.len() {
        let split = decode_chunked(&stream, &[offset]);
        assert_eq!(split, whole, "split at {}", offset);
    }
}

#[test]
fn test_byte_by_byte_feed() {
    let stream = sample_stream(30);
    let whole = decode_chunked(&stream, &[]);
    let cuts: Vec<usize> = (1..stream.len()).collect();
    assert_eq!(decode_chunked(&stream, &cuts), whole);
}

#[test]
fn test_pseudo_random_chunkings() {
    let stream = sample_stream(200);
    let whole = decode_chunked(&stream, &[]);

    let mut seed: u32 = 0x1234_5678;
    for _ in 0..50 {
        let mut cuts = Vec::new();
        let mut pos = 0;
        loop {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            pos += 1 + (seed >> 16) as usize % 40;
            if pos >= stream.len() {
                break;
            }
            cuts.push(pos);
        }
        assert_eq!(decode_chunked(&stream, &cuts), whole);
    }
}

#[test]
fn test_small_output_buffer_touches_nothing() {
    reset_counters();
    let stream = sample_stream(4);
    let mut decoder = decoder();

    let mut small = vec![0u8; Decoder::<StubDecoder>::estimate_out_buf_bytes(ESTIMATE_FRAMES) - 1];
    let err = decoder.decode(&stream, &mut small).unwrap_err();
    assert!(matches!(err, AacError::BufferTooSmall { .. }));
    assert_eq!(FILL_CALLS.with(|c| c.get()), 0);
    assert_eq!(decoder.buffered_len(), 0);
    assert!(matches!(decoder.stream_info(), Err(AacError::NotYetAvailable)));

    // the rejected call left nothing behind
    let mut out = out_buffer();
    let mut total = decoder.decode(&stream, &mut out).unwrap();
    loop {
        let n = decoder.drain(&mut out).unwrap();
        if n == 0 {
            break;
        }
        total += n;
    }
    assert_eq!(total, decode_chunked(&stream, &[]).len());
    assert!(FILL_CALLS.with(|c| c.get()) > 0);
}

#[test]
fn test_clear_buffer_discards_partial_unit() {
    let mut decoder = decoder();
    let mut out = out_buffer();

    // half of a 6-byte unit
    let n = decoder.decode(&[6, 1, 2], &mut out).unwrap();
    assert_eq!(n, 0);
    decoder.clear_buffer().unwrap();

    let fresh = toy_stream(&[&[9, 8]]);
    let n = decoder.decode(&fresh, &mut out).unwrap();
    assert_eq!(&out[..n], &[9, 0, 8, 0]);
}

#[test]
fn test_long_stream_totals() {
    let stream = sample_stream(5000);
    let mut decoder = decoder();
    let mut pcm = Vec::new();
    let total = decode_stream(stream.as_slice(), &mut pcm, &mut decoder).unwrap();

    let expected_samples: usize = (0..5000).map(|i| i * 7 % 13 + 1).sum();
    assert_eq!(total as usize, expected_samples * 2);
    assert_eq!(pcm.len(), expected_samples * 2);
}
