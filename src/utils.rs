// utils.rs - Utility functions and PCM sample conversion
use std::f32::consts::PI;

/// Generate a test sine wave signal
pub fn generate_test_signal(frequency: f32, sample_rate: u32, samples: usize) -> Vec<f32> {
    let mut signal = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = i as f32 / sample_rate as f32;
        signal.push((2.0 * PI * frequency * t).sin() * 0.5);
    }
    signal
}

/// Generate an interleaved 16-bit little-endian PCM sine tone, every channel identical.
pub fn generate_test_pcm(frequency: f32, sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let mono = pcm::f32_to_i16(&generate_test_signal(frequency, sample_rate, frames));
    let mut interleaved = Vec::with_capacity(frames * channels as usize);
    for sample in mono {
        interleaved.extend(std::iter::repeat(sample).take(channels as usize));
    }
    pcm::samples_to_bytes(&interleaved)
}

/// 16-bit PCM conversion utilities
pub mod pcm {
    /// Decode little-endian 16-bit samples into `out`, replacing its contents.
    /// A trailing odd byte is ignored.
    pub fn bytes_to_samples(input: &[u8], out: &mut Vec<i16>) {
        out.clear();
        out.extend(
            input
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
    }

    /// Write samples as little-endian bytes into `out`; returns bytes written.
    /// Stops early when `out` runs out of room.
    pub fn write_samples(samples: &[i16], out: &mut [u8]) -> usize {
        let mut written = 0;
        for (sample, dst) in samples.iter().zip(out.chunks_exact_mut(2)) {
            dst.copy_from_slice(&sample.to_le_bytes());
            written += 2;
        }
        written
    }

    pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn f32_to_i16(input: &[f32]) -> Vec<i16> {
        input
            .iter()
            .map(|&x| (x.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    }

    pub fn calculate_rms(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        ((sum_squares / samples.len() as f64).sqrt() / 32768.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_byte_conversion() {
        let mut samples = Vec::new();
        pcm::bytes_to_samples(&[0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0x7f], &mut samples);
        assert_eq!(samples, vec![1, -1, i16::MIN]);

        let bytes = pcm::samples_to_bytes(&samples);
        assert_eq!(bytes, vec![0x01, 0x00, 0xff, 0xff, 0x00, 0x80]);

        let mut short = [0u8; 3];
        assert_eq!(pcm::write_samples(&samples, &mut short), 2);
        assert_eq!(short, [0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_generate_test_pcm_layout() {
        let bytes = generate_test_pcm(440.0, 48000, 2, 480);
        assert_eq!(bytes.len(), 480 * 2 * 2);

        let mut samples = Vec::new();
        pcm::bytes_to_samples(&bytes, &mut samples);
        for frame in samples.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        let rms = pcm::calculate_rms(&samples);
        assert!(rms > 0.3 && rms < 0.4, "rms {}", rms);
    }
}
