// fdk.rs - Fraunhofer FDK AAC backends
//! Native codec backends on top of libfdk-aac.
//!
//! The decoder talks to `fdk-aac-sys` directly so the whole parameter table and
//! every transport type are reachable. The encoder uses the safe `fdk_aac::enc`
//! wrapper, which supports ADTS or raw output in mono or stereo.

use crate::backend::{
    DecoderBackend, EncodeProgress, EncoderBackend, EncoderInfo, FrameOutcome, StreamInfo,
};
use crate::config::{AudioObjectType, BitrateMode, DecoderParam, EncoderConfig, TransportType};
use crate::error::{AacError, Result};
use crate::status::{DecoderStatus, EncoderStatus};
use crate::utils::pcm;
use fdk_aac::enc::{self as fdk_enc, BitRate, ChannelMode, EncoderParams};
use fdk_aac_sys as sys;
use std::ptr;
use tracing::{debug, warn};

fn check(code: u32) -> Result<()> {
    match DecoderStatus::from_code(code) {
        None => Ok(()),
        Some(status) => Err(AacError::Decoder(status)),
    }
}

/// libfdk-aac decoder instance.
pub struct FdkDecoder {
    handle: sys::HANDLE_AACDECODER,
    scratch: Vec<i16>,
}

// The handle is owned exclusively and only touched through `&mut self`.
unsafe impl Send for FdkDecoder {}

impl DecoderBackend for FdkDecoder {
    fn open(transport: TransportType) -> Result<Self> {
        let handle = unsafe { sys::aacDecoder_Open(transport.code() as _, 1) };
        if handle.is_null() {
            return Err(AacError::HandleOpen(format!(
                "aacDecoder_Open failed for {:?}",
                transport
            )));
        }
        debug!(?transport, "libfdk-aac decoder opened");
        Ok(Self {
            handle,
            scratch: Vec::new(),
        })
    }

    fn set_param(&mut self, param: DecoderParam, value: i32) -> Result<()> {
        let code = unsafe { sys::aacDecoder_SetParam(self.handle, param.id() as _, value as _) };
        check(code as u32)
    }

    fn config_raw(&mut self, asc: &[u8]) -> Result<()> {
        let mut conf = [asc.as_ptr() as *mut u8];
        let length = [asc.len() as u32];
        let code = unsafe {
            sys::aacDecoder_ConfigRaw(self.handle, conf.as_mut_ptr() as _, length.as_ptr() as _)
        };
        check(code as u32)
    }

    fn fill(&mut self, input: &[u8]) -> Result<usize> {
        let mut buffer = input.as_ptr() as *mut u8;
        let size = input.len() as u32;
        let mut valid = size;
        let code = unsafe {
            sys::aacDecoder_Fill(
                self.handle,
                &mut buffer as *mut *mut u8 as _,
                &size as *const u32 as _,
                &mut valid as *mut u32 as _,
            )
        };
        check(code as u32)?;
        Ok(valid as usize)
    }

    fn decode_frame(&mut self, output: &mut [u8]) -> Result<FrameOutcome> {
        self.scratch.resize(output.len() / 2, 0);
        let code = unsafe {
            sys::aacDecoder_DecodeFrame(
                self.handle,
                self.scratch.as_mut_ptr() as _,
                self.scratch.len() as _,
                0,
            )
        };
        match DecoderStatus::from_code(code as u32) {
            None => {}
            Some(DecoderStatus::NotEnoughBits) => return Ok(FrameOutcome::NeedMoreInput),
            Some(status) => {
                if status.is_transient() {
                    warn!(%status, "libfdk-aac transport condition");
                }
                return Err(AacError::Decoder(status));
            }
        }

        let samples = self
            .stream_info()
            .map(|info| info.frame_length * info.channels as usize)
            .unwrap_or(0)
            .min(self.scratch.len());
        Ok(FrameOutcome::Decoded(pcm::write_samples(
            &self.scratch[..samples],
            output,
        )))
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        let raw = unsafe { sys::aacDecoder_GetStreamInfo(self.handle) };
        if raw.is_null() {
            return None;
        }
        let raw = unsafe { &*raw };
        if raw.sampleRate <= 0 {
            return None;
        }
        let aot = |code: i32| (code > 0).then(|| AudioObjectType::from_code(code));
        Some(
            StreamInfo {
                sample_rate: raw.sampleRate as u32,
                frame_length: raw.frameSize as usize,
                channels: raw.numChannels as u16,
                aac_sample_rate: raw.aacSampleRate as u32,
                profile: raw.profile as i32,
                aot: aot(raw.aot as i32),
                channel_config: raw.channelConfig as i32,
                bit_rate: raw.bitRate as u32,
                aac_samples_per_frame: raw.aacSamplesPerFrame as usize,
                aac_channels: raw.aacNumChannels as u16,
                ext_aot: aot(raw.extAot as i32),
                ext_sample_rate: raw.extSamplingRate as u32,
                output_delay: raw.outputDelay as u32,
                flags: raw.flags as u32,
                ep_config: raw.epConfig as i8,
                lost_access_units: raw.numLostAccessUnits as i64,
                total_bytes: raw.numTotalBytes as u64,
                bad_bytes: raw.numBadBytes as u64,
                total_access_units: raw.numTotalAccessUnits as u64,
                bad_access_units: raw.numBadAccessUnits as u64,
                drc_prog_ref_level: raw.drcProgRefLev as i8,
                drc_pres_mode: raw.drcPresMode as i8,
                ..Default::default()
            }
            .with_frame_bytes(),
        )
    }
}

impl Drop for FdkDecoder {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { sys::aacDecoder_Close(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

/// libfdk-aac encoder instance.
///
/// `fdk_aac::enc` has no end-of-input call, so flushing feeds silent frames
/// covering the encoder delay instead of draining the look-ahead. The encoded
/// stream therefore ends with up to one frame of extra silence.
pub struct FdkEncoder {
    encoder: fdk_enc::Encoder,
    info: EncoderInfo,
    silence: Vec<i16>,
    flush_frames: Option<usize>,
}

fn encoder_params(config: &EncoderConfig) -> Result<EncoderParams> {
    let channels = match config.channels {
        1 => ChannelMode::Mono,
        2 => ChannelMode::Stereo,
        n => {
            return Err(AacError::InvalidConfig(format!(
                "libfdk-aac encoder supports mono or stereo, got {} channels",
                n
            )))
        }
    };
    let transport = match config.transport {
        TransportType::Mp4Adts => fdk_enc::Transport::Adts,
        TransportType::Mp4Raw => fdk_enc::Transport::Raw,
        other => {
            return Err(AacError::InvalidConfig(format!(
                "unsupported encoder transport {:?}",
                other
            )))
        }
    };
    let audio_object_type = match config.aot {
        AudioObjectType::AacLc => fdk_enc::AudioObjectType::Mpeg4LowComplexity,
        AudioObjectType::HeAac => fdk_enc::AudioObjectType::Mpeg4HeAac,
        AudioObjectType::HeAacV2 => fdk_enc::AudioObjectType::Mpeg4HeAacV2,
        AudioObjectType::AacLd => fdk_enc::AudioObjectType::Mpeg4LowDelay,
        AudioObjectType::AacEld => fdk_enc::AudioObjectType::Mpeg4EnhancedLowDelay,
        other => {
            return Err(AacError::InvalidConfig(format!(
                "unsupported encoder object type {:?}",
                other
            )))
        }
    };
    let bit_rate = match config.bitrate {
        BitrateMode::Cbr(bps) => BitRate::Cbr(bps),
        BitrateMode::Vbr(1) => BitRate::VbrVeryLow,
        BitrateMode::Vbr(2) => BitRate::VbrLow,
        BitrateMode::Vbr(3) => BitRate::VbrMedium,
        BitrateMode::Vbr(4) => BitRate::VbrHigh,
        BitrateMode::Vbr(_) => BitRate::VbrVeryHigh,
    };
    Ok(EncoderParams {
        bit_rate,
        sample_rate: config.sample_rate,
        transport,
        channels,
        audio_object_type,
    })
}

impl EncoderBackend for FdkEncoder {
    fn open(config: &EncoderConfig) -> Result<Self> {
        let encoder = fdk_enc::Encoder::new(encoder_params(config)?)
            .map_err(|e| AacError::HandleOpen(format!("aacEncOpen failed: {:?}", e)))?;
        let raw = encoder
            .info()
            .map_err(|e| AacError::HandleOpen(format!("aacEncInfo failed: {:?}", e)))?;

        let conf_len = (raw.confSize as usize).min(raw.confBuf.len());
        let info = EncoderInfo {
            frame_length: raw.frameLength as usize,
            channels: raw.inputChannels as u16,
            max_out_buf_bytes: raw.maxOutBufBytes as usize,
            delay: raw.nDelay as u32,
            audio_specific_config: raw.confBuf[..conf_len].to_vec(),
        };
        debug!(
            frame_length = info.frame_length,
            delay = info.delay,
            asc_len = info.audio_specific_config.len(),
            "libfdk-aac encoder opened"
        );

        Ok(Self {
            encoder,
            silence: vec![0; info.frame_length * info.channels as usize],
            info,
            flush_frames: None,
        })
    }

    fn info(&self) -> &EncoderInfo {
        &self.info
    }

    fn encode(&mut self, pcm: &[i16], output: &mut [u8]) -> Result<EncodeProgress> {
        let frame = self.silence.len();
        let input = &pcm[..pcm.len().min(frame)];
        let result = self.encoder.encode(input, output).map_err(|e| {
            warn!(error = ?e, "libfdk-aac encode failed");
            AacError::Encoder(EncoderStatus::EncodeError)
        })?;
        Ok(EncodeProgress {
            input_consumed: result.input_consumed,
            output_bytes: result.output_size,
        })
    }

    fn flush(&mut self, output: &mut [u8]) -> Result<EncodeProgress> {
        let remaining = self
            .flush_frames
            .get_or_insert(flush_frame_count(self.info.delay, self.info.frame_length));
        while *remaining > 0 {
            *remaining -= 1;
            let result = self.encoder.encode(&self.silence, output).map_err(|e| {
                warn!(error = ?e, "libfdk-aac flush failed");
                AacError::Encoder(EncoderStatus::EncodeError)
            })?;
            if result.output_size > 0 {
                return Ok(EncodeProgress {
                    input_consumed: 0,
                    output_bytes: result.output_size,
                });
            }
        }
        Ok(EncodeProgress::default())
    }
}

/// Silent frames needed to push `delay` samples of look-ahead out of the encoder.
fn flush_frame_count(delay: u32, frame_length: usize) -> usize {
    let frame_length = frame_length.max(1);
    (delay as usize + frame_length - 1) / frame_length
}
