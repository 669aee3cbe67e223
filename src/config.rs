// config.rs - Encoder/decoder configuration
use crate::error::{AacError, Result};

/// Bitstream transport wrapping the raw access units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportType {
    /// Raw access units; needs an out-of-band AudioSpecificConfig.
    Mp4Raw,
    Mp4Adif,
    #[default]
    Mp4Adts,
    Mp4LatmMcp1,
    Mp4LatmMcp0,
    Mp4Loas,
    Drm,
}

impl TransportType {
    /// Numeric transport identifier understood by the codec library.
    pub fn code(self) -> i32 {
        match self {
            TransportType::Mp4Raw => 0,
            TransportType::Mp4Adif => 1,
            TransportType::Mp4Adts => 2,
            TransportType::Mp4LatmMcp1 => 6,
            TransportType::Mp4LatmMcp0 => 7,
            TransportType::Mp4Loas => 10,
            TransportType::Drm => 12,
        }
    }
}

/// MPEG-4 audio object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioObjectType {
    AacMain,
    #[default]
    AacLc,
    /// HE-AAC (SBR)
    HeAac,
    /// HE-AAC v2 (SBR + PS)
    HeAacV2,
    AacLd,
    AacEld,
    Other(i32),
}

impl AudioObjectType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => AudioObjectType::AacMain,
            2 => AudioObjectType::AacLc,
            5 => AudioObjectType::HeAac,
            29 => AudioObjectType::HeAacV2,
            23 => AudioObjectType::AacLd,
            39 => AudioObjectType::AacEld,
            other => AudioObjectType::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            AudioObjectType::AacMain => 1,
            AudioObjectType::AacLc => 2,
            AudioObjectType::HeAac => 5,
            AudioObjectType::HeAacV2 => 29,
            AudioObjectType::AacLd => 23,
            AudioObjectType::AacEld => 39,
            AudioObjectType::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateMode {
    /// Constant bitrate in bits per second
    Cbr(u32),
    /// Variable bitrate, quality 1 (lowest) to 5 (highest)
    Vbr(u8),
}

/// AAC encoder configuration with validation
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub transport: TransportType,
    pub aot: AudioObjectType,
    pub sample_rate: u32,
    pub channels: u16,
    pub bitrate: BitrateMode,
}

impl EncoderConfig {
    pub fn new(sample_rate: u32, channels: u16, bitrate: u32) -> Result<Self> {
        let config = Self {
            sample_rate,
            channels,
            bitrate: BitrateMode::Cbr(bitrate),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AacError::InvalidConfig("Sample rate must be > 0".to_string()));
        }
        if self.channels == 0 || self.channels > 8 {
            return Err(AacError::InvalidConfig(format!(
                "Invalid channel count: {}",
                self.channels
            )));
        }
        match self.bitrate {
            BitrateMode::Cbr(0) => {
                return Err(AacError::InvalidConfig("Bitrate must be > 0".to_string()))
            }
            BitrateMode::Vbr(quality) if !(1..=5).contains(&quality) => {
                return Err(AacError::InvalidConfig(format!(
                    "VBR quality must be between 1 and 5, got {}",
                    quality
                )))
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            transport: TransportType::Mp4Adts,
            aot: AudioObjectType::AacLc,
            sample_rate: 44100,
            channels: 2,
            bitrate: BitrateMode::Cbr(128_000),
        }
    }
}

/// Decoder parameters settable through the codec's set-parameter primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderParam {
    PcmDualChannelOutputMode,
    PcmOutputChannelMapping,
    PcmLimiterEnable,
    PcmLimiterAttackTime,
    PcmLimiterReleaseTime,
    PcmMinOutputChannels,
    PcmMaxOutputChannels,
    MetadataProfile,
    MetadataExpiryTime,
    ConcealMethod,
    DrcBoostFactor,
    DrcAttenuationFactor,
    DrcReferenceLevel,
    DrcHeavyCompression,
    DrcDefaultPresentationMode,
    DrcEncTargetLevel,
    UnidrcSetEffect,
    UnidrcAlbumMode,
    QmfLowpower,
    TpdecClearBuffer,
}

impl DecoderParam {
    /// Parameter identifier understood by the codec library.
    pub fn id(self) -> u32 {
        match self {
            DecoderParam::PcmDualChannelOutputMode => 0x0002,
            DecoderParam::PcmOutputChannelMapping => 0x0003,
            DecoderParam::PcmLimiterEnable => 0x0004,
            DecoderParam::PcmLimiterAttackTime => 0x0005,
            DecoderParam::PcmLimiterReleaseTime => 0x0006,
            DecoderParam::PcmMinOutputChannels => 0x0011,
            DecoderParam::PcmMaxOutputChannels => 0x0012,
            DecoderParam::MetadataProfile => 0x0020,
            DecoderParam::MetadataExpiryTime => 0x0021,
            DecoderParam::ConcealMethod => 0x0100,
            DecoderParam::DrcBoostFactor => 0x0200,
            DecoderParam::DrcAttenuationFactor => 0x0201,
            DecoderParam::DrcReferenceLevel => 0x0202,
            DecoderParam::DrcHeavyCompression => 0x0203,
            DecoderParam::DrcDefaultPresentationMode => 0x0204,
            DecoderParam::DrcEncTargetLevel => 0x0205,
            DecoderParam::UnidrcSetEffect => 0x0206,
            DecoderParam::UnidrcAlbumMode => 0x0207,
            DecoderParam::QmfLowpower => 0x0300,
            DecoderParam::TpdecClearBuffer => 0x0603,
        }
    }
}

/// How the decoder renders two-channel signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DualChannelOutputMode {
    #[default]
    LeaveBoth,
    MonoCh1,
    MonoCh2,
    Mix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimiterMode {
    #[default]
    AutoConfig,
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataProfile {
    #[default]
    MpegStandard,
    MpegLegacy,
    MpegLegacyPrio,
    AribJapan,
}

/// Error concealment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcealMethod {
    #[default]
    SpectralMuting,
    NoiseSubstitution,
    EnergyInterpolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrcPresentationMode {
    #[default]
    ParameterHandlingDisabled,
    ParameterHandlingEnabled,
    PresentationMode1,
    PresentationMode2,
}

/// QMF bank processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QmfLowpowerMode {
    #[default]
    Internal,
    Complex,
    Real,
}

/// AAC decoder configuration. Zero/default fields leave the library default in place.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    pub transport: TransportType,
    pub dual_channel_output_mode: DualChannelOutputMode,
    /// Use MPEG channel ordering in the output buffer.
    pub output_channel_mapping_mpeg: bool,
    pub limiter_mode: LimiterMode,
    /// Limiter attack time in ms
    pub limiter_attack_time: u32,
    /// Limiter release time in ms
    pub limiter_release_time: u32,
    pub min_output_channels: u32,
    pub max_output_channels: u32,
    pub metadata_profile: MetadataProfile,
    /// Time in ms after which bitstream metadata expires
    pub metadata_expiry_time: u32,
    pub conceal_method: ConcealMethod,
    pub drc_boost_factor: u32,
    pub drc_attenuation_factor: u32,
    pub drc_reference_level: u32,
    pub drc_heavy_compression: bool,
    pub drc_default_presentation_mode: DrcPresentationMode,
    pub drc_enc_target_level: u32,
    pub unidrc_set_effect: i32,
    pub unidrc_album_mode: bool,
    pub qmf_lowpower_mode: QmfLowpowerMode,
}

impl DecoderConfig {
    pub fn new(transport: TransportType) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_output_channels > 8 {
            return Err(AacError::InvalidConfig(format!(
                "Invalid max output channels: {}",
                self.max_output_channels
            )));
        }
        if self.max_output_channels > 0 && self.min_output_channels > self.max_output_channels {
            return Err(AacError::InvalidConfig(
                "Min output channels exceeds max output channels".to_string(),
            ));
        }
        if self.drc_boost_factor > 127 || self.drc_attenuation_factor > 127 {
            return Err(AacError::InvalidConfig(
                "DRC factors must be between 0 and 127".to_string(),
            ));
        }
        if self.drc_reference_level > 127 || self.drc_enc_target_level > 127 {
            return Err(AacError::InvalidConfig(
                "DRC levels must be between 0 and 127".to_string(),
            ));
        }
        Ok(())
    }

    /// Lower the configuration to the ordered list of set-parameter calls.
    pub fn params(&self) -> Vec<(DecoderParam, i32)> {
        let mut params = Vec::new();
        let mut push_if = |cond: bool, param: DecoderParam, value: i32| {
            if cond {
                params.push((param, value));
            }
        };

        push_if(
            self.dual_channel_output_mode != DualChannelOutputMode::LeaveBoth,
            DecoderParam::PcmDualChannelOutputMode,
            self.dual_channel_output_mode as i32,
        );
        push_if(
            self.output_channel_mapping_mpeg,
            DecoderParam::PcmOutputChannelMapping,
            0,
        );
        // The library encodes "auto" as -1, so enable/disable shift down by one.
        push_if(
            self.limiter_mode != LimiterMode::AutoConfig,
            DecoderParam::PcmLimiterEnable,
            self.limiter_mode as i32 - 1,
        );
        push_if(
            self.limiter_attack_time > 0,
            DecoderParam::PcmLimiterAttackTime,
            self.limiter_attack_time as i32,
        );
        push_if(
            self.limiter_release_time > 0,
            DecoderParam::PcmLimiterReleaseTime,
            self.limiter_release_time as i32,
        );
        push_if(
            self.min_output_channels > 0,
            DecoderParam::PcmMinOutputChannels,
            self.min_output_channels as i32,
        );
        push_if(
            self.max_output_channels > 0,
            DecoderParam::PcmMaxOutputChannels,
            self.max_output_channels as i32,
        );
        push_if(
            self.metadata_profile != MetadataProfile::MpegStandard,
            DecoderParam::MetadataProfile,
            self.metadata_profile as i32,
        );
        push_if(
            self.metadata_expiry_time > 0,
            DecoderParam::MetadataExpiryTime,
            self.metadata_expiry_time as i32,
        );
        push_if(
            self.conceal_method != ConcealMethod::SpectralMuting,
            DecoderParam::ConcealMethod,
            self.conceal_method as i32,
        );
        push_if(
            self.drc_boost_factor > 0,
            DecoderParam::DrcBoostFactor,
            self.drc_boost_factor as i32,
        );
        push_if(
            self.drc_attenuation_factor > 0,
            DecoderParam::DrcAttenuationFactor,
            self.drc_attenuation_factor as i32,
        );
        push_if(
            self.drc_reference_level > 0,
            DecoderParam::DrcReferenceLevel,
            self.drc_reference_level as i32,
        );
        push_if(
            self.drc_heavy_compression,
            DecoderParam::DrcHeavyCompression,
            1,
        );
        push_if(
            self.drc_default_presentation_mode != DrcPresentationMode::ParameterHandlingDisabled,
            DecoderParam::DrcDefaultPresentationMode,
            self.drc_default_presentation_mode as i32 - 1,
        );
        push_if(
            self.drc_enc_target_level > 0,
            DecoderParam::DrcEncTargetLevel,
            self.drc_enc_target_level as i32,
        );
        push_if(
            self.unidrc_set_effect != 0,
            DecoderParam::UnidrcSetEffect,
            self.unidrc_set_effect,
        );
        push_if(self.unidrc_album_mode, DecoderParam::UnidrcAlbumMode, 1);
        push_if(
            self.qmf_lowpower_mode != QmfLowpowerMode::Internal,
            DecoderParam::QmfLowpower,
            self.qmf_lowpower_mode as i32,
        );

        params
    }
}
