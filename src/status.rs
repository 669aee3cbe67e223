// status.rs - Codec status code tables
//! Numeric status codes returned across the codec boundary.
//!
//! Every known code maps to a fixed kind with a human-readable description.
//! Codes outside the table become `Unknown(raw)` instead of being dropped.

use std::fmt;

macro_rules! status_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:literal => $desc:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A code that is not part of the table.
            Unknown(u32),
        }

        impl $name {
            /// Look up a raw status code. `0` is success and yields `None`.
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    0 => None,
                    $($code => Some(Self::$variant),)+
                    other => Some(Self::Unknown(other)),
                }
            }

            pub fn code(&self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => *code,
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $desc,)+
                    Self::Unknown(_) => "unknown status",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} ({:#06x})", self.description(), self.code())
            }
        }
    };
}

status_table! {
    /// Status codes of the external AAC decoder.
    pub enum DecoderStatus {
        OutOfMemory = 0x0002 => "heap returned NULL pointer or output buffer is invalid",
        UnknownReason = 0x0005 => "error condition is of unknown reason",
        TransportSyncError = 0x1001 => "the transport decoder had synchronization problems",
        NotEnoughBits = 0x1002 => "the input buffer ran out of bits",
        InvalidHandle = 0x2001 => "the handle passed to the function call was invalid",
        UnsupportedAot = 0x2002 => "the AOT found in the configuration is not supported",
        UnsupportedFormat = 0x2003 => "the bitstream format is not supported",
        UnsupportedErFormat = 0x2004 => "the error resilience tool format is not supported",
        UnsupportedEpConfig = 0x2005 => "the error protection format is not supported",
        UnsupportedMultilayer = 0x2006 => "more than one layer for AAC scalable is not supported",
        UnsupportedChannelConfig = 0x2007 => "the channel configuration is not supported",
        UnsupportedSamplingRate = 0x2008 => "the sample rate specified in the configuration is not supported",
        InvalidSbrConfig = 0x2009 => "the SBR configuration is not supported",
        SetParamFail = 0x200A => "the parameter could not be set",
        NeedToRestart = 0x200B => "the decoder needs to be restarted",
        OutputBufferTooSmall = 0x200C => "the provided output buffer is too small",
        TransportError = 0x4001 => "the transport decoder encountered an unexpected error",
        ParseError = 0x4002 => "error while parsing the bitstream",
        UnsupportedExtensionPayload = 0x4003 => "error while parsing the extension payload of the bitstream",
        DecodeFrameError = 0x4004 => "the parsed bitstream value is out of range",
        CrcError = 0x4005 => "the embedded CRC did not match",
        InvalidCodeBook = 0x4006 => "an invalid codebook was signaled",
        UnsupportedPrediction = 0x4007 => "predictor found, but not supported in the AAC Low Complexity profile",
        UnsupportedCce = 0x4008 => "a CCE element was found which is not supported",
        UnsupportedLfe = 0x4009 => "a LFE element was found which is not supported",
        UnsupportedGainControlData = 0x400A => "gain control data found but not supported",
        UnsupportedSba = 0x400B => "SBA found but currently not supported in the BSAC profile",
        TnsReadError = 0x400C => "error while reading TNS data",
        RvlcError = 0x400D => "error while decoding error resilient data",
        AncDataError = 0x8001 => "non severe error concerning the ancillary data handling",
        TooSmallAncBuffer = 0x8002 => "the registered ancillary data buffer is too small to receive the parsed data",
        TooManyAncElements = 0x8003 => "more than the allowed number of ancillary data elements should be written to buffer",
    }
}

impl DecoderStatus {
    /// Synchronisation or bit-starvation conditions; more input may resolve them.
    pub fn is_transient(&self) -> bool {
        (0x1000..=0x1FFF).contains(&self.code())
    }

    /// Initialisation/configuration failures; the decoder must be recreated.
    pub fn is_fatal(&self) -> bool {
        let code = self.code();
        (0x2000..=0x2FFF).contains(&code) || code < 0x1000
    }

    /// Bitstream errors the decoder concealed; the output is still valid.
    pub fn is_concealed(&self) -> bool {
        (0x4000..=0x4FFF).contains(&self.code())
    }

    /// Non-severe ancillary data problems.
    pub fn is_ancillary(&self) -> bool {
        (0x8000..=0x8FFF).contains(&self.code())
    }
}

status_table! {
    /// Status codes of the external AAC encoder.
    pub enum EncoderStatus {
        InvalidHandle = 0x0020 => "the handle passed to the function call was invalid",
        MemoryError = 0x0021 => "memory allocation failed",
        UnsupportedParameter = 0x0022 => "the parameter is not available",
        InvalidConfig = 0x0023 => "the configuration is not available",
        InitError = 0x0040 => "general initialization error",
        InitAacError = 0x0041 => "AAC library initialization error",
        InitSbrError = 0x0042 => "SBR library initialization error",
        InitTpError = 0x0043 => "transport library initialization error",
        InitMetaError = 0x0044 => "meta data library initialization error",
        InitMpsError = 0x0045 => "MPS library initialization error",
        EncodeError = 0x0060 => "the encoding process was interrupted by an unexpected error",
        EncodeEof = 0x0080 => "end of file reached",
    }
}

impl EncoderStatus {
    /// End of input reached while draining; not a failure of the stream.
    pub fn is_eof(&self) -> bool {
        matches!(self, EncoderStatus::EncodeEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_code_maps_to_none() {
        assert_eq!(DecoderStatus::from_code(0), None);
        assert_eq!(EncoderStatus::from_code(0), None);
    }

    #[test]
    fn test_known_decoder_codes() {
        let status = DecoderStatus::from_code(0x1002).unwrap();
        assert_eq!(status, DecoderStatus::NotEnoughBits);
        assert!(status.is_transient());
        assert!(!status.is_fatal());

        let status = DecoderStatus::from_code(0x2002).unwrap();
        assert_eq!(status, DecoderStatus::UnsupportedAot);
        assert!(status.is_fatal());
        assert_eq!(status.code(), 0x2002);

        let status = DecoderStatus::from_code(0x4005).unwrap();
        assert!(status.is_concealed());
        assert_eq!(status.description(), "the embedded CRC did not match");

        assert!(DecoderStatus::from_code(0x8002).unwrap().is_ancillary());
    }

    #[test]
    fn test_unknown_codes_keep_raw_value() {
        let status = DecoderStatus::from_code(0x7777).unwrap();
        assert_eq!(status, DecoderStatus::Unknown(0x7777));
        assert_eq!(status.code(), 0x7777);
        assert!(status.to_string().contains("0x7777"));

        assert_eq!(EncoderStatus::from_code(3), Some(EncoderStatus::Unknown(3)));
    }

    #[test]
    fn test_encoder_eof() {
        assert!(EncoderStatus::from_code(0x0080).unwrap().is_eof());
        assert!(!EncoderStatus::EncodeError.is_eof());
    }
}
