use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AlignmentError;

/// MFCC granularity preset. Each level fixes the analysis window duration,
/// hop duration, and FFT order used for one alignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    XxLow,
    XLow,
    Low,
    Medium,
    High,
    XHigh,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::XxLow,
        Granularity::XLow,
        Granularity::Low,
        Granularity::Medium,
        Granularity::High,
        Granularity::XHigh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::XxLow => "xx-low",
            Self::XLow => "x-low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::XHigh => "x-high",
        }
    }

    /// MFCC options for this granularity, with the first cepstral coefficient
    /// kept by default. Alignment passes force it to zero for energy
    /// invariance.
    pub fn mfcc_options(self) -> MfccOptions {
        let (window_duration, hop_duration, fft_order) = match self {
            Self::XxLow => (0.400, 0.160, 8192),
            Self::XLow => (0.200, 0.080, 4096),
            Self::Low => (0.100, 0.040, 2048),
            Self::Medium => (0.050, 0.020, 1024),
            Self::High => (0.025, 0.010, 512),
            Self::XHigh => (0.020, 0.005, 512),
        };
        MfccOptions {
            window_duration,
            hop_duration,
            fft_order,
            ..MfccOptions::default()
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xx-low" => Ok(Self::XxLow),
            "x-low" => Ok(Self::XLow),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "x-high" => Ok(Self::XHigh),
            other => Err(AlignmentError::unsupported("granularity", other)),
        }
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Options for the MFCC frontend.
#[derive(Debug, Clone, PartialEq)]
pub struct MfccOptions {
    pub window_duration: f64,
    pub hop_duration: f64,
    /// FFT length; raised to the next power of two covering the analysis
    /// window when the window is longer.
    pub fft_order: usize,
    /// Zeroing the zeroth cepstral coefficient removes overall energy from
    /// the feature vector, so loudness differences do not dominate the
    /// frame-to-frame distance.
    pub zero_first_coefficient: bool,
    pub mel_filterbank_count: usize,
    pub cepstral_coefficient_count: usize,
    pub low_frequency_hz: f64,
    pub high_frequency_hz: f64,
    pub pre_emphasis: f64,
}

impl Default for MfccOptions {
    fn default() -> Self {
        Self {
            window_duration: 0.050,
            hop_duration: 0.020,
            fft_order: 1024,
            zero_first_coefficient: false,
            mel_filterbank_count: 40,
            cepstral_coefficient_count: 13,
            low_frequency_hz: 133.3333,
            high_frequency_hz: 6855.4976,
            pre_emphasis: 0.97,
        }
    }
}

impl MfccOptions {
    pub fn frames_per_second(&self) -> f64 {
        1.0 / self.hop_duration
    }
}

/// How phone timings are attached to recognized words in indirect alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneAlignmentMethod {
    /// Scale the synthesized phone intervals linearly into the recognized
    /// word interval.
    #[default]
    Interpolation,
    /// Run a per-word DTW between the source audio and the synthesized word.
    Dtw,
}

impl PhoneAlignmentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interpolation => "interpolation",
            Self::Dtw => "dtw",
        }
    }
}

impl fmt::Display for PhoneAlignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhoneAlignmentMethod {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interpolation" => Ok(Self::Interpolation),
            "dtw" => Ok(Self::Dtw),
            other => Err(AlignmentError::unsupported("phone alignment method", other)),
        }
    }
}
