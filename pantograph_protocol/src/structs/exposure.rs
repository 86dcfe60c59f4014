use crate::Error;
use binrw::binrw;
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Automatic exposure mode (`CAM_AE`).
///
/// The discriminant is the mode byte on the wire, which is not contiguous.
/// Callers that think of exposure modes as an index (`0..=3`) should use
/// [`ExposureMode::from_index`].
#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Default, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ExposureMode {
    #[default]
    FullAuto = 0x00,
    Manual = 0x03,
    ShutterPriority = 0x0a,
    IrisPriority = 0x0b,
}

impl ExposureMode {
    /// Maps an exposure mode index to a mode, clamping to `0..=3`:
    ///
    /// * `0` (and below): [full auto][Self::FullAuto]
    /// * `1`: [manual][Self::Manual]
    /// * `2`: [shutter priority][Self::ShutterPriority]
    /// * `3` (and above): [iris priority][Self::IrisPriority]
    pub fn from_index(index: i64) -> Self {
        match index.clamp(0, 3) {
            0 => Self::FullAuto,
            1 => Self::Manual,
            2 => Self::ShutterPriority,
            _ => Self::IrisPriority,
        }
    }

    pub const fn index(&self) -> u8 {
        match self {
            Self::FullAuto => 0,
            Self::Manual => 1,
            Self::ShutterPriority => 2,
            Self::IrisPriority => 3,
        }
    }
}

impl Display for ExposureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FullAuto => "Full Auto",
            Self::Manual => "Manual",
            Self::ShutterPriority => "Shutter Priority",
            Self::IrisPriority => "Iris Priority",
        })
    }
}

impl FromStr for ExposureMode {
    type Err = Error;

    /// Parses either a mode name, or a (clamped) mode index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<i64>() {
            return Ok(Self::from_index(index));
        }

        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "auto" | "full-auto" => Ok(Self::FullAuto),
            "manual" => Ok(Self::Manual),
            "shutter" | "shutter-priority" => Ok(Self::ShutterPriority),
            "iris" | "iris-priority" => Ok(Self::IrisPriority),
            _ => Err(Error::InvalidParameter(format!(
                "unknown exposure mode: {s:?}"
            ))),
        }
    }
}
