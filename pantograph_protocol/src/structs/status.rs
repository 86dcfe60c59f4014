use crate::Error;
use binrw::binrw;
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// On/off switch value, as used by power and backlight commands and the
/// backlight inquiry.
#[binrw]
#[brw(repr = u8)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Switch {
    On = 0x02,
    Off = 0x03,
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::On => "On",
            Self::Off => "Off",
        })
    }
}

impl FromStr for Switch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" | "1" | "true" => Ok(Self::On),
            "off" | "0" | "false" => Ok(Self::Off),
            _ => Err(Error::InvalidParameter(format!(
                "expected on or off, got {s:?}"
            ))),
        }
    }
}

/// Camera power state, from a power inquiry (`CAM_PowerInq`).
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum PowerState {
    On = 0x02,
    /// Off, but still listening for a power on command.
    Standby = 0x03,
    InternalError = 0x04,
}

impl From<Switch> for PowerState {
    fn from(s: Switch) -> Self {
        match s {
            Switch::On => Self::On,
            Switch::Off => Self::Standby,
        }
    }
}

impl Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::On => "On",
            Self::Standby => "Off (Standby)",
            Self::InternalError => "Internal power circuit error",
        })
    }
}

/// Focus mode, from a focus mode inquiry (`CAM_FocusModeInq`).
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FocusMode {
    Auto = 0x02,
    Manual = 0x03,
}

impl Display for FocusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Auto => "Auto",
            Self::Manual => "Manual",
        })
    }
}

/// White balance mode, from a white balance inquiry (`CAM_WBModeInq`).
///
/// `0x04` (ATW on some models) is deliberately absent, and is reported as
/// [`Reported::Unknown`][crate::structs::Reported::Unknown].
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum WhiteBalance {
    Auto = 0x00,
    Indoor = 0x01,
    Outdoor = 0x02,
    OnePush = 0x03,
    Manual = 0x05,
}

impl Display for WhiteBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Auto => "Auto",
            Self::Indoor => "Indoor",
            Self::Outdoor => "Outdoor",
            Self::OnePush => "One Push",
            Self::Manual => "Manual",
        })
    }
}
