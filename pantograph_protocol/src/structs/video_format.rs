#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Output video format, from a video system inquiry.
///
/// `0x05` is reserved on the cameras this was tested with, and reports as
/// [`VideoFormat::Reserved`] (displayed blank) rather than unknown.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum VideoFormat {
    /// 1920x1080i, 59.94 Hz
    Fhd1080i59_94 = 0x00,
    /// 1920x1080p, 29.97 Hz
    Fhd1080p29_97 = 0x01,
    /// 1280x720p, 59.94 Hz
    Hd720p59_94 = 0x02,
    /// 1280x720p, 29.97 Hz
    Hd720p29_97 = 0x03,
    /// 720x480i, 59.94 Hz (NTSC)
    Ntsc480i59_94 = 0x04,
    Reserved = 0x05,
    /// 720x576i, 50 Hz (PAL)
    Pal576i50 = 0x06,
}

impl VideoFormat {
    /// Frame dimensions in pixels, or `None` for [`VideoFormat::Reserved`].
    pub const fn dimensions(&self) -> Option<(u16, u16)> {
        use VideoFormat::*;
        match self {
            Fhd1080i59_94 | Fhd1080p29_97 => Some((1920, 1080)),
            Hd720p59_94 | Hd720p29_97 => Some((1280, 720)),
            Ntsc480i59_94 => Some((720, 480)),
            Pal576i50 => Some((720, 576)),
            Reserved => None,
        }
    }
}

impl Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use VideoFormat::*;
        f.write_str(match self {
            Fhd1080i59_94 => "1920x1080i/59.94",
            Fhd1080p29_97 => "1920x1080p/29.97",
            Hd720p59_94 => "1280x720p/59.94",
            Hd720p29_97 => "1280x720p/29.97",
            Ntsc480i59_94 => "720x480i/59.94",
            Reserved => "",
            Pal576i50 => "720x576i/50",
        })
    }
}

/// Component output colour format.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ColorFormat {
    Rgb = 0x00,
    YPbPr = 0x01,
}

impl Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Rgb => "RGB",
            Self::YPbPr => "YPbPr",
        })
    }
}
