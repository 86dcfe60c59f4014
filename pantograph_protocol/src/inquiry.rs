//! # Inquiries
//!
//! Inquiries are [messages][crate::Message] with type `0x09`. The camera
//! answers each one with a completion on socket 0 (`90 50 ... FF`) carrying
//! the reply data, which [`Inquiry::decode`] turns into an [`InquiryResponse`].
//!
//! Inquiry | Bytes after `81 09` | Reply data
//! ------- | ------------------- | ----------
//! [Version][Inquiry::Version] | `00 02` | [`VersionInfo`]
//! [Power][Inquiry::Power] | `04 00` | [`PowerState`]
//! [White balance][Inquiry::WhiteBalance] | `04 35` | [`WhiteBalance`]
//! [Focus mode][Inquiry::FocusMode] | `04 38` | [`FocusMode`]
//! [Exposure mode][Inquiry::ExposureMode] | `04 39` | [`ExposureMode`]
//! [Backlight][Inquiry::Backlight] | `04 33` | [`Switch`]
//! [Position][Inquiry::Position] | `06 12` | [`PtzPosition`]
//! [Video format][Inquiry::VideoFormat] | `06 23` | [`VideoFormat`]
//! [Color format][Inquiry::ColorFormat] | `06 24` | [`ColorFormat`]
use crate::{
    structs::{
        ColorFormat, ExposureMode, FocusMode, PowerState, PtzPosition, Reported, Switch,
        VersionInfo, VideoFormat, WhiteBalance,
    },
    Error, Result,
};
use binrw::{binrw, BinRead};
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt::Display, io::Cursor, str::FromStr};

/// Inquiry payload, selected by the category and inquiry bytes.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Inquiry {
    #[brw(magic = b"\x00\x02")]
    Version,
    #[brw(magic = b"\x04\x00")]
    Power,
    #[brw(magic = b"\x04\x33")]
    Backlight,
    #[brw(magic = b"\x04\x35")]
    WhiteBalance,
    #[brw(magic = b"\x04\x38")]
    FocusMode,
    #[brw(magic = b"\x04\x39")]
    ExposureMode,
    #[brw(magic = b"\x06\x12")]
    Position,
    #[brw(magic = b"\x06\x23")]
    VideoFormat,
    #[brw(magic = b"\x06\x24")]
    ColorFormat,
}

impl Inquiry {
    pub const ALL: [Self; 9] = [
        Self::Power,
        Self::FocusMode,
        Self::WhiteBalance,
        Self::ExposureMode,
        Self::Backlight,
        Self::VideoFormat,
        Self::ColorFormat,
        Self::Version,
        Self::Position,
    ];

    /// Number of data bytes in a reply to this inquiry.
    pub const fn reply_length(&self) -> usize {
        match self {
            Self::Version => 7,
            Self::Position => 8,
            _ => 1,
        }
    }

    /// Decodes the data of a reply to this inquiry.
    ///
    /// Status bytes which are not in the table for this inquiry are returned
    /// as [`Reported::Unknown`], not an error.
    ///
    /// ## Errors
    ///
    /// * [`Error::InvalidLength`] if `data` is not exactly
    ///   [`Inquiry::reply_length`] bytes.
    pub fn decode(&self, data: &[u8]) -> Result<InquiryResponse> {
        if data.len() != self.reply_length() {
            error!(
                "{self} reply has {} bytes, expected {}",
                data.len(),
                self.reply_length()
            );
            return Err(Error::InvalidLength);
        }
        let status = data[0];

        use InquiryResponse as R;
        Ok(match self {
            Self::Power => R::Power(status.into()),
            Self::FocusMode => R::FocusMode(status.into()),
            Self::WhiteBalance => R::WhiteBalance(status.into()),
            Self::ExposureMode => R::ExposureMode(status.into()),
            Self::Backlight => R::Backlight(status.into()),
            Self::VideoFormat => R::VideoFormat(status.into()),
            Self::ColorFormat => R::ColorFormat(status.into()),
            Self::Version => R::Version(VersionInfo::read(&mut Cursor::new(data))?),
            Self::Position => R::Position(PtzPosition::read(&mut Cursor::new(data))?),
        })
    }
}

impl Display for Inquiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Power => "power",
            Self::FocusMode => "focus",
            Self::WhiteBalance => "white-balance",
            Self::ExposureMode => "exposure",
            Self::Backlight => "backlight",
            Self::VideoFormat => "video-format",
            Self::ColorFormat => "color-format",
            Self::Version => "version",
            Self::Position => "position",
        })
    }
}

impl FromStr for Inquiry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "power" => Self::Power,
            "focus" | "focus-mode" => Self::FocusMode,
            "wb" | "white-balance" => Self::WhiteBalance,
            "exposure" | "exposure-mode" | "ae" => Self::ExposureMode,
            "backlight" => Self::Backlight,
            "video" | "video-format" => Self::VideoFormat,
            "color" | "colour" | "color-format" | "colour-format" => Self::ColorFormat,
            "version" => Self::Version,
            "position" | "pos" => Self::Position,
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "unknown inquiry: {s:?}"
                )))
            }
        })
    }
}

/// Decoded reply to an [`Inquiry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InquiryResponse {
    Power(Reported<PowerState>),
    FocusMode(Reported<FocusMode>),
    WhiteBalance(Reported<WhiteBalance>),
    ExposureMode(Reported<ExposureMode>),
    Backlight(Reported<Switch>),
    VideoFormat(Reported<VideoFormat>),
    ColorFormat(Reported<ColorFormat>),
    Version(VersionInfo),
    Position(PtzPosition),
}

impl InquiryResponse {
    /// The inquiry this answers.
    pub const fn inquiry(&self) -> Inquiry {
        match self {
            Self::Power(_) => Inquiry::Power,
            Self::FocusMode(_) => Inquiry::FocusMode,
            Self::WhiteBalance(_) => Inquiry::WhiteBalance,
            Self::ExposureMode(_) => Inquiry::ExposureMode,
            Self::Backlight(_) => Inquiry::Backlight,
            Self::VideoFormat(_) => Inquiry::VideoFormat,
            Self::ColorFormat(_) => Inquiry::ColorFormat,
            Self::Version(_) => Inquiry::Version,
            Self::Position(_) => Inquiry::Position,
        }
    }
}

impl Display for InquiryResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.inquiry())?;
        match self {
            Self::Power(v) => v.fmt(f),
            Self::FocusMode(v) => v.fmt(f),
            Self::WhiteBalance(v) => v.fmt(f),
            Self::ExposureMode(v) => v.fmt(f),
            Self::Backlight(v) => v.fmt(f),
            Self::VideoFormat(v) => v.fmt(f),
            Self::ColorFormat(v) => v.fmt(f),
            Self::Version(v) => v.fmt(f),
            Self::Position(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Message, Request};

    #[test]
    fn requests() -> Result {
        let cases = [
            (Inquiry::Power, "81090400ff"),
            (Inquiry::FocusMode, "81090438ff"),
            (Inquiry::WhiteBalance, "81090435ff"),
            (Inquiry::ExposureMode, "81090439ff"),
            (Inquiry::Backlight, "81090433ff"),
            (Inquiry::VideoFormat, "81090623ff"),
            (Inquiry::ColorFormat, "81090624ff"),
            (Inquiry::Version, "81090002ff"),
            (Inquiry::Position, "81090612ff"),
        ];

        for (inquiry, expected) in cases {
            let expected = hex::decode(expected)?;
            let req = Request::new(1, inquiry)?;
            assert!(req.is_inquiry());
            assert_eq!(expected, req.to_bytes()?, "{inquiry}");
            assert_eq!(Message::Inquiry(inquiry), Request::from_bytes(&expected)?.message);
        }
        Ok(())
    }

    #[test]
    fn power() -> Result {
        assert_eq!(
            InquiryResponse::Power(Reported::Known(PowerState::On)),
            Inquiry::Power.decode(&[0x02])?
        );
        assert_eq!(
            "power: Internal power circuit error",
            Inquiry::Power.decode(&[0x04])?.to_string()
        );
        assert_eq!(
            InquiryResponse::Power(Reported::Unknown(0x07)),
            Inquiry::Power.decode(&[0x07])?
        );
        Ok(())
    }

    #[test]
    fn status_tables() -> Result {
        assert_eq!(
            InquiryResponse::FocusMode(Reported::Known(FocusMode::Manual)),
            Inquiry::FocusMode.decode(&[0x03])?
        );
        assert_eq!(
            InquiryResponse::WhiteBalance(Reported::Known(WhiteBalance::Outdoor)),
            Inquiry::WhiteBalance.decode(&[0x02])?
        );
        assert_eq!(
            InquiryResponse::ExposureMode(Reported::Known(ExposureMode::ShutterPriority)),
            Inquiry::ExposureMode.decode(&[0x0a])?
        );
        assert_eq!(
            InquiryResponse::ExposureMode(Reported::Unknown(0x01)),
            Inquiry::ExposureMode.decode(&[0x01])?
        );
        assert_eq!(
            InquiryResponse::Backlight(Reported::Known(Switch::Off)),
            Inquiry::Backlight.decode(&[0x03])?
        );
        assert_eq!(
            InquiryResponse::VideoFormat(Reported::Known(VideoFormat::Hd720p59_94)),
            Inquiry::VideoFormat.decode(&[0x02])?
        );
        assert_eq!(
            InquiryResponse::ColorFormat(Reported::Known(ColorFormat::YPbPr)),
            Inquiry::ColorFormat.decode(&[0x01])?
        );
        Ok(())
    }

    #[test]
    fn position() -> Result {
        assert_eq!(
            InquiryResponse::Position(PtzPosition::new(-2224, 1200)),
            Inquiry::Position.decode(&hex::decode("0f07050000040b00")?)?
        );
        assert_eq!(
            InquiryResponse::Position(PtzPosition::HOME),
            Inquiry::Position.decode(&[0; 8])?
        );
        Ok(())
    }

    #[test]
    fn version() -> Result {
        let expected = VersionInfo {
            vendor_id: 0x0020,
            model_id: 0x040e,
            rom_revision: 0x0117,
            max_sockets: 2,
        };
        assert_eq!(
            InquiryResponse::Version(expected),
            Inquiry::Version.decode(&hex::decode("0020040e011702")?)?
        );
        Ok(())
    }

    #[test]
    fn wrong_length_replies() {
        for inquiry in Inquiry::ALL {
            assert!(
                matches!(inquiry.decode(&[]), Err(Error::InvalidLength)),
                "{inquiry}"
            );
        }
        assert!(matches!(
            Inquiry::Position.decode(&[0; 7]),
            Err(Error::InvalidLength)
        ));
        assert!(matches!(
            Inquiry::Version.decode(&[0; 6]),
            Err(Error::InvalidLength)
        ));

        // A position reply is not a power reply
        assert!(matches!(
            Inquiry::Power.decode(&[0x0f, 0x07, 0x05, 0x00, 0x00, 0x04, 0x0b, 0x00]),
            Err(Error::InvalidLength)
        ));
        assert!(matches!(
            Inquiry::Version.decode(&[0; 8]),
            Err(Error::InvalidLength)
        ));
    }

    #[test]
    fn from_str() -> Result {
        for inquiry in Inquiry::ALL {
            assert_eq!(inquiry, inquiry.to_string().parse()?);
        }
        assert_eq!(Inquiry::WhiteBalance, "wb".parse()?);
        assert!(matches!(
            "zoom".parse::<Inquiry>(),
            Err(Error::InvalidParameter(_))
        ));
        Ok(())
    }
}
