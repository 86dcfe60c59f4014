use num_traits::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A status value reported by the camera.
///
/// Cameras report states that aren't in any table this library knows about
/// (vendor extensions, newer firmware). Those are kept as
/// [`Reported::Unknown`] with the raw status byte, rather than failing the
/// inquiry.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reported<T> {
    Known(T),
    Unknown(u8),
}

impl<T> Reported<T> {
    /// Returns the known value, if any.
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown(_) => None,
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl<T: ToPrimitive> Reported<T> {
    /// Returns the status byte as it appears on the wire.
    pub fn raw(&self) -> u8 {
        match self {
            Self::Known(v) => v.to_u8().unwrap_or_default(),
            Self::Unknown(v) => *v,
        }
    }
}

impl<T: FromPrimitive> From<u8> for Reported<T> {
    fn from(v: u8) -> Self {
        match T::from_u8(v) {
            Some(known) => Self::Known(known),
            None => {
                debug!("unknown status byte: {v:#04x}");
                Self::Unknown(v)
            }
        }
    }
}

impl<T: Display> Display for Reported<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(v) => v.fmt(f),
            Self::Unknown(v) => write!(f, "Unknown ({v:#04x})"),
        }
    }
}

impl<T: std::error::Error> std::error::Error for Reported<T> {}
