use crate::coordinate::{decode_coordinate, encode_coordinate};
use binrw::binrw;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Pan/tilt position, in device units.
///
/// Ranges are model specific; an EVI-D70 pans about `-2224..=2216` and tilts
/// about `-400..=1200`. Values are passed to the camera as-is.
///
/// ## Packet format
///
/// * 4 bytes: pan, [nibble encoded][crate::coordinate]
/// * 4 bytes: tilt, [nibble encoded][crate::coordinate]
#[binrw]
#[brw(big)]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PtzPosition {
    #[br(map = decode_coordinate)]
    #[bw(map = |v: &i16| encode_coordinate(*v))]
    pub pan: i16,
    #[br(map = decode_coordinate)]
    #[bw(map = |v: &i16| encode_coordinate(*v))]
    pub tilt: i16,
}

impl PtzPosition {
    /// The home position.
    pub const HOME: Self = Self { pan: 0, tilt: 0 };

    pub const fn new(pan: i16, tilt: i16) -> Self {
        Self { pan, tilt }
    }

    /// Creates a position from arbitrary integers, saturating each axis to the
    /// range of an `i16`.
    pub fn clamped(pan: i64, tilt: i64) -> Self {
        let sat = |v: i64| v.clamp(i16::MIN.into(), i16::MAX.into()) as i16;
        Self {
            pan: sat(pan),
            tilt: sat(tilt),
        }
    }
}

impl Display for PtzPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pan={}, tilt={}", self.pan, self.tilt)
    }
}
