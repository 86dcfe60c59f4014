use crate::Error;
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Direction of continuous pan/tilt motion.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

/// Pan then tilt axis bytes, for stopping both axes.
pub(crate) const STOP_AXES: [u8; 2] = [0x03, 0x03];

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    /// Pan and tilt axis bytes for this direction.
    ///
    /// Pan: `01` left, `02` right, `03` stop.
    /// Tilt: `01` up, `02` down, `03` stop.
    pub const fn axes(&self) -> [u8; 2] {
        match self {
            Self::Up => [0x03, 0x01],
            Self::Down => [0x03, 0x02],
            Self::Left => [0x01, 0x03],
            Self::Right => [0x02, 0x03],
            Self::UpLeft => [0x01, 0x01],
            Self::UpRight => [0x02, 0x01],
            Self::DownLeft => [0x01, 0x02],
            Self::DownRight => [0x02, 0x02],
        }
    }

    /// Reverses [`Direction::axes`]. Returns `None` for [`STOP_AXES`] or
    /// anything invalid.
    pub fn from_axes(axes: [u8; 2]) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.axes() == axes)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::UpLeft => "up-left",
            Self::UpRight => "up-right",
            Self::DownLeft => "down-left",
            Self::DownRight => "down-right",
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        Ok(match normalised.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "upleft" => Self::UpLeft,
            "upright" => Self::UpRight,
            "downleft" => Self::DownLeft,
            "downright" => Self::DownRight,
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "unknown direction: {s:?}"
                )))
            }
        })
    }
}
