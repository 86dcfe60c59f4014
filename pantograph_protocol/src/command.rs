//! # Commands
//!
//! Commands are [messages][crate::Message] with type `0x01`. The camera
//! acknowledges them (`4z`) and later reports completion (`5z`) on the same
//! socket, but carries no data back.
//!
//! Every numeric parameter is clamped into range when the command is built,
//! so building a command never fails.
//!
//! Command | Bytes after `81 01`
//! ------- | -------------------
//! [Interface clear][Command::InterfaceClear] | `00 01`
//! [Power][Command::Power] | `04 00 0p`
//! [Backlight][Command::Backlight] | `04 33 0p`
//! [Exposure mode][Command::ExposureMode] | `04 39 0p`
//! [Drive][Command::Drive] | `06 01 VV WW XX YY`
//! [Absolute position][Command::AbsolutePosition] | `06 02 VV WW 0Y 0Y 0Y 0Y 0Z 0Z 0Z 0Z`
//! [Relative position][Command::RelativePosition] | `06 03 VV WW 0Y 0Y 0Y 0Y 0Z 0Z 0Z 0Z`
//! [Home][Command::Home] | `06 04`
//! [Reset][Command::Reset] | `06 05`
use crate::{
    structs::{Direction, ExposureMode, PtzPosition, Switch, STOP_AXES},
    Error,
};
use binrw::binrw;

/// Slowest pan or tilt speed.
pub const MIN_SPEED: u8 = 0x01;
/// Fastest pan speed.
pub const MAX_PAN_SPEED: u8 = 18;
/// Fastest tilt speed.
pub const MAX_TILT_SPEED: u8 = 14;

#[inline]
fn clamp_speed(speed: i64, max: u8) -> u8 {
    speed.clamp(MIN_SPEED.into(), max.into()) as u8
}

/// Clamps a pan speed to `1..=18`.
pub fn pan_speed(speed: i64) -> u8 {
    clamp_speed(speed, MAX_PAN_SPEED)
}

/// Clamps a tilt speed to `1..=14`.
pub fn tilt_speed(speed: i64) -> u8 {
    clamp_speed(speed, MAX_TILT_SPEED)
}

/// Command payload, selected by the category and command bytes.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flushes the camera's command buffers (`IF_Clear`).
    #[brw(magic = b"\x00\x01")]
    InterfaceClear,

    #[brw(magic = b"\x04\x00")]
    Power(Switch),

    #[brw(magic = b"\x04\x33")]
    Backlight(Switch),

    #[brw(magic = b"\x04\x39")]
    ExposureMode(ExposureMode),

    /// Starts or stops continuous pan/tilt motion.
    #[brw(magic = b"\x06\x01")]
    Drive(PanTiltDrive),

    #[brw(magic = b"\x06\x02")]
    AbsolutePosition(PositionTarget),

    /// Moves by an offset from the current position.
    #[brw(magic = b"\x06\x03")]
    RelativePosition(PositionTarget),

    #[brw(magic = b"\x06\x04")]
    Home,

    /// Re-initialises the pan/tilt mechanism.
    #[brw(magic = b"\x06\x05")]
    Reset,
}

impl Command {
    /// Stops pan/tilt motion.
    pub const STOP: Self = Self::Drive(PanTiltDrive::STOP);

    /// Sets the exposure mode by index (`0..=3`, clamped).
    pub fn exposure_mode_index(index: i64) -> Self {
        Self::ExposureMode(ExposureMode::from_index(index))
    }

    /// Starts moving in `direction` until [stopped][Self::STOP].
    pub fn drive(direction: Direction, pan_speed: i64, tilt_speed: i64) -> Self {
        Self::Drive(PanTiltDrive::new(direction, pan_speed, tilt_speed))
    }

    /// Moves to `position`; or by `position` when `relative` is set.
    pub fn move_to(pan_speed: i64, tilt_speed: i64, position: PtzPosition, relative: bool) -> Self {
        let target = PositionTarget::new(pan_speed, tilt_speed, position);
        if relative {
            Self::RelativePosition(target)
        } else {
            Self::AbsolutePosition(target)
        }
    }

    /// Returns `true` if this command makes the pan/tilt head move.
    pub fn moves_head(&self) -> bool {
        use Command::*;
        match self {
            Drive(d) => d.direction.is_some(),
            AbsolutePosition(_) | RelativePosition(_) | Home | Reset => true,
            InterfaceClear | Power(_) | Backlight(_) | ExposureMode(_) => false,
        }
    }
}

/// Continuous pan/tilt drive.
///
/// ## Packet format
///
/// * `u8`: pan speed (`VV`)
/// * `u8`: tilt speed (`WW`)
/// * 2 bytes: pan and tilt axis [direction][Direction::axes], `03 03` when
///   stopping
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanTiltDrive {
    pub pan_speed: u8,
    pub tilt_speed: u8,

    /// Direction to move, or `None` to stop.
    #[br(try_map = |axes: [u8; 2]| if axes == STOP_AXES { Ok(None) } else { Direction::from_axes(axes).map(Some).ok_or(Error::ParameterOutOfRange) })]
    #[bw(map = |d: &Option<Direction>| d.map_or(STOP_AXES, |d| d.axes()))]
    pub direction: Option<Direction>,
}

impl PanTiltDrive {
    /// Stops both axes. The speed bytes are ignored by the camera, but are
    /// always sent as `01 01`.
    pub const STOP: Self = Self {
        pan_speed: MIN_SPEED,
        tilt_speed: MIN_SPEED,
        direction: None,
    };

    pub fn new(direction: Direction, pan_speed: i64, tilt_speed: i64) -> Self {
        Self {
            pan_speed: self::pan_speed(pan_speed),
            tilt_speed: self::tilt_speed(tilt_speed),
            direction: Some(direction),
        }
    }
}

/// Absolute or relative position target.
///
/// ## Packet format
///
/// * `u8`: pan speed (`VV`)
/// * `u8`: tilt speed (`WW`)
/// * 8 bytes: [position][PtzPosition]
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTarget {
    pub pan_speed: u8,
    pub tilt_speed: u8,
    pub position: PtzPosition,
}

impl PositionTarget {
    pub fn new(pan_speed: i64, tilt_speed: i64, position: PtzPosition) -> Self {
        Self {
            pan_speed: self::pan_speed(pan_speed),
            tilt_speed: self::tilt_speed(tilt_speed),
            position,
        }
    }
}
