use crate::protocol::{
    command::Command,
    inquiry::InquiryResponse,
    structs::{
        ColorFormat, ExposureMode, FocusMode, PowerState, PtzPosition, Reported, Switch,
        VersionInfo, VideoFormat, WhiteBalance,
    },
};
use std::fmt::Display;

bitflags! {
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct StateUpdate: u32 {
        const POWER         = 1;
        const BACKLIGHT     = 1 << 1;
        const FOCUS_MODE    = 1 << 2;
        const WHITE_BALANCE = 1 << 3;
        const EXPOSURE_MODE = 1 << 4;
        const VIDEO_FORMAT  = 1 << 5;
        const COLOR_FORMAT  = 1 << 6;
        /// The position was read, or the head was told to move and the last
        /// read position is no longer valid.
        const POSITION      = 1 << 7;
        const VERSION       = 1 << 8;
    }
}

/// [CameraState] stores the last known state of the camera, from inquiries
/// and commands sent by a [ViscaController].
///
/// Fields are `None` until they are first learned.
///
/// [ViscaController]: crate::controller::ViscaController
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct CameraState {
    pub power: Option<Reported<PowerState>>,
    pub backlight: Option<Reported<Switch>>,
    pub focus_mode: Option<Reported<FocusMode>>,
    pub white_balance: Option<Reported<WhiteBalance>>,
    pub exposure_mode: Option<Reported<ExposureMode>>,
    pub video_format: Option<Reported<VideoFormat>>,
    pub color_format: Option<Reported<ColorFormat>>,
    /// Last read pan/tilt position. Cleared when the head is told to move.
    pub position: Option<PtzPosition>,
    pub version: Option<VersionInfo>,
}

/// Replaces `field` with `value`, returning `flag` if it changed.
fn set<T: PartialEq>(field: &mut Option<T>, value: Option<T>, flag: StateUpdate) -> StateUpdate {
    if *field == value {
        StateUpdate::empty()
    } else {
        *field = value;
        flag
    }
}

impl CameraState {
    /// Updates state after the camera accepted `cmd`.
    pub fn apply_command(&mut self, cmd: &Command) -> StateUpdate {
        trace!("applying {cmd:?}");
        match cmd {
            Command::Power(s) => set(
                &mut self.power,
                Some(Reported::Known(PowerState::from(*s))),
                StateUpdate::POWER,
            ),
            Command::Backlight(s) => set(
                &mut self.backlight,
                Some(Reported::Known(*s)),
                StateUpdate::BACKLIGHT,
            ),
            Command::ExposureMode(m) => set(
                &mut self.exposure_mode,
                Some(Reported::Known(*m)),
                StateUpdate::EXPOSURE_MODE,
            ),
            c if c.moves_head() => set(&mut self.position, None, StateUpdate::POSITION),
            _ => StateUpdate::empty(),
        }
    }

    /// Updates state from a decoded inquiry reply.
    pub fn apply_response(&mut self, resp: &InquiryResponse) -> StateUpdate {
        use InquiryResponse as R;
        match *resp {
            R::Power(v) => set(&mut self.power, Some(v), StateUpdate::POWER),
            R::FocusMode(v) => set(&mut self.focus_mode, Some(v), StateUpdate::FOCUS_MODE),
            R::WhiteBalance(v) => set(&mut self.white_balance, Some(v), StateUpdate::WHITE_BALANCE),
            R::ExposureMode(v) => set(&mut self.exposure_mode, Some(v), StateUpdate::EXPOSURE_MODE),
            R::Backlight(v) => set(&mut self.backlight, Some(v), StateUpdate::BACKLIGHT),
            R::VideoFormat(v) => set(&mut self.video_format, Some(v), StateUpdate::VIDEO_FORMAT),
            R::ColorFormat(v) => set(&mut self.color_format, Some(v), StateUpdate::COLOR_FORMAT),
            R::Version(v) => set(&mut self.version, Some(v), StateUpdate::VERSION),
            R::Position(v) => set(&mut self.position, Some(v), StateUpdate::POSITION),
        }
    }
}

struct Field<'a, T>(&'a Option<T>);

impl<T: Display> Display for Field<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("?"),
        }
    }
}

impl Display for CameraState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Power: {}", Field(&self.power))?;
        writeln!(f, "Backlight: {}", Field(&self.backlight))?;
        writeln!(f, "Focus: {}", Field(&self.focus_mode))?;
        writeln!(f, "White balance: {}", Field(&self.white_balance))?;
        writeln!(f, "Exposure: {}", Field(&self.exposure_mode))?;
        writeln!(f, "Video format: {}", Field(&self.video_format))?;
        writeln!(f, "Color format: {}", Field(&self.color_format))?;
        writeln!(f, "Position: {}", Field(&self.position))?;
        write!(f, "Version: {}", Field(&self.version))
    }
}
