//! Non-frame structures and enumerations.
//!
//! These are the values carried inside command and inquiry reply frames.
mod direction;
mod exposure;
mod position;
mod reported;
mod socket;
mod status;
mod version;
mod video_format;

pub use self::{
    direction::Direction,
    exposure::ExposureMode,
    position::PtzPosition,
    reported::Reported,
    socket::Socket,
    status::{FocusMode, PowerState, Switch, WhiteBalance},
    version::VersionInfo,
    video_format::{ColorFormat, VideoFormat},
};

pub(crate) use self::direction::STOP_AXES;
