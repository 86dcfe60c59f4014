//! Textual camera actions.
//!
//! [`Action`] parses one line of text into a camera operation, for glue such
//! as a control socket or an interactive console. It adds no protocol logic:
//! [`ViscaController::execute`][crate::ViscaController::execute] maps each
//! action onto the matching controller method.
//!
//! Action | Syntax
//! ------ | ------
//! Power | `power on\|off`
//! Backlight | `backlight on\|off`
//! Exposure mode | `exposure <auto\|manual\|shutter\|iris\|0..3>`
//! Continuous move | `move <direction> [pan speed] [tilt speed]`
//! Stop | `stop`
//! Absolute position | `absolute <pan> <tilt> [pan speed] [tilt speed]`
//! Relative position | `relative <pan> <tilt> [pan speed] [tilt speed]`
//! Home | `home`
//! Reset | `reset`
//! Cancel | `cancel <socket>`
//! Interface clear | `clear`
//! Inquiry | `query <power\|focus\|wb\|exposure\|backlight\|video\|color\|version\|position>`
use crate::{
    protocol::{
        inquiry::{Inquiry, InquiryResponse},
        structs::{Direction, ExposureMode, PtzPosition, Switch},
        Error as ProtocolError,
    },
    Error, Result,
};
use std::{fmt::Display, str::FromStr};

/// Pan speed used when an action doesn't give one.
pub const DEFAULT_PAN_SPEED: i64 = 9;
/// Tilt speed used when an action doesn't give one.
pub const DEFAULT_TILT_SPEED: i64 = 7;

/// A camera operation, parsed from text.
///
/// Numbers are not range checked here: speeds, sockets and exposure mode
/// indexes are clamped when the request is built, and positions are clamped
/// to the range of an `i16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Power(bool),
    Backlight(bool),
    ExposureMode(ExposureMode),
    Move {
        direction: Direction,
        pan_speed: i64,
        tilt_speed: i64,
    },
    Stop,
    MoveTo {
        position: PtzPosition,
        pan_speed: i64,
        tilt_speed: i64,
        relative: bool,
    },
    Home,
    Reset,
    Cancel(i64),
    InterfaceClear,
    Query(Inquiry),
}

/// Result of an executed [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The camera accepted the command.
    Done,
    /// The camera answered the inquiry.
    Response(InquiryResponse),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done => f.write_str("ok"),
            Self::Response(r) => r.fmt(f),
        }
    }
}

fn parse_arg<T>(arg: &str) -> Result<T>
where
    T: FromStr<Err = ProtocolError>,
{
    arg.parse().map_err(|e| match e {
        ProtocolError::InvalidParameter(m) => Error::InvalidParameter(m),
        e => e.into(),
    })
}

fn parse_int(arg: &str) -> Result<i64> {
    arg.parse()
        .map_err(|_| Error::InvalidParameter(format!("expected a number, got {arg:?}")))
}

fn parse_switch(arg: &str) -> Result<bool> {
    Ok(parse_arg::<Switch>(arg)? == Switch::On)
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let Some((verb, args)) = words.split_first() else {
            return Err(Error::InvalidParameter("empty action".to_string()));
        };

        let verb = verb.to_ascii_lowercase();
        let arity = |min: usize, max: usize| {
            if (min..=max).contains(&args.len()) {
                Ok(())
            } else {
                Err(Error::InvalidParameter(format!(
                    "{verb} takes {min}..={max} arguments, got {}",
                    args.len()
                )))
            }
        };
        let speed = |i: usize, default: i64| args.get(i).map_or(Ok(default), |a| parse_int(a));

        Ok(match verb.as_str() {
            "power" => {
                arity(1, 1)?;
                Self::Power(parse_switch(args[0])?)
            }
            "backlight" => {
                arity(1, 1)?;
                Self::Backlight(parse_switch(args[0])?)
            }
            "exposure" => {
                arity(1, 1)?;
                Self::ExposureMode(parse_arg(args[0])?)
            }
            "move" => {
                arity(1, 3)?;
                Self::Move {
                    direction: parse_arg(args[0])?,
                    pan_speed: speed(1, DEFAULT_PAN_SPEED)?,
                    tilt_speed: speed(2, DEFAULT_TILT_SPEED)?,
                }
            }
            "absolute" | "relative" => {
                arity(2, 4)?;
                Self::MoveTo {
                    position: PtzPosition::clamped(parse_int(args[0])?, parse_int(args[1])?),
                    pan_speed: speed(2, DEFAULT_PAN_SPEED)?,
                    tilt_speed: speed(3, DEFAULT_TILT_SPEED)?,
                    relative: verb == "relative",
                }
            }
            "cancel" => {
                arity(1, 1)?;
                Self::Cancel(parse_int(args[0])?)
            }
            "query" => {
                arity(1, 1)?;
                Self::Query(parse_arg(args[0])?)
            }
            "stop" | "home" | "reset" | "clear" => {
                arity(0, 0)?;
                match verb.as_str() {
                    "stop" => Self::Stop,
                    "home" => Self::Home,
                    "reset" => Self::Reset,
                    _ => Self::InterfaceClear,
                }
            }
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "unknown action: {verb:?}"
                )))
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn simple() -> Result {
        assert_eq!(Action::Power(true), "power on".parse()?);
        assert_eq!(Action::Power(false), "POWER off".parse()?);
        assert_eq!(Action::Backlight(true), "backlight 1".parse()?);
        assert_eq!(Action::Stop, "stop".parse()?);
        assert_eq!(Action::Home, "  home ".parse()?);
        assert_eq!(Action::Reset, "reset".parse()?);
        assert_eq!(Action::InterfaceClear, "clear".parse()?);
        assert_eq!(Action::Cancel(5), "cancel 5".parse()?);
        assert_eq!(Action::Query(Inquiry::Position), "query position".parse()?);
        Ok(())
    }

    #[test]
    fn exposure() -> Result {
        assert_eq!(
            Action::ExposureMode(ExposureMode::IrisPriority),
            "exposure iris".parse()?
        );
        assert_eq!(
            Action::ExposureMode(ExposureMode::FullAuto),
            "exposure -1".parse()?
        );
        Ok(())
    }

    #[test]
    fn motion() -> Result {
        assert_eq!(
            Action::Move {
                direction: Direction::UpLeft,
                pan_speed: 8,
                tilt_speed: 4
            },
            "move up-left 8 4".parse()?
        );
        assert_eq!(
            Action::Move {
                direction: Direction::Down,
                pan_speed: DEFAULT_PAN_SPEED,
                tilt_speed: DEFAULT_TILT_SPEED
            },
            "move down".parse()?
        );
        assert_eq!(
            Action::MoveTo {
                position: PtzPosition::new(-100, 50),
                pan_speed: 30,
                tilt_speed: DEFAULT_TILT_SPEED,
                relative: false,
            },
            "absolute -100 50 30".parse()?
        );
        assert_eq!(
            Action::MoveTo {
                position: PtzPosition::new(i16::MIN, 0),
                pan_speed: DEFAULT_PAN_SPEED,
                tilt_speed: DEFAULT_TILT_SPEED,
                relative: true,
            },
            "relative -99999 0".parse()?
        );
        Ok(())
    }

    #[test]
    fn invalid() {
        for s in [
            "",
            "dance",
            "power",
            "power dim",
            "move sideways",
            "move up fast",
            "absolute 1",
            "absolute one two",
            "cancel x",
            "query zoom",
            "stop now",
        ] {
            assert!(
                matches!(s.parse::<Action>(), Err(Error::InvalidParameter(_))),
                "{s:?}"
            );
        }
    }
}
