#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Command socket (buffer) on the camera.
///
/// Cameras hold up to two commands in progress; each is tracked by the socket
/// number returned in its ACK.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Socket {
    One = 1,
    Two = 2,
}

impl Socket {
    /// Picks a socket, clamping `socket` to `1..=2`.
    pub fn clamped(socket: i64) -> Self {
        if socket >= 2 {
            Self::Two
        } else {
            Self::One
        }
    }
}
