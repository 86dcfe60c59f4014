use crate::protocol::{structs::Reported, DeviceError};
use std::io::Error as IoError;
use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    IoError(#[from] IoError),

    #[error(transparent)]
    Protocol(#[from] crate::protocol::Error),

    #[error("data parse error: {0}")]
    BinRwError(#[from] binrw::Error),

    #[error("channel unavailable, likely dropped")]
    ChannelUnavailable,

    #[error("timeout waiting for response")]
    Timeout,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("unexpected state")]
    UnexpectedState,

    #[error("transport write failed: {0}")]
    TransportWriteFailure(#[source] IoError),

    #[error("transport closed")]
    TransportClosed,

    #[error("transport error: {0}")]
    TransportError(#[source] IoError),

    #[error("camera reported {0}")]
    Device(#[from] Reported<DeviceError>),
}
