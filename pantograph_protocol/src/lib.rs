#![doc = include_str!("../README.md")]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate tracing;

pub mod command;
pub mod coordinate;
mod error;
mod frame;
pub mod inquiry;
pub mod structs;

pub use crate::{
    error::Error,
    frame::{
        Cancel, DeviceError, Header, Message, Reply, ReplyMessage, Request, MAX_FRAME_LENGTH,
        TERMINATOR,
    },
};

/// Result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
