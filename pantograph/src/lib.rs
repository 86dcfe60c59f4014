#![doc = include_str!("../README.md")]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate tracing;

pub mod action;
mod channel;
pub mod config;
mod controller;
mod correlator;
mod error;
mod state;

pub use {
    crate::{
        action::{Action, Outcome},
        channel::{ChannelEvent, ViscaCodec},
        config::ViscaConfig,
        controller::ViscaController,
        error::Error,
        state::{CameraState, StateUpdate},
    },
    pantograph_protocol as protocol,
};
pub type Result<T = ()> = std::result::Result<T, Error>;
