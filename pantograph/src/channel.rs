//! Byte stream framing for VISCA over a serial link.
//!
//! Serial reads return arbitrary chunks: a single reply can be split across
//! reads, and one read can carry several replies. [`ViscaCodec`] turns the
//! stream into whole frames by splitting on the [terminator][TERMINATOR].
use crate::{
    protocol::{structs::Reported, DeviceError, Request, MAX_FRAME_LENGTH, TERMINATOR},
    Error, Result,
};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Channel level events, published by
/// [`ViscaController::channel_events`][crate::ViscaController::channel_events].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The session has started on the transport.
    ///
    /// This is sent once, when the session task starts, so it is usually
    /// missed by receivers from
    /// [`channel_events()`][crate::ViscaController::channel_events].
    Opened,
    /// The transport reached end of stream, or the session stopped.
    Closed,
    /// The transport failed.
    Error(String),
    /// The camera reported an error which no pending inquiry was waiting for.
    DeviceError {
        socket: u8,
        error: Reported<DeviceError>,
    },
}

/// Splits a byte stream into frames, and writes [`Request`]s.
///
/// Decoded frames include their terminator, and are not otherwise checked.
/// Runs of more than [`MAX_FRAME_LENGTH`] bytes without a terminator are
/// discarded as line noise.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViscaCodec;

impl Decoder for ViscaCodec {
    type Item = BytesMut;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let Some(end) = src.iter().position(|&b| b == TERMINATOR) else {
                if src.len() > MAX_FRAME_LENGTH {
                    warn!(
                        "discarding {} bytes without terminator: {}",
                        src.len(),
                        hex::encode_upper(&src[..])
                    );
                    src.clear();
                }
                return Ok(None);
            };

            let frame = src.split_to(end + 1);
            if frame.len() > MAX_FRAME_LENGTH {
                warn!("discarding overlong frame: {}", hex::encode_upper(&frame));
                continue;
            }

            return Ok(Some(frame));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let frame = self.decode(src)?;
        if frame.is_none() && !src.is_empty() {
            warn!(
                "discarding {} bytes at end of stream: {}",
                src.len(),
                hex::encode_upper(&src[..])
            );
            src.clear();
        }
        Ok(frame)
    }
}

impl<'a> Encoder<&'a Request> for ViscaCodec {
    type Error = Error;

    fn encode(&mut self, item: &'a Request, dst: &mut BytesMut) -> Result {
        let b = item.to_bytes()?;
        dst.reserve(b.len());
        dst.put_slice(&b);
        Ok(())
    }
}
