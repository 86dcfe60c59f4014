use crate::{
    command::Command,
    inquiry::Inquiry,
    structs::{Reported, Socket},
    Error, Result,
};
use binrw::{binrw, BinRead, BinWrite};
use modular_bitfield::{bitfield, specifiers::B3};
use num_traits::FromPrimitive;
use std::{
    fmt::Display,
    io::{Cursor, Seek, SeekFrom},
};

/// Terminates every frame in both directions.
pub const TERMINATOR: u8 = 0xff;

/// Largest frame the protocol allows, including header and terminator.
pub const MAX_FRAME_LENGTH: usize = 16;

/// Frame address header.
///
/// ## Format
///
/// This is a `u8` bitfield. Fields from LSB to MSB:
///
/// * `u3 0x07`: destination address
/// * `bit 0x08`: broadcast
/// * `u3 0x70`: source address
/// * `bit 0x80`: marker, always set
///
/// A controller talking to camera 1 sends `0x81`; camera 1 replies with `0x90`.
#[bitfield(bits = 8)]
#[repr(u8)]
#[derive(BinRead, BinWrite, Debug, Default, PartialEq, Eq, Clone, Copy)]
#[brw(big)]
#[br(map = From::<u8>::from)]
#[bw(map = |&x| Into::<u8>::into(x))]
pub struct Header {
    pub destination: B3,
    pub broadcast: bool,
    pub source: B3,
    pub marker: bool,
}

impl Header {
    /// Header for a request from the controller (address 0) to camera
    /// `destination` (`1..=7`).
    pub fn request(destination: u8) -> Result<Self> {
        if destination == 0 {
            return Err(Error::ParameterOutOfRange);
        }

        Self::new()
            .with_marker(true)
            .with_destination_checked(destination)
            .map_err(|_| Error::ParameterOutOfRange)
    }

    /// Header for a reply from camera `source` (`1..=7`) to the controller.
    pub fn reply(source: u8) -> Result<Self> {
        if source == 0 {
            return Err(Error::ParameterOutOfRange);
        }

        Self::new()
            .with_marker(true)
            .with_source_checked(source)
            .map_err(|_| Error::ParameterOutOfRange)
    }
}

/// Request frame, from the controller to a camera.
///
/// ## Packet format
///
/// * `u8`: [header][Header]
/// * [message][Message]: category byte and payload
/// * `u8`: [`TERMINATOR`]
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    #[br(assert(header.marker() && header.source() == 0))]
    pub header: Header,
    pub message: Message,
    #[br(temp, assert(terminator == TERMINATOR))]
    #[bw(calc = TERMINATOR)]
    terminator: u8,
}

impl Request {
    /// Addresses `message` to camera `address`.
    pub fn new(address: u8, message: impl Into<Message>) -> Result<Self> {
        Ok(Self {
            header: Header::request(address)?,
            message: message.into(),
        })
    }

    /// Returns `true` if this request expects an inquiry reply.
    #[inline]
    pub fn is_inquiry(&self) -> bool {
        self.message.is_inquiry()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(MAX_FRAME_LENGTH));
        self.write(&mut out)?;
        Ok(out.into_inner())
    }

    /// Parses a complete request frame, including its terminator.
    pub fn from_bytes(frame: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(frame))?)
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_bytes() {
            Ok(b) => f.write_str(&hex::encode_upper(b)),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// Request payload, selected by the message type byte.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    #[brw(magic = 0x01u8)]
    Command(Command),
    #[brw(magic = 0x09u8)]
    Inquiry(Inquiry),
    Cancel(Cancel),
}

impl Message {
    #[inline]
    pub fn is_inquiry(&self) -> bool {
        matches!(self, Self::Inquiry(_))
    }
}

impl From<Command> for Message {
    fn from(c: Command) -> Self {
        Self::Command(c)
    }
}

impl From<Inquiry> for Message {
    fn from(i: Inquiry) -> Self {
        Self::Inquiry(i)
    }
}

impl From<Cancel> for Message {
    fn from(c: Cancel) -> Self {
        Self::Cancel(c)
    }
}

/// Cancels the command running in a socket (`2p`).
///
/// This asks the camera to abandon a command; it does not affect anything
/// waiting locally.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancel {
    #[br(try_map = |v: u8| if v & 0xf0 == 0x20 { Socket::from_u8(v & 0x0f).ok_or(Error::ParameterOutOfRange) } else { Err(Error::UnexpectedState) })]
    #[bw(map = |s: &Socket| 0x20 | *s as u8)]
    pub socket: Socket,
}

impl Cancel {
    /// Cancels `socket`, clamped to `1..=2`.
    pub fn clamped(socket: i64) -> Self {
        Self {
            socket: Socket::clamped(socket),
        }
    }
}

/// Errors reported by the camera in an error reply (`6z`).
///
/// Error replies carry this as a [`Reported`] value, so that codes outside
/// this table still reach the caller.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum DeviceError {
    MessageLength = 0x01,
    Syntax = 0x02,
    CommandBufferFull = 0x03,
    CommandCancelled = 0x04,
    NoSocket = 0x05,
    CommandNotExecutable = 0x41,
}

impl Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MessageLength => "message length error",
            Self::Syntax => "syntax error",
            Self::CommandBufferFull => "command buffer full",
            Self::CommandCancelled => "command cancelled",
            Self::NoSocket => "no socket",
            Self::CommandNotExecutable => "command not executable",
        })
    }
}

impl std::error::Error for DeviceError {}

/// Reply frame, from a camera to the controller.
///
/// ## Packet format
///
/// * `u8`: [header][Header]
/// * `u8`: reply type (high nibble) and socket (low nibble)
/// * [message][ReplyMessage]: type specific payload, may be empty
/// * `u8`: [`TERMINATOR`]
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    #[br(assert(header.marker() && header.destination() == 0 && header.source() != 0))]
    pub header: Header,

    #[br(temp)]
    #[bw(calc = message.code())]
    code: u8,

    #[br(args(code))]
    pub message: ReplyMessage,

    #[br(temp, assert(terminator == TERMINATOR))]
    #[bw(calc = TERMINATOR)]
    terminator: u8,
}

impl Reply {
    /// Reply from camera `source`.
    pub fn new(source: u8, message: ReplyMessage) -> Result<Self> {
        Ok(Self {
            header: Header::reply(source)?,
            message,
        })
    }

    /// Parses a complete reply frame, including its terminator.
    pub fn from_bytes(frame: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(frame))?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(MAX_FRAME_LENGTH));
        self.write(&mut out)?;
        Ok(out.into_inner())
    }
}

/// Reply payload.
///
/// The `socket` of each variant comes from the reply type byte.
#[binrw]
#[brw(big)]
#[br(import(code: u8))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMessage {
    /// Command accepted into `socket` (`4z`).
    #[br(pre_assert(code >> 4 == 0x4))]
    Ack {
        #[br(calc = code & 0x0f)]
        #[bw(ignore)]
        socket: u8,
    },

    /// Command in `socket` completed (`5z`).
    ///
    /// Inquiry replies are completions on socket 0, and carry `data`.
    #[br(pre_assert(code >> 4 == 0x5))]
    Completion {
        #[br(calc = code & 0x0f)]
        #[bw(ignore)]
        socket: u8,
        #[br(parse_with = read_reply_data)]
        data: Vec<u8>,
    },

    /// Command in `socket` failed (`6z`).
    #[br(pre_assert(code >> 4 == 0x6))]
    Error {
        #[br(calc = code & 0x0f)]
        #[bw(ignore)]
        socket: u8,
        #[br(map = |v: u8| Reported::from(v))]
        #[bw(map = |e: &Reported<DeviceError>| e.raw())]
        error: Reported<DeviceError>,
    },
}

impl ReplyMessage {
    const fn code(&self) -> u8 {
        match self {
            Self::Ack { socket } => 0x40 | (*socket & 0x0f),
            Self::Completion { socket, .. } => 0x50 | (*socket & 0x0f),
            Self::Error { socket, .. } => 0x60 | (*socket & 0x0f),
        }
    }

    pub const fn socket(&self) -> u8 {
        match self {
            Self::Ack { socket }
            | Self::Completion { socket, .. }
            | Self::Error { socket, .. } => *socket,
        }
    }

    /// Returns the inquiry reply data, if this is a completion on socket 0.
    pub fn inquiry_data(&self) -> Option<&[u8]> {
        match self {
            Self::Completion { socket: 0, data } if !data.is_empty() => Some(data.as_slice()),
            _ => None,
        }
    }
}

/// Reads reply data up to (but not including) the terminator.
#[binrw::parser(reader, endian)]
fn read_reply_data() -> binrw::BinResult<Vec<u8>> {
    let mut data = Vec::new();
    loop {
        let b = u8::read_options(reader, endian, ())?;
        if b == TERMINATOR {
            reader.seek(SeekFrom::Current(-1))?;
            return Ok(data);
        }
        if data.len() >= MAX_FRAME_LENGTH {
            return Err(binrw::Error::AssertFail {
                pos: reader.stream_position()?,
                message: "reply data too long".to_string(),
            });
        }
        data.push(b);
    }
}
