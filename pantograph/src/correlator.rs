//! Request/reply correlation over a half-duplex VISCA link.
//!
//! The camera sends every reply on one stream, and inquiry replies carry no
//! reference to the inquiry they answer. The only way to tell which reply
//! belongs to which inquiry is to have one inquiry outstanding at a time, so
//! [`Correlator`] writes requests strictly in submission order, and holds
//! further requests until the reply (or timeout) for an inquiry.
use crate::{
    channel::{ChannelEvent, ViscaCodec},
    protocol::{Message, Reply, ReplyMessage, Request},
    Error, Result,
};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    select,
    sync::{broadcast, mpsc, oneshot},
    time::{sleep_until, Instant},
};
use tokio_util::codec::Framed;

/// A request waiting to be written.
pub(crate) struct Submission {
    pub request: Request,
    /// Receives `None` once a command has been written, or the reply data for
    /// an inquiry.
    pub responder: oneshot::Sender<Result<Option<Vec<u8>>>>,
}

/// An inquiry which has been written, and is waiting for its reply.
struct PendingInquiry {
    request: Request,
    responder: oneshot::Sender<Result<Option<Vec<u8>>>>,
    deadline: Instant,
    /// Length of reply data this inquiry expects.
    reply_length: usize,
}

enum CorrelatorState {
    /// Nothing in flight; the next submission can be taken.
    Idle,
    /// A request is being written to the transport.
    AwaitingTransportAck,
    /// An inquiry has been written, and the next inquiry reply belongs to it.
    AwaitingReply(PendingInquiry),
}

/// Owns the transport, and runs its own event loop ([`Correlator::run()`]).
pub(crate) struct Correlator<T> {
    framed: Framed<T, ViscaCodec>,
    address: u8,
    inquiry_timeout: Duration,
    cmd_rx: mpsc::Receiver<Submission>,
    event_tx: broadcast::Sender<ChannelEvent>,
    state: CorrelatorState,
}

impl<T> Correlator<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        io: T,
        address: u8,
        inquiry_timeout: Duration,
        cmd_rx: mpsc::Receiver<Submission>,
        event_tx: broadcast::Sender<ChannelEvent>,
    ) -> Self {
        Self {
            framed: Framed::new(io, ViscaCodec),
            address,
            inquiry_timeout,
            cmd_rx,
            event_tx,
            state: CorrelatorState::Idle,
        }
    }

    fn emit(&self, event: ChannelEvent) {
        // It doesn't matter whether anyone is listening
        let _ = self.event_tx.send(event);
    }

    /// Runs until the transport closes or fails, or every controller handle
    /// has been dropped.
    ///
    /// On exit, the pending inquiry and every queued submission are rejected.
    pub async fn run(mut self) -> Result {
        self.emit(ChannelEvent::Opened);
        let r = self.main_loop().await;

        let reason = match &r {
            Err(Error::TransportError(e)) => {
                error!("transport error: {e}");
                self.emit(ChannelEvent::Error(e.to_string()));
                Error::TransportError(std::io::Error::new(e.kind(), e.to_string()))
            }
            Err(e) => {
                error!("correlator stopped: {e}");
                self.emit(ChannelEvent::Error(e.to_string()));
                Error::TransportClosed
            }
            Ok(()) => Error::TransportClosed,
        };

        if let CorrelatorState::AwaitingReply(pending) =
            std::mem::replace(&mut self.state, CorrelatorState::Idle)
        {
            debug!("rejecting pending inquiry {}", pending.request);
            let _ = pending.responder.send(Err(reason));
        }

        self.cmd_rx.close();
        while let Ok(sub) = self.cmd_rx.try_recv() {
            debug!("rejecting queued request {}", sub.request);
            let _ = sub.responder.send(Err(Error::TransportClosed));
        }

        self.emit(ChannelEvent::Closed);
        info!("session closed");
        r
    }

    fn deadline(&self) -> Option<Instant> {
        match &self.state {
            CorrelatorState::AwaitingReply(pending) => Some(pending.deadline),
            _ => None,
        }
    }

    async fn main_loop(&mut self) -> Result {
        loop {
            let idle = matches!(self.state, CorrelatorState::Idle);
            let deadline = self.deadline();

            select! {
                // Only take a new request when nothing is in flight
                sub = self.cmd_rx.recv(), if idle => {
                    let Some(sub) = sub else {
                        debug!("all controllers dropped");
                        return Ok(());
                    };
                    self.handle_submission(sub).await;
                }

                frame = self.framed.next() => {
                    match frame {
                        Some(Ok(frame)) => self.handle_frame(&frame),
                        Some(Err(Error::IoError(e))) => return Err(Error::TransportError(e)),
                        Some(Err(e)) => return Err(e),
                        None => {
                            info!("transport reached end of stream");
                            return Ok(());
                        }
                    }
                }

                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_timeout();
                }
            }
        }
    }

    async fn handle_submission(&mut self, sub: Submission) {
        let Submission { request, responder } = sub;
        self.state = CorrelatorState::AwaitingTransportAck;
        trace!(">>> {request}");

        if let Err(e) = self.framed.send(&request).await {
            // Unwritten bytes of a rejected request must not go out with the
            // next one.
            self.framed.write_buffer_mut().clear();
            self.state = CorrelatorState::Idle;
            let e = match e {
                Error::IoError(e) => Error::TransportWriteFailure(e),
                e => e,
            };
            error!("could not write {request}: {e}");
            self.emit(ChannelEvent::Error(e.to_string()));
            let _ = responder.send(Err(e));
            return;
        }

        let reply_length = match &request.message {
            Message::Inquiry(inquiry) => Some(inquiry.reply_length()),
            _ => None,
        };

        if let Some(reply_length) = reply_length {
            self.state = CorrelatorState::AwaitingReply(PendingInquiry {
                request,
                responder,
                deadline: Instant::now() + self.inquiry_timeout,
                reply_length,
            });
        } else {
            self.state = CorrelatorState::Idle;
            if responder.send(Ok(None)).is_err() {
                debug!("caller went away before {request} was written");
            }
        }
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        trace!("<<< {}", hex::encode_upper(frame));
        let reply = match Reply::from_bytes(frame) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("dropping unparseable frame {}: {e}", hex::encode_upper(frame));
                return;
            }
        };

        if reply.header.source() != self.address {
            warn!(
                "dropping reply from camera {}, expected {}",
                reply.header.source(),
                self.address
            );
            return;
        }

        let expected = match &self.state {
            CorrelatorState::AwaitingReply(pending) => Some(pending.reply_length),
            _ => None,
        };
        let awaiting = expected.is_some();
        let result = match reply.message {
            ReplyMessage::Completion { socket: 0, data } if awaiting && !data.is_empty() => {
                if Some(data.len()) != expected {
                    // Most likely a late reply to an inquiry which timed out
                    warn!(
                        "dropping {} byte inquiry reply, expected {}",
                        data.len(),
                        expected.unwrap_or_default()
                    );
                    return;
                }
                Ok(Some(data))
            }

            ReplyMessage::Error { socket: 0, error } if awaiting => Err(Error::Device(error)),

            ReplyMessage::Error { socket, error } => {
                warn!("camera reported {error} on socket {socket}");
                self.emit(ChannelEvent::DeviceError { socket, error });
                return;
            }

            message => {
                debug!("skipping {message:?}");
                return;
            }
        };

        let CorrelatorState::AwaitingReply(pending) =
            std::mem::replace(&mut self.state, CorrelatorState::Idle)
        else {
            // Checked above
            return;
        };

        if let Err(e) = &result {
            warn!("{} failed: {e}", pending.request);
        }

        if pending.responder.send(result).is_err() {
            debug!("caller went away before reply to {}", pending.request);
        }
    }

    fn handle_timeout(&mut self) {
        if let CorrelatorState::AwaitingReply(pending) =
            std::mem::replace(&mut self.state, CorrelatorState::Idle)
        {
            warn!(
                "no reply to {} within {:?}",
                pending.request, self.inquiry_timeout
            );
            let _ = pending.responder.send(Err(Error::Timeout));
        }
    }
}
