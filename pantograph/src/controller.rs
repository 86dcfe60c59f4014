use crate::{
    action::{Action, Outcome},
    channel::ChannelEvent,
    config::ViscaConfig,
    correlator::{Correlator, Submission},
    error::Error,
    protocol::{
        command::Command,
        inquiry::{Inquiry, InquiryResponse},
        structs::{
            ColorFormat, Direction, ExposureMode, FocusMode, PowerState, PtzPosition, Reported,
            Switch, VersionInfo, VideoFormat, WhiteBalance,
        },
        Cancel, Message, Request,
    },
    state::{CameraState, StateUpdate},
    Result,
};
use concread::cowcell::asynch::{CowCell, CowCellReadTxn};
use std::sync::Arc;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, ToSocketAddrs},
    sync::{
        broadcast::{self, Receiver},
        mpsc::{self, Sender},
        oneshot,
    },
};

/// [ViscaController] runs a session with a single VISCA camera, and keeps
/// state.
///
/// ## General design
///
/// The transport is owned by a correlator task, which writes requests one at
/// a time in the order they were submitted. Commands resolve once they have
/// been written; inquiries resolve when the camera replies, or fail with
/// [`Error::Timeout`] after [`ViscaConfig::inquiry_timeout`].
///
/// Successful commands and inquiries update a [CameraState] snapshot, which
/// can be read with [`get_state()`][Self::get_state] or followed with
/// [`state_update_events()`][Self::state_update_events].
///
/// Dropping the controller stops the correlator task and closes the
/// transport.
pub struct ViscaController {
    address: u8,
    cmd_tx: Sender<Submission>,

    /// State associated with the connection.
    state: Arc<CowCell<CameraState>>,
    state_tx: broadcast::Sender<(CowCellReadTxn<CameraState>, StateUpdate)>,
    state_rx: Receiver<(CowCellReadTxn<CameraState>, StateUpdate)>,
    event_rx: Receiver<ChannelEvent>,
}

impl ViscaController {
    /// Depth of the state and channel event broadcast buffers.
    const EVENT_CHANNEL_SIZE: usize = 16;

    /// Starts a session with a camera over `io`.
    ///
    /// This must be called from within a tokio runtime.
    ///
    /// ## Errors
    ///
    /// * [`Error::ParameterOutOfRange`] if `config` is invalid.
    pub fn new<T>(io: T, config: ViscaConfig) -> Result<Self>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        config.validate()?;
        let (cmd_tx, cmd_rx) = mpsc::channel(config.queue_depth);
        let (event_tx, event_rx) = broadcast::channel(Self::EVENT_CHANNEL_SIZE);
        let (state_tx, state_rx) = broadcast::channel(Self::EVENT_CHANNEL_SIZE);

        let correlator = Correlator::new(
            io,
            config.address,
            config.inquiry_timeout,
            cmd_rx,
            event_tx,
        );

        debug!("Spawning correlator task...");
        tokio::task::spawn(async move {
            if let Err(e) = correlator.run().await {
                debug!("correlator task finished: {e}");
            }
        });

        Ok(Self {
            address: config.address,
            cmd_tx,
            state: Arc::new(CowCell::new(CameraState::default())),
            state_tx,
            state_rx,
            event_rx,
        })
    }

    /// Connects to a camera through a TCP serial bridge.
    pub async fn connect_tcp<A: ToSocketAddrs>(addr: A, config: ViscaConfig) -> Result<Self> {
        config.validate()?;
        info!("Connecting to serial bridge...");
        let sock = TcpStream::connect(addr).await?;
        sock.set_nodelay(true)?;
        info!("Connected to {}", sock.peer_addr()?);
        Self::new(sock, config)
    }

    /// Submits a request, and waits for it to be written (commands) or
    /// answered (inquiries).
    async fn send(&self, message: impl Into<Message>) -> Result<Option<Vec<u8>>> {
        let request = Request::new(self.address, message)?;
        // https://tokio.rs/tokio/tutorial/channels#receive-responses
        let (responder, resp_rx) = oneshot::channel();
        self.cmd_tx
            .send(Submission { request, responder })
            .await
            .map_err(|_| Error::TransportClosed)?;
        resp_rx.await.map_err(|_| Error::ChannelUnavailable)?
    }

    async fn update_state(&self, f: impl FnOnce(&mut CameraState) -> StateUpdate) {
        let mut w = self.state.write().await;
        let updated_fields = f(&mut w);
        if updated_fields.is_empty() {
            return;
        }

        w.commit().await;
        // It doesn't matter whether this actually succeeds
        let _ = self.state_tx.send((self.state.read().await, updated_fields));
    }

    /// Sends a command, and waits for it to be written.
    pub async fn command(&self, cmd: Command) -> Result {
        self.send(cmd).await?;
        self.update_state(|s| s.apply_command(&cmd)).await;
        Ok(())
    }

    /// Sends an inquiry, and waits for the camera's reply.
    pub async fn inquire(&self, inquiry: Inquiry) -> Result<InquiryResponse> {
        let data = self.send(inquiry).await?.ok_or(Error::UnexpectedState)?;
        let resp = inquiry.decode(&data)?;
        debug!("{resp}");
        self.update_state(|s| s.apply_response(&resp)).await;
        Ok(resp)
    }

    pub async fn power(&self, on: bool) -> Result {
        self.command(Command::Power(on.into())).await
    }

    pub async fn backlight(&self, on: bool) -> Result {
        self.command(Command::Backlight(on.into())).await
    }

    pub async fn set_exposure_mode(&self, mode: ExposureMode) -> Result {
        self.command(Command::ExposureMode(mode)).await
    }

    /// Sets the exposure mode by index, clamped to `0..=3`.
    pub async fn exposure_mode(&self, index: i64) -> Result {
        self.command(Command::exposure_mode_index(index)).await
    }

    /// Starts moving in `direction`. The camera keeps moving until
    /// [stopped][Self::stop].
    ///
    /// Speeds are clamped to `1..=18` (pan) and `1..=14` (tilt).
    pub async fn move_continuous(
        &self,
        direction: Direction,
        pan_speed: i64,
        tilt_speed: i64,
    ) -> Result {
        self.command(Command::drive(direction, pan_speed, tilt_speed))
            .await
    }

    pub async fn stop(&self) -> Result {
        self.command(Command::STOP).await
    }

    /// Moves to `position`, or by `position` when `relative` is set.
    pub async fn move_to(
        &self,
        pan_speed: i64,
        tilt_speed: i64,
        position: PtzPosition,
        relative: bool,
    ) -> Result {
        self.command(Command::move_to(pan_speed, tilt_speed, position, relative))
            .await
    }

    pub async fn home(&self) -> Result {
        self.command(Command::Home).await
    }

    pub async fn reset(&self) -> Result {
        self.command(Command::Reset).await
    }

    /// Flushes the camera's command buffers.
    pub async fn interface_clear(&self) -> Result {
        self.command(Command::InterfaceClear).await
    }

    /// Asks the camera to cancel the command in `socket` (clamped to `1..=2`).
    ///
    /// This doesn't affect any local request.
    pub async fn cancel(&self, socket: i64) -> Result {
        self.send(Cancel::clamped(socket)).await?;
        Ok(())
    }

    pub async fn query_power(&self) -> Result<Reported<PowerState>> {
        match self.inquire(Inquiry::Power).await? {
            InquiryResponse::Power(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_focus_mode(&self) -> Result<Reported<FocusMode>> {
        match self.inquire(Inquiry::FocusMode).await? {
            InquiryResponse::FocusMode(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_white_balance(&self) -> Result<Reported<WhiteBalance>> {
        match self.inquire(Inquiry::WhiteBalance).await? {
            InquiryResponse::WhiteBalance(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_exposure_mode(&self) -> Result<Reported<ExposureMode>> {
        match self.inquire(Inquiry::ExposureMode).await? {
            InquiryResponse::ExposureMode(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_backlight(&self) -> Result<Reported<Switch>> {
        match self.inquire(Inquiry::Backlight).await? {
            InquiryResponse::Backlight(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_video_format(&self) -> Result<Reported<VideoFormat>> {
        match self.inquire(Inquiry::VideoFormat).await? {
            InquiryResponse::VideoFormat(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_color_format(&self) -> Result<Reported<ColorFormat>> {
        match self.inquire(Inquiry::ColorFormat).await? {
            InquiryResponse::ColorFormat(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_version(&self) -> Result<VersionInfo> {
        match self.inquire(Inquiry::Version).await? {
            InquiryResponse::Version(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    pub async fn query_position(&self) -> Result<PtzPosition> {
        match self.inquire(Inquiry::Position).await? {
            InquiryResponse::Position(v) => Ok(v),
            _ => Err(Error::UnexpectedState),
        }
    }

    /// Runs a parsed [Action].
    pub async fn execute(&self, action: &Action) -> Result<Outcome> {
        match *action {
            Action::Power(on) => self.power(on).await?,
            Action::Backlight(on) => self.backlight(on).await?,
            Action::ExposureMode(mode) => self.set_exposure_mode(mode).await?,
            Action::Move {
                direction,
                pan_speed,
                tilt_speed,
            } => {
                self.move_continuous(direction, pan_speed, tilt_speed)
                    .await?
            }
            Action::Stop => self.stop().await?,
            Action::MoveTo {
                position,
                pan_speed,
                tilt_speed,
                relative,
            } => self.move_to(pan_speed, tilt_speed, position, relative).await?,
            Action::Home => self.home().await?,
            Action::Reset => self.reset().await?,
            Action::Cancel(socket) => self.cancel(socket).await?,
            Action::InterfaceClear => self.interface_clear().await?,
            Action::Query(inquiry) => return Ok(Outcome::Response(self.inquire(inquiry).await?)),
        }

        Ok(Outcome::Done)
    }

    pub async fn get_state(&self) -> impl std::ops::Deref<Target = CameraState> {
        self.state.read().await
    }

    pub fn state_update_events(&self) -> Receiver<(CowCellReadTxn<CameraState>, StateUpdate)> {
        self.state_rx.resubscribe()
    }

    /// Subscribes to transport and unsolicited device error events.
    ///
    /// Receivers only get events sent after they subscribe. The session
    /// sends [`ChannelEvent::Opened`] as soon as it starts, which is normally
    /// before the caller gets here.
    pub fn channel_events(&self) -> Receiver<ChannelEvent> {
        self.event_rx.resubscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::DeviceError;
    use std::{
        io::Error as IoError,
        pin::Pin,
        task::{Context, Poll},
        time::Duration,
    };
    use tokio::{
        io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf},
        time::timeout,
    };

    /// Our end of a [duplex] pipe, with injected I/O errors.
    struct FaultyLink {
        io: DuplexStream,
        /// Number of writes left to fail.
        write_faults: usize,
        /// Fail every read which returns data.
        read_faults: bool,
    }

    impl AsyncRead for FaultyLink {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let filled = buf.filled().len();
            let r = Pin::new(&mut self.io).poll_read(cx, buf);
            let got_data = matches!(r, Poll::Ready(Ok(()))) && buf.filled().len() > filled;
            if self.read_faults && got_data {
                return Poll::Ready(Err(IoError::other("line fault")));
            }
            r
        }
    }

    impl AsyncWrite for FaultyLink {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.write_faults > 0 {
                self.write_faults -= 1;
                return Poll::Ready(Err(IoError::other("glitch")));
            }
            Pin::new(&mut self.io).poll_write(cx, buf)
        }

        fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.io).poll_flush(cx)
        }

        fn poll_shutdown(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.io).poll_shutdown(cx)
        }
    }

    /// The camera end of a [duplex] pipe.
    struct FakeCamera {
        io: DuplexStream,
    }

    impl FakeCamera {
        fn new(config: ViscaConfig) -> Result<(ViscaController, Self)> {
            let (ours, theirs) = duplex(256);
            Ok((ViscaController::new(ours, config)?, Self { io: theirs }))
        }

        fn faulty(
            config: ViscaConfig,
            write_faults: usize,
            read_faults: bool,
        ) -> Result<(ViscaController, Self)> {
            let (ours, theirs) = duplex(256);
            let link = FaultyLink {
                io: ours,
                write_faults,
                read_faults,
            };
            Ok((ViscaController::new(link, config)?, Self { io: theirs }))
        }

        /// Reads one request frame.
        async fn read_frame(&mut self) -> Result<Vec<u8>> {
            let mut frame = Vec::new();
            loop {
                let b = self.io.read_u8().await?;
                frame.push(b);
                if b == 0xff {
                    return Ok(frame);
                }
            }
        }

        /// Reads one request frame, failing if none arrives soon.
        async fn expect_frame(&mut self) -> Result<Vec<u8>> {
            timeout(Duration::from_secs(1), self.read_frame())
                .await
                .map_err(|_| Error::Timeout)?
        }

        /// Checks that nothing more has been written.
        async fn expect_silence(&mut self) {
            assert!(
                timeout(Duration::from_millis(50), self.read_frame())
                    .await
                    .is_err(),
                "unexpected request"
            );
        }

        async fn write(&mut self, hex: &str) -> Result {
            self.io.write_all(&hex::decode(hex)?).await?;
            Ok(())
        }
    }

    /// Waits for the next channel event after [ChannelEvent::Opened].
    async fn next_event(events: &mut Receiver<ChannelEvent>) -> Result<ChannelEvent> {
        loop {
            let event = timeout(Duration::from_secs(1), events.recv())
                .await
                .map_err(|_| Error::Timeout)?
                .map_err(|_| Error::ChannelUnavailable)?;
            if event != ChannelEvent::Opened {
                return Ok(event);
            }
        }
    }

    #[tokio::test]
    async fn commands() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;

        camera.power(true).await?;
        assert_eq!(hex::decode("8101040002ff")?, fake.expect_frame().await?);

        camera.move_continuous(Direction::Up, 8, 4).await?;
        assert_eq!(hex::decode("8101060108040301ff")?, fake.expect_frame().await?);

        camera.stop().await?;
        assert_eq!(hex::decode("8101060101010303ff")?, fake.expect_frame().await?);

        camera.move_to(30, 20, PtzPosition::HOME, false).await?;
        assert_eq!(
            hex::decode("81010602120e0000000000000000ff")?,
            fake.expect_frame().await?
        );

        camera.cancel(0).await?;
        assert_eq!(hex::decode("8121ff")?, fake.expect_frame().await?);
        camera.cancel(5).await?;
        assert_eq!(hex::decode("8122ff")?, fake.expect_frame().await?);

        camera.exposure_mode(99).await?;
        assert_eq!(hex::decode("810104390bff")?, fake.expect_frame().await?);

        let state = camera.get_state().await;
        assert_eq!(Some(Reported::Known(PowerState::On)), state.power);
        assert_eq!(
            Some(Reported::Known(ExposureMode::IrisPriority)),
            state.exposure_mode
        );
        Ok(())
    }

    #[tokio::test]
    async fn camera_address() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default().with_address(3))?;
        camera.home().await?;
        assert_eq!(hex::decode("83010604ff")?, fake.expect_frame().await?);

        let (q, ()) = tokio::join!(camera.query_power(), async {
            assert_eq!(hex::decode("83090400ff").ok(), fake.expect_frame().await.ok());
            // Camera 1 is not the camera we asked
            fake.write("905002ff").await.ok();
            fake.write("b05003ff").await.ok();
        });
        assert_eq!(Reported::Known(PowerState::Standby), q?);
        Ok(())
    }

    #[tokio::test]
    async fn inquiry() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;
        let mut updates = camera.state_update_events();

        let (pos, ()) = tokio::join!(camera.query_position(), async {
            assert_eq!(hex::decode("81090612ff").ok(), fake.expect_frame().await.ok());
            fake.write("90500f07050000040b00ff").await.ok();
        });
        assert_eq!(PtzPosition::new(-2224, 1200), pos?);

        let (state, update) = updates.recv().await.map_err(|_| Error::ChannelUnavailable)?;
        assert_eq!(StateUpdate::POSITION, update);
        assert_eq!(Some(PtzPosition::new(-2224, 1200)), state.position);

        // Moving invalidates the position
        camera.move_continuous(Direction::Left, 1, 1).await?;
        fake.expect_frame().await?;
        assert_eq!(None, camera.get_state().await.position);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_status() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;

        let (power, ()) = tokio::join!(camera.query_power(), async {
            fake.expect_frame().await.ok();
            fake.write("905004ff").await.ok();
        });
        assert_eq!(Reported::Known(PowerState::InternalError), power?);

        let (power, ()) = tokio::join!(camera.query_power(), async {
            fake.expect_frame().await.ok();
            fake.write("905077ff").await.ok();
        });
        let power = power?;
        assert_eq!(Reported::Unknown(0x77), power);
        assert_eq!("Unknown (0x77)", power.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn inquiries_are_serialised() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;

        let (power, video, ()) = tokio::join!(
            camera.query_power(),
            camera.query_video_format(),
            async {
                let first = fake.expect_frame().await.ok();
                // Nothing else is written until the first inquiry is answered
                fake.expect_silence().await;

                // Stale replies to earlier commands are skipped
                fake.write("9041ff9051ff").await.ok();
                fake.expect_silence().await;

                if first == hex::decode("81090400ff").ok() {
                    fake.write("905002ff").await.ok();
                    assert_eq!(hex::decode("81090623ff").ok(), fake.expect_frame().await.ok());
                    fake.write("905006ff").await.ok();
                } else {
                    assert_eq!(hex::decode("81090623ff").ok(), first);
                    fake.write("905006ff").await.ok();
                    assert_eq!(hex::decode("81090400ff").ok(), fake.expect_frame().await.ok());
                    fake.write("905002ff").await.ok();
                }
            }
        );

        assert_eq!(Reported::Known(PowerState::On), power?);
        assert_eq!(Reported::Known(VideoFormat::Pal576i50), video?);
        Ok(())
    }

    #[tokio::test]
    async fn fragmented_reply() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;

        let (version, ()) = tokio::join!(camera.query_version(), async {
            fake.expect_frame().await.ok();
            fake.write("9050").await.ok();
            tokio::time::sleep(Duration::from_millis(10)).await;
            fake.write("0020040e").await.ok();
            tokio::time::sleep(Duration::from_millis(10)).await;
            fake.write("011702ff").await.ok();
        });

        assert_eq!(
            VersionInfo {
                vendor_id: 0x0020,
                model_id: 0x040e,
                rom_revision: 0x0117,
                max_sockets: 2,
            },
            version?
        );
        Ok(())
    }

    #[tokio::test]
    async fn timeout_recovers() -> Result {
        let config = ViscaConfig::default().with_inquiry_timeout(Duration::from_millis(50));
        let (camera, mut fake) = FakeCamera::new(config)?;

        let (r, frame) = tokio::join!(camera.query_focus_mode(), fake.expect_frame());
        assert!(matches!(r, Err(Error::Timeout)));
        assert_eq!(hex::decode("81090438ff")?, frame?);

        // A failed inquiry leaves state untouched
        assert_eq!(None, camera.get_state().await.focus_mode);

        // The correlator is idle again
        let (r, ()) = tokio::join!(camera.query_focus_mode(), async {
            fake.expect_frame().await.ok();
            fake.write("905002ff").await.ok();
        });
        assert_eq!(Reported::Known(FocusMode::Auto), r?);
        assert_eq!(
            Some(Reported::Known(FocusMode::Auto)),
            camera.get_state().await.focus_mode
        );
        Ok(())
    }

    #[tokio::test]
    async fn device_error() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;
        let mut events = camera.channel_events();

        let (r, ()) = tokio::join!(camera.query_white_balance(), async {
            fake.expect_frame().await.ok();
            fake.write("906002ff").await.ok();
        });
        assert!(matches!(
            r,
            Err(Error::Device(Reported::Known(DeviceError::Syntax)))
        ));
        assert_eq!(None, camera.get_state().await.white_balance);

        // Codes outside the table still fail the inquiry straight away
        let (r, ()) = tokio::join!(camera.query_white_balance(), async {
            fake.expect_frame().await.ok();
            fake.write("906099ff").await.ok();
        });
        assert!(matches!(r, Err(Error::Device(Reported::Unknown(0x99)))));

        // Errors nobody is waiting for are published
        fake.write("906141ff").await?;
        let event = next_event(&mut events).await?;
        assert_eq!(
            ChannelEvent::DeviceError {
                socket: 1,
                error: Reported::Known(DeviceError::CommandNotExecutable)
            },
            event
        );
        Ok(())
    }

    #[tokio::test]
    async fn transport_closed() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;
        let mut events = camera.channel_events();

        let (r, ()) = tokio::join!(camera.query_backlight(), async {
            fake.expect_frame().await.ok();
            drop(fake);
        });
        assert!(matches!(r, Err(Error::TransportClosed)));

        let event = next_event(&mut events).await?;
        assert_eq!(ChannelEvent::Closed, event);

        // Later requests fail too
        assert!(matches!(camera.home().await, Err(Error::TransportClosed)));
        Ok(())
    }

    #[tokio::test]
    async fn late_reply_after_timeout() -> Result {
        let config = ViscaConfig::default().with_inquiry_timeout(Duration::from_millis(50));
        let (camera, mut fake) = FakeCamera::new(config)?;

        let (r, frame) = tokio::join!(camera.query_position(), fake.expect_frame());
        assert!(matches!(r, Err(Error::Timeout)));
        assert_eq!(hex::decode("81090612ff")?, frame?);

        // The position reply turns up during the next inquiry, and is not
        // taken as its reply
        let (power, ()) = tokio::join!(camera.query_power(), async {
            assert_eq!(hex::decode("81090400ff").ok(), fake.expect_frame().await.ok());
            fake.write("90500f07050000040b00ff905003ff").await.ok();
        });
        assert_eq!(Reported::Known(PowerState::Standby), power?);
        assert_eq!(None, camera.get_state().await.position);
        Ok(())
    }

    #[tokio::test]
    async fn write_failure() -> Result {
        let (camera, mut fake) = FakeCamera::faulty(ViscaConfig::default(), 1, false)?;
        let mut events = camera.channel_events();

        assert!(matches!(
            camera.query_power().await,
            Err(Error::TransportWriteFailure(_))
        ));
        assert!(matches!(
            next_event(&mut events).await?,
            ChannelEvent::Error(_)
        ));

        // The failed inquiry is not sent ahead of the next one
        let (pos, ()) = tokio::join!(camera.query_position(), async {
            assert_eq!(hex::decode("81090612ff").ok(), fake.expect_frame().await.ok());
            fake.write("90500f07050000040b00ff").await.ok();
        });
        assert_eq!(PtzPosition::new(-2224, 1200), pos?);
        assert_eq!(None, camera.get_state().await.power);
        Ok(())
    }

    #[tokio::test]
    async fn read_failure() -> Result {
        let (camera, mut fake) = FakeCamera::faulty(ViscaConfig::default(), 0, true)?;
        let mut events = camera.channel_events();

        let (r, ()) = tokio::join!(camera.query_power(), async {
            fake.expect_frame().await.ok();
            fake.write("905002ff").await.ok();
        });
        assert!(matches!(r, Err(Error::TransportError(_))));
        assert_eq!(None, camera.get_state().await.power);

        assert!(matches!(
            next_event(&mut events).await?,
            ChannelEvent::Error(_)
        ));
        assert_eq!(ChannelEvent::Closed, next_event(&mut events).await?);
        assert!(matches!(camera.home().await, Err(Error::TransportClosed)));
        Ok(())
    }

    #[tokio::test]
    async fn opened_is_not_replayed() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;
        camera.home().await?;
        fake.expect_frame().await?;

        // The session is already running
        let mut events = camera.channel_events();
        drop(fake);
        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|_| Error::ChannelUnavailable)?;
        assert_eq!(ChannelEvent::Closed, event);
        Ok(())
    }

    #[tokio::test]
    async fn execute() -> Result {
        let (camera, mut fake) = FakeCamera::new(ViscaConfig::default())?;

        let action: Action = "backlight on".parse()?;
        assert_eq!(Outcome::Done, camera.execute(&action).await?);
        assert_eq!(hex::decode("8101043302ff")?, fake.expect_frame().await?);

        let action: Action = "query color".parse()?;
        let (r, ()) = tokio::join!(camera.execute(&action), async {
            assert_eq!(hex::decode("81090624ff").ok(), fake.expect_frame().await.ok());
            fake.write("905001ff").await.ok();
        });
        let r = r?;
        assert_eq!(
            Outcome::Response(InquiryResponse::ColorFormat(Reported::Known(
                ColorFormat::YPbPr
            ))),
            r
        );
        assert_eq!("color-format: YPbPr", r.to_string());
        Ok(())
    }

    #[test]
    fn bad_config() {
        let (ours, _theirs) = duplex(16);
        assert!(matches!(
            ViscaController::new(ours, ViscaConfig::default().with_address(0)),
            Err(Error::ParameterOutOfRange)
        ));
    }
}
