use clap::Parser;
use futures::StreamExt;
use pantograph::{
    protocol::inquiry::Inquiry, Action, ChannelEvent, Result, ViscaConfig, ViscaController,
};
use std::time::Duration;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

/// Interactive console for a VISCA camera behind a TCP serial bridge.
///
/// Reads one action per line from stdin, for example:
///
///   power on
///   move up-left 8 4
///   stop
///   absolute -2224 1200 18 14
///   query position
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// Address and port of the serial bridge.
    pub addr: String,

    /// Camera address on the VISCA bus (1 - 7).
    #[clap(short, long, default_value_t = 1)]
    pub address: u8,

    /// Inquiry reply timeout, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Inquiries to run on connection.
    #[clap(short, long, value_enum)]
    pub inquire: Vec<Inquiry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();
    let opts = CliParser::parse();
    let config = ViscaConfig::default()
        .with_address(opts.address)
        .with_inquiry_timeout(Duration::from_millis(opts.timeout_ms));
    let camera = ViscaController::connect_tcp(&opts.addr, config).await?;

    let mut events = BroadcastStream::new(camera.channel_events());
    tokio::task::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(ChannelEvent::DeviceError { socket, error }) => {
                    warn!("camera error on socket {socket}: {error}")
                }
                Ok(ChannelEvent::Closed) => {
                    info!("connection closed");
                    break;
                }
                Ok(event) => info!("{event:?}"),
                Err(e) => warn!("missed events: {e}"),
            }
        }
    });

    for inquiry in opts.inquire {
        match camera.inquire(inquiry).await {
            Ok(resp) => info!("{resp}"),
            Err(e) => error!("{inquiry}: {e}"),
        }
    }

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "state" {
            info!("\n{}", *camera.get_state().await);
            continue;
        }

        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                error!("{e}");
                continue;
            }
        };

        match camera.execute(&action).await {
            Ok(outcome) => info!("{outcome}"),
            Err(e) => error!("{e}"),
        }
    }

    Ok(())
}
