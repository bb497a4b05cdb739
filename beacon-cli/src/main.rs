use async_trait::async_trait;
use beacon_core::{MediaDirections, ReadySignal, Role, RoomIdentity, StreamKind};
use beacon_peer::{
    Polarity, Session, SessionBehavior, SessionConfig, SessionError, TransportConfig,
    WebRtcEngineFactory,
};
use bytes::Bytes;
use clap::Parser;
use colored::Colorize;
use rand::Rng;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Negotiate a direct peer-to-peer media/data session through a named room on
/// a rendezvous server.
#[derive(Parser)]
#[command(name = "beacon")]
struct Cli {
    /// Base URL of the rendezvous server, or a shared room link with `#room`.
    #[arg(long, default_value = "https://localhost/camera/")]
    url: String,

    /// Room name to host. Omit to join via the URL's `#room` fragment, or to
    /// host under a generated name when the URL has no fragment.
    #[arg(long)]
    room: Option<String>,

    /// Send audio to the peer.
    #[arg(long)]
    send_audio: bool,

    /// Send video to the peer.
    #[arg(long)]
    send_video: bool,

    /// Receive the peer's audio.
    #[arg(long)]
    receive_audio: bool,

    /// Receive the peer's video.
    #[arg(long)]
    receive_video: bool,

    /// Which side creates the offer: host-offers, client-offers or
    /// either-offers.
    #[arg(long, default_value = "host-offers")]
    polarity: Polarity,

    /// Open a data channel with this label alongside the media session
    /// (host side).
    #[arg(long)]
    data_channel: Option<String>,

    /// Announce readiness as a plain `{"ready": true}` flag instead of the
    /// separateIce marker.
    #[arg(long)]
    plain_ready: bool,

    /// Skip the `settings` announcement after the peer joins.
    #[arg(long)]
    no_settings: bool,

    /// ICE server URL; may be given multiple times. Defaults to a public
    /// STUN server.
    #[arg(long)]
    ice_server: Vec<String>,
}

/// Prints what arrives; actual rendering/consumption of media is out of the
/// session core's hands.
struct PrintingBehavior;

#[async_trait]
impl SessionBehavior for PrintingBehavior {
    async fn on_stream(&self, kind: StreamKind) {
        info!(kind = ?kind, "incoming media stream");
    }

    async fn on_data_channel_open(&self, label: &str) {
        info!(label = %label, "data channel open");
    }

    async fn on_data_message(&self, label: &str, data: Bytes) {
        info!(label = %label, message = %String::from_utf8_lossy(&data), "data channel message");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run(cli)
}

#[tokio::main]
async fn run(cli: Cli) -> ExitCode {
    let directions = MediaDirections {
        send_audio: cli.send_audio,
        send_video: cli.send_video,
        receive_audio: cli.receive_audio,
        receive_video: cli.receive_video,
    };
    if !directions.any() {
        error!("must enable at least one of audio or video, in some direction");
        return ExitCode::from(2);
    }

    let generated;
    let room = match (&cli.room, cli.url.contains('#')) {
        (Some(name), _) => Some(name.as_str()),
        (None, true) => None,
        (None, false) => {
            generated = random_room_name();
            Some(generated.as_str())
        }
    };

    let identity = match RoomIdentity::resolve(&cli.url, room) {
        Ok(identity) => identity,
        Err(e) => {
            error!(error = %e, "invalid room configuration");
            return ExitCode::from(2);
        }
    };

    if identity.role() == Role::Host {
        println!(
            "{} {}",
            "room link:".green().bold(),
            identity.share_link().cyan()
        );
    }
    info!(room = identity.room_name(), role = %identity.role(), "joining room");

    let mut config = SessionConfig::new(identity.role());
    config.polarity = cli.polarity;
    config.directions = directions;
    config.announce_settings = !cli.no_settings;
    config.data_channel = cli.data_channel.clone();
    if cli.plain_ready {
        config.ready_signal = ReadySignal::Flag(true);
    }

    let transport = if cli.ice_server.is_empty() {
        TransportConfig::default()
    } else {
        TransportConfig {
            ice_servers: cli.ice_server.clone(),
        }
    };
    let factory = Box::new(WebRtcEngineFactory::new(transport));

    let session =
        match Session::connect(&identity, config, factory, Box::new(PrintingBehavior)).await {
            Ok(session) => session,
            Err(e) => return exit_for(e),
        };

    match session.run().await {
        Ok(()) => {
            info!("session ended");
            ExitCode::SUCCESS
        }
        Err(e) => exit_for(e),
    }
}

fn exit_for(e: SessionError) -> ExitCode {
    match e {
        SessionError::Capability(reason) => {
            error!(reason = %reason, "media engine capability missing");
            ExitCode::from(1)
        }
        other => {
            error!(error = %other, "session failed");
            ExitCode::from(2)
        }
    }
}

fn random_room_name() -> String {
    let mut rng = rand::rng();
    (0..6)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}
