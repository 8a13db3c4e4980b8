use anyhow::Result;
use clap::{Parser, Subcommand};
use robot_mouth::{
    CommandDispatcher, Config, ConnectivityMonitor, EventStreamConsumer, HttpTransport,
    LogRenderer, RobotFace, VoiceOptions,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "robot-mouth", about = "Drive a remote talking robot")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/robot-mouth")]
    config: String,

    /// Override the actuator base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Probe the actuator's health endpoint
    Health,
    /// Send text to be spoken
    Speak {
        text: String,
        #[arg(long)]
        rate: Option<f32>,
        #[arg(long)]
        pitch: Option<f32>,
        #[arg(long)]
        volume: Option<f32>,
    },
    /// Interrupt the current utterance
    Stop,
    /// Follow the event stream until Ctrl-C
    Listen,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        cfg.service.base_url = base_url;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Actuator: {}", cfg.service.base_url);

    let transport = Arc::new(HttpTransport::new()?);
    let connectivity = ConnectivityMonitor::new();

    match cli.command {
        Action::Health => {
            let dispatcher =
                CommandDispatcher::new(transport, cfg.dispatcher_config(), connectivity);
            let reachable = dispatcher.check_connection().await;
            println!("{}", dispatcher.connectivity().current());
            if !reachable {
                std::process::exit(1);
            }
        }
        Action::Speak {
            text,
            rate,
            pitch,
            volume,
        } => {
            let dispatcher =
                CommandDispatcher::new(transport, cfg.dispatcher_config(), connectivity);
            let options = VoiceOptions {
                rate,
                pitch,
                volume,
            };
            if !dispatcher.speak(&text, Some(options)).await {
                warn!("Speak command was not delivered");
                std::process::exit(1);
            }
        }
        Action::Stop => {
            let dispatcher =
                CommandDispatcher::new(transport, cfg.dispatcher_config(), connectivity);
            if !dispatcher.stop().await {
                std::process::exit(1);
            }
        }
        Action::Listen => {
            let face = Arc::new(RobotFace::new(Arc::new(LogRenderer)));
            let consumer = EventStreamConsumer::new(
                transport,
                face.clone(),
                cfg.stream_config(),
                connectivity,
            );

            info!("✅ Client ID: {}", consumer.client_id());
            consumer.connect().await;

            tokio::signal::ctrl_c().await?;

            info!("Shutting down");
            face.silence().await;
            consumer.close().await;
        }
    }

    Ok(())
}
