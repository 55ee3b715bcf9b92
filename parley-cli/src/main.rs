use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use parley_core::{generate_username, ChatPayload, ConnectionState, RoomId};
use parley_peer::{
    ChatRoute, FileStore, PeerConfig, PeerConnectionManager, PeerError, PeerHandle, PeerObserver,
    RemoteTrack, SignalingTransport, WebRtcSessionFactory,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Two-terminal chat over a shared mailbox directory")]
struct Cli {
    /// Directory holding the room mailboxes. Peers must share it.
    #[arg(long, env = "PARLEY_STORE_DIR", default_value = ".parley")]
    store_dir: PathBuf,

    /// Chat name. Prompted for when omitted.
    #[arg(short, long, env = "PARLEY_USERNAME")]
    username: Option<String>,

    /// Mailbox poll interval in milliseconds.
    #[arg(long)]
    poll_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new room and wait for someone to join.
    Create,

    /// Join an existing room.
    Join { room: String },

    /// Print the messages waiting in a room's mailbox.
    Inspect { room: String },

    /// Delete a room's mailbox.
    Clear {
        room: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PeerConfig::from_env()?;
    if let Some(ms) = cli.poll_ms {
        config.poll_interval = Duration::from_millis(ms.max(1));
    }

    match cli.command {
        Commands::Create => {
            let room = RoomId::new();
            let username = resolve_username(cli.username)?;
            let peer = spawn_peer(&cli.store_dir, config)?;

            println!("{}", "Room created".green().bold());
            println!("   Room:  {}", room.as_str().bold());
            println!("   Join:  parley join {}", room);

            peer.create_session(room).await?;
            peer.start_as_initiator(None).await?;

            chat_loop(&peer, &username).await?;
            peer.close().await?;
        }

        Commands::Join { room } => {
            let room = RoomId::parse(&room).context("Please enter a room ID")?;
            let username = resolve_username(cli.username)?;
            let peer = spawn_peer(&cli.store_dir, config)?;

            println!("{} {}", "Joining room".green().bold(), room.as_str().bold());
            peer.join(room).await?;

            chat_loop(&peer, &username).await?;
            peer.close().await?;
        }

        Commands::Inspect { room } => {
            let room = RoomId::parse(&room).context("Please enter a room ID")?;
            let transport = open_transport(&cli.store_dir, &config)?;
            let messages = transport.read(&room);

            println!(
                "{} {} ({} messages)",
                "Mailbox".cyan().bold(),
                SignalingTransport::mailbox_key(&room),
                messages.len()
            );
            for message in messages {
                println!(
                    "   {:<14} {}  {}",
                    message.kind().to_string().as_str().yellow(),
                    message.timestamp,
                    message.id.as_str().dimmed()
                );
            }
        }

        Commands::Clear { room, yes } => {
            let room = RoomId::parse(&room).context("Please enter a room ID")?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Clear the mailbox for room {room}?"))
                    .default(false)
                    .interact()?;

            if confirmed {
                open_transport(&cli.store_dir, &config)?.clear(&room)?;
                println!("{}", "Mailbox cleared".green());
            }
        }
    }

    Ok(())
}

fn resolve_username(username: Option<String>) -> Result<String> {
    if let Some(name) = username {
        return Ok(name);
    }

    let generated = generate_username();
    match Input::<String>::new()
        .with_prompt("Username")
        .default(generated.clone())
        .interact_text()
    {
        Ok(name) => Ok(name),
        Err(_) => Ok(generated),
    }
}

fn open_transport(dir: &Path, config: &PeerConfig) -> Result<SignalingTransport> {
    let store = FileStore::open(dir)
        .with_context(|| format!("Failed to open store at {}", dir.display()))?;
    Ok(SignalingTransport::new(Arc::new(store), config.mailbox))
}

fn spawn_peer(dir: &Path, config: PeerConfig) -> Result<PeerHandle> {
    let store = FileStore::open(dir)
        .with_context(|| format!("Failed to open store at {}", dir.display()))?;
    info!(
        "Using mailbox store at {} (poll every {:?})",
        dir.display(),
        config.poll_interval
    );
    let factory = WebRtcSessionFactory::new(config.ice_servers.clone());

    let manager = PeerConnectionManager::new(
        config,
        Arc::new(store),
        Arc::new(factory),
        Arc::new(CliObserver),
    );
    Ok(manager.spawn())
}

async fn chat_loop(peer: &PeerHandle, username: &str) -> Result<()> {
    println!(
        "{}",
        "Type a message and press enter. /stats shows counters, /quit leaves.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();

                match line {
                    "" => continue,
                    "/quit" => {
                        debug!("Quit requested");
                        break;
                    }
                    "/stats" => print_stats(peer).await?,
                    content => {
                        let route = peer
                            .send_chat_message(ChatPayload::new(content, username))
                            .await?;
                        if route == ChatRoute::Signaling {
                            println!("{}", "   (sent via mailbox, channel not open yet)".dimmed());
                        }
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, leaving room");
                break;
            }
        }
    }

    Ok(())
}

async fn print_stats(peer: &PeerHandle) -> Result<()> {
    match peer.stats().await? {
        Some(stats) => {
            println!("{}", "Connection stats".cyan().bold());
            println!(
                "   sent:     {} bytes, {} messages",
                stats.bytes_sent, stats.messages_sent
            );
            println!(
                "   received: {} bytes, {} messages",
                stats.bytes_received, stats.messages_received
            );
            if let Some(rtt) = stats.round_trip_time {
                println!("   rtt:      {:.1} ms", rtt * 1000.0);
            }
        }
        None => println!("{}", "No stats available".dimmed()),
    }
    Ok(())
}

struct CliObserver;

#[async_trait]
impl PeerObserver for CliObserver {
    async fn on_state_change(&self, state: ConnectionState) {
        let label = format!("connection {state}");
        let label = match state {
            ConnectionState::Connected => label.as_str().green(),
            ConnectionState::Failed | ConnectionState::Closed => label.as_str().red(),
            _ => label.as_str().yellow(),
        };
        println!("{} {}", "*".dimmed(), label);
    }

    async fn on_remote_track(&self, track: RemoteTrack) {
        println!(
            "{} remote {:?} track {}",
            "*".dimmed(),
            track.kind,
            track.id
        );
    }

    async fn on_channel_open(&self, _label: String) {
        println!("{}", "* data channel open".green());
    }

    async fn on_channel_close(&self, _label: String) {
        println!("{}", "* data channel closed".yellow());
    }

    async fn on_chat_message(&self, payload: ChatPayload) {
        println!(
            "{} {}",
            format!("{}:", payload.username).as_str().cyan().bold(),
            payload.content
        );
    }

    async fn on_error(&self, error: &PeerError) {
        eprintln!("{} {}", "error:".red().bold(), error);
    }
}
