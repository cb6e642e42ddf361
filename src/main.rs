use std::path::PathBuf;

use anyhow::Context;
use bittorrent::{
    config::{self, ClientConfig},
    tracker::{self, AnnounceRequest},
    Bencode, Torrent,
};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(version, about = "Bencode and torrent metainfo tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a bencoded value and print it as JSON
    Decode { value: String },
    /// Print tracker, size, info hash and piece hashes of a torrent file
    Info { torrent: PathBuf },
    /// Ask the torrent's tracker for peers
    Peers {
        torrent: PathBuf,
        /// 20-byte peer id sent to the tracker
        #[arg(long, env = "BITTORRENT_PEER_ID", default_value = config::DEFAULT_PEER_ID, value_parser = config::parse_peer_id)]
        peer_id: [u8; 20],
        /// Port reported to the tracker
        #[arg(long, env = "BITTORRENT_PORT", default_value_t = config::DEFAULT_PORT)]
        port: u16,
        /// Print the peer list as a JSON array
        #[arg(long)]
        json: bool,
    },
}

// At most `max` bytes of raw input for log lines, non-printable bytes escaped.
fn preview(bytes: &[u8], max: usize) -> String {
    let shown = &bytes[..bytes.len().min(max)];
    let ellipsis = if bytes.len() > max { "..." } else { "" };
    format!("{}{ellipsis}", shown.escape_ascii())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Decode { value } => {
            debug!(input = %preview(value.as_bytes(), 64), "decoding");
            let decoded = Bencode::decode_all(value.as_bytes()).context("decode bencoded value")?;
            println!("{decoded}");
        }
        Command::Info { torrent } => {
            let torrent = Torrent::read(&torrent)
                .with_context(|| format!("read torrent {}", torrent.display()))?;

            println!("Tracker URL: {}", torrent.announce);
            println!("Length: {}", torrent.info.length);
            println!("Info Hash: {}", torrent.info_hash());
            println!("Piece Length: {}", torrent.info.piece_length);
            println!("Piece Hashes:");
            for hash in &torrent.info.pieces {
                println!("{}", hex::encode(hash));
            }
        }
        Command::Peers {
            torrent,
            peer_id,
            port,
            json,
        } => {
            let torrent = Torrent::read(&torrent)
                .with_context(|| format!("read torrent {}", torrent.display()))?;
            let config = ClientConfig { peer_id, port };

            let request = AnnounceRequest::started(torrent.info_hash(), &config, torrent.info.length);
            let response = tracker::announce(&torrent.announce, &request)
                .with_context(|| format!("announce to {}", torrent.announce))?;

            if json {
                println!("{}", serde_json::to_string(&response.peers)?);
            } else {
                for peer in &response.peers {
                    println!("{peer}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_escapes_binary() {
        assert_eq!(preview(b"4:sp\x00m", 16), "4:sp\\x00m");
        assert_eq!(preview(b"abcdef", 3), "abc...");
        assert_eq!(preview(b"abc", 3), "abc");
    }
}
