use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::{debug, info};

use crate::bencode::Bencode;
use crate::config::ClientConfig;
use crate::error::TrackerError;
use crate::info_hash::{url_encode_bytes, InfoHash};

const COMPACT_PEER_LEN: usize = 6;

/// Query parameters of an HTTP tracker announce.
#[derive(Clone, Debug)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: [u8; 20],
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub compact: bool,
}

impl AnnounceRequest {
    /// A fresh download: nothing transferred yet, `left` bytes to go.
    pub fn started(info_hash: InfoHash, config: &ClientConfig, left: u64) -> Self {
        AnnounceRequest {
            info_hash,
            peer_id: config.peer_id,
            port: config.port,
            uploaded: 0,
            downloaded: 0,
            left,
            compact: true,
        }
    }

    pub fn url(&self, announce: &str) -> String {
        let separator = if announce.contains('?') { '&' } else { '?' };

        format!(
            "{announce}{separator}info_hash={}&peer_id={}&port={}&uploaded={}&downloaded={}&left={}&compact={}",
            self.info_hash.url_encoded(),
            url_encode_bytes(&self.peer_id),
            self.port,
            self.uploaded,
            self.downloaded,
            self.left,
            u8::from(self.compact),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub ip: String,
    pub port: u16,
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.contains(':') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerResponse {
    /// Seconds the tracker wants between announces.
    pub interval: Option<i64>,
    pub peers: Vec<Peer>,
}

impl TrackerResponse {
    pub fn from_bytes(body: &[u8]) -> Result<Self, TrackerError> {
        Self::parse(&Bencode::decode_all(body)?)
    }

    /// Interprets a decoded announce reply. `peers` may be either the
    /// compact byte string form or a list of `ip`/`port` dictionaries.
    pub fn parse(response: &Bencode) -> Result<Self, TrackerError> {
        if response.as_dict().is_none() {
            return Err(TrackerError::InvalidResponse("response is not a dictionary"));
        }

        if let Some(reason) = response.get(b"failure reason") {
            let reason = reason.as_bytes().map(String::from_utf8_lossy).unwrap_or_default();
            return Err(TrackerError::Failure(reason.to_string()));
        }

        let interval = match response.get(b"interval") {
            None => None,
            Some(Bencode::Integer(interval)) => Some(*interval),
            Some(_) => return Err(TrackerError::InvalidResponse("interval is not an integer")),
        };

        let peers = match response.get(b"peers") {
            Some(Bencode::String(compact)) => parse_compact_peers(compact)?,
            Some(Bencode::List(peers)) => peers.iter().map(parse_peer).collect::<Result<_, _>>()?,
            _ => return Err(TrackerError::InvalidResponse("invalid or missing peers field")),
        };

        Ok(TrackerResponse { interval, peers })
    }
}

fn parse_compact_peers(compact: &[u8]) -> Result<Vec<Peer>, TrackerError> {
    if compact.len() % COMPACT_PEER_LEN != 0 {
        return Err(TrackerError::MalformedPeers(compact.len()));
    }

    Ok(compact
        .chunks_exact(COMPACT_PEER_LEN)
        .map(|record| Peer {
            ip: Ipv4Addr::new(record[0], record[1], record[2], record[3]).to_string(),
            port: u16::from_be_bytes([record[4], record[5]]),
        })
        .collect())
}

fn parse_peer(peer: &Bencode) -> Result<Peer, TrackerError> {
    let ip = peer
        .get(b"ip")
        .and_then(Bencode::as_str)
        .ok_or(TrackerError::InvalidResponse("peer without ip"))?;

    let port = peer
        .get(b"port")
        .and_then(Bencode::as_integer)
        .and_then(|port| u16::try_from(port).ok())
        .ok_or(TrackerError::InvalidResponse("peer without valid port"))?;

    Ok(Peer {
        ip: ip.to_string(),
        port,
    })
}

/// Sends a blocking GET announce and decodes the tracker's reply.
pub fn announce(announce_url: &str, request: &AnnounceRequest) -> Result<TrackerResponse, TrackerError> {
    let url = request.url(announce_url);
    info!(tracker = announce_url, info_hash = %request.info_hash, "announcing");

    let body = reqwest::blocking::get(&url)?.error_for_status()?.bytes()?;
    debug!(bytes = body.len(), "tracker replied");

    let response = TrackerResponse::from_bytes(&body)?;
    debug!(peers = response.peers.len(), interval = ?response.interval, "parsed tracker response");

    Ok(response)
}
