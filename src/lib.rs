//! Bencode codec and torrent metainfo handling.
//!
//! - [`bencode`] - the `Bencode` value model
//! - [`decoder`] / [`encoder`] - wire format to value and back
//! - [`torrent`] - metainfo schema on top of a decoded dictionary
//! - [`info_hash`] - SHA-1 of the canonically re-encoded `info` dictionary
//! - [`tracker`] - HTTP announce and tracker response parsing
//! - [`config`] - peer id and port announced to trackers

pub mod bencode;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod info_hash;
pub mod torrent;
pub mod tracker;

pub use bencode::Bencode;
pub use config::ClientConfig;
pub use error::{DecodeError, MetainfoError, TrackerError};
pub use info_hash::InfoHash;
pub use torrent::{Info, Torrent};
