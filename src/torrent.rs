use std::{fs, path::Path};

use indexmap::IndexMap;
use tracing::debug;

use crate::bencode::Bencode;
use crate::error::MetainfoError;
use crate::info_hash::InfoHash;

pub const PIECE_HASH_LEN: usize = 20;

type Dict = IndexMap<Vec<u8>, Bencode>;

/// A parsed `.torrent` metainfo file.
#[derive(Debug, Clone, PartialEq)]
pub struct Torrent {
    pub announce: String,
    /// Tiers of backup trackers, empty when the file has none.
    pub announce_list: Vec<Vec<String>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<i64>,
    pub info: Info,
    raw_info: Bencode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub name: Option<String>,
    pub length: u64,
    pub piece_length: u64,
    /// One SHA-1 digest per piece, in piece order.
    pub pieces: Vec<[u8; PIECE_HASH_LEN]>,
    pub private: bool,
}

impl Torrent {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MetainfoError> {
        let path = path.as_ref();
        let content = fs::read(path)?;
        debug!(path = %path.display(), bytes = content.len(), "read torrent file");

        Self::from_bytes(&content)
    }

    pub fn from_bytes(content: &[u8]) -> Result<Self, MetainfoError> {
        let metainfo = Bencode::decode_all(content)?;
        Self::parse(&metainfo)
    }

    pub fn parse(metainfo: &Bencode) -> Result<Self, MetainfoError> {
        let Bencode::Dictionary(metainfo_dict) = metainfo else {
            return Err(MetainfoError::InvalidMetainfo("metainfo is not a dictionary"));
        };

        let announce = match metainfo_dict.get(&b"announce"[..]) {
            Some(Bencode::String(announce)) => String::from_utf8_lossy(announce).to_string(),
            _ => return Err(MetainfoError::InvalidMetainfo("invalid or missing announce field")),
        };

        let raw_info = match metainfo_dict.get(&b"info"[..]) {
            Some(info @ Bencode::Dictionary(_)) => info.clone(),
            _ => return Err(MetainfoError::InvalidMetainfo("invalid or missing info dictionary")),
        };
        let info = Info::parse(&raw_info)?;

        let announce_list = match metainfo_dict.get(&b"announce-list"[..]) {
            None => Vec::new(),
            Some(Bencode::List(tiers)) => tiers
                .iter()
                .map(parse_tier)
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(MetainfoError::InvalidMetainfo("announce-list is not a list")),
        };

        let torrent = Torrent {
            announce,
            announce_list,
            comment: optional_string(metainfo_dict, "comment")?,
            created_by: optional_string(metainfo_dict, "created by")?,
            creation_date: optional_integer(metainfo_dict, "creation date")?,
            info,
            raw_info,
        };

        debug!(
            announce = %torrent.announce,
            length = torrent.info.length,
            pieces = torrent.info.pieces.len(),
            "parsed metainfo"
        );

        Ok(torrent)
    }

    /// The `info` dictionary exactly as decoded.
    pub fn raw_info(&self) -> &Bencode {
        &self.raw_info
    }

    pub fn info_hash(&self) -> InfoHash {
        InfoHash::of(&self.raw_info)
    }
}

impl Info {
    fn parse(info: &Bencode) -> Result<Self, MetainfoError> {
        let Bencode::Dictionary(info_dict) = info else {
            return Err(MetainfoError::InvalidMetainfo("info is not a dictionary"));
        };

        let length = match info_dict.get(&b"length"[..]) {
            Some(Bencode::Integer(length)) => u64::try_from(*length)
                .map_err(|_| MetainfoError::InvalidMetainfo("length is negative"))?,
            _ => return Err(MetainfoError::InvalidMetainfo("invalid or missing length field")),
        };

        let piece_length = match info_dict.get(&b"piece length"[..]) {
            Some(Bencode::Integer(piece_length)) if *piece_length > 0 => *piece_length as u64,
            Some(Bencode::Integer(_)) => {
                return Err(MetainfoError::InvalidMetainfo("piece length is not positive"))
            }
            _ => {
                return Err(MetainfoError::InvalidMetainfo(
                    "invalid or missing piece length field",
                ))
            }
        };

        let pieces = match info_dict.get(&b"pieces"[..]) {
            Some(Bencode::String(pieces)) => split_pieces(pieces)?,
            _ => return Err(MetainfoError::InvalidMetainfo("invalid or missing pieces field")),
        };

        Ok(Info {
            name: optional_string(info_dict, "name")?,
            length,
            piece_length,
            pieces,
            private: optional_integer(info_dict, "private")?.is_some_and(|p| p != 0),
        })
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Size in bytes of the piece at `index`; only the last piece may be
    /// shorter than `piece_length`.
    pub fn piece_size(&self, index: usize) -> Option<u64> {
        if index >= self.pieces.len() {
            return None;
        }

        let start = self.piece_length.saturating_mul(index as u64);
        Some(self.length.saturating_sub(start).min(self.piece_length))
    }
}

fn split_pieces(pieces: &[u8]) -> Result<Vec<[u8; PIECE_HASH_LEN]>, MetainfoError> {
    if pieces.len() % PIECE_HASH_LEN != 0 {
        return Err(MetainfoError::MalformedPieceTable(pieces.len()));
    }

    Ok(pieces
        .chunks_exact(PIECE_HASH_LEN)
        .map(|chunk| {
            let mut hash = [0u8; PIECE_HASH_LEN];
            hash.copy_from_slice(chunk);
            hash
        })
        .collect())
}

fn parse_tier(tier: &Bencode) -> Result<Vec<String>, MetainfoError> {
    let Bencode::List(urls) = tier else {
        return Err(MetainfoError::InvalidMetainfo("announce-list tier is not a list"));
    };

    urls.iter()
        .map(|url| match url {
            Bencode::String(url) => Ok(String::from_utf8_lossy(url).to_string()),
            _ => Err(MetainfoError::InvalidMetainfo("announce-list entry is not a string")),
        })
        .collect()
}

fn optional_string(dict: &Dict, key: &'static str) -> Result<Option<String>, MetainfoError> {
    match dict.get(key.as_bytes()) {
        None => Ok(None),
        Some(Bencode::String(s)) => Ok(Some(String::from_utf8_lossy(s).to_string())),
        Some(_) => Err(MetainfoError::InvalidMetainfo(key)),
    }
}

fn optional_integer(dict: &Dict, key: &'static str) -> Result<Option<i64>, MetainfoError> {
    match dict.get(key.as_bytes()) {
        None => Ok(None),
        Some(Bencode::Integer(i)) => Ok(Some(*i)),
        Some(_) => Err(MetainfoError::InvalidMetainfo(key)),
    }
}
