use std::fmt::Display;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A decoded bencode value.
///
/// Dictionaries keep the key order they were decoded in; the encoder sorts
/// keys itself, so the stored order never leaks into the canonical form.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Bencode {
    /// Raw bytes, not necessarily UTF-8.
    String(Vec<u8>),
    /// Bounded to `i64`; larger values are rejected by the decoder.
    Integer(i64),
    List(Vec<Bencode>),
    Dictionary(IndexMap<Vec<u8>, Bencode>),
}

impl Bencode {
    pub fn string(s: &str) -> Self {
        Bencode::String(s.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Bencode::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte string as UTF-8, if it is one and decodes cleanly.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|s| std::str::from_utf8(s).ok())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Bencode::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Bencode]> {
        match self {
            Bencode::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&IndexMap<Vec<u8>, Bencode>> {
        match self {
            Bencode::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Bencode> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Bencode {
    fn from(i: i64) -> Self {
        Bencode::Integer(i)
    }
}

impl From<&str> for Bencode {
    fn from(s: &str) -> Self {
        Bencode::string(s)
    }
}

impl From<Vec<u8>> for Bencode {
    fn from(s: Vec<u8>) -> Self {
        Bencode::String(s)
    }
}

impl From<Vec<Bencode>> for Bencode {
    fn from(l: Vec<Bencode>) -> Self {
        Bencode::List(l)
    }
}

impl From<IndexMap<Vec<u8>, Bencode>> for Bencode {
    fn from(d: IndexMap<Vec<u8>, Bencode>) -> Self {
        Bencode::Dictionary(d)
    }
}

// Byte strings that are not UTF-8 (piece tables, peer ids) fall back to hex.
fn text_or_hex(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.into(),
        Err(_) => hex::encode(bytes).into(),
    }
}

impl Serialize for Bencode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bencode::String(s) => serializer.serialize_str(&text_or_hex(s)),
            Bencode::Integer(i) => serializer.serialize_i64(*i),
            Bencode::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for value in l {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Bencode::Dictionary(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (key, value) in d {
                    map.serialize_entry(&String::from_utf8_lossy(key), value)?;
                }
                map.end()
            }
        }
    }
}

impl Display for Bencode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
