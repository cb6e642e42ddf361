use std::fmt;

use crate::bencode::Bencode;

/// SHA-1 of the canonical encoding of a torrent's `info` dictionary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Hashes `info` after re-encoding it with sorted keys.
    pub fn of(info: &Bencode) -> Self {
        let mut m = sha1_smol::Sha1::new();
        m.update(&info.encode());
        InfoHash(m.digest().bytes())
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        InfoHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Percent-encodes every byte, leaving only RFC 3986 unreserved
    /// characters as-is, for the tracker's `info_hash` query parameter.
    pub fn url_encoded(&self) -> String {
        url_encode_bytes(&self.0)
    }
}

pub(crate) fn url_encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for &byte in bytes {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
