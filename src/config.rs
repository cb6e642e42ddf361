pub const DEFAULT_PEER_ID: &str = "00112233445566778899";
pub const DEFAULT_PORT: u16 = 6881;

/// Identity this client announces to trackers with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub peer_id: [u8; 20],
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            peer_id: *b"00112233445566778899",
            port: DEFAULT_PORT,
        }
    }
}

/// Accepts exactly 20 bytes of text, the fixed peer id width.
pub fn parse_peer_id(s: &str) -> Result<[u8; 20], String> {
    s.as_bytes()
        .try_into()
        .map_err(|_| format!("peer id must be 20 bytes, got {}", s.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_peer_id_is_valid() {
        assert_eq!(parse_peer_id(DEFAULT_PEER_ID), Ok(ClientConfig::default().peer_id));
    }

    #[test]
    fn peer_id_length_checked() {
        assert!(parse_peer_id("short").is_err());
        assert!(parse_peer_id("-RS0001-0123456789012").is_err());
        assert_eq!(parse_peer_id("-RS0001-012345678901"), Ok(*b"-RS0001-012345678901"));
    }
}
