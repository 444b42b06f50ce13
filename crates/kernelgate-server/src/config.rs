//! Gateway server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the gateway server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Capacity of the kernel→client forwarding channel, per connection.
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_message_size: 16 * 1024 * 1024, // 16 MB
            outbound_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
    }

    #[test]
    fn default_max_message_size() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.max_message_size, 16 * 1024 * 1024);
    }

    #[test]
    fn default_outbound_capacity() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.outbound_capacity, 1024);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8888,
            max_message_size: 1024,
            outbound_capacity: 16,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.port, cfg.port);
        assert_eq!(back.max_message_size, cfg.max_message_size);
        assert_eq!(back.outbound_capacity, cfg.outbound_capacity);
    }

    #[test]
    fn deserialize_from_json_string() {
        let json = r#"{"host":"10.0.0.1","port":8888,"max_message_size":512,"outbound_capacity":4}"#;
        let cfg: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.host, "10.0.0.1");
        assert_eq!(cfg.port, 8888);
        assert_eq!(cfg.outbound_capacity, 4);
    }
}
