//! Embedded server configuration.
//!
//! All options have documented defaults; HTTP/2 settings default to the
//! values of RFC 7540 section 6.5.2. A handful of operational knobs can be
//! overridden from the environment:
//!
//! - `SWITCHYARD_HOST` / `SWITCHYARD_PORT`: bind address
//! - `SWITCHYARD_STACK_SIZE`: coroutine stack size in bytes, decimal or
//!   `0x`-prefixed hex

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host. Default `0.0.0.0`.
    pub host: String,
    /// Bind port. Default `8080`.
    pub port: u16,
    /// Accept backlog. Default `1024`.
    pub accept_backlog: u32,
    /// TCP keep-alive. Default `false`.
    pub tcp_keep_alive: bool,
    /// TCP no-delay. Default `true`.
    pub tcp_no_delay: bool,
    /// Serve the generated OpenAPI description. Default `false`.
    pub enable_open_api: bool,
    /// Serve bundled webjar assets. Default `false`.
    pub enable_webjars: bool,
    /// Coroutine stack size in bytes. Default 64 KiB.
    pub stack_size: usize,
    pub ssl: SslConfig,
    pub http2: Http2Config,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            accept_backlog: 1024,
            tcp_keep_alive: false,
            tcp_no_delay: true,
            enable_open_api: false,
            enable_webjars: false,
            stack_size: DEFAULT_STACK_SIZE,
            ssl: SslConfig::default(),
            http2: Http2Config::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();
        if let Ok(host) = env::var("SWITCHYARD_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("SWITCHYARD_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(stack_size) = env::var("SWITCHYARD_STACK_SIZE") {
            config.stack_size = parse_size(&stack_size).unwrap_or(DEFAULT_STACK_SIZE);
        }
        config
    }

    /// The `host:port` bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TLS settings. The listener itself stays plain until `enabled` is set and
/// the key material options point at a store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SslConfig {
    /// Default `false`.
    pub enabled: bool,
    pub key_store: Option<PathBuf>,
    pub key_store_type: Option<String>,
    pub key_alias: Option<String>,
    pub key_store_password: Option<String>,
    pub cipher_includes: Vec<String>,
    pub cipher_excludes: Vec<String>,
}

/// HTTP/2 settings, defaulting to RFC 7540 values except where noted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Http2Config {
    /// SETTINGS_HEADER_TABLE_SIZE. Default `4096`.
    pub header_table_size: u32,
    /// SETTINGS_ENABLE_PUSH. Default `true`.
    pub enable_push: bool,
    /// SETTINGS_MAX_CONCURRENT_STREAMS. Default `100`.
    pub max_concurrent_streams: u32,
    /// SETTINGS_INITIAL_WINDOW_SIZE. Default `65535`.
    pub initial_window_size: u32,
    /// SETTINGS_MAX_FRAME_SIZE. Default `16384`.
    pub max_frame_size: u32,
    /// SETTINGS_MAX_HEADER_LIST_SIZE. Default unlimited.
    pub max_header_list_size: Option<u32>,
}

impl Default for Http2Config {
    fn default() -> Self {
        Http2Config {
            header_table_size: 4096,
            enable_push: true,
            max_concurrent_streams: 100,
            initial_window_size: 65_535,
            max_frame_size: 16_384,
            max_header_list_size: None,
        }
    }
}

/// Parse a byte size, decimal or `0x`-prefixed hex.
fn parse_size(value: &str) -> Option<usize> {
    if let Some(hex) = value.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.accept_backlog, 1024);
        assert!(config.tcp_no_delay);
        assert!(!config.tcp_keep_alive);
        assert!(!config.ssl.enabled);
        assert_eq!(config.http2.header_table_size, 4096);
        assert_eq!(config.http2.max_concurrent_streams, 100);
        assert_eq!(config.http2.initial_window_size, 65_535);
        assert_eq!(config.http2.max_frame_size, 16_384);
        assert_eq!(config.http2.max_header_list_size, None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("65536"), Some(65536));
        assert_eq!(parse_size("0x10000"), Some(65536));
        assert_eq!(parse_size("nope"), None);
    }

    #[test]
    fn test_deserializes_partial_config() {
        let config: ServerConfig = serde_json::from_str(r#"{ "port": 9090 }"#).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
    }
}
