//! Client configuration

use std::time::Duration;

use firews_core::frame::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_SIZE};
use firews_core::FrameConfig;
use serde::{Deserialize, Serialize};

/// Connection settings, loadable from any serde format (the CLI uses TOML).
///
/// ```toml
/// address = "tcp://127.0.0.1:8085"
/// connect_timeout_ms = 4000
/// namespace = "app"
/// secret_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub address: String,
    pub connect_timeout_ms: u64,
    pub chunk_size: usize,
    pub max_frame_size: usize,
    /// With `secret_key`, authenticate right after connecting
    pub namespace: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:8085".to_string(),
            connect_timeout_ms: 4000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            namespace: None,
            secret_key: None,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            chunk_size: self.chunk_size,
            max_frame_size: self.max_frame_size,
        }
    }
}
