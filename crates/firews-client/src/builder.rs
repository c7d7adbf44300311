//! Client builder pattern

use std::time::Duration;

use firews_core::FrameConfig;

use crate::config::ClientConfig;
use crate::transport::{Address, Connection, DEFAULT_CONNECT_TIMEOUT};
use crate::{FireWs, Result};

/// Builder for FireWS client
pub struct FireWsBuilder {
    address: String,
    connect_timeout: Duration,
    frame_config: FrameConfig,
    credentials: Option<(String, String)>,
}

impl FireWsBuilder {
    /// Create a new builder
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            frame_config: FrameConfig::default(),
            credentials: None,
        }
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::new(&config.address)
            .connect_timeout(config.connect_timeout())
            .chunk_size(config.chunk_size)
            .max_frame_size(config.max_frame_size);

        if let (Some(namespace), Some(secret_key)) = (&config.namespace, &config.secret_key) {
            builder = builder.credentials(namespace, secret_key);
        }
        builder
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read chunk size in bytes
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.frame_config.chunk_size = bytes;
        self
    }

    /// Set largest accepted response payload
    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.frame_config.max_frame_size = bytes;
        self
    }

    /// Authenticate against `namespace` right after connecting
    pub fn credentials(mut self, namespace: &str, secret_key: &str) -> Self {
        self.credentials = Some((namespace.to_string(), secret_key.to_string()));
        self
    }

    /// Build and connect
    pub fn connect(self) -> Result<FireWs> {
        let address: Address = self.address.parse()?;
        let connection = Connection::connect(&address, self.connect_timeout)?;
        let mut client = FireWs::with_config(connection, self.frame_config);

        if let Some((namespace, secret_key)) = &self.credentials {
            client.auth(namespace, secret_key)?;
        }

        Ok(client)
    }
}
