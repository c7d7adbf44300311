//! FireWS Client Library
//!
//! Blocking client for FireWS channel state servers.
//!
//! # Example
//!
//! ```ignore
//! use firews_client::FireWs;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut ws = FireWs::connect("tcp://127.0.0.1:8085")?;
//!     let secret = ws.register_namespace("app", "master-key")?;
//!     ws.auth("app", &secret)?;
//!
//!     // Store and broadcast state
//!     ws.set_and_send("scores", &serde_json::json!({"home": 2}), None, Some(60))?;
//!
//!     // Hand a token to a browser client
//!     let token = ws.auth_string(Some("user-1"))?;
//!     println!("{}", token);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use builder::FireWsBuilder;
pub use client::{FireWs, SessionState};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use transport::{Address, Connection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::FireWsBuilder;
    pub use crate::client::{FireWs, SessionState};
    pub use crate::config::ClientConfig;
    pub use crate::error::{ClientError, Result};
    pub use firews_core::{Algorithm, Response, ServerError};
}
