//! FireWS Core
//!
//! Wire-level primitives for talking to a FireWS channel state server.
//!
//! This crate provides:
//! - Length-prefixed JSON framing ([`Frame`], [`frame::query`])
//! - Request and response messages ([`Request`], [`Response`])
//! - Compact signed tokens for authentication ([`token`])
//!
//! No networking lives here; every function works over any
//! [`std::io::Read`] / [`std::io::Write`] stream.

pub mod error;
pub mod frame;
pub mod token;
pub mod types;

pub use error::{Error, Result};
pub use frame::{encode_frame, read_frame, write_frame, Frame, FrameConfig};
pub use token::{Algorithm, DecodingKey, EncodingKey};
pub use types::*;
