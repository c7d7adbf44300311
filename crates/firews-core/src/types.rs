//! FireWS request and response messages

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Error, Result};

/// Prefix that marks a private channel
pub const PRIVATE_CHANNEL_SIGIL: char = '#';

/// Check whether a channel name is a private channel
pub fn is_private_channel(channel: &str) -> bool {
    channel.starts_with(PRIVATE_CHANNEL_SIGIL)
}

/// `params` object for calls that only carry a subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserParams {
    pub fn new(user_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
        }
    }
}

/// `params` object for base state writes (`set` / `push`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateParams {
    pub user_id: Option<String>,
    /// Also broadcast the write to channel listeners
    pub emit: bool,
    /// Expiry hint for the stored state, in seconds
    pub ttl: Option<u64>,
}

impl StateParams {
    pub fn new(user_id: Option<&str>, emit: bool, ttl: Option<u64>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            emit,
            ttl,
        }
    }
}

/// A client request, discriminated on the wire by `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    RegisterNameSpace {
        name: String,
        key: String,
    },
    Auth {
        name: String,
        #[serde(rename = "sKey")]
        s_key: String,
    },
    Emit {
        channel: String,
        data: Value,
        params: UserParams,
    },
    Set {
        channel: String,
        data: Value,
        params: StateParams,
    },
    Push {
        channel: String,
        data: Value,
        params: StateParams,
    },
    Subscribe {
        channel: String,
        params: UserParams,
    },
    Unsubscribe {
        channel: String,
        params: UserParams,
    },
    Get {
        channel: String,
        params: UserParams,
    },
    ChannelInfo {
        channel: String,
    },
}

impl Request {
    /// The `action` discriminator sent on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Request::RegisterNameSpace { .. } => "registerNameSpace",
            Request::Auth { .. } => "auth",
            Request::Emit { .. } => "emit",
            Request::Set { .. } => "set",
            Request::Push { .. } => "push",
            Request::Subscribe { .. } => "subscribe",
            Request::Unsubscribe { .. } => "unsubscribe",
            Request::Get { .. } => "get",
            Request::ChannelInfo { .. } => "channelInfo",
        }
    }

    /// Channel targeted by the request, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            Request::RegisterNameSpace { .. } | Request::Auth { .. } => None,
            Request::Emit { channel, .. }
            | Request::Set { channel, .. }
            | Request::Push { channel, .. }
            | Request::Subscribe { channel, .. }
            | Request::Unsubscribe { channel, .. }
            | Request::Get { channel, .. }
            | Request::ChannelInfo { channel } => Some(channel),
        }
    }
}

/// Failure reported by the server in a `success: false` reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("server error {code}: {reason}")]
pub struct ServerError {
    pub reason: String,
    pub code: i64,
}

/// A decoded server reply.
///
/// Every reply carries `success`; failures add `reason` and `code`. Any
/// other fields are operation specific and land in `payload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// Successful reply with the given payload fields
    pub fn ok(payload: Map<String, Value>) -> Self {
        Self {
            success: true,
            reason: None,
            code: None,
            payload,
        }
    }

    /// Failed reply
    pub fn failure(reason: impl Into<String>, code: i64) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            code: Some(code),
            payload: Map::new(),
        }
    }

    /// The server error carried by a failed reply
    pub fn error(&self) -> Option<ServerError> {
        if self.success {
            return None;
        }
        Some(ServerError {
            reason: self.reason.clone().unwrap_or_default(),
            code: self.code.unwrap_or_default(),
        })
    }

    /// Split into payload or server error
    pub fn into_result(self) -> std::result::Result<Map<String, Value>, ServerError> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self.payload),
        }
    }

    /// Look up one payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Deserialize the payload fields into an operation specific shape
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .map_err(|e| Error::DecodeError(e.to_string()))
    }
}

/// Payload of a successful `registerNameSpace` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSpaceRegistered {
    #[serde(rename = "secretKey")]
    pub secret_key: String,
}
