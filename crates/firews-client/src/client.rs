//! Main FireWS client implementation

use std::io::{Read, Write};

use firews_core::frame::{self, FrameConfig};
use firews_core::token::{self, Algorithm, EncodingKey};
use firews_core::{is_private_channel, NameSpaceRegistered, Request, Response, StateParams, UserParams};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::builder::FireWsBuilder;
use crate::error::{ClientError, Result};
use crate::transport::{Address, Connection, DEFAULT_CONNECT_TIMEOUT};

/// Session state as tracked on the client side.
///
/// The server decides what an unauthenticated session may do; this only
/// records whether `auth` has succeeded on this connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Authenticated,
}

/// A FireWS client over one exclusively owned stream.
///
/// Every call is one blocking round trip. The protocol carries no request
/// ids, so a client must not be shared between callers without external
/// locking.
pub struct FireWs<S = Connection> {
    stream: S,
    frame_config: FrameConfig,

    /// Namespace secret cached by a successful `auth`
    secret_key: Option<String>,
}

impl FireWs {
    /// Connect with the default 4 second timeout (use builder for more options)
    pub fn connect(address: &str) -> Result<Self> {
        let address: Address = address.parse()?;
        let connection = Connection::connect(&address, DEFAULT_CONNECT_TIMEOUT)?;
        Ok(Self::with_stream(connection))
    }

    /// Create a builder
    pub fn builder(address: &str) -> FireWsBuilder {
        FireWsBuilder::new(address)
    }

    /// Build an HS256 auth token whose payload is the user id.
    ///
    /// Fails with `MissingCredential` before touching any stream.
    pub fn generate_auth_string(user_id: Option<&str>, s_key: Option<&str>) -> Result<String> {
        let user_id = user_id.ok_or(ClientError::MissingCredential("user id"))?;
        let s_key = s_key.ok_or(ClientError::MissingCredential("secret key"))?;

        let key = EncodingKey::from_secret(s_key.as_bytes());
        Ok(token::encode(user_id, &key, Algorithm::HS256)?)
    }

    /// Shut the socket down and drop the client
    pub fn close(self) -> Result<()> {
        info!("Closing connection");
        self.stream
            .shutdown()
            .map_err(|e| ClientError::Protocol(e.into()))
    }
}

impl<S: Read + Write> FireWs<S> {
    /// Wrap an already open stream
    pub fn with_stream(stream: S) -> Self {
        Self::with_config(stream, FrameConfig::default())
    }

    /// Wrap an already open stream with custom frame limits
    pub fn with_config(stream: S, frame_config: FrameConfig) -> Self {
        Self {
            stream,
            frame_config,
            secret_key: None,
        }
    }

    pub fn frame_config(&self) -> &FrameConfig {
        &self.frame_config
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the client, returning the stream
    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn state(&self) -> SessionState {
        if self.secret_key.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Connected
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Secret cached by the last successful `auth`
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }

    /// Auth token for `user_id` signed with the cached secret
    pub fn auth_string(&self, user_id: Option<&str>) -> Result<String> {
        FireWs::generate_auth_string(user_id, self.secret_key())
    }

    /// One raw round trip
    pub fn query(&mut self, request: &Request) -> Result<Response> {
        debug!(action = request.action(), "query");
        Ok(frame::query(&mut self.stream, request, &self.frame_config)?)
    }

    /// Register a namespace and return its secret key
    pub fn register_namespace(&mut self, name: &str, key: &str) -> Result<String> {
        let res = self.query(&Request::RegisterNameSpace {
            name: name.to_string(),
            key: key.to_string(),
        })?;

        if let Some(err) = res.error() {
            warn!("registerNameSpace {} refused: {}", name, err);
            return Err(err.into());
        }

        let registered: NameSpaceRegistered = res.payload_as()?;
        info!("Registered namespace {}", name);
        Ok(registered.secret_key)
    }

    /// Authenticate the connection against a namespace.
    ///
    /// The secret is cached only once the server accepts it.
    pub fn auth(&mut self, namespace: &str, s_key: &str) -> Result<&mut Self> {
        let res = self.query(&Request::Auth {
            name: namespace.to_string(),
            s_key: s_key.to_string(),
        })?;

        if let Some(err) = res.error() {
            warn!("auth for {} refused: {}", namespace, err);
            return Err(err.into());
        }

        self.secret_key = Some(s_key.to_string());
        info!("Authenticated to namespace {}", namespace);
        Ok(self)
    }

    /// Broadcast `data` to channel listeners
    pub fn send<T>(&mut self, channel: &str, data: &T, user_id: Option<&str>) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.query(&Request::Emit {
            channel: channel.to_string(),
            data: to_value(data)?,
            params: UserParams::new(user_id),
        })
    }

    /// Store base state without broadcasting
    pub fn set<T>(
        &mut self,
        channel: &str,
        data: &T,
        user_id: Option<&str>,
        ttl: Option<u64>,
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.write_state(channel, data, StateParams::new(user_id, false, ttl), false)
    }

    /// Store base state and broadcast it
    pub fn set_and_send<T>(
        &mut self,
        channel: &str,
        data: &T,
        user_id: Option<&str>,
        ttl: Option<u64>,
    ) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        let res = self.write_state(channel, data, StateParams::new(user_id, true, ttl), false)?;
        Ok(res.success)
    }

    /// Append to base state without broadcasting
    pub fn push<T>(
        &mut self,
        channel: &str,
        data: &T,
        user_id: Option<&str>,
        ttl: Option<u64>,
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.write_state(channel, data, StateParams::new(user_id, false, ttl), true)
    }

    /// Append to base state and broadcast it
    pub fn push_and_send<T>(
        &mut self,
        channel: &str,
        data: &T,
        user_id: Option<&str>,
        ttl: Option<u64>,
    ) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        let res = self.write_state(channel, data, StateParams::new(user_id, true, ttl), true)?;
        Ok(res.success)
    }

    fn write_state<T>(&mut self, channel: &str, data: &T, params: StateParams, push: bool) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let channel = channel.to_string();
        let data = to_value(data)?;
        let request = if push {
            Request::Push { channel, data, params }
        } else {
            Request::Set { channel, data, params }
        };
        self.query(&request)
    }

    /// Subscribe a user to a private channel.
    ///
    /// Returns false without any I/O when `channel` lacks the `#` prefix.
    pub fn subscribe(&mut self, channel: &str, user_id: &str) -> Result<bool> {
        if !is_private_channel(channel) {
            debug!("subscribe skipped, not a private channel: {}", channel);
            return Ok(false);
        }

        let res = self.query(&Request::Subscribe {
            channel: channel.to_string(),
            params: UserParams::new(Some(user_id)),
        })?;
        Ok(res.success)
    }

    /// Unsubscribe a user from a private channel, with the same prefix check
    pub fn unsubscribe(&mut self, channel: &str, user_id: &str) -> Result<bool> {
        if !is_private_channel(channel) {
            debug!("unsubscribe skipped, not a private channel: {}", channel);
            return Ok(false);
        }

        let res = self.query(&Request::Unsubscribe {
            channel: channel.to_string(),
            params: UserParams::new(Some(user_id)),
        })?;
        Ok(res.success)
    }

    /// Fetch base state
    pub fn get(&mut self, channel: &str, user_id: Option<&str>) -> Result<Response> {
        self.query(&Request::Get {
            channel: channel.to_string(),
            params: UserParams::new(user_id),
        })
    }

    pub fn channel_info(&mut self, channel: &str) -> Result<Response> {
        self.query(&Request::ChannelInfo {
            channel: channel.to_string(),
        })
    }
}

fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
    serde_json::to_value(data)
        .map_err(|e| ClientError::Protocol(firews_core::Error::EncodeError(e.to_string())))
}
