//! Stream transport
//!
//! Plain stream sockets, TCP or Unix domain. Addresses are scheme
//! qualified:
//!
//! ```text
//! tcp://127.0.0.1:8085
//! unix:///run/firews.sock
//! ```
//!
//! A bare `host:port` is read as TCP and a bare absolute path as a Unix
//! socket.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Default connect timeout (4 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(4);

/// A parsed server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// `host:port`
    Tcp(String),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Address {
    fn tcp(authority: &str) -> Result<Self> {
        let valid = authority
            .rsplit_once(':')
            .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
            .unwrap_or(false);

        if valid {
            Ok(Address::Tcp(authority.to_string()))
        } else {
            Err(ClientError::InvalidAddress(format!(
                "expected host:port, got: {}",
                authority
            )))
        }
    }

    #[cfg(unix)]
    fn unix(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(ClientError::InvalidAddress("empty socket path".to_string()));
        }
        Ok(Address::Unix(PathBuf::from(path)))
    }

    #[cfg(not(unix))]
    fn unix(path: &str) -> Result<Self> {
        Err(ClientError::InvalidAddress(format!(
            "unix sockets are not supported on this platform: {}",
            path
        )))
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(rest) = s.strip_prefix("tcp://") {
            return Address::tcp(rest);
        }
        if let Some(rest) = s.strip_prefix("unix://").or_else(|| s.strip_prefix("unix:")) {
            return Address::unix(rest);
        }
        if s.contains("://") {
            return Err(ClientError::InvalidAddress(format!("unsupported scheme: {}", s)));
        }
        if s.starts_with('/') || s.starts_with("./") {
            return Address::unix(s);
        }

        Address::tcp(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Tcp(authority) => write!(f, "tcp://{}", authority),
            #[cfg(unix)]
            Address::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

/// An open, exclusively owned stream to the server.
///
/// Dropping the connection closes the socket.
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    /// Open a stream to `address`.
    ///
    /// TCP tries each resolved socket address in turn, bounded by `timeout`
    /// per attempt. Unix sockets connect directly.
    pub fn connect(address: &Address, timeout: Duration) -> Result<Self> {
        info!("Connecting to {}", address);

        let connection = match address {
            Address::Tcp(authority) => Connection::Tcp(connect_tcp(authority, timeout)?),
            #[cfg(unix)]
            Address::Unix(path) => Connection::Unix(
                UnixStream::connect(path).map_err(|e| ClientError::connection_failed(&e))?,
            ),
        };

        info!("Connected to {}", address);
        Ok(connection)
    }

    /// Close both directions of the stream
    pub fn shutdown(&self) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.shutdown(Shutdown::Both),
        }
    }
}

fn connect_tcp(authority: &str, timeout: Duration) -> Result<TcpStream> {
    let addrs = authority
        .to_socket_addrs()
        .map_err(|e| ClientError::connection_failed(&e))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                let _ = stream.set_nodelay(true);
                return Ok(stream);
            }
            Err(e) => {
                debug!("TCP connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => ClientError::connection_failed(&e),
        None => ClientError::ConnectionFailed {
            message: format!("no addresses resolved for {}", authority),
            code: None,
        },
    })
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
        }
    }
}
