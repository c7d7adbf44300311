//! Length-prefixed JSON framing
//!
//! FireWS frame format:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Bytes 0-3:  Payload Length (uint32 little-endian)               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Payload (UTF-8 JSON, exactly `length` bytes)                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Sentinel (1 byte, value ignored by readers)                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Frames carry no correlation id, so a stream holds at most one
//! outstanding request at a time.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Length prefix size
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Trailing sentinel size
pub const SENTINEL_SIZE: usize = 1;

/// Sentinel byte written after every payload
pub const SENTINEL: u8 = 0x00;

/// Maximum bytes requested from the stream per read call
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default upper bound on a declared payload length (64MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Frame reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Read chunk size in bytes (zero is treated as one)
    pub chunk_size: usize,
    /// Largest payload length accepted from the peer
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// A FireWS frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame around an already serialized payload
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Serialize a message to JSON and wrap it in a frame
    pub fn from_message<T: Serialize + ?Sized>(message: &T) -> Result<Self> {
        let json = serde_json::to_vec(message).map_err(|e| Error::EncodeError(e.to_string()))?;
        Ok(Self::new(json))
    }

    /// Total encoded size: prefix, payload and sentinel
    pub fn size(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.payload.len() + SENTINEL_SIZE
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> Result<Bytes> {
        let len = u32::try_from(self.payload.len()).map_err(|_| Error::FrameTooLarge {
            size: self.payload.len(),
            max: u32::MAX as usize,
        })?;

        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u32_le(len);
        buf.extend_from_slice(&self.payload);
        buf.put_u8(SENTINEL);

        Ok(buf.freeze())
    }

    /// Parse the payload as JSON
    pub fn message<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.payload).map_err(|e| Error::DecodeError(e.to_string()))
    }
}

/// Encode a message into wire bytes
pub fn encode_frame<T: Serialize + ?Sized>(message: &T) -> Result<Bytes> {
    Frame::from_message(message)?.encode()
}

/// Write one framed message to the stream. Returns the number of bytes written.
///
/// Nothing is read back; see [`query`] for a full round trip.
pub fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<usize>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = encode_frame(message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;

    debug!(bytes = bytes.len(), "frame written");
    Ok(bytes.len())
}

/// Read one frame with the default configuration and decode its JSON payload
pub fn read_frame<R, T>(reader: &mut R) -> Result<T>
where
    R: Read + ?Sized,
    T: DeserializeOwned,
{
    read_frame_with(reader, &FrameConfig::default())
}

/// Read one frame and decode its JSON payload
pub fn read_frame_with<R, T>(reader: &mut R, config: &FrameConfig) -> Result<T>
where
    R: Read + ?Sized,
    T: DeserializeOwned,
{
    read_raw_frame(reader, config)?.message()
}

/// Read one frame without interpreting the payload.
///
/// # Protocol
///
/// 1. Read exactly 4 bytes, the little-endian payload length `N`
/// 2. Read `N` bytes, never asking the stream for more than remain
///    and never more than `chunk_size` per call
/// 3. Read and discard exactly one sentinel byte
///
/// On return the stream is positioned at the start of the next frame.
///
/// # Errors
///
/// - `ConnectionClosed` if the stream hits EOF anywhere inside the frame
/// - `FrameTooLarge` if `N` exceeds `max_frame_size`
/// - `Io` for any other stream failure
pub fn read_raw_frame<R>(reader: &mut R, config: &FrameConfig) -> Result<Frame>
where
    R: Read + ?Sized,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).map_err(Error::from_read)?;
    let len = (&prefix[..]).get_u32_le() as usize;

    if len > config.max_frame_size {
        return Err(Error::FrameTooLarge {
            size: len,
            max: config.max_frame_size,
        });
    }

    let chunk_size = config.chunk_size.max(1);
    let mut payload = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        let want = (len - filled).min(chunk_size);
        match reader.read(&mut payload[filled..filled + want]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => {
                filled += n;
                trace!(read = n, filled, len, "frame chunk");
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::from_read(e)),
        }
    }

    let mut sentinel = [0u8; SENTINEL_SIZE];
    reader.read_exact(&mut sentinel).map_err(Error::from_read)?;

    debug!(bytes = len, "frame read");
    Ok(Frame::new(payload))
}

/// Write a request frame, then block until the response frame is read
pub fn query<S, Req, Resp>(stream: &mut S, request: &Req, config: &FrameConfig) -> Result<Resp>
where
    S: Read + Write + ?Sized,
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    write_frame(stream, request)?;
    read_frame_with(stream, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Request, StateParams, UserParams};
    use serde_json::{json, Value};
    use std::io::Cursor;

    /// Delivers at most `step` bytes per read call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        largest_request: usize,
    }

    impl Trickle {
        fn new(data: Vec<u8>, step: usize) -> Self {
            Self {
                data,
                pos: 0,
                step,
                largest_request: 0,
            }
        }
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.largest_request = self.largest_request.max(buf.len());
            let n = buf.len().min(self.step).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_encode_layout() {
        let msg = json!({"action": "get", "channel": "news"});
        let encoded = encode_frame(&msg).unwrap();
        let json = serde_json::to_vec(&msg).unwrap();

        assert_eq!(encoded.len(), LENGTH_PREFIX_SIZE + json.len() + SENTINEL_SIZE);
        assert_eq!(&encoded[..4], &(json.len() as u32).to_le_bytes());
        assert_eq!(&encoded[4..4 + json.len()], json.as_slice());
        assert_eq!(encoded[encoded.len() - 1], SENTINEL);
    }

    #[test]
    fn test_frame_size() {
        let frame = Frame::new(b"{}".as_slice());
        assert_eq!(frame.size(), 7);
        assert_eq!(frame.encode().unwrap().len(), frame.size());
    }

    #[test]
    fn test_read_back_written_frame() {
        let mut deep = json!("leaf");
        for depth in 0..32 {
            let mut level = serde_json::Map::new();
            level.insert(format!("level{}", depth), json!([deep]));
            deep = Value::Object(level);
        }

        let messages = vec![
            json!({}),
            json!([]),
            json!(null),
            json!(""),
            json!({"action": "set", "data": {"nested": [1, 2, 3]}, "params": {"ttl": null}}),
            json!({"text": "héllo 世界 🚀", "ключ": "значение"}),
            json!({"quote": "say \"hi\"", "path": "C:\\dir\\file", "ctl": "tab\tnl\n\u{1}"}),
            json!({"min": i64::MIN, "max": u64::MAX, "neg": -1, "float": -0.125, "decimal": 12345.678}),
            json!({"flags": [true, false, null], "empty": {"a": {}, "b": []}}),
            deep,
        ];

        for msg in messages {
            let mut wire = Vec::new();
            let written = write_frame(&mut wire, &msg).unwrap();
            assert_eq!(written, wire.len());

            let decoded: Value = read_frame(&mut Cursor::new(wire.clone())).unwrap();
            assert_eq!(decoded, msg);

            let mut stream = Trickle::new(wire, 3);
            let decoded: Value = read_frame(&mut stream).unwrap();
            assert_eq!(decoded, msg);
            assert_eq!(stream.pos, stream.data.len());
        }
    }

    #[test]
    fn test_read_back_every_request() {
        let requests = vec![
            Request::RegisterNameSpace {
                name: "app".to_string(),
                key: "master".to_string(),
            },
            Request::Auth {
                name: "app".to_string(),
                s_key: "s3cr3t".to_string(),
            },
            Request::Emit {
                channel: "news".to_string(),
                data: json!({"text": "héllo \"world\""}),
                params: UserParams::new(None),
            },
            Request::Set {
                channel: "score".to_string(),
                data: json!({"home": 1, "away": -2}),
                params: StateParams::new(Some("u1"), true, Some(60)),
            },
            Request::Push {
                channel: "feed".to_string(),
                data: json!(["a", "b"]),
                params: StateParams::new(None, false, None),
            },
            Request::Subscribe {
                channel: "#room".to_string(),
                params: UserParams::new(Some("u1")),
            },
            Request::Unsubscribe {
                channel: "#room".to_string(),
                params: UserParams::new(Some("u1")),
            },
            Request::Get {
                channel: "score".to_string(),
                params: UserParams::new(Some("u2")),
            },
            Request::ChannelInfo {
                channel: "news".to_string(),
            },
        ];

        for request in requests {
            let mut wire = Vec::new();
            write_frame(&mut wire, &request).unwrap();

            let decoded: Request = read_frame(&mut Trickle::new(wire, 2)).unwrap();
            assert_eq!(decoded, request);
        }
    }

    #[test]
    fn test_one_byte_fragments() {
        let msg = json!({"success": true, "data": "x".repeat(3000)});
        let mut wire = encode_frame(&msg).unwrap().to_vec();
        let next = encode_frame(&json!({"success": false})).unwrap();
        wire.extend_from_slice(&next);

        let mut stream = Trickle::new(wire, 1);
        let first: Value = read_frame(&mut stream).unwrap();
        assert_eq!(first, msg);

        // Positioned exactly at the next frame
        let second: Value = read_frame(&mut stream).unwrap();
        assert_eq!(second, json!({"success": false}));
        assert_eq!(stream.pos, stream.data.len());
    }

    #[test]
    fn test_reads_never_exceed_chunk_size() {
        let msg = json!({"data": "y".repeat(5000)});
        let wire = encode_frame(&msg).unwrap().to_vec();

        let mut stream = Trickle::new(wire, usize::MAX);
        let _: Value = read_frame(&mut stream).unwrap();
        assert!(stream.largest_request <= DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let msg = json!({"ok": 1});
        let wire = encode_frame(&msg).unwrap().to_vec();
        let config = FrameConfig {
            chunk_size: 0,
            ..Default::default()
        };

        let decoded: Value = read_frame_with(&mut Cursor::new(wire), &config).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_sentinel_value_ignored() {
        let mut wire = encode_frame(&json!([1])).unwrap().to_vec();
        let last = wire.len() - 1;
        wire[last] = 0x01;

        let decoded: Value = read_frame(&mut Cursor::new(wire)).unwrap();
        assert_eq!(decoded, json!([1]));
    }

    #[test]
    fn test_eof_in_prefix() {
        let result: Result<Value> = read_frame(&mut Cursor::new(vec![5u8, 0]));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_eof_in_payload() {
        let wire = encode_frame(&json!({"k": "value"})).unwrap();
        let truncated = wire[..wire.len() - 4].to_vec();

        let result: Result<Value> = read_frame(&mut Cursor::new(truncated));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_eof_before_sentinel() {
        let wire = encode_frame(&json!({"k": 1})).unwrap();
        let without_sentinel = wire[..wire.len() - 1].to_vec();

        let result: Result<Value> = read_frame(&mut Cursor::new(without_sentinel));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_invalid_json_payload() {
        let wire = Frame::new(b"not json".as_slice()).encode().unwrap();

        let result: Result<Value> = read_frame(&mut Cursor::new(wire.to_vec()));
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_rejects_oversized_length() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&1025u32.to_le_bytes());
        let config = FrameConfig {
            max_frame_size: 1024,
            ..Default::default()
        };

        let result: Result<Value> = read_frame_with(&mut Cursor::new(wire), &config);
        match result {
            Err(Error::FrameTooLarge { size, max }) => {
                assert_eq!(size, 1025);
                assert_eq!(max, 1024);
            }
            other => panic!("expected FrameTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_payload_frame() {
        let wire = Frame::new(Bytes::new()).encode().unwrap();
        assert_eq!(&wire[..], &[0, 0, 0, 0, SENTINEL]);

        let frame = read_raw_frame(&mut Cursor::new(wire.to_vec()), &FrameConfig::default()).unwrap();
        assert!(frame.payload.is_empty());
    }
}
