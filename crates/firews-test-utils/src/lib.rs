//! Common test helpers and utilities for FireWS tests
//!
//! This crate provides:
//! - An in-process framed JSON server with RAII shutdown ([`MockServer`])
//! - A stateful handler that behaves like a small FireWS server ([`FakeFireWs`])
//! - Stream doubles for driving a client without sockets
//! - Condition-based waiting (no hardcoded sleeps)

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use firews_core::frame::{self, FrameConfig};
use firews_core::Error;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Master key [`FakeFireWs`] accepts for `registerNameSpace`
pub const FAKE_MASTER_KEY: &str = "master";

// ============================================================================
// Port Allocation
// ============================================================================

/// Find an available TCP port for testing
pub fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub fn wait_for<F>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check() {
            return true;
        }
        thread::sleep(interval);
    }
    check()
}

// ============================================================================
// Mock Server - RAII wrapper with proper cleanup
// ============================================================================

/// Request handler. Returning `None` closes the connection without a reply.
pub type Handler = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// A loopback framed JSON server that stops on drop.
///
/// Each accepted connection is served on its own thread; every decoded
/// request is recorded before its reply is written.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    connections: Arc<AtomicU32>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start a server answering with `handler`
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::start_with(Arc::new(handler), None)
    }

    /// Start a server that writes every reply in `write_chunk` byte pieces
    pub fn start_fragmented<F>(handler: F, write_chunk: usize) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::start_with(Arc::new(handler), Some(write_chunk.max(1)))
    }

    /// Start a server that replies with `responses` in order, then hangs up
    pub fn scripted(responses: Vec<Value>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::start(move |_| queue.lock().pop_front())
    }

    /// Start a server backed by a fresh [`FakeFireWs`]
    pub fn fake() -> Self {
        let fake = FakeFireWs::new();
        Self::start(move |request| Some(fake.handle(request)))
    }

    fn start_with(handler: Handler, write_chunk: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicU32::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = requests.clone();
            let connections = connections.clone();
            let shutdown = shutdown.clone();

            thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    let stream = match stream {
                        Ok(stream) => stream,
                        Err(e) => {
                            warn!("mock server accept failed: {}", e);
                            continue;
                        }
                    };

                    connections.fetch_add(1, Ordering::SeqCst);
                    let handler = handler.clone();
                    let requests = requests.clone();
                    thread::spawn(move || serve_connection(stream, handler, requests, write_chunk));
                }
            })
        };

        Self {
            addr,
            requests,
            connections,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Scheme-qualified address for `FireWs::connect`
    pub fn address(&self) -> String {
        format!("tcp://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// All requests received so far, across connections
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn connection_count(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` requests have been recorded
    pub fn wait_for_requests(&self, n: usize, max_wait: Duration) -> bool {
        wait_for(|| self.request_count() >= n, DEFAULT_CHECK_INTERVAL, max_wait)
    }

    /// Stop accepting connections (also happens on drop)
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.store(true, Ordering::SeqCst);
            // Wake the blocking accept
            let _ = TcpStream::connect(self.addr);
            let _ = handle.join();
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve_connection(
    mut stream: TcpStream,
    handler: Handler,
    requests: Arc<Mutex<Vec<Value>>>,
    write_chunk: Option<usize>,
) {
    let _ = stream.set_nodelay(true);
    let config = FrameConfig::default();

    loop {
        let request: Value = match frame::read_frame_with(&mut stream, &config) {
            Ok(request) => request,
            Err(Error::ConnectionClosed) => break,
            Err(e) => {
                warn!("mock server read failed: {}", e);
                break;
            }
        };
        debug!(%request, "mock server request");

        let response = handler(&request);
        requests.lock().push(request);

        let Some(response) = response else {
            break;
        };
        if let Err(e) = write_response(&mut stream, &response, write_chunk) {
            warn!("mock server write failed: {}", e);
            break;
        }
    }
}

fn write_response(stream: &mut TcpStream, response: &Value, write_chunk: Option<usize>) -> firews_core::Result<()> {
    let bytes = frame::encode_frame(response)?;
    match write_chunk {
        Some(chunk) => {
            for piece in bytes.chunks(chunk) {
                stream.write_all(piece)?;
                stream.flush()?;
            }
        }
        None => stream.write_all(&bytes)?,
    }
    Ok(())
}

// ============================================================================
// Fake FireWS - stateful handler
// ============================================================================

#[derive(Default)]
struct FakeState {
    /// namespace -> secret key
    namespaces: HashMap<String, String>,
    /// channel -> base state
    channels: HashMap<String, Value>,
    /// channel -> subscribed user ids
    members: HashMap<String, HashSet<String>>,
}

/// A minimal in-memory FireWS server.
///
/// Enough behavior for client tests: namespace registration (master key
/// [`FAKE_MASTER_KEY`]), auth, base state with `set`/`push`/`get`, private
/// channel membership and `channelInfo`. No auth is enforced on data calls.
#[derive(Default)]
pub struct FakeFireWs {
    state: Mutex<FakeState>,
}

impl FakeFireWs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer one decoded request
    pub fn handle(&self, request: &Value) -> Value {
        let mut state = self.state.lock();
        let channel = request["channel"].as_str().unwrap_or_default().to_string();
        let user_id = request["params"]["userId"].as_str().map(str::to_string);

        match request["action"].as_str().unwrap_or_default() {
            "registerNameSpace" => {
                let name = request["name"].as_str().unwrap_or_default();
                if request["key"] != FAKE_MASTER_KEY {
                    return failure("bad key", 403);
                }
                if state.namespaces.contains_key(name) {
                    return failure("namespace exists", 409);
                }
                let secret = format!("sk-{}", name);
                state.namespaces.insert(name.to_string(), secret.clone());
                json!({"success": true, "secretKey": secret})
            }
            "auth" => {
                let name = request["name"].as_str().unwrap_or_default();
                match state.namespaces.get(name) {
                    Some(secret) if request["sKey"] == secret.as_str() => json!({"success": true}),
                    _ => failure("auth failed", 401),
                }
            }
            "emit" => json!({"success": true}),
            "set" => {
                state.channels.insert(channel, request["data"].clone());
                json!({"success": true})
            }
            "push" => {
                let data = request["data"].clone();
                match state.channels.get_mut(&channel) {
                    Some(Value::Array(items)) => items.push(data),
                    Some(existing) => *existing = json!([existing.take(), data]),
                    None => {
                        state.channels.insert(channel, json!([data]));
                    }
                }
                json!({"success": true})
            }
            "get" => {
                let data = state.channels.get(&channel).cloned().unwrap_or(Value::Null);
                json!({"success": true, "data": data})
            }
            "subscribe" | "unsubscribe" => {
                let Some(user_id) = user_id else {
                    return failure("userId required", 400);
                };
                let members = state.members.entry(channel).or_default();
                if request["action"] == "subscribe" {
                    members.insert(user_id);
                } else {
                    members.remove(&user_id);
                }
                json!({"success": true})
            }
            "channelInfo" => {
                let subscribers = state.members.get(&channel).map_or(0, HashSet::len);
                let has_state = state.channels.contains_key(&channel);
                json!({
                    "success": true,
                    "channel": channel,
                    "subscribers": subscribers,
                    "hasState": has_state,
                })
            }
            other => failure(&format!("unknown action: {}", other), 400),
        }
    }
}

fn failure(reason: &str, code: i64) -> Value {
    json!({"success": false, "reason": reason, "code": code})
}

// ============================================================================
// Stream Doubles
// ============================================================================

/// In-memory stream: serves preloaded response frames, captures writes.
#[derive(Debug)]
pub struct MemoryStream {
    incoming: Cursor<Vec<u8>>,
    written: Vec<u8>,
    read_chunk: usize,
    read_calls: usize,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self {
            incoming: Cursor::new(Vec::new()),
            written: Vec::new(),
            read_chunk: usize::MAX,
            read_calls: 0,
        }
    }

    /// Preload one response frame per value
    pub fn with_responses(responses: &[Value]) -> Self {
        let mut stream = Self::new();
        for response in responses {
            stream.push_response(response);
        }
        stream
    }

    /// Hand out at most `read_chunk` bytes per read call
    pub fn fragmented(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk.max(1);
        self
    }

    pub fn push_response(&mut self, response: &Value) {
        let bytes = frame::encode_frame(response).unwrap();
        self.push_raw(&bytes);
    }

    /// Append raw bytes to the readable side
    pub fn push_raw(&mut self, bytes: &[u8]) {
        self.incoming.get_mut().extend_from_slice(bytes);
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Decode everything written so far as frames
    pub fn written_frames(&self) -> Vec<Value> {
        let mut cursor = Cursor::new(self.written.as_slice());
        let mut frames = Vec::new();
        while (cursor.position() as usize) < self.written.len() {
            frames.push(frame::read_frame(&mut cursor).unwrap());
        }
        frames
    }

    /// Unread bytes left on the readable side
    pub fn remaining(&self) -> usize {
        self.incoming.get_ref().len() - self.incoming.position() as usize
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls += 1;
        let limit = buf.len().min(self.read_chunk);
        self.incoming.read(&mut buf[..limit])
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A stream that panics on any I/O, for asserting a call stays local
#[derive(Debug, Default)]
pub struct UntouchableStream;

impl Read for UntouchableStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("stream was read");
    }
}

impl Write for UntouchableStream {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        panic!("stream was written");
    }

    fn flush(&mut self) -> io::Result<()> {
        panic!("stream was flushed");
    }
}
