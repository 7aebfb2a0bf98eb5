//! Line-delimited JSON controller over TCP.
//!
//! One connection per command: the request is written as a single JSON line
//! and the controller answers with a single JSON line. The whole exchange is
//! bounded by the caller's deadline: every read and write syscall gets only
//! what is left of it, so a controller that trickles its reply cannot hold
//! the call open. The controller address is resolved once, up front.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};

use super::{DriveRequest, DriveResponse, MotionController};
use crate::motion::DispatchError;

/// Longest reply line accepted from a controller.
pub const MAX_REPLY_BYTES: usize = 4096;

/// TCP motion controller client.
#[derive(Clone, Debug)]
pub struct TcpController {
    addr: SocketAddr,
}

impl TcpController {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Resolve a `host:port` pair once. Name lookups block, so they happen
    /// here rather than inside the bounded call.
    pub fn resolve(addr: &str) -> anyhow::Result<Self> {
        let resolved = addr
            .to_socket_addrs()
            .with_context(|| format!("failed to resolve controller address {}", addr))?
            .next()
            .ok_or_else(|| anyhow!("no address found for controller {}", addr))?;
        Ok(Self::new(resolved))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl MotionController for TcpController {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn call(
        &mut self,
        request: &DriveRequest,
        timeout: Duration,
    ) -> Result<DriveResponse, DispatchError> {
        let deadline = Deadline::new(timeout);

        let stream = TcpStream::connect_timeout(&self.addr, deadline.remaining()?)
            .map_err(|e| deadline.io_error("connect", e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| deadline.io_error("configure", e))?;

        let mut line = serde_json::to_vec(request)
            .map_err(|e| DispatchError::Transport(format!("encode request: {e}")))?;
        line.push(b'\n');
        write_request(&stream, &line, &deadline)?;

        let reply = read_reply(&stream, &deadline)?;
        DriveResponse::parse(&reply)
    }
}

fn write_request(
    mut stream: &TcpStream,
    mut buf: &[u8],
    deadline: &Deadline,
) -> Result<(), DispatchError> {
    while !buf.is_empty() {
        stream
            .set_write_timeout(Some(deadline.remaining()?))
            .map_err(|e| deadline.io_error("configure", e))?;
        match stream.write(buf) {
            Ok(0) => {
                return Err(DispatchError::Transport(
                    "write: controller stopped accepting data".into(),
                ))
            }
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(deadline.io_error("write", e)),
        }
    }
    Ok(())
}

/// Read one reply line, re-arming the socket timeout before every read.
fn read_reply(mut stream: &TcpStream, deadline: &Deadline) -> Result<String, DispatchError> {
    let mut reply = Vec::with_capacity(128);
    let mut chunk = [0u8; 512];
    loop {
        stream
            .set_read_timeout(Some(deadline.remaining()?))
            .map_err(|e| deadline.io_error("configure", e))?;
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(deadline.io_error("read", e)),
        };
        if n == 0 {
            if reply.is_empty() {
                return Err(DispatchError::Transport(
                    "controller closed the connection without a response".into(),
                ));
            }
            break;
        }
        let newline = chunk[..n].iter().position(|&b| b == b'\n');
        reply.extend_from_slice(&chunk[..newline.unwrap_or(n)]);
        if reply.len() > MAX_REPLY_BYTES {
            return Err(DispatchError::Transport(format!(
                "controller response exceeds {MAX_REPLY_BYTES} bytes"
            )));
        }
        if newline.is_some() {
            break;
        }
    }
    String::from_utf8(reply)
        .map_err(|e| DispatchError::Transport(format!("response is not UTF-8: {e}")))
}

struct Deadline {
    timeout: Duration,
    at: Instant,
}

impl Deadline {
    fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            at: Instant::now() + timeout,
        }
    }

    fn remaining(&self) -> Result<Duration, DispatchError> {
        let left = self.at.saturating_duration_since(Instant::now());
        // zero is rejected by connect_timeout and means "block forever" for socket timeouts
        if left.is_zero() {
            return Err(self.expired());
        }
        Ok(left)
    }

    fn expired(&self) -> DispatchError {
        DispatchError::Timeout {
            after: self.timeout,
        }
    }

    fn io_error(&self, op: &str, err: io::Error) -> DispatchError {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => self.expired(),
            _ => DispatchError::Transport(format!("{op}: {err}")),
        }
    }
}
