use std::io::{ErrorKind, Read, Write};
use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;
use mio::net::TcpStream;
use mio::{Events, Interest, Poll, Token};
use tracing::debug;

use venuelink_frame::HEADER_SIZE;

use crate::error::{NetError, Result};

const CHANNEL_TOKEN: Token = Token(0);
const DRAIN_CHUNK_SIZE: usize = 64 * 1024;

/// Socket configuration applied at connect time.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// SO_SNDBUF size in bytes. `None` keeps the kernel default.
    pub send_buffer_size: Option<usize>,
    /// SO_RCVBUF size in bytes. `None` keeps the kernel default.
    pub recv_buffer_size: Option<usize>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: Some(10 * 1024 * 1024),
            recv_buffer_size: Some(10 * 1024 * 1024),
        }
    }
}

/// One non-blocking TCP connection with its own readiness poll.
///
/// Every I/O operation is bounded by a caller-supplied monotonic deadline.
/// I/O is always attempted first; the poll only runs after a would-block, so
/// edge-triggered wakeups cannot be lost.
pub struct TcpChannel {
    stream: TcpStream,
    poll: Poll,
    events: Events,
}

impl TcpChannel {
    /// Connect to `addr` and prepare the channel: apply socket buffer sizes,
    /// switch to non-blocking mode, register with a fresh poll instance.
    pub fn connect(addr: SocketAddr, config: &ChannelConfig) -> Result<Self> {
        let stream =
            std::net::TcpStream::connect(addr).map_err(|source| NetError::Connect { addr, source })?;

        let sock = socket2::SockRef::from(&stream);
        if let Some(size) = config.send_buffer_size {
            sock.set_send_buffer_size(size)
                .map_err(|source| NetError::Connect { addr, source })?;
        }
        if let Some(size) = config.recv_buffer_size {
            sock.set_recv_buffer_size(size)
                .map_err(|source| NetError::Connect { addr, source })?;
        }
        stream
            .set_nonblocking(true)
            .map_err(|source| NetError::Connect { addr, source })?;

        debug!(%addr, "connected tcp channel");
        Self::from_std(stream)
    }

    /// Wrap an already-connected stream. The stream must be (or is switched
    /// to) non-blocking before any I/O runs through the channel.
    pub fn from_std(stream: std::net::TcpStream) -> Result<Self> {
        stream.set_nonblocking(true)?;
        let mut stream = TcpStream::from_std(stream);

        let poll = Poll::new()?;
        poll.registry().register(
            &mut stream,
            CHANNEL_TOKEN,
            Interest::READABLE | Interest::WRITABLE,
        )?;

        Ok(Self {
            stream,
            poll,
            events: Events::with_capacity(4),
        })
    }

    /// Write the whole buffer, waiting for write-readiness between partial
    /// writes, bounded by `deadline`.
    pub fn send_deadline(&mut self, buf: &[u8], deadline: Instant) -> Result<()> {
        let mut sent = 0;
        while sent < buf.len() {
            match self.stream.write(&buf[sent..]) {
                Ok(0) => {
                    return Err(NetError::ConnectionClosed {
                        collected: sent,
                        expected: buf.len(),
                    })
                }
                Ok(n) => sent += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    self.wait_ready(Interest::WRITABLE, deadline, sent, buf.len())?;
                }
                Err(err) => return Err(NetError::Socket(err)),
            }
        }
        Ok(())
    }

    /// Collect exactly `n` bytes, tolerating arbitrary fragmentation, bounded
    /// by `deadline`. Never returns a short buffer: deadline expiry is
    /// `Timeout`, EOF short of `n` is `ConnectionClosed`.
    pub fn recv_exact(&mut self, n: usize, deadline: Instant) -> Result<Bytes> {
        let mut buf = vec![0u8; n];
        let mut collected = 0;
        while collected < n {
            match self.stream.read(&mut buf[collected..]) {
                Ok(0) => {
                    return Err(NetError::ConnectionClosed {
                        collected,
                        expected: n,
                    })
                }
                Ok(read) => collected += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    self.wait_ready(Interest::READABLE, deadline, collected, n)?;
                }
                Err(err) => return Err(NetError::Socket(err)),
            }
        }
        Ok(Bytes::from(buf))
    }

    /// Receive one complete frame: length header, then exactly that many
    /// payload bytes. All-or-nothing: a partial frame is never returned.
    pub fn recv_frame(&mut self, deadline: Instant) -> Result<Bytes> {
        let header = self.recv_exact(HEADER_SIZE, deadline)?;
        let payload_len = u16::from_le_bytes([header[0], header[1]]) as usize;
        self.recv_exact(payload_len, deadline)
    }

    /// Best-effort purge of all currently buffered inbound bytes, without
    /// parsing. Never waits: stops at would-block or EOF. Returns the number
    /// of bytes discarded.
    pub fn drain_and_discard(&mut self) -> Result<usize> {
        let mut scratch = [0u8; DRAIN_CHUNK_SIZE];
        let mut drained = 0;
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => return Ok(drained),
                Ok(n) => drained += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(drained),
                Err(err) => return Err(NetError::Socket(err)),
            }
        }
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.stream.peer_addr().map_err(NetError::Socket)
    }

    /// Block (readiness-polled, not spinning) until the socket reports the
    /// requested readiness or the deadline expires. `done`/`total` feed the
    /// timeout's progress report.
    fn wait_ready(
        &mut self,
        interest: Interest,
        deadline: Instant,
        done: usize,
        total: usize,
    ) -> Result<()> {
        loop {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Err(NetError::Timeout {
                    collected: done,
                    expected: total,
                });
            };

            match self.poll.poll(&mut self.events, Some(remaining)) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(NetError::Socket(err)),
            }

            for event in self.events.iter() {
                if event.token() != CHANNEL_TOKEN {
                    continue;
                }
                if event.is_error() {
                    let source = self
                        .stream
                        .take_error()
                        .ok()
                        .flatten()
                        .unwrap_or_else(|| std::io::Error::other("socket error condition"));
                    return Err(NetError::Socket(source));
                }
                // Closed-for-reading/-writing still counts as ready: the next
                // read/write attempt observes EOF or the reset directly.
                let ready = if interest.is_readable() {
                    event.is_readable() || event.is_read_closed()
                } else {
                    event.is_writable() || event.is_write_closed()
                };
                if ready {
                    return Ok(());
                }
            }
            // Spurious or foreign wakeup: the deadline check at the top of
            // the loop bounds the retry.
        }
    }
}

impl std::fmt::Debug for TcpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpChannel")
            .field("peer", &self.stream.peer_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    use bytes::BytesMut;
    use venuelink_frame::encode_frame;

    use super::*;

    fn listen() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn deadline_in(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[test]
    fn send_and_recv_frame_roundtrip() {
        let (listener, addr) = listen();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(&framed(b"tick")).unwrap();
            let mut received = [0u8; 6];
            std::io::Read::read_exact(&mut sock, &mut received).unwrap();
            received
        });

        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();

        let payload = channel.recv_frame(deadline_in(2_000)).unwrap();
        assert_eq!(payload.as_ref(), b"tick");

        channel.send_deadline(&framed(b"tock"), deadline_in(2_000)).unwrap();
        assert_eq!(&server.join().unwrap(), &framed(b"tock")[..]);
    }

    #[test]
    fn recv_frame_reconstructs_fragmented_delivery() {
        let (listener, addr) = listen();
        let wire = framed(b"fragmented-delivery");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            for byte in wire {
                sock.write_all(&[byte]).unwrap();
                sock.flush().unwrap();
                thread::sleep(Duration::from_millis(1));
            }
        });

        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();
        let payload = channel.recv_frame(deadline_in(5_000)).unwrap();
        assert_eq!(payload.as_ref(), b"fragmented-delivery");

        server.join().unwrap();
    }

    #[test]
    fn recv_times_out_without_data() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();
        let (_sock, _) = listener.accept().unwrap();

        let err = channel.recv_frame(deadline_in(50)).unwrap_err();
        assert!(matches!(
            err,
            NetError::Timeout {
                collected: 0,
                expected: HEADER_SIZE,
            }
        ));
    }

    #[test]
    fn recv_timeout_reports_partial_progress() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();

        let (mut sock, _) = listener.accept().unwrap();
        // One byte of the two-byte header, then silence.
        sock.write_all(&[0x04]).unwrap();
        sock.flush().unwrap();

        let err = channel.recv_frame(deadline_in(100)).unwrap_err();
        assert!(matches!(
            err,
            NetError::Timeout {
                collected: 1,
                expected: HEADER_SIZE,
            }
        ));
    }

    #[test]
    fn recv_distinguishes_closed_from_timeout() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();

        let (sock, _) = listener.accept().unwrap();
        drop(sock); // Peer shutdown before any bytes

        let err = channel.recv_frame(deadline_in(2_000)).unwrap_err();
        assert!(matches!(
            err,
            NetError::ConnectionClosed {
                collected: 0,
                expected: HEADER_SIZE,
            }
        ));
    }

    #[test]
    fn recv_closed_mid_frame_reports_progress() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();

        let (mut sock, _) = listener.accept().unwrap();
        let wire = framed(b"abcdef");
        sock.write_all(&wire[..4]).unwrap();
        sock.flush().unwrap();
        drop(sock);

        let err = channel.recv_frame(deadline_in(2_000)).unwrap_err();
        assert!(matches!(
            err,
            NetError::ConnectionClosed {
                collected: 2,
                expected: 6,
            }
        ));
    }

    #[test]
    fn drain_discards_buffered_bytes() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();

        let (mut sock, _) = listener.accept().unwrap();
        sock.write_all(&[0xAA; 1024]).unwrap();
        sock.flush().unwrap();

        // Give the bytes time to land in the receive buffer.
        thread::sleep(Duration::from_millis(50));

        let drained = channel.drain_and_discard().unwrap();
        assert_eq!(drained, 1024);

        // Nothing buffered now; the call never waits.
        let start = Instant::now();
        assert_eq!(channel.drain_and_discard().unwrap(), 0);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn recv_exact_zero_bytes_is_empty() {
        let (listener, addr) = listen();
        let mut channel = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap();
        let (_sock, _) = listener.accept().unwrap();

        let buf = channel.recv_exact(0, deadline_in(100)).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn connect_refused_reports_address() {
        // Bind then drop to get a port that refuses connections.
        let addr = {
            let (listener, addr) = listen();
            drop(listener);
            addr
        };

        let err = TcpChannel::connect(addr, &ChannelConfig::default()).unwrap_err();
        match err {
            NetError::Connect { addr: reported, .. } => assert_eq!(reported, addr),
            other => panic!("expected Connect error, got {other:?}"),
        }
    }

    #[test]
    fn keeps_kernel_defaults_when_unset() {
        let (listener, addr) = listen();
        let config = ChannelConfig {
            send_buffer_size: None,
            recv_buffer_size: None,
        };
        let channel = TcpChannel::connect(addr, &config).unwrap();
        let (_sock, _) = listener.accept().unwrap();
        assert_eq!(channel.peer_addr().unwrap(), addr);
    }

    #[test]
    fn from_std_accepts_server_side_stream() {
        let (listener, addr) = listen();
        let client = TcpStream::connect(addr).unwrap();
        let (accepted, _) = listener.accept().unwrap();

        let mut server_channel = TcpChannel::from_std(accepted).unwrap();
        let mut client_channel = TcpChannel::from_std(client).unwrap();

        server_channel
            .send_deadline(&framed(b"hello"), deadline_in(2_000))
            .unwrap();
        let payload = client_channel.recv_frame(deadline_in(2_000)).unwrap();
        assert_eq!(payload.as_ref(), b"hello");
    }
}
