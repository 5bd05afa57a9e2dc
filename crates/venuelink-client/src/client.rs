use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use venuelink_net::TcpChannel;
use venuelink_wire::{
    decode_message, encode_login_request, encode_message, encode_token_bind_request, Message, Order,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, HandshakeStep, Result};

/// Session lifecycle.
///
/// `Failed` absorbs any handshake or protocol failure; the client does not
/// re-login automatically. Recover by calling `close()` and connecting again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    UpstreamAuthenticated,
    Ready,
    Failed,
}

/// A dual-channel venue session.
///
/// Owns both sockets and the session token exclusively. No state is shared
/// between client instances, so independent clients may be driven from
/// separate threads without coordination.
pub struct VenueClient {
    config: ClientConfig,
    upstream: Option<TcpChannel>,
    downstream: Option<TcpChannel>,
    token: Option<u64>,
    state: SessionState,
}

impl VenueClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            upstream: None,
            downstream: None,
            token: None,
            state: SessionState::Disconnected,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The token issued at login, once the upstream step has completed.
    pub fn token(&self) -> Option<u64> {
        self.token
    }

    /// Open both channels. On failure the client stays `Disconnected` and
    /// `connect` may be retried; any half-open channel is released.
    pub fn connect(&mut self) -> Result<()> {
        self.require_state(SessionState::Disconnected, "connect")?;

        let upstream = TcpChannel::connect(self.config.upstream_addr(), &self.config.channel)?;
        let downstream = TcpChannel::connect(self.config.downstream_addr(), &self.config.channel)?;

        self.upstream = Some(upstream);
        self.downstream = Some(downstream);
        self.state = SessionState::Connected;
        info!(
            upstream = %self.config.upstream_addr(),
            downstream = %self.config.downstream_addr(),
            "connected both session channels"
        );
        Ok(())
    }

    /// Run the two-step login handshake.
    ///
    /// The steps are strictly ordered: the downstream bind carries the token
    /// issued by the upstream step, so it is never attempted until upstream
    /// authentication has succeeded. Any failure in either step is fatal to
    /// the session.
    pub fn login(&mut self, name: &str, password: &str) -> Result<()> {
        self.require_state(SessionState::Connected, "login")?;

        let token = match self.authenticate_upstream(name, password) {
            Ok(token) => token,
            Err(err) => {
                warn!(name, "upstream authentication failed");
                self.state = SessionState::Failed;
                return Err(err);
            }
        };
        self.state = SessionState::UpstreamAuthenticated;
        self.token = Some(token);

        if let Err(err) = self.bind_downstream(token) {
            warn!(name, "downstream token bind failed");
            self.state = SessionState::Failed;
            return Err(err);
        }

        self.state = SessionState::Ready;
        info!(name, "session ready");
        Ok(())
    }

    /// Send a message on the upstream (command) channel.
    pub fn send_upstream(&mut self, msg: &Message) -> Result<()> {
        self.require_state(SessionState::Ready, "send_upstream")?;
        let buf = encode_message(msg)?;
        let deadline = Instant::now() + self.config.send_timeout;
        channel(&mut self.upstream, self.state, "send_upstream")?.send_deadline(&buf, deadline)?;
        Ok(())
    }

    /// Send a message on the downstream channel.
    pub fn send_downstream(&mut self, msg: &Message) -> Result<()> {
        self.require_state(SessionState::Ready, "send_downstream")?;
        let buf = encode_message(msg)?;
        let deadline = Instant::now() + self.config.send_timeout;
        channel(&mut self.downstream, self.state, "send_downstream")?
            .send_deadline(&buf, deadline)?;
        Ok(())
    }

    /// Submit an order on the upstream channel.
    pub fn send_order(&mut self, order: &Order) -> Result<()> {
        self.send_upstream(&Message::Order(order.clone()))
    }

    /// Receive and decode one message from the upstream channel.
    pub fn receive_upstream(&mut self, timeout: Duration) -> Result<Message> {
        self.require_state(SessionState::Ready, "receive_upstream")?;
        let deadline = Instant::now() + timeout;
        let frame = channel(&mut self.upstream, self.state, "receive_upstream")?
            .recv_frame(deadline)?;
        Ok(decode_message(&frame)?)
    }

    /// Receive and decode one message from the downstream channel.
    pub fn receive_downstream(&mut self, timeout: Duration) -> Result<Message> {
        self.require_state(SessionState::Ready, "receive_downstream")?;
        let deadline = Instant::now() + timeout;
        let frame = channel(&mut self.downstream, self.state, "receive_downstream")?
            .recv_frame(deadline)?;
        Ok(decode_message(&frame)?)
    }

    /// Purge any buffered downstream bytes without parsing them. Never
    /// waits. Deliberately desynchronizes the channel; cleanup use only.
    pub fn drain_downstream(&mut self) -> Result<usize> {
        let drained =
            channel(&mut self.downstream, self.state, "drain_downstream")?.drain_and_discard()?;
        if drained > 0 {
            debug!(drained, "discarded buffered downstream bytes");
        }
        Ok(drained)
    }

    /// Release both sockets. Idempotent: closing an already-closed client is
    /// a no-op, never an error.
    pub fn close(&mut self) {
        if self.upstream.is_some() || self.downstream.is_some() {
            debug!("closing session channels");
        }
        self.upstream = None;
        self.downstream = None;
        self.token = None;
        self.state = SessionState::Disconnected;
    }

    fn authenticate_upstream(&mut self, name: &str, password: &str) -> Result<u64> {
        debug!(name, "authenticating upstream channel");
        let request = encode_login_request(name, password)?;
        let send_deadline = Instant::now() + self.config.send_timeout;
        let recv_timeout = self.config.login_timeout;

        let upstream = channel(&mut self.upstream, self.state, "login")?;
        upstream.send_deadline(&request, send_deadline)?;

        let frame = upstream.recv_frame(Instant::now() + recv_timeout)?;
        match decode_message(&frame)? {
            Message::LoginResponse(resp) if resp.ok => Ok(resp.token),
            Message::LoginResponse(resp) => Err(ClientError::AuthenticationFailed {
                step: HandshakeStep::UpstreamAuth,
                detail: resp.error,
            }),
            other => Err(ClientError::AuthenticationFailed {
                step: HandshakeStep::UpstreamAuth,
                detail: format!("unexpected {} response", other.name()),
            }),
        }
    }

    fn bind_downstream(&mut self, token: u64) -> Result<()> {
        debug!(token, "binding downstream channel");
        let request = encode_token_bind_request(token)?;
        let send_deadline = Instant::now() + self.config.send_timeout;
        let recv_timeout = self.config.login_timeout;

        let downstream = channel(&mut self.downstream, self.state, "login")?;
        downstream.send_deadline(&request, send_deadline)?;

        let frame = downstream.recv_frame(Instant::now() + recv_timeout)?;
        match decode_message(&frame)? {
            Message::LoginResponse(resp) if resp.ok => Ok(()),
            Message::LoginResponse(resp) => Err(ClientError::AuthenticationFailed {
                step: HandshakeStep::DownstreamBind,
                detail: resp.error,
            }),
            other => Err(ClientError::AuthenticationFailed {
                step: HandshakeStep::DownstreamBind,
                detail: format!("unexpected {} response", other.name()),
            }),
        }
    }

    fn require_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(ClientError::NotReady {
                state: self.state,
                operation,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for VenueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueClient")
            .field("state", &self.state)
            .field("token", &self.token.map(|_| "<issued>"))
            .finish()
    }
}

fn channel<'a>(
    slot: &'a mut Option<TcpChannel>,
    state: SessionState,
    operation: &'static str,
) -> Result<&'a mut TcpChannel> {
    slot.as_mut()
        .ok_or(ClientError::NotReady { state, operation })
}
