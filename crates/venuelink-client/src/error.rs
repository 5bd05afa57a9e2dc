use std::fmt;

use crate::client::SessionState;

/// Which half of the login handshake failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Credentials presented on the upstream channel.
    UpstreamAuth,
    /// Token bound on the downstream channel.
    DownstreamBind,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeStep::UpstreamAuth => f.write_str("upstream authentication"),
            HandshakeStep::DownstreamBind => f.write_str("downstream token bind"),
        }
    }
}

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Channel I/O error.
    #[error("channel error: {0}")]
    Net(#[from] venuelink_net::NetError),

    /// Envelope encode/decode error.
    #[error("wire error: {0}")]
    Wire(#[from] venuelink_wire::WireError),

    /// The venue rejected credentials or the token bind.
    /// `detail` carries the server-supplied error verbatim.
    #[error("{step} rejected: {detail}")]
    AuthenticationFailed {
        step: HandshakeStep,
        detail: String,
    },

    /// The operation is not allowed in the session's current state.
    #[error("{operation} not allowed in {state:?} state")]
    NotReady {
        state: SessionState,
        operation: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
