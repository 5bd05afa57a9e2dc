use std::net::SocketAddr;

/// Errors that can occur in channel I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to establish the TCP connection.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The deadline elapsed before the operation completed.
    /// Carries how far the operation got (bytes moved of bytes expected).
    #[error("deadline elapsed ({collected}/{expected} bytes)")]
    Timeout { collected: usize, expected: usize },

    /// The peer closed the connection before the operation completed.
    #[error("connection closed by peer ({collected}/{expected} bytes)")]
    ConnectionClosed { collected: usize, expected: usize },

    /// An I/O error reported by the socket.
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NetError>;
