//! Deadline-bounded non-blocking TCP channel I/O.
//!
//! Sockets are placed in non-blocking mode and multiplexed with OS-level
//! readiness polling, so every operation is bounded by a caller-supplied
//! monotonic deadline instead of kernel-default blocking semantics. A full
//! send buffer or a slow peer surfaces as an explicit timeout, never an
//! indefinite stall.

pub mod channel;
pub mod error;

pub use channel::{ChannelConfig, TcpChannel};
pub use error::{NetError, Result};
