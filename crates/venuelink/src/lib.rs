//! Wire-protocol client toolkit for a trading venue.
//!
//! # Crate Structure
//!
//! - [`frame`] — Length-prefixed message framing
//! - [`wire`] — Tagged-union envelope codec over the domain records
//! - [`net`] — Deadline-bounded non-blocking TCP channel I/O
//! - [`client`] — Dual-channel session client with the login handshake

/// Re-export frame types.
pub mod frame {
    pub use venuelink_frame::*;
}

/// Re-export envelope codec and domain records.
pub mod wire {
    pub use venuelink_wire::*;
}

/// Re-export channel I/O types.
pub mod net {
    pub use venuelink_net::*;
}

/// Re-export session client types.
pub mod client {
    pub use venuelink_client::*;
}
