//! Length-prefixed message framing for the venue wire protocol.
//!
//! Every message on the wire is framed as:
//! - A 2-byte little-endian payload length
//! - Exactly that many payload bytes
//!
//! The length header is the entire frame boundary: there is no magic number
//! and no channel id; upstream and downstream are separate TCP connections.

pub mod codec;
pub mod error;

pub use codec::{decode_frame, encode_frame, frame_len, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
