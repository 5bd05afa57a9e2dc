use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: payload length (2 bytes, little-endian).
pub const HEADER_SIZE: usize = 2;

/// Maximum payload size expressible by the 16-bit length header.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Total wire size of a frame carrying `payload_len` payload bytes.
pub fn frame_len(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬──────────────────┐
/// │ Length      │ Payload          │
/// │ (2B LE)     │ (Length bytes)   │
/// └─────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u16_le(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `None` if the buffer doesn't contain a complete frame yet.
/// On success, consumes exactly the frame's bytes from the buffer, never
/// fewer, never more.
pub fn decode_frame(src: &mut BytesMut) -> Option<Bytes> {
    if src.len() < HEADER_SIZE {
        return None; // Need more data
    }

    let payload_len = u16::from_le_bytes([src[0], src[1]]) as usize;

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return None; // Need more data
    }

    src.advance(HEADER_SIZE);
    Some(src.split_to(payload_len).freeze())
}
