use bytes::{BufMut, Bytes, BytesMut};

use venuelink_frame::{encode_frame, frame_len};

use crate::error::{Result, WireError};
use crate::types::{
    LoginRequest, LoginResponse, Message, Order, OrderAction, OrderState, OrderStatus, TickerPrice,
    TokenBindRequest,
};

/// Discriminator tags. Tag 0 is reserved and never valid on the wire.
pub const TAG_LOGIN_REQUEST: u8 = 1;
pub const TAG_TOKEN_BIND_REQUEST: u8 = 2;
pub const TAG_LOGIN_RESPONSE: u8 = 3;
pub const TAG_ORDER: u8 = 4;
pub const TAG_ORDER_STATUS: u8 = 5;
pub const TAG_TICKER_PRICE: u8 = 6;

const MAX_STRING: usize = u16::MAX as usize;

/// Encode a message as a complete wire frame.
///
/// The returned buffer is contiguous and socket-ready: length header first,
/// then the envelope (tag + fields in positional order).
pub fn encode_message(msg: &Message) -> Result<Bytes> {
    let mut payload = BytesMut::with_capacity(64);

    match msg {
        Message::LoginRequest(m) => {
            payload.put_u8(TAG_LOGIN_REQUEST);
            put_str(&mut payload, "name", &m.name)?;
            put_str(&mut payload, "password", &m.password)?;
        }
        Message::TokenBindRequest(m) => {
            payload.put_u8(TAG_TOKEN_BIND_REQUEST);
            payload.put_u64_le(m.token);
        }
        Message::LoginResponse(m) => {
            payload.put_u8(TAG_LOGIN_RESPONSE);
            payload.put_u64_le(m.token);
            payload.put_u8(m.ok as u8);
            put_str(&mut payload, "error", &m.error)?;
        }
        Message::Order(m) => {
            payload.put_u8(TAG_ORDER);
            payload.put_u32_le(m.id);
            payload.put_u64_le(m.created);
            put_str(&mut payload, "ticker", &m.ticker)?;
            payload.put_u32_le(m.quantity);
            payload.put_u32_le(m.price);
            payload.put_u8(m.action as u8);
        }
        Message::OrderStatus(m) => {
            payload.put_u8(TAG_ORDER_STATUS);
            payload.put_u32_le(m.order_id);
            payload.put_u64_le(m.timestamp);
            payload.put_u32_le(m.quantity);
            payload.put_u32_le(m.fill_price);
            payload.put_u8(m.state as u8);
        }
        Message::TickerPrice(m) => {
            payload.put_u8(TAG_TICKER_PRICE);
            put_str(&mut payload, "ticker", &m.ticker)?;
            payload.put_u32_le(m.price);
        }
    }

    let mut framed = BytesMut::with_capacity(frame_len(payload.len()));
    encode_frame(&payload, &mut framed)?;
    Ok(framed.freeze())
}

/// Encode a framed `LoginRequest`.
pub fn encode_login_request(name: &str, password: &str) -> Result<Bytes> {
    encode_message(&Message::LoginRequest(LoginRequest {
        name: name.to_string(),
        password: password.to_string(),
    }))
}

/// Encode a framed `TokenBindRequest`.
pub fn encode_token_bind_request(token: u64) -> Result<Bytes> {
    encode_message(&Message::TokenBindRequest(TokenBindRequest { token }))
}

/// Encode a framed `Order`.
pub fn encode_order(order: &Order) -> Result<Bytes> {
    encode_message(&Message::Order(order.clone()))
}

/// Decode one envelope from a frame payload.
///
/// The payload must contain exactly one envelope: an unknown tag is an error,
/// never a default variant, and leftover bytes after the variant's fields are
/// an error as well.
pub fn decode_message(payload: &[u8]) -> Result<Message> {
    let mut buf = payload;
    let tag = take_u8(&mut buf)?;

    let msg = match tag {
        TAG_LOGIN_REQUEST => Message::LoginRequest(LoginRequest {
            name: take_str(&mut buf, "name")?,
            password: take_str(&mut buf, "password")?,
        }),
        TAG_TOKEN_BIND_REQUEST => Message::TokenBindRequest(TokenBindRequest {
            token: take_u64(&mut buf)?,
        }),
        TAG_LOGIN_RESPONSE => Message::LoginResponse(LoginResponse {
            token: take_u64(&mut buf)?,
            ok: take_bool(&mut buf, "ok")?,
            error: take_str(&mut buf, "error")?,
        }),
        TAG_ORDER => Message::Order(Order {
            id: take_u32(&mut buf)?,
            created: take_u64(&mut buf)?,
            ticker: take_str(&mut buf, "ticker")?,
            quantity: take_u32(&mut buf)?,
            price: take_u32(&mut buf)?,
            action: take_enum(&mut buf, "action", OrderAction::from_wire)?,
        }),
        TAG_ORDER_STATUS => Message::OrderStatus(OrderStatus {
            order_id: take_u32(&mut buf)?,
            timestamp: take_u64(&mut buf)?,
            quantity: take_u32(&mut buf)?,
            fill_price: take_u32(&mut buf)?,
            state: take_enum(&mut buf, "state", OrderState::from_wire)?,
        }),
        TAG_TICKER_PRICE => Message::TickerPrice(TickerPrice {
            ticker: take_str(&mut buf, "ticker")?,
            price: take_u32(&mut buf)?,
        }),
        other => return Err(WireError::UnknownTag(other)),
    };

    if !buf.is_empty() {
        return Err(WireError::TrailingBytes { count: buf.len() });
    }

    Ok(msg)
}

fn put_str(dst: &mut BytesMut, field: &'static str, value: &str) -> Result<()> {
    if value.len() > MAX_STRING {
        return Err(WireError::FieldTooLong {
            field,
            len: value.len(),
            max: MAX_STRING,
        });
    }
    dst.put_u16_le(value.len() as u16);
    dst.put_slice(value.as_bytes());
    Ok(())
}

fn need(buf: &[u8], n: usize) -> Result<()> {
    if buf.len() < n {
        return Err(WireError::Truncated {
            needed: n - buf.len(),
            remaining: buf.len(),
        });
    }
    Ok(())
}

fn take_u8(buf: &mut &[u8]) -> Result<u8> {
    need(buf, 1)?;
    let value = buf[0];
    *buf = &buf[1..];
    Ok(value)
}

fn take_u16(buf: &mut &[u8]) -> Result<u16> {
    need(buf, 2)?;
    let value = u16::from_le_bytes(buf[..2].try_into().unwrap());
    *buf = &buf[2..];
    Ok(value)
}

fn take_u32(buf: &mut &[u8]) -> Result<u32> {
    need(buf, 4)?;
    let value = u32::from_le_bytes(buf[..4].try_into().unwrap());
    *buf = &buf[4..];
    Ok(value)
}

fn take_u64(buf: &mut &[u8]) -> Result<u64> {
    need(buf, 8)?;
    let value = u64::from_le_bytes(buf[..8].try_into().unwrap());
    *buf = &buf[8..];
    Ok(value)
}

fn take_bool(buf: &mut &[u8], field: &'static str) -> Result<bool> {
    match take_u8(buf)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(WireError::BadEnum { field, value }),
    }
}

fn take_enum<T>(buf: &mut &[u8], field: &'static str, from_wire: fn(u8) -> Option<T>) -> Result<T> {
    let value = take_u8(buf)?;
    from_wire(value).ok_or(WireError::BadEnum { field, value })
}

fn take_str(buf: &mut &[u8], field: &'static str) -> Result<String> {
    let len = take_u16(buf)? as usize;
    need(buf, len)?;
    let (head, rest) = buf.split_at(len);
    *buf = rest;
    String::from_utf8(head.to_vec()).map_err(|_| WireError::BadUtf8 { field })
}
