//! Tagged-union envelope codec for the venue wire protocol.
//!
//! Every frame payload is an envelope: a one-byte discriminator tag followed
//! by the variant's fields in fixed positional order. Integers are
//! little-endian, strings are a 2-byte little-endian length plus UTF-8 bytes,
//! booleans and enums are one byte. The field layout is part of the protocol
//! contract with the venue server and must not change.

pub mod envelope;
pub mod error;
pub mod types;

pub use envelope::{
    decode_message, encode_login_request, encode_message, encode_order,
    encode_token_bind_request, TAG_LOGIN_REQUEST, TAG_LOGIN_RESPONSE, TAG_ORDER, TAG_ORDER_STATUS,
    TAG_TICKER_PRICE, TAG_TOKEN_BIND_REQUEST,
};
pub use error::{Result, WireError};
pub use types::{
    LoginRequest, LoginResponse, Message, Order, OrderAction, OrderState, OrderStatus, TickerPrice,
    TokenBindRequest,
};
