use std::fmt;

use serde::Serialize;

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderAction {
    Buy = 0,
    Sell = 1,
}

impl OrderAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderAction::Buy => "buy",
            OrderAction::Sell => "sell",
        }
    }

    pub(crate) fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderAction::Buy),
            1 => Some(OrderAction::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state reported by the venue for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderState {
    Accepted = 0,
    Rejected = 1,
    Cancelled = 2,
    Filled = 3,
    PartiallyFilled = 4,
}

impl OrderState {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Accepted => "accepted",
            OrderState::Rejected => "rejected",
            OrderState::Cancelled => "cancelled",
            OrderState::Filled => "filled",
            OrderState::PartiallyFilled => "partially-filled",
        }
    }

    pub(crate) fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderState::Accepted),
            1 => Some(OrderState::Rejected),
            2 => Some(OrderState::Cancelled),
            3 => Some(OrderState::Filled),
            4 => Some(OrderState::PartiallyFilled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials presented on the upstream channel.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub name: String,
    /// Credential material; redacted in debug output.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("name", &self.name)
            .field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            )
            .finish()
    }
}

/// Venue response to a login or a token bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub token: u64,
    pub ok: bool,
    pub error: String,
}

/// Binds the downstream channel to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBindRequest {
    pub token: u64,
}

/// A new order submitted on the upstream channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: u32,
    pub created: u64,
    pub ticker: String,
    pub quantity: u32,
    pub price: u32,
    pub action: OrderAction,
}

/// Order lifecycle notification delivered downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatus {
    pub order_id: u32,
    pub timestamp: u64,
    pub quantity: u32,
    pub fill_price: u32,
    pub state: OrderState,
}

/// Market data tick delivered downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerPrice {
    pub ticker: String,
    pub price: u32,
}

/// The closed set of messages that can travel inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
    LoginRequest(LoginRequest),
    TokenBindRequest(TokenBindRequest),
    LoginResponse(LoginResponse),
    Order(Order),
    OrderStatus(OrderStatus),
    TickerPrice(TickerPrice),
}

impl Message {
    /// Short variant name for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Message::LoginRequest(_) => "LoginRequest",
            Message::TokenBindRequest(_) => "TokenBindRequest",
            Message::LoginResponse(_) => "LoginResponse",
            Message::Order(_) => "Order",
            Message::OrderStatus(_) => "OrderStatus",
            Message::TickerPrice(_) => "TickerPrice",
        }
    }
}
