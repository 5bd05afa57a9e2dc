use std::fmt;
use std::io;

use venuelink_client::ClientError;
use venuelink_net::NetError;
use venuelink_wire::WireError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const AUTH_REJECTED: i32 = 75;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn net_error(context: &str, err: NetError) -> CliError {
    let code = match &err {
        NetError::Connect { .. } | NetError::ConnectionClosed { .. } => FAILURE,
        NetError::Timeout { .. } => TIMEOUT,
        NetError::Socket(source) => match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
            _ => TRANSPORT_ERROR,
        },
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Net(err) => net_error(context, err),
        ClientError::Wire(err) => wire_error(context, err),
        ClientError::AuthenticationFailed { .. } => {
            CliError::new(AUTH_REJECTED, format!("{context}: {err}"))
        }
        ClientError::NotReady { .. } => CliError::new(USAGE, format!("{context}: {err}")),
    }
}
