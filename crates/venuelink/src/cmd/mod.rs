use std::net::IpAddr;
use std::time::Duration;

use clap::{Args, Subcommand};
use venuelink_client::{ClientConfig, VenueClient};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod login;
pub mod order;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect and run the login handshake, then print the session summary.
    Login(LoginArgs),
    /// Submit one order and await its downstream status reports.
    Order(OrderArgs),
    /// Stream downstream messages until interrupted.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Login(args) => login::run(args, format),
        Command::Order(args) => order::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Trader account name.
    #[arg(long)]
    pub name: String,
    /// Trader account password.
    #[arg(long, env = "VENUELINK_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Venue host.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,
    /// Upstream (command) channel port.
    #[arg(long, default_value_t = 8080)]
    pub up_port: u16,
    /// Downstream (market data) channel port.
    #[arg(long, default_value_t = 8081)]
    pub down_port: u16,
    /// Budget for each handshake response (e.g. 5s, 500ms).
    #[arg(long, default_value = "2s")]
    pub login_timeout: String,
}

impl SessionArgs {
    pub fn config(&self) -> CliResult<ClientConfig> {
        Ok(ClientConfig {
            host: self.host,
            upstream_port: self.up_port,
            downstream_port: self.down_port,
            login_timeout: parse_duration(&self.login_timeout)?,
            ..ClientConfig::default()
        })
    }

    /// Connect both channels and run the handshake.
    pub fn open_session(&self) -> CliResult<VenueClient> {
        let mut client = VenueClient::new(self.config()?);
        client
            .connect()
            .map_err(|err| client_error("connect failed", err))?;
        client
            .login(&self.name, &self.password)
            .map_err(|err| client_error("login failed", err))?;
        Ok(client)
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Order id.
    #[arg(long)]
    pub id: u32,
    /// Instrument ticker.
    #[arg(long)]
    pub ticker: String,
    /// Order quantity.
    #[arg(long)]
    pub quantity: u32,
    /// Limit price.
    #[arg(long)]
    pub price: u32,
    /// Order side.
    #[arg(long, value_enum)]
    pub action: ActionArg,
    /// Downstream status reports to await before exiting.
    #[arg(long, default_value_t = 1)]
    pub await_statuses: usize,
    /// Budget for each awaited status (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub recv_timeout: String,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum ActionArg {
    Buy,
    Sell,
}

impl From<ActionArg> for venuelink_wire::OrderAction {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::Buy => venuelink_wire::OrderAction::Buy,
            ActionArg::Sell => venuelink_wire::OrderAction::Sell,
        }
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
