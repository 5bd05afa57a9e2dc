use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use venuelink_net::ChannelConfig;

/// Session endpoints and operation budgets.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Venue host.
    pub host: IpAddr,
    /// Upstream (command) channel port.
    pub upstream_port: u16,
    /// Downstream (market data / fills) channel port.
    pub downstream_port: u16,
    /// Receive budget for each handshake response.
    pub login_timeout: Duration,
    /// Send budget for any outbound message.
    pub send_timeout: Duration,
    /// Socket-level configuration applied to both channels.
    pub channel: ChannelConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            upstream_port: 8080,
            downstream_port: 8081,
            login_timeout: Duration::from_secs(2),
            send_timeout: Duration::from_secs(5),
            channel: ChannelConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Upstream channel endpoint.
    pub fn upstream_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.upstream_port)
    }

    /// Downstream channel endpoint.
    pub fn downstream_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.downstream_port)
    }
}
