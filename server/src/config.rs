use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

/// Relays session descriptions and connectivity candidates between peers in the same room
#[derive(Debug, Clone, Parser)]
#[command(name = "signaling-server", version)]
pub struct Config {
    /// Address to accept peer connections on
    #[arg(long, env = "SIGNALING_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to accept peer connections on
    #[arg(long, env = "SIGNALING_PORT", default_value_t = 3003)]
    pub port: u16,

    /// Log filter directives, e.g. `info` or `signaling_server=debug`
    #[arg(long, env = "SIGNALING_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["signaling-server"]).unwrap();

        assert_eq!(config.listen_addr(), "0.0.0.0:3003".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "signaling-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--log-filter",
            "debug",
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Config::try_parse_from(["signaling-server", "--port", "70000"]).is_err());
    }
}
