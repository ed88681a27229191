//! Network configuration shared by the drone and operator binaries.
//!
//! Deliberately the smallest thing that can turn
//! `<operator_ip> <operator_tcp_port> <drone_ip> <flight_ctrl_udp_port>`
//! into validated types — no flags, no `clap`, just positional parsing
//! shared between both binaries so they agree on what's valid.

use crate::error::SharedError;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// The four positional values both binaries take on their command line.
#[derive(Debug, Clone, Copy)]
pub struct NetConfig {
    pub operator_ip: Ipv4Addr,
    pub operator_tcp_port: u16,
    pub drone_ip: Ipv4Addr,
    pub flight_ctrl_udp_port: u16,
}

impl NetConfig {
    /// Parse `<operator_ip> <operator_tcp_port> <drone_ip> <flight_ctrl_udp_port>`
    /// from a slice of argument strings (i.e. `&args[1..]`, with `argv[0]`
    /// already stripped).
    pub fn parse(args: &[String]) -> Result<Self, SharedError> {
        if args.len() != 4 {
            return Err(SharedError::ArgumentCount {
                expected: 4,
                got: args.len(),
            });
        }

        Ok(Self {
            operator_ip: parse_ipv4(&args[0])?,
            operator_tcp_port: parse_port(&args[1])?,
            drone_ip: parse_ipv4(&args[2])?,
            flight_ctrl_udp_port: parse_port(&args[3])?,
        })
    }
}

fn parse_ipv4(s: &str) -> Result<Ipv4Addr, SharedError> {
    Ipv4Addr::from_str(s).map_err(|_| SharedError::InvalidAddress(s.to_string()))
}

fn parse_port(s: &str) -> Result<u16, SharedError> {
    u16::from_str(s).map_err(|_| SharedError::InvalidPort(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_well_formed_arguments() {
        let cfg = NetConfig::parse(&args(&["127.0.0.1", "7878", "127.0.0.2", "7879"])).unwrap();
        assert_eq!(cfg.operator_ip, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(cfg.operator_tcp_port, 7878);
        assert_eq!(cfg.drone_ip, Ipv4Addr::new(127, 0, 0, 2));
        assert_eq!(cfg.flight_ctrl_udp_port, 7879);
    }

    #[test]
    fn rejects_wrong_argument_count() {
        assert!(matches!(
            NetConfig::parse(&args(&["127.0.0.1"])),
            Err(SharedError::ArgumentCount { expected: 4, got: 1 })
        ));
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(matches!(
            NetConfig::parse(&args(&["not-an-ip", "1", "127.0.0.2", "2"])),
            Err(SharedError::InvalidAddress(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(matches!(
            NetConfig::parse(&args(&["127.0.0.1", "99999", "127.0.0.2", "2"])),
            Err(SharedError::InvalidPort(_))
        ));
    }
}
