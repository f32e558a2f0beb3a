//! Server configuration.

use std::net::SocketAddr;

use thiserror::Error;

use notepool_prover::{ConfigError, ProverConfig};

const ENV_ADDR: &str = "NOTEPOOL_ADDR";

#[derive(Error, Debug)]
pub enum ServerConfigError {
    #[error("invalid NOTEPOOL_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    Prover(#[from] ConfigError),
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub prover: ProverConfig,
}

impl ServerConfig {
    /// `NOTEPOOL_ADDR` (default `0.0.0.0:3001`) plus the prover's variables.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let addr = match std::env::var(ENV_ADDR) {
            Ok(value) => parse_addr(value)?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3001)),
        };
        Ok(Self {
            addr,
            prover: ProverConfig::from_env()?,
        })
    }
}

fn parse_addr(value: String) -> Result<SocketAddr, ServerConfigError> {
    value
        .parse()
        .map_err(|source| ServerConfigError::InvalidAddr { value, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        let addr = parse_addr("127.0.0.1:8080".to_string()).unwrap();
        assert_eq!(addr.port(), 8080);

        let err = parse_addr("localhost".to_string()).unwrap_err();
        assert!(err.to_string().contains("NOTEPOOL_ADDR"));
    }
}
