//! Server Configuration
//!
//! Runtime settings read from the environment (and `.env`). Gameplay tuning
//! is not configurable here; see `game::tuning`.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::TICK_RATE;

/// Wall-clock period of one simulation tick.
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Per-connection outbound queue length.
    pub outbound_buffer: usize,
    /// Session input queue length.
    pub inbound_buffer: usize,
    /// Seed for ball serves; clock based when unset.
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 64,
            outbound_buffer: 64,
            inbound_buffer: 1024,
            rng_seed: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but does not parse.
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: parse_var(&lookup, "ARENA_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            max_connections: parse_var(&lookup, "ARENA_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            outbound_buffer: positive(parse_var(&lookup, "ARENA_OUTBOUND_BUFFER")?, "ARENA_OUTBOUND_BUFFER")?
                .unwrap_or(defaults.outbound_buffer),
            inbound_buffer: positive(parse_var(&lookup, "ARENA_INBOUND_BUFFER")?, "ARENA_INBOUND_BUFFER")?
                .unwrap_or(defaults.inbound_buffer),
            rng_seed: parse_var(&lookup, "ARENA_RNG_SEED")?,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

// Channel capacities must be non-zero
fn positive(value: Option<usize>, name: &'static str) -> Result<Option<usize>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Invalid { name, value: "0".to_string() }),
        other => Ok(other),
    }
}
