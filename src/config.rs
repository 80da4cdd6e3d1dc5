//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{AccountId, Amount, InvalidAccountId};

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    ListenAddr {
        /// Offending value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
    /// `ASSET_TREASURY` is blank or names a custody account.
    #[error("invalid ASSET_TREASURY: {0}")]
    Treasury(#[from] InvalidAccountId),
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Account seeded with the in-memory asset's initial supply.
    pub asset_treasury: AccountId,

    /// Initial supply credited to `asset_treasury`.
    pub asset_treasury_supply: Amount,

    /// Log output format.
    pub log_format: LogFormat,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LISTEN_ADDR` is set but cannot be
    /// parsed, or if `ASSET_TREASURY` is blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::ListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let asset_treasury = AccountId::new(
            lookup("ASSET_TREASURY")
                .unwrap_or_else(|| "0x0000000000000000000000000000000000000001".to_string()),
        )
        .map_err(ConfigError::Treasury)?;

        Ok(Self {
            listen_addr,
            event_bus_capacity: parse_or(&lookup, "EVENT_BUS_CAPACITY", 10_000),
            asset_treasury,
            asset_treasury_supply: parse_or(&lookup, "ASSET_TREASURY_SUPPLY", 1_000_000_000_000_000),
            log_format: lookup("LOG_FORMAT")
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or_default(),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)),
        })
    }
}

/// Parses a key as `T`, returning `default` on missing or invalid values.
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
