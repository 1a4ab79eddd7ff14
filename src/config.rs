//! Environment-based Configuration for the Payout Worker
//!
//! All sensitive values (store credential, treasury key) MUST come from
//! environment variables, never from hardcoded values.
//!
//! # Required Environment Variables
//!
//! - `STORE_URL` - Request store base URL
//! - `STORE_SERVICE_KEY` - Request store service credential
//! - `TREASURY_PRIVATE_KEY` - Base58-encoded treasury keypair
//!
//! # Optional Settings
//!
//! - `SOLANA_RPC_URL` - Ledger RPC endpoint (default: mainnet-beta)
//! - `TOKEN_TO_SOL_RATE` - Internal token to SOL conversion rate
//! - `MIN_WITHDRAWAL_SOL` - Minimum payout per request, in SOL
//! - `MAX_WITHDRAWAL_SOL` - Maximum payout per request, in SOL
//! - `POLL_INTERVAL_SECS` - Seconds between store polls
//! - `LOG_LEVEL` - Logging level (debug, info, warn, error)
//! - `LOG_JSON` - Set to "1" for JSON log output

use std::env;
use std::str::FromStr;

use solana_sdk::signature::Keypair;
use thiserror::Error;

/// Default Solana RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid treasury key: {0}")]
    InvalidTreasuryKey(String),
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Request store base URL
    pub store_url: String,

    /// Request store service credential
    pub store_service_key: String,

    /// Solana RPC endpoint
    pub solana_rpc_url: String,

    /// Base58-encoded treasury keypair. Kept private so the secret cannot
    /// leak through field access outside this module.
    treasury_private_key: String,

    /// Internal token to SOL conversion rate
    pub token_to_sol_rate: f64,

    /// Minimum payout per request, in SOL
    pub min_withdrawal_sol: f64,

    /// Maximum payout per request, in SOL
    pub max_withdrawal_sol: f64,

    /// Seconds between store polls
    pub poll_interval_secs: u64,

    /// Log level
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url = required("STORE_URL")?;
        let store_service_key = required("STORE_SERVICE_KEY")?;
        let treasury_private_key = required("TREASURY_PRIVATE_KEY")?;

        let solana_rpc_url =
            env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let token_to_sol_rate = parsed("TOKEN_TO_SOL_RATE", 0.000_001)?;
        let min_withdrawal_sol = parsed("MIN_WITHDRAWAL_SOL", 0.01)?;
        let max_withdrawal_sol = parsed("MAX_WITHDRAWAL_SOL", 1.0)?;
        let poll_interval_secs = parsed("POLL_INTERVAL_SECS", 30)?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("LOG_JSON").map(|v| v == "1").unwrap_or(false);

        let config = Self {
            store_url,
            store_service_key,
            solana_rpc_url,
            treasury_private_key,
            token_to_sol_rate,
            min_withdrawal_sol,
            max_withdrawal_sol,
            poll_interval_secs,
            log_level,
            log_json,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.treasury_private_key.is_empty() {
            return Err(ConfigError::MissingEnvVar(
                "TREASURY_PRIVATE_KEY".to_string(),
            ));
        }
        if !(self.token_to_sol_rate > 0.0) {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TO_SOL_RATE".to_string(),
                "must be positive".to_string(),
            ));
        }
        if self.min_withdrawal_sol < 0.0 || self.max_withdrawal_sol < self.min_withdrawal_sol {
            return Err(ConfigError::InvalidValue(
                "MAX_WITHDRAWAL_SOL".to_string(),
                "bounds must satisfy 0 <= min <= max".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Decode the treasury keypair from its base58 form.
    ///
    /// Called once at startup; a failure here is fatal.
    pub fn treasury_keypair(&self) -> Result<Keypair, ConfigError> {
        let bytes = bs58::decode(&self.treasury_private_key)
            .into_vec()
            .map_err(|e| ConfigError::InvalidTreasuryKey(e.to_string()))?;
        Keypair::try_from(bytes.as_slice())
            .map_err(|e| ConfigError::InvalidTreasuryKey(e.to_string()))
    }
}

/// Get a required env var
fn required(var_name: &str) -> Result<String, ConfigError> {
    match env::var(var_name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(var_name.to_string())),
    }
}

/// Get an optional env var, parsed; present-but-invalid is fatal
fn parsed<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var_name) {
        Ok(raw) => raw.parse().map_err(|_| {
            ConfigError::InvalidValue(var_name.to_string(), format!("cannot parse {:?}", raw))
        }),
        Err(_) => Ok(default),
    }
}
