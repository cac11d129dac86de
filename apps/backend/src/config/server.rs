use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::game::GameOptions;
use crate::error::AppError;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How often the server pings each connection
    pub heartbeat_interval: Duration,
    /// Silence after which a connection is closed
    pub client_timeout: Duration,
    /// How long a fully disconnected player keeps its session alive
    pub inactivity_grace: Duration,
    /// Period of the background sweep for inactive sessions
    pub sweep_interval: Duration,
    /// Options for sessions created without explicit config
    pub default_game: GameOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            heartbeat_interval: Duration::from_secs(20),
            client_timeout: Duration::from_secs(40),
            inactivity_grace: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(30),
            default_game: GameOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset
    /// variables fall back to defaults; unparsable ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let game = defaults.default_game;

        let config = Self {
            host: lookup("BACKEND_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "BACKEND_PORT")?.unwrap_or(defaults.port),
            heartbeat_interval: secs_var(&lookup, "WS_HEARTBEAT_SECS")?
                .unwrap_or(defaults.heartbeat_interval),
            client_timeout: secs_var(&lookup, "WS_CLIENT_TIMEOUT_SECS")?
                .unwrap_or(defaults.client_timeout),
            inactivity_grace: secs_var(&lookup, "INACTIVITY_GRACE_SECS")?
                .unwrap_or(defaults.inactivity_grace),
            sweep_interval: secs_var(&lookup, "SWEEP_INTERVAL_SECS")?
                .unwrap_or(defaults.sweep_interval),
            default_game: GameOptions {
                board_size: parse_var(&lookup, "GAME_BOARD_SIZE")?,
                win_run_length: parse_var(&lookup, "GAME_WIN_RUN_LENGTH")?
                    .unwrap_or(game.win_run_length),
                max_players: parse_var(&lookup, "GAME_MAX_PLAYERS")?.unwrap_or(game.max_players),
                min_players: parse_var(&lookup, "GAME_MIN_PLAYERS")?.unwrap_or(game.min_players),
            }
            .sanitized(),
        };

        if config.heartbeat_interval.is_zero() || config.sweep_interval.is_zero() {
            return Err(AppError::config(
                "WS_HEARTBEAT_SECS and SWEEP_INTERVAL_SECS must be greater than zero",
            ));
        }
        if config.client_timeout <= config.heartbeat_interval {
            return Err(AppError::config(
                "WS_CLIENT_TIMEOUT_SECS must be greater than WS_HEARTBEAT_SECS",
            ));
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::config(format!("{name} has invalid value '{raw}': {e}"))),
    }
}

fn secs_var<F>(lookup: &F, name: &str) -> Result<Option<Duration>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<F, u64>(lookup, name)?.map(Duration::from_secs))
}
