use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Engine tuning knobs: timers, sweeps and bidding limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Time a seat has to act; `None` disables turn timers.
    pub turn_timeout: Option<Duration>,
    /// Grace period for a disconnected seat before it is abandoned.
    pub abandon_timeout: Duration,
    /// How long an offline session survives before the sweep drops it.
    pub session_ttl: Duration,
    pub nav_token_ttl: Duration,
    pub sweep_interval: Duration,
    /// Redeals allowed before the opening seat is forced to be landlord.
    pub max_redeals: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Some(Duration::from_secs(30)),
            abandon_timeout: Duration::from_secs(60),
            session_ttl: Duration::from_secs(300),
            nav_token_ttl: Duration::from_secs(30),
            sweep_interval: Duration::from_millis(1000),
            max_redeals: 3,
        }
    }
}

impl EngineConfig {
    /// Read `LANDLORD_*` variables, falling back to defaults when unset.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let turn_secs = parse_var(&lookup, "LANDLORD_TURN_TIMEOUT_SECS", 30u64)?;
        let turn_timeout = (turn_secs > 0).then(|| Duration::from_secs(turn_secs));

        let abandon_timeout = parse_var(
            &lookup,
            "LANDLORD_ABANDON_TIMEOUT_SECS",
            defaults.abandon_timeout.as_secs(),
        )
        .map(Duration::from_secs)?;
        let session_ttl = parse_var(
            &lookup,
            "LANDLORD_SESSION_TTL_SECS",
            defaults.session_ttl.as_secs(),
        )
        .map(Duration::from_secs)?;
        let nav_token_ttl = parse_var(
            &lookup,
            "LANDLORD_NAV_TOKEN_TTL_SECS",
            defaults.nav_token_ttl.as_secs(),
        )
        .map(Duration::from_secs)?;

        let sweep_ms = parse_var(&lookup, "LANDLORD_SWEEP_INTERVAL_MS", 1000u64)?;
        if sweep_ms == 0 {
            return Err(AppError::config(
                "LANDLORD_SWEEP_INTERVAL_MS must be greater than zero",
            ));
        }

        let max_redeals = parse_var(&lookup, "LANDLORD_MAX_REDEALS", defaults.max_redeals)?;

        Ok(Self {
            turn_timeout,
            abandon_timeout,
            session_ttl,
            nav_token_ttl,
            sweep_interval: Duration::from_millis(sweep_ms),
            max_redeals,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}
