//! Process configuration read from the environment

use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

use crate::middleware::Credentials;
use crate::routes::RouterOptions;

const DEFAULT_ADDR: &str = ":8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not provided")]
    Missing(&'static str),

    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    /// Address in `host:port` form, ready to bind
    pub addr: String,
    pub request_timeout: Duration,
    /// Credentials guarding the task routes, when auth is switched on
    pub auth: Option<Credentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &'static str| non_empty(name).ok_or(ConfigError::Missing(name));

        let db_user = required("DBUSER")?;
        let db_password = required("DBPASSWORD")?;
        let db_name = required("DBNAME")?;

        let addr = normalize_addr(&non_empty("ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()))?;

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidValue {
                    name: "REQUEST_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let auth = if env_flag(lookup("REQUIRE_AUTH"), false) {
            let defaults = Credentials::default();
            Some(Credentials::new(
                non_empty("AUTH_USER").unwrap_or(defaults.username),
                non_empty("AUTH_PASSWORD").unwrap_or(defaults.password),
            ))
        } else {
            None
        };

        Ok(Self {
            db_user,
            db_password,
            db_name,
            addr,
            request_timeout,
            auth,
        })
    }

    /// Connection options for the task database
    ///
    /// Host and port are left to the driver defaults (and the standard `PG*`
    /// variables it honours).
    pub fn pg_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            request_timeout: self.request_timeout,
            auth: self.auth.clone(),
        }
    }
}

fn env_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

/// Accepts `host:port` as well as the bare `:port` shorthand for all interfaces
fn normalize_addr(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let (host, port) = raw
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::InvalidAddr(raw.to_string()))?;
    if port.parse::<u16>().is_err() {
        return Err(ConfigError::InvalidAddr(raw.to_string()));
    }

    if host.is_empty() {
        Ok(format!("0.0.0.0:{}", port))
    } else {
        Ok(raw.to_string())
    }
}
