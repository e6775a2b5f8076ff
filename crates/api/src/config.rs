//! Server configuration sourced from the environment.
//!
//! Environment table:
//!
//! | Variable                     | Default        | Meaning                                    |
//! |------------------------------|----------------|--------------------------------------------|
//! | `DATABASE_URL`               | required       | Postgres connection string                 |
//! | `GLOW_BIND_ADDR`             | `0.0.0.0:8080` | Listen address                             |
//! | `GLOW_DB_MAX_CONNECTIONS`    | `20`           | Pool size                                  |
//! | `GLOW_JWT_SECRET`            | required       | HS256 signing secret for access tokens     |
//! | `GLOW_ACCESS_TOKEN_MINUTES`  | `15`           | Access token lifetime                      |
//! | `GLOW_REFRESH_TOKEN_DAYS`    | `30`           | Refresh token lifetime                     |
//! | `GLOW_MEDIA_ROOT`            | `./media`      | Directory for progress photo files         |
//! | `GLOW_CORS_ORIGINS`          | empty          | Comma-separated allowed origins            |
//! | `GLOW_SEEDER_INTERVAL_SECS`  | `300`          | Occurrence seeder cadence                  |
//! | `GLOW_SWEEP_INTERVAL_SECS`   | `300`          | Missed-status sweep cadence                |
//! | `GLOW_REQUEST_TIMEOUT_SECS`  | `30`           | Per-request timeout                        |
//!
//! Missing required variables abort startup; everything else falls back
//! to the defaults above.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub media_root: PathBuf,
    pub cors_origins: Vec<String>,
    pub seeder_interval_secs: u64,
    pub sweep_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Read configuration from the environment, panicking on missing or
    /// malformed required values. Called once at startup.
    pub fn from_env() -> Self {
        Self {
            bind_addr: parse_var("GLOW_BIND_ADDR", "0.0.0.0:8080"),
            database_url: required_var("DATABASE_URL"),
            db_max_connections: parse_var("GLOW_DB_MAX_CONNECTIONS", "20"),
            jwt_secret: required_var("GLOW_JWT_SECRET"),
            access_token_minutes: parse_var("GLOW_ACCESS_TOKEN_MINUTES", "15"),
            refresh_token_days: parse_var("GLOW_REFRESH_TOKEN_DAYS", "30"),
            media_root: PathBuf::from(string_var("GLOW_MEDIA_ROOT", "./media")),
            cors_origins: list_var("GLOW_CORS_ORIGINS"),
            seeder_interval_secs: parse_var("GLOW_SEEDER_INTERVAL_SECS", "300"),
            sweep_interval_secs: parse_var("GLOW_SWEEP_INTERVAL_SECS", "300"),
            request_timeout_secs: parse_var("GLOW_REQUEST_TIMEOUT_SECS", "30"),
        }
    }
}

fn required_var(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => panic!("{name} must be set"),
    }
}

fn string_var(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> T {
    let raw = string_var(name, default);
    match raw.parse() {
        Ok(value) => value,
        Err(_) => panic!("{name} has invalid value '{raw}'"),
    }
}

fn list_var(name: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
