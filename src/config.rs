use crate::utils::error::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

/// Runtime settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub seed_sample_data: bool,
    pub recent_bookings_limit: usize,
    pub admin: Option<AdminBootstrap>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 3)?,
            }),
            _ => {
                info!("DATABASE_URL not set, using the in-memory store");
                None
            }
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::ConfigError("JWT_SECRET must be set".into()))?;

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminBootstrap { username, password }),
            _ => None,
        };

        Ok(AppConfig {
            database,
            jwt_secret,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            seed_sample_data: parse_or("SEED_SAMPLE_DATA", true)?,
            recent_bookings_limit: parse_or("RECENT_BOOKINGS_LIMIT", 10)?,
            admin,
        })
    }

    /// In-memory settings with a fixed secret, used by tests and demos.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        AppConfig {
            database: None,
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_sample_data: false,
            recent_bookings_limit: 10,
            admin: None,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_and_rejects_garbage() {
        env::remove_var("SMART_PARKING_TEST_UNSET");
        assert_eq!(parse_or("SMART_PARKING_TEST_UNSET", 7u32).unwrap(), 7);

        env::set_var("SMART_PARKING_TEST_LIMIT", " 25 ");
        assert_eq!(parse_or("SMART_PARKING_TEST_LIMIT", 10usize).unwrap(), 25);

        env::set_var("SMART_PARKING_TEST_FLAG", "maybe");
        let err = parse_or("SMART_PARKING_TEST_FLAG", true).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
