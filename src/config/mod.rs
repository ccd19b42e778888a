use serde::Deserialize;
use thiserror::Error;

// Main configuration container, grouped by concern
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub booking: BookingConfig,
}

// Application / HTTP server settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_seconds: u64,
}

// Redis settings. No URL means the cache is disabled.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub ttl_seconds: u64,
    /// Seat maps change with every booking, so they live much shorter.
    pub showtime_ttl_seconds: u64,
}

// Booking transaction and seat map defaults
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub max_retries: u32,
    pub default_rows: u32,
    pub default_seats_per_row: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Flat view of the process environment, one field per variable.
#[derive(Debug, Deserialize)]
struct EnvVars {
    host: String,
    port: u16,
    environment: String,
    rust_log: String,
    log_format: LogFormat,
    database_url: String,
    db_pool_size: u32,
    db_acquire_timeout_seconds: u64,
    redis_url: Option<String>,
    cache_ttl_seconds: u64,
    showtime_cache_ttl_seconds: u64,
    booking_max_retries: u32,
    default_rows: u32,
    default_seats_per_row: u32,
}

impl Config {
    /// Reads the configuration from the environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("environment", "development")?
            .set_default("rust_log", "cinema_booking=debug,tower_http=debug")?
            .set_default("log_format", "text")?
            .set_default("db_pool_size", 20)?
            .set_default("db_acquire_timeout_seconds", 5)?
            .set_default("cache_ttl_seconds", 3600)?
            .set_default("showtime_cache_ttl_seconds", 30)?
            .set_default("booking_max_retries", 3)?
            .set_default("default_rows", 10)?
            .set_default("default_seats_per_row", 10)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        let vars: EnvVars = source.try_deserialize()?;
        Self::from_vars(vars)
    }

    fn from_vars(vars: EnvVars) -> Result<Self, ConfigError> {
        if vars.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid("DATABASE_URL must be set".to_string()));
        }
        if vars.db_pool_size == 0 {
            return Err(ConfigError::Invalid("DB_POOL_SIZE must be > 0".to_string()));
        }
        if vars.showtime_cache_ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "SHOWTIME_CACHE_TTL_SECONDS must be > 0".to_string(),
            ));
        }
        if !(1..=crate::seat_map::MAX_ROWS).contains(&vars.default_rows) {
            return Err(ConfigError::Invalid(format!(
                "DEFAULT_ROWS must be between 1 and {}",
                crate::seat_map::MAX_ROWS
            )));
        }
        if !(1..=crate::seat_map::MAX_SEATS_PER_ROW).contains(&vars.default_seats_per_row) {
            return Err(ConfigError::Invalid(format!(
                "DEFAULT_SEATS_PER_ROW must be between 1 and {}",
                crate::seat_map::MAX_SEATS_PER_ROW
            )));
        }

        Ok(Config {
            app: AppConfig {
                host: vars.host,
                port: vars.port,
                environment: vars.environment,
                rust_log: vars.rust_log,
                log_format: vars.log_format,
            },
            database: DatabaseConfig {
                url: vars.database_url,
                pool_size: vars.db_pool_size,
                acquire_timeout_seconds: vars.db_acquire_timeout_seconds,
            },
            redis: RedisConfig {
                url: vars.redis_url.filter(|url| !url.trim().is_empty()),
                ttl_seconds: vars.cache_ttl_seconds,
                showtime_ttl_seconds: vars.showtime_cache_ttl_seconds,
            },
            booking: BookingConfig {
                max_retries: vars.booking_max_retries,
                default_rows: vars.default_rows,
                default_seats_per_row: vars.default_seats_per_row,
            },
        })
    }
}
