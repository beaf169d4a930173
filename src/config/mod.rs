use crate::core::{AppError, Result};
use std::env;

pub mod database;
pub mod mail;
pub mod server;

pub use database::DatabaseConfig;
pub use mail::MailConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub mail: MailConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `json` switches the tracing formatter to JSON lines
    pub log_format: String,
    /// Origin allowed to call the API from the dashboard
    pub dashboard_origin: String,
    /// Printed on receipts and report documents
    pub institute_name: String,
    pub institute_address: String,
    pub institute_contact: String,
}

/// Scheduled report trigger settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Seconds between trigger sweeps
    pub sweep_interval_secs: u64,
    /// Attempts per email hand-off before the firing is recorded as failed
    pub delivery_attempts: u32,
    /// Pause between delivery attempts
    pub delivery_backoff_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 60,
            delivery_attempts: 3,
            delivery_backoff_ms: 2000,
        }
    }
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", key)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                dashboard_origin: env::var("DASHBOARD_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
                institute_name: env::var("INSTITUTE_NAME")
                    .unwrap_or_else(|_| "Training Center".to_string()),
                institute_address: env::var("INSTITUTE_ADDRESS").unwrap_or_default(),
                institute_contact: env::var("INSTITUTE_CONTACT").unwrap_or_default(),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            mail: MailConfig::from_env()?,
            scheduler: SchedulerConfig {
                enabled: env_parse("SCHEDULER_ENABLED", "true")?,
                sweep_interval_secs: env_parse("SCHEDULER_SWEEP_INTERVAL_SECS", "60")?,
                delivery_attempts: env_parse("SCHEDULER_DELIVERY_ATTEMPTS", "3")?,
                delivery_backoff_ms: env_parse("SCHEDULER_DELIVERY_BACKOFF_MS", "2000")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.sweep_interval_secs == 0 {
            return Err(AppError::Configuration(
                "Scheduler sweep interval must be greater than 0".to_string(),
            ));
        }

        if self.scheduler.delivery_attempts == 0 {
            return Err(AppError::Configuration(
                "Delivery attempts must be greater than 0".to_string(),
            ));
        }

        if self.mail.enabled && self.mail.from_address.trim().is_empty() {
            return Err(AppError::Configuration(
                "SMTP_FROM_ADDRESS is required when mail is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
