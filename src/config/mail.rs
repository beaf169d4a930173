use crate::config::env_parse;
use crate::core::Result;
use std::env;

/// SMTP settings for scheduled report delivery
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        Ok(MailConfig {
            enabled: env_parse("SMTP_ENABLED", "false")?,
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env_parse("SMTP_PORT", "587")?,
            user: env::var("SMTP_USER").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Training Center Reports".to_string()),
            from_address: env::var("SMTP_FROM_ADDRESS").unwrap_or_default(),
        })
    }
}
