//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Auth token configuration.
    pub auth: AuthConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Email (SMTP) configuration. Absent = log-only dispatch.
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Escalation workflow configuration.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Auth token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing JWTs.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploaded complaint files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

/// SMTP email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// From address for outgoing mail.
    pub from_address: String,
    /// From display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Escalation workflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// Days a complaint may stay unresolved before auto-escalation.
    #[serde(default = "default_auto_escalate_days")]
    pub auto_escalate_after_days: i64,
    /// Days an escalation may stay active before a reminder goes out.
    #[serde(default = "default_reminder_days")]
    pub reminder_after_days: i64,
    /// Interval between sweep runs, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Target selection strategy name, e.g. `SUPERADMIN_ONLY`.
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            auto_escalate_after_days: default_auto_escalate_days(),
            reminder_after_days: default_reminder_days(),
            sweep_interval_secs: default_sweep_interval(),
            strategy: default_strategy(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_token_ttl() -> i64 {
    86_400
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "ResolveIT".to_string()
}

const fn default_auto_escalate_days() -> i64 {
    3
}

const fn default_reminder_days() -> i64 {
    2
}

const fn default_sweep_interval() -> u64 {
    86_400
}

fn default_strategy() -> String {
    "SUPERADMIN_ONLY".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `RESOLVEIT_ENV`)
    /// 3. Environment variables with `RESOLVEIT_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("RESOLVEIT_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RESOLVEIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RESOLVEIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_defaults() {
        let cfg = EscalationConfig::default();
        assert_eq!(cfg.auto_escalate_after_days, 3);
        assert_eq!(cfg.reminder_after_days, 2);
        assert_eq!(cfg.sweep_interval_secs, 86_400);
        assert_eq!(cfg.strategy, "SUPERADMIN_ONLY");
    }

    #[test]
    fn test_storage_default_dir() {
        assert_eq!(StorageConfig::default().upload_dir, "uploads");
    }
}
