//! Application configuration.
//!
//! Configuration is layered: a YAML file (default `config.yaml`, overridable
//! with `-f`/`ROSTERD_CONFIG`) is merged with `ROSTERD_`-prefixed environment
//! variables, where `__` separates nesting levels. For example
//! `ROSTERD_DATABASE__URL` overrides `database.url`.
//!
//! Every section has working defaults so a development instance starts from
//! an empty file; [`Config::validate`] catches the combinations that cannot
//! work (sessions without a secret key, a relative uploads path, etc.)
//! before the server binds.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ROSTERD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment
/// variables. All fields have sensible defaults defined in the `Default`
/// implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL where the application is reachable (e.g., "https://roster.example.com").
    /// Used for invite acceptance links, QR payloads, and uploaded-file URLs.
    pub public_url: Url,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required whenever native auth is enabled)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Email transport for invite and sign-in mails
    pub email: EmailConfig,
    /// Invite lifecycle configuration
    pub invites: InvitesConfig,
    /// Upload storage configuration
    pub storage: StorageConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3080,
            public_url: Url::parse("http://localhost:3080").expect("default public_url is valid"),
            database: DatabaseConfig::default(),
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            invites: InvitesConfig::default(),
            storage: StorageConfig::default(),
            enable_metrics: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string for the PostgreSQL database
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/rosterd".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Individual pool configuration with all SQLx parameters.
///
/// These settings control connection pool behavior for optimal performance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
}

impl Default for PoolSettings {
    /// Production defaults: balanced for reliability and resource usage
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600, // 10 minutes
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Native email/password authentication
    pub native: NativeAuthConfig,
    /// Security settings (JWT, CORS)
    pub security: SecurityConfig,
}

/// Native email/password authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeAuthConfig {
    /// Enable native authentication (login / set-password)
    pub enabled: bool,
    /// Password validation rules
    pub password: PasswordConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
}

impl Default for NativeAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            password: PasswordConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("Strict", "Lax", or "None")
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            cookie_secure: false,
            cookie_same_site: "Lax".to_string(),
        }
    }
}

/// Security configuration for JWT and CORS.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// JWT token expiry duration
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 60 * 60), // 1 day
            cors: CorsConfig::default(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allow_credentials: true,
            max_age: None,
        }
    }
}

/// A CORS origin: either a specific URL or the wildcard.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    Url(Url),
    Wildcard(WildcardOrigin),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum WildcardOrigin {
    #[serde(rename = "*")]
    Any,
}

/// Email configuration for invite and sign-in mails.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
// Note: Cannot use deny_unknown_fields here due to #[serde(flatten)] on transport
pub struct EmailConfig {
    /// Email transport method
    #[serde(flatten)]
    pub transport: EmailTransportConfig,
    /// Sender email address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransportConfig::File {
                path: "./emails".to_string(),
            },
            from_email: "noreply@localhost".to_string(),
            from_name: "Roster".to_string(),
        }
    }
}

/// Email transport configuration - either SMTP or file-based for development.
///
/// The file transport is also the development fallback for invite delivery:
/// the acceptance URL is returned to the admin UI directly, so a missing SMTP
/// server never blocks onboarding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmailTransportConfig {
    /// Send emails via SMTP server
    Smtp {
        /// SMTP server hostname
        host: String,
        /// SMTP server port
        port: u16,
        /// SMTP authentication username
        username: String,
        /// SMTP authentication password
        password: String,
        /// Use TLS encryption
        use_tls: bool,
    },
    /// Write emails to files (for development/testing)
    File {
        /// Directory path where email files will be written
        path: String,
    },
}

/// Invite lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvitesConfig {
    /// How long invite tokens are valid. The expiry is fixed at creation
    /// time; changing this setting never affects tokens already issued.
    #[serde(with = "humantime_serde")]
    pub token_duration: Duration,
    /// How many invites the admin listing returns
    pub recent_limit: i64,
}

impl Default for InvitesConfig {
    fn default() -> Self {
        Self {
            token_duration: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            recent_limit: 20,
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory where uploaded files are written. Served back under `/files`.
    pub uploads_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("ROSTERD_").split("__"))
    }

    /// Get the address to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.native.enabled && self.secret_key.is_none() {
            anyhow::bail!("secret_key is required when native authentication is enabled");
        }

        if self.auth.native.password.min_length > self.auth.native.password.max_length {
            anyhow::bail!("password min_length must not exceed max_length");
        }

        if self.invites.recent_limit <= 0 {
            anyhow::bail!("invites.recent_limit must be positive");
        }

        match self.auth.native.session.cookie_same_site.as_str() {
            "Strict" | "Lax" | "None" => {}
            other => anyhow::bail!("unsupported SameSite value: {other}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let mut config = Config::default();
        config.secret_key = Some("secret".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_native_auth_requires_secret_key() {
        let config = Config::default();
        assert!(config.auth.native.enabled);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
port: 4000
secret_key: file-secret
invites:
  token_duration: 7days
  recent_limit: 50
"#,
            )?;
            jail.set_env("ROSTERD_PORT", "5000");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            // Env beats file, file beats default
            assert_eq!(config.port, 5000);
            assert_eq!(config.secret_key.as_deref(), Some("file-secret"));
            assert_eq!(config.invites.recent_limit, 50);
            assert_eq!(config.invites.token_duration, Duration::from_secs(7 * 24 * 60 * 60));
            Ok(())
        });
    }

    #[test]
    fn test_email_transport_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
secret_key: s
email:
  type: smtp
  host: mail.example.com
  port: 587
  username: roster
  password: hunter2
  use_tls: true
"#,
            )?;

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            match config.email.transport {
                EmailTransportConfig::Smtp { ref host, port, use_tls, .. } => {
                    assert_eq!(host, "mail.example.com");
                    assert_eq!(port, 587);
                    assert!(use_tls);
                }
                _ => panic!("expected SMTP transport"),
            }
            Ok(())
        });
    }

    #[test]
    fn test_invalid_same_site_rejected() {
        let mut config = Config::default();
        config.secret_key = Some("secret".into());
        config.auth.native.session.cookie_same_site = "Sideways".to_string();
        assert!(config.validate().is_err());
    }
}
