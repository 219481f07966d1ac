use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "nexusconnect.toml",
    "config/nexusconnect.toml",
    "crates/config/nexusconnect.toml",
    "../nexusconnect.toml",
    "../config/nexusconnect.toml",
    "../crates/config/nexusconnect.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 9002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://nexusconnect.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_reset_token_ttl")]
    pub reset_token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "default_secret_change_in_production".to_string(),
            token_ttl_seconds: Self::default_token_ttl(),
            reset_token_ttl_seconds: Self::default_reset_token_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_token_ttl() -> u64 {
        86_400
    }

    fn default_reset_token_ttl() -> u64 {
        3_600
    }
}

/// Settings for the transactional email provider. When `api_key` is absent
/// the mailer runs in disabled mode and only logs what it would have sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "EmailConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "EmailConfig::default_from_address")]
    pub from_address: String,
    /// Public URL of the web application, used for deep links in emails.
    #[serde(default = "EmailConfig::default_app_url")]
    pub app_url: String,
}

impl EmailConfig {
    fn default_base_url() -> String {
        "https://api.resend.com".to_string()
    }

    fn default_from_address() -> String {
        "onboarding@resend.dev".to_string()
    }

    fn default_app_url() -> String {
        "http://localhost:9002".to_string()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            from_address: Self::default_from_address(),
            app_url: Self::default_app_url(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use nexus_config::load;
///
/// std::env::remove_var("NEXUS_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let db_max = defaults.database.max_connections as i64;
    let token_ttl = clamp_to_i64(defaults.auth.token_ttl_seconds);
    let reset_ttl = clamp_to_i64(defaults.auth.reset_token_ttl_seconds);

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default("database.max_connections", db_max)
        .unwrap()
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())
        .unwrap()
        .set_default("auth.token_ttl_seconds", token_ttl)
        .unwrap()
        .set_default("auth.reset_token_ttl_seconds", reset_ttl)
        .unwrap()
        .set_default("email.base_url", defaults.email.base_url.clone())
        .unwrap()
        .set_default("email.from_address", defaults.email.from_address.clone())
        .unwrap()
        .set_default("email.app_url", defaults.email.app_url.clone())
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("NEXUS").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("NEXUS_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via NEXUS_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

fn clamp_to_i64(value: u64) -> i64 {
    if value > i64::MAX as u64 {
        i64::MAX
    } else {
        value as i64
    }
}
