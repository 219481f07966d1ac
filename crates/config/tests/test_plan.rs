//! Test plan for the `nexus-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use nexus_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "NEXUS_CONFIG",
    "NEXUS__AUTH__JWT_SECRET",
    "NEXUS__AUTH__TOKEN_TTL_SECONDS",
    "NEXUS__AUTH__RESET_TOKEN_TTL_SECONDS",
    "NEXUS__DATABASE__MAX_CONNECTIONS",
    "NEXUS__DATABASE__URL",
    "NEXUS__EMAIL__API_KEY",
    "NEXUS__EMAIL__APP_URL",
    "NEXUS__EMAIL__BASE_URL",
    "NEXUS__EMAIL__FROM_ADDRESS",
    "NEXUS__HTTP__ADDRESS",
    "NEXUS__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(config.auth.jwt_secret, defaults.auth.jwt_secret);
    assert_eq!(config.auth.token_ttl_seconds, defaults.auth.token_ttl_seconds);
    assert_eq!(config.email.api_key, defaults.email.api_key);
    assert_eq!(config.email.from_address, defaults.email.from_address);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "nexusconnect.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/nexusconnect.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "nexusconnect.toml",
        r#"
        [http]
        port = 8181

        [database]
        max_connections = 50

        [email]
        api_key = "re_test_key"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.http.port, 8181);
    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.email.api_key.as_deref(), Some("re_test_key"));
    assert_eq!(config.email.app_url, defaults.email.app_url);
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "nexusconnect.toml",
        r#"
        [http]
        port = 8181
        "#,
    );

    ctx.set_var("NEXUS__HTTP__PORT", "9191");
    ctx.set_var("NEXUS__AUTH__JWT_SECRET", "env-secret");
    ctx.set_var("NEXUS__EMAIL__APP_URL", "https://app.example.com");

    let config = load().expect("configuration load should apply env overrides");
    assert_eq!(config.http.port, 9191);
    assert_eq!(config.auth.jwt_secret, "env-secret");
    assert_eq!(config.email.app_url, "https://app.example.com");
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [database]
        url = "sqlite://custom.db"
        "#,
    );

    let explicit = temp_dir.path().join("elsewhere/custom.toml");
    ctx.set_var("NEXUS_CONFIG", explicit.to_string_lossy());

    let config = load().expect("configuration load should honour NEXUS_CONFIG");
    assert_eq!(config.database.url, "sqlite://custom.db");
}
