//! Test configuration builders for creating settings programmatically

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use registrar::config::{EngineSettings, Mode, TaskSettings};
use registrar::scheduler::WindowOptions;
use registrar::session::Credentials;

use super::mock_portal::MockPortalServer;
use super::test_data::*;

/// Engine settings pointing at the mock portal, with fast timings
pub fn engine_settings(portal: &MockPortalServer) -> EngineSettings {
    EngineSettings {
        endpoints: portal.endpoints(),
        window: WindowOptions {
            heartbeat_interval: Duration::from_millis(50),
            recheck_delay: Duration::from_millis(10),
            max_checks: 5,
            ..WindowOptions::default()
        },
        watch_poll_interval: Duration::from_millis(10),
    }
}

pub fn task_settings(mode: Mode, crns: &[&str], drop_crns: &[&str], webhook_url: &str) -> TaskSettings {
    TaskSettings {
        term: TEST_TERM.to_string(),
        subject: "MATH".to_string(),
        mode,
        crns: strings(crns),
        drop_crns: strings(drop_crns),
        registration_time: None,
        credentials: Credentials {
            username: TEST_USERNAME.to_string(),
            password: TEST_PASSWORD.to_string(),
        },
        webhook_url: webhook_url.to_string(),
    }
}

/// Builder writing `main.toml` (and optionally `credentials.toml`) to a temp dir
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_toml: String,
    credentials_toml: Option<String>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_toml: String::new(),
            credentials_toml: None,
        }
    }

    pub fn with_main(mut self, main_toml: &str) -> Self {
        self.main_toml = main_toml.to_string();
        self
    }

    pub fn with_credentials(mut self, credentials_toml: &str) -> Self {
        self.credentials_toml = Some(credentials_toml.to_string());
        self
    }

    /// Build and write config files to the temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), &self.main_toml).expect("Failed to write main.toml");
        if let Some(credentials) = &self.credentials_toml {
            fs::write(config_dir.join("credentials.toml"), credentials)
                .expect("Failed to write credentials.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Written configuration; the directory lives as long as this value
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_string(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
