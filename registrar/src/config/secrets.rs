//! Credentials loader for portal logins and webhook URLs.
//!
//! Credentials live in a separate TOML file (config/credentials.toml) that
//! should be excluded from version control. Every value can also be given
//! through the environment, which wins over the file, which wins over the
//! value written inline in a task.
//!
//! Example credentials.toml:
//! ```toml
//! username = "20123456"
//! password = "hunter2"
//! webhook = "https://hooks.example.com/registrar"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::TaskConfig;
use crate::constants::defaults::{PASSWORD_ENV, USERNAME_ENV, WEBHOOK_ENV};
use crate::session::Credentials;

/// Structure matching the credentials.toml file format
#[derive(Debug, Deserialize, Default)]
pub struct CredentialsFile {
    pub username: Option<String>,
    pub password: Option<String>,
    pub webhook: Option<String>,
}

/// Credentials and webhook resolved for one task
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    pub webhook_url: String,
}

pub struct CredentialsLoader {
    file: CredentialsFile,
}

impl CredentialsLoader {
    /// Load the credentials file. Returns an empty loader if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Credentials file not found at {:?}, relying on environment and inline values",
                path
            );
            return Ok(Self::from_file(CredentialsFile::default()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {:?}", path))?;

        let file: CredentialsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {:?}", path))?;

        info!("Loaded credentials from {:?}", path);
        Ok(Self::from_file(file))
    }

    pub fn from_file(file: CredentialsFile) -> Self {
        Self { file }
    }

    pub fn resolve(&self, task: &TaskConfig) -> Result<ResolvedCredentials> {
        self.resolve_with(task, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with<E>(&self, task: &TaskConfig, env: E) -> Result<ResolvedCredentials>
    where
        E: Fn(&str) -> Option<String>,
    {
        let username = pick(
            env(USERNAME_ENV),
            self.file.username.as_deref(),
            task.username.as_deref(),
        )
        .ok_or_else(|| anyhow!("[{}] No username configured", task.term))?;

        let password = pick(
            env(PASSWORD_ENV),
            self.file.password.as_deref(),
            task.password.as_deref(),
        )
        .ok_or_else(|| anyhow!("[{}] No password configured", task.term))?;

        let webhook_url = pick(
            env(WEBHOOK_ENV),
            self.file.webhook.as_deref(),
            task.webhook.as_deref(),
        )
        .unwrap_or_default();

        Ok(ResolvedCredentials {
            credentials: Credentials { username, password },
            webhook_url,
        })
    }
}

/// First non-blank value, in precedence order
fn pick(env: Option<String>, file: Option<&str>, inline: Option<&str>) -> Option<String> {
    env.into_iter()
        .chain(file.map(str::to_string))
        .chain(inline.map(str::to_string))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
