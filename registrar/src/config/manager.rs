use super::secrets::CredentialsLoader;
use super::{Config, EngineSettings, Mode, TaskConfig, TaskSettings};
use crate::constants::defaults;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info};

pub struct ConfigManager {
    current_config: Arc<Config>,
    engine: EngineSettings,
    tasks: Vec<TaskSettings>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        let engine = config.engine_settings()?;

        let credentials_path = config
            .credentials_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(&config_dir).join(defaults::CREDENTIALS_FILE));
        let loader = CredentialsLoader::load(&credentials_path)?;

        let tasks = Self::resolve_tasks(&config.tasks, &loader);
        info!(
            "Loaded {} of {} task(s) from {}",
            tasks.len(),
            config.tasks.len(),
            config_dir
        );

        Ok(Self {
            current_config: Arc::new(config),
            engine,
            tasks,
        })
    }

    /// Directory from `REGISTRAR_CONFIG_DIR`, or `config`
    pub fn default_dir() -> String {
        std::env::var(defaults::CONFIG_DIR_ENV).unwrap_or_else(|_| defaults::CONFIG_DIR.to_string())
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    pub fn engine(&self) -> &EngineSettings {
        &self.engine
    }

    pub fn tasks(&self) -> &[TaskSettings] {
        &self.tasks
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let config: Config = toml::from_str(&main_config_content)
            .map_err(|e| anyhow!("Failed to parse main config: {}", e))?;

        debug!("Parsed {} task entries", config.tasks.len());
        Ok(config)
    }

    /// Invalid entries are logged and skipped so the remaining tasks still run
    pub fn resolve_tasks(entries: &[TaskConfig], loader: &CredentialsLoader) -> Vec<TaskSettings> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match Self::resolve_task(entry, loader) {
                Ok(task) => Some(task),
                Err(e) => {
                    error!("Skipping task #{} ({}): {}", index + 1, entry.term, e);
                    None
                }
            })
            .collect()
    }

    fn resolve_task(entry: &TaskConfig, loader: &CredentialsLoader) -> Result<TaskSettings> {
        let term = entry.term.trim();
        if term.is_empty() {
            return Err(anyhow!("term is required"));
        }

        match entry.mode {
            Mode::Watch if entry.crns.is_empty() => {
                return Err(anyhow!("Watch mode needs at least one CRN"));
            }
            Mode::Signup | Mode::Release if entry.crns.is_empty() && entry.drop_crns.is_empty() => {
                return Err(anyhow!("{} mode needs CRNs to add or drop", entry.mode));
            }
            Mode::Release if entry.registration_time.is_none() => {
                return Err(anyhow!("Release mode needs a registration_time"));
            }
            _ => {}
        }

        let resolved = loader.resolve(entry)?;

        Ok(TaskSettings {
            term: term.to_string(),
            subject: entry.subject.trim().to_string(),
            mode: entry.mode,
            crns: entry.crns.clone(),
            drop_crns: entry.drop_crns.clone(),
            registration_time: entry.registration_time.clone(),
            credentials: resolved.credentials,
            webhook_url: resolved.webhook_url,
        })
    }
}
