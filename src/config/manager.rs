use super::{
    evolution::EvolutionConfig,
    fitness::FitnessConfig,
    music::MusicSettings,
    traits::ConfigSection,
};
use crate::error::TunegenError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Prefix of environment variables read by [`ConfigManager::load_layered`],
/// e.g. `TUNEGEN__EVOLUTION__SEED=7`.
pub const ENV_PREFIX: &str = "TUNEGEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub fitness: FitnessConfig,
    pub music: MusicSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TunegenError> {
        self.evolution.validate()?;
        self.fitness.validate()?;
        self.music.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TunegenError> {
        let contents = std::fs::read_to_string(path)?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| TunegenError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.write()? = config;
        Ok(())
    }

    /// Stack defaults, an optional TOML file and `TUNEGEN__*` environment
    /// variables, later sources overriding earlier ones.
    pub fn load_layered<P: AsRef<Path>>(&self, path: Option<P>) -> Result<(), TunegenError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path.as_ref()).format(config::FileFormat::Toml),
            );
        }

        let config: AppConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::debug!("Loaded layered configuration: {:?}", config);

        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TunegenError> {
        let config = self.read()?;
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| TunegenError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, TunegenError> {
        Ok(self.read()?.clone())
    }

    /// Apply `f` to the current config. The change is rolled back if the
    /// result does not validate.
    pub fn update<F>(&self, f: F) -> Result<(), TunegenError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write()?;
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, AppConfig>, TunegenError> {
        self.config
            .read()
            .map_err(|_| TunegenError::Configuration("Config lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, AppConfig>, TunegenError> {
        self.config
            .write()
            .map_err(|_| TunegenError::Configuration("Config lock poisoned".to_string()))
    }
}
