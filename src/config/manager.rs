use super::{evolution::EvolutionConfig, training::TrainingConfig, traits::ConfigSection};
use crate::error::EvonetError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix of environment overrides, e.g. `EVONET__TRAINING__MAX_EPOCHS=50`
pub const ENV_PREFIX: &str = "EVONET";

/// List-valued keys accept comma-separated overrides,
/// e.g. `EVONET__TRAINING__TOPOLOGY__WIDTHS=4,8,4,2`
const ENV_LIST_KEYS: &[&str] = &["training.topology.widths"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub training: TrainingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EvonetError> {
        validate_section(&self.evolution)?;
        validate_section(&self.training)?;
        Ok(())
    }

    /// Read a TOML or JSON file (by extension), layered with `EVONET__*`
    /// environment overrides. Does not validate.
    pub fn read_file(path: &Path) -> Result<Self, EvonetError> {
        if !path.is_file() {
            return Err(EvonetError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let environment = ENV_LIST_KEYS.iter().fold(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |env, key| env.with_list_parse_key(key),
        );

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Tag configuration errors with the section they came from.
fn validate_section<S: ConfigSection>(section: &S) -> Result<(), EvonetError> {
    section.validate().map_err(|e| match e {
        EvonetError::Configuration(msg) => {
            EvonetError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
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

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvonetError> {
        let config = AppConfig::read_file(path.as_ref())?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.as_ref().display());
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    /// Write the current configuration; `.json` files get JSON, anything else TOML.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvonetError> {
        let path = path.as_ref();
        let config = self.get();
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let contents = if is_json {
            serde_json::to_string_pretty(&config)?
        } else {
            toml::to_string_pretty(&config)?
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` to a copy; the copy is stored only if it validates.
    pub fn update<F>(&self, f: F) -> Result<(), EvonetError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = guard.clone();
        f(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }
}
