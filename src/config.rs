use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChefError, Result};
use crate::kitchen::CuisineStyle;
use crate::suggestions::TierPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("CHEFAI_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ChefError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(local) = Self::load_patch(&root.join("config.toml"))? {
                config.merge_patch(local);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a full config from TOML text, without env overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| ChefError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("chefai/config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| ChefError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| ChefError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.engine {
            self.engine.merge(patch);
        }
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.catalog {
            self.catalog.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `CHEFAI_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let env = Env(lookup);

        if let Some(values) = env.list("CHEFAI_THRESHOLDS") {
            self.engine.thresholds = fixed_array(&values, "CHEFAI_THRESHOLDS")?;
        }
        if let Some(values) = env.list("CHEFAI_MULTIPLIERS") {
            self.engine.multipliers = fixed_array(&values, "CHEFAI_MULTIPLIERS")?;
        }
        if let Some(value) = env.parse::<usize>("CHEFAI_HISTORY_CAPACITY")? {
            self.engine.history_capacity = value;
        }
        if let Some(value) = env.string("CHEFAI_PREFERRED_CUISINE") {
            self.engine.preferred_cuisine = if value.trim().is_empty() {
                None
            } else {
                Some(value.parse()?)
            };
        }

        if let Some(value) = env.parse::<StorageBackend>("CHEFAI_STORAGE_BACKEND")? {
            self.storage.backend = value;
        }
        if let Some(value) = env.string("CHEFAI_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(value));
        }

        if let Some(value) = env.string("CHEFAI_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        if let Some(value) = env.bool("CHEFAI_NO_COLOR") {
            self.output.color = !value;
        }
        if let Some(value) = env.parse::<usize>("CHEFAI_WRAP_WIDTH")? {
            self.output.wrap_width = value;
        }

        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.engine.policy()?;
        if self.engine.history_capacity == 0 {
            return Err(ChefError::Config(
                "engine.history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Interaction counts unlocking Intermediate, Advanced and Master.
    pub thresholds: [u64; 3],
    /// Confidence multipliers, Beginner first.
    pub multipliers: [f64; 4],
    pub history_capacity: usize,
    pub preferred_cuisine: Option<CuisineStyle>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = TierPolicy::default();
        Self {
            thresholds: policy.thresholds,
            multipliers: policy.multipliers,
            history_capacity: 50,
            preferred_cuisine: None,
        }
    }
}

impl EngineConfig {
    fn merge(&mut self, patch: EnginePatch) {
        if let Some(value) = patch.thresholds {
            self.thresholds = value;
        }
        if let Some(value) = patch.multipliers {
            self.multipliers = value;
        }
        if let Some(value) = patch.history_capacity {
            self.history_capacity = value;
        }
        if let Some(value) = patch.preferred_cuisine {
            self.preferred_cuisine = Some(value);
        }
    }

    pub fn policy(&self) -> Result<TierPolicy> {
        TierPolicy::new(self.thresholds, self.multipliers)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ChefError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" | "db" => Ok(Self::Sqlite),
            "memory" | "none" => Ok(Self::Memory),
            _ => Err(ChefError::Config(format!(
                "invalid storage backend {value} (expected json|sqlite|memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Overrides the backend's default file under the data root.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.backend {
            self.backend = value;
        }
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Replacement knowledge base TOML; the built-in one when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    fn merge(&mut self, patch: CatalogPatch) {
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    /// Column limit for wrapped prose; 0 disables wrapping.
    pub wrap_width: usize,
    /// Suggestions listed by `status`.
    pub recent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            wrap_width: 88,
            recent: 5,
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.color {
            self.color = value;
        }
        if let Some(value) = patch.wrap_width {
            self.wrap_width = value;
        }
        if let Some(value) = patch.recent {
            self.recent = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub engine: Option<EnginePatch>,
    pub storage: Option<StoragePatch>,
    pub catalog: Option<CatalogPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EnginePatch {
    pub thresholds: Option<[u64; 3]>,
    pub multipliers: Option<[f64; 4]>,
    pub history_capacity: Option<usize>,
    pub preferred_cuisine: Option<CuisineStyle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub backend: Option<StorageBackend>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogPatch {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub color: Option<bool>,
    pub wrap_width: Option<usize>,
    pub recent: Option<usize>,
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        (self.0)(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.0)(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                ChefError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        (self.0)(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToString::to_string)
                .collect()
        })
    }
}

fn fixed_array<T, const N: usize>(values: &[String], key: &str) -> Result<[T; N]>
where
    T: FromStr + Copy + Default,
    T::Err: std::fmt::Display,
{
    if values.len() != N {
        return Err(ChefError::Config(format!(
            "{key} needs {N} comma-separated values, got {}",
            values.len()
        )));
    }
    let mut out = [T::default(); N];
    for (slot, raw) in out.iter_mut().zip(values) {
        *slot = raw
            .parse()
            .map_err(|err| ChefError::Config(format!("invalid {key} value {raw}: {err}")))?;
    }
    Ok(out)
}
