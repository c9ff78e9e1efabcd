use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::BoxError;

/// Run configuration read from `config.toml`.
///
/// The program has no CLI surface; the three file paths and the model
/// hyperparameters are the whole configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Training CSV (headered, 7 columns).
    pub train_path: String,
    /// Held-out test CSV with the same layout.
    pub test_path: String,
    /// Where the trained model artifact is written (overwritten each run).
    pub model_path: String,
    #[serde(default)]
    pub model: ModelParams,
}

/// Gradient-boosted-tree hyperparameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelParams {
    pub iterations: usize,
    pub max_depth: u32,
    pub learning_rate: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_depth: 6,
            learning_rate: 0.1,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BoxError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}
