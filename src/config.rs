use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Everything the trainer and predictor would otherwise hard-code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub paths: PathsConfig,
	pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
	pub dataset: PathBuf,
	pub model: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			dataset: PathBuf::from("crop_data.csv"),
			model: PathBuf::from("crop_recommender.bin"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
	pub label_column: String,
	/// Fraction of rows held out for evaluation.
	pub test_size: f64,
	pub seed: u64,
	pub n_trees: usize,
	/// `None` grows every tree until its leaves are pure.
	pub max_depth: Option<usize>,
	/// Bootstrap sample size per tree, as a fraction of the training rows.
	pub bag_amount: f64,
	pub preview_rows: usize,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self {
			label_column: "label".to_string(),
			test_size: 0.2,
			seed: 42,
			n_trees: 100,
			max_depth: None,
			bag_amount: 1.0,
			preview_rows: 5,
		}
	}
}

impl Config {
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.map_err(|e| Error::Config(format!("failed to read config {}: {e}", path.display())))?;

		let config: Config = toml::from_str(&content)?;
		config.validate()?;

		Ok(config)
	}

	/// Loads `path` when given, otherwise starts from the defaults.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load(path),
			None => Ok(Self::default()),
		}
	}

	pub fn validate(&self) -> Result<()> {
		let training = &self.training;

		if !(training.test_size > 0.0 && training.test_size < 1.0) {
			return Err(Error::Config(format!(
				"test_size must be between 0 and 1, got {}",
				training.test_size
			)));
		}
		if !(training.bag_amount > 0.0 && training.bag_amount <= 1.0) {
			return Err(Error::Config(format!(
				"bag_amount must be in (0, 1], got {}",
				training.bag_amount
			)));
		}
		if training.n_trees == 0 {
			return Err(Error::Config("n_trees must be at least 1".to_string()));
		}
		if training.n_trees > u16::MAX as usize {
			return Err(Error::Config(format!("n_trees must be at most {}", u16::MAX)));
		}
		if training.max_depth == Some(0) {
			return Err(Error::Config("max_depth must be at least 1".to_string()));
		}
		if training.label_column.trim().is_empty() {
			return Err(Error::Config("label_column must not be empty".to_string()));
		}

		Ok(())
	}
}
