use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Dataset error: {0}")]
	Dataset(String),

	/// The serialized model could not be read back, or does not fit the request.
	#[error("Model artifact error: {0}")]
	Artifact(String),

	/// Wrong number of command line features.
	#[error("Error: Expected {expected} feature values (N P K temperature humidity ph rainfall)")]
	Usage { expected: usize },

	#[error("Error: feature {position} ({name}) is not a finite number: {value:?}")]
	InvalidFeature {
		position: usize,
		name: &'static str,
		value: String,
	},
}

impl Error {
	/// Errors caused by how the program was invoked rather than by its inputs on disk.
	pub fn is_usage(&self) -> bool {
		matches!(self, Error::Usage { .. } | Error::InvalidFeature { .. })
	}
}

impl From<toml::de::Error> for Error {
	fn from(err: toml::de::Error) -> Self {
		Error::Config(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
