pub mod classifier;
pub mod config;
pub mod crop_data;
pub mod dataset;
pub mod decision_tree;
pub mod error;
pub mod features;
pub mod functions;
pub mod logging;
pub mod model;
pub mod node;
pub mod predictor;
pub mod random_forest;
pub mod trainer;

pub use config::Config;
pub use error::{Error, Result};
pub use features::FeatureVector;
pub use model::CropModel;
