use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::Config;
use crate::crop_data;
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::model::CropModel;
use crate::random_forest::RandomForestBuilder;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
	/// `(rows, columns)` of the dataset, label column included.
	pub shape: (usize, usize),
	pub train_rows: usize,
	pub test_rows: usize,
	/// Share of held-out rows classified correctly.
	pub accuracy: f64,
	pub train_accuracy: f64,
	pub model_path: PathBuf,
	pub example_prediction: String,
}

/// Reads the dataset, fits and evaluates a forest, saves it and classifies
/// [`FeatureVector::EXAMPLE`]. The human-readable report goes to `out`.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<TrainReport> {
	config.validate()?;
	let training = &config.training;

	let table = crop_data::read(&config.paths.dataset, &training.label_column)?;
	writeln!(out, "Dataset loaded. Shape: {:?}", table.shape())?;
	writeln!(out)?;
	writeln!(out, "First {} rows:", training.preview_rows)?;
	write!(out, "{}", table.preview(training.preview_rows))?;

	for (class, support) in table.class_support() {
		debug!("{class}: {support} rows");
	}

	let mut rng = StdRng::seed_from_u64(training.seed);
	let (train, test) = table.build().train_test_split(&mut rng, training.test_size);
	info!("train: {} rows, test: {} rows", train.rows_len(), test.rows_len());
	if train.rows_len() == 0 || test.rows_len() == 0 {
		return Err(Error::Dataset(format!(
			"{} rows with test_size {} leave {} for training and {} for evaluation",
			table.rows_len(),
			training.test_size,
			train.rows_len(),
			test.rows_len()
		)));
	}

	info!(
		"fitting random forest [trees: {}, depth: {}, bag: {}] ...",
		training.n_trees,
		training.max_depth.map_or_else(|| "unbounded".to_string(), |d| d.to_string()),
		training.bag_amount
	);
	let start = Instant::now();
	let forest = (RandomForestBuilder {
		n_trees: training.n_trees,
		max_depth: training.max_depth,
		bag_amount: training.bag_amount,
		seed: training.seed,
	}).fit(train.clone());
	info!("fitted in {:.2?}", start.elapsed());

	let accuracy = test.evaluate(&forest);
	let train_accuracy = train.evaluate(&forest);
	debug!("training accuracy: {:.2}%", train_accuracy * 100.0);

	writeln!(out)?;
	writeln!(out, "Model Accuracy: {:.2}%", accuracy * 100.0)?;

	let model = CropModel::new(table.feature_names().to_vec(), table.classes().to_vec(), forest);
	model.save(&config.paths.model)?;
	writeln!(out, "Model saved as '{}'", config.paths.model.display())?;

	let example = FeatureVector::EXAMPLE;
	let example_prediction = model.predict_label(&example)?.to_string();
	writeln!(out)?;
	writeln!(out, "Example prediction for {} → {}", example, example_prediction)?;

	Ok(TrainReport {
		shape: table.shape(),
		train_rows: train.rows_len(),
		test_rows: test.rows_len(),
		accuracy,
		train_accuracy,
		model_path: config.paths.model.clone(),
		example_prediction,
	})
}
