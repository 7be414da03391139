use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::CropModel;

/// Validates the raw feature arguments, loads the model and returns the crop label.
///
/// Arguments are checked before the model is touched, so a bad invocation is
/// reported the same way whether or not a model exists.
pub fn predict<S: AsRef<str>>(model_path: &Path, args: &[S]) -> Result<String> {
	let features = FeatureVector::parse(args)?;
	debug!("features: {}", features);

	let model = CropModel::load(model_path)?;
	debug!("loaded model with {} trees, {} classes", model.forest().trees().len(), model.classes().len());

	Ok(model.predict_label(&features)?.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::crop_data;
	use crate::error::Error;
	use crate::random_forest::RandomForestBuilder;

	const CSV: &str = "\
N,P,K,temperature,humidity,ph,rainfall,label
90,42,43,20.8,82.0,6.5,202.9,rice
85,58,41,21.7,80.3,7.0,226.6,rice
60,55,44,23.0,82.3,7.8,263.9,rice
40,72,77,17.0,16.9,7.4,88.5,chickpea
45,69,81,18.3,15.1,6.8,79.1,chickpea
22,68,79,17.5,18.2,7.6,74.2,chickpea
";

	fn save_model(path: &Path) {
		let table = crop_data::read_from(CSV.as_bytes(), "label").unwrap();
		let forest = RandomForestBuilder { n_trees: 25, ..RandomForestBuilder::default() }.fit(table.build());
		CropModel::new(table.feature_names().to_vec(), table.classes().to_vec(), forest)
			.save(path)
			.unwrap();
	}

	#[test]
	fn predicts_a_known_label() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		save_model(&path);

		let label = predict(&path, &["90", "42", "43", "20.87", "82", "6.5", "203"]).unwrap();
		assert_eq!(label, "rice");
	}

	#[test]
	fn argument_errors_win_over_missing_model() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.bin");

		assert!(matches!(predict(&path, &["1", "2"]), Err(Error::Usage { .. })));
		assert!(matches!(
			predict(&path, &["1", "2", "3", "4", "5", "6", "x"]),
			Err(Error::InvalidFeature { position: 7, .. })
		));
		assert!(matches!(
			predict(&path, &["1", "2", "3", "4", "5", "6", "7"]),
			Err(Error::Artifact(_))
		));
	}
}
