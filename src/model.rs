use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::node::to_u16;
use crate::random_forest::RandomForestClassifier;

const MAGIC: &[u8; 8] = b"CROPRF01";

/// A fitted forest together with the schema it was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct CropModel {
	feature_names: Vec<String>,
	classes: Vec<String>,
	forest: RandomForestClassifier,
}

impl CropModel {
	pub fn new(feature_names: Vec<String>, classes: Vec<String>, forest: RandomForestClassifier) -> Self {
		Self { feature_names, classes, forest }
	}

	pub fn feature_names(&self) -> &[String] {
		&self.feature_names
	}

	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	pub fn forest(&self) -> &RandomForestClassifier {
		&self.forest
	}

	pub fn predict_row(&self, x: &[f64]) -> &str {
		&self.classes[self.forest.predict(x)]
	}

	pub fn predict_label(&self, features: &FeatureVector) -> Result<&str> {
		if self.feature_names.len() != features.as_slice().len() {
			return Err(Error::Artifact(format!(
				"model expects {} features, got {}",
				self.feature_names.len(),
				features.as_slice().len()
			)));
		}

		Ok(self.predict_row(features.as_slice()))
	}

	/// Writes the model to `path`, replacing any existing file.
	pub fn save(&self, path: &Path) -> Result<()> {
		let mut writer = BufWriter::new(File::create(path)?);
		self.serialize(&mut writer)?;
		writer.flush()?;

		debug!("wrote model to {}", path.display());
		Ok(())
	}

	pub fn load(path: &Path) -> Result<Self> {
		let file = File::open(path)
			.map_err(|e| Error::Artifact(format!("cannot open {}: {e}", path.display())))?;

		Self::deserialize(&mut BufReader::new(file))
			.map_err(|e| Error::Artifact(format!("cannot read {}: {e}", path.display())))
	}
}

impl Classifier for CropModel {
	fn predict(&self, x: &[f64]) -> usize {
		self.forest.predict(x)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		writer.write_all(MAGIC)?;
		write_strings(writer, &self.feature_names)?;
		write_strings(writer, &self.classes)?;
		self.forest.serialize(writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> io::Result<Self> {
		let mut magic = [0u8; 8];
		reader.read_exact(&mut magic)?;
		if &magic != MAGIC {
			return Err(invalid_data("not a crop model file".to_string()));
		}

		let feature_names = read_strings(reader)?;
		let classes = read_strings(reader)?;
		let forest = RandomForestClassifier::deserialize(reader)?;

		if forest.classes_len() != classes.len() {
			return Err(invalid_data(format!(
				"forest has {} classes, header names {}",
				forest.classes_len(),
				classes.len()
			)));
		}

		for tree in forest.trees() {
			if let (_, Some(column)) = tree.root().max_indices() {
				if column >= feature_names.len() {
					return Err(invalid_data(format!("tree splits on missing column {}", column)));
				}
			}
		}

		Ok(Self { feature_names, classes, forest })
	}
}

fn invalid_data(message: String) -> io::Error {
	io::Error::new(io::ErrorKind::InvalidData, message)
}

fn write_strings<W: Write>(writer: &mut W, values: &[String]) -> io::Result<()> {
	writer.write_u16::<BigEndian>(to_u16(values.len(), "name count")?)?;

	for value in values {
		writer.write_u16::<BigEndian>(to_u16(value.len(), "name length")?)?;
		writer.write_all(value.as_bytes())?;
	}

	Ok(())
}

fn read_strings<R: Read>(reader: &mut R) -> io::Result<Vec<String>> {
	let len = reader.read_u16::<BigEndian>()?;

	(0..len)
		.map(|_| {
			let len = reader.read_u16::<BigEndian>()? as usize;
			let mut bytes = vec![0u8; len];
			reader.read_exact(&mut bytes)?;
			String::from_utf8(bytes).map_err(|e| invalid_data(e.to_string()))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::crop_data;
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

	fn model() -> CropModel {
		let table = crop_data::read_from(CSV.as_bytes(), "label").unwrap();
		let forest = RandomForestBuilder { n_trees: 25, ..RandomForestBuilder::default() }.fit(table.build());
		CropModel::new(table.feature_names().to_vec(), table.classes().to_vec(), forest)
	}

	#[test]
	fn save_and_load_preserve_predictions() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");

		let model = model();
		model.save(&path).unwrap();
		let loaded = CropModel::load(&path).unwrap();

		assert_eq!(loaded, model);
		assert_eq!(loaded.predict_label(&FeatureVector::EXAMPLE).unwrap(), "rice");
		assert_eq!(loaded.predict_row(&[40.0, 72.0, 77.0, 17.0, 16.9, 7.4, 88.5]), "chickpea");
	}

	#[test]
	fn save_overwrites() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		std::fs::write(&path, vec![0xffu8; 1 << 16]).unwrap();

		model().save(&path).unwrap();
		assert!(CropModel::load(&path).is_ok());
	}

	#[test]
	fn rejects_foreign_files() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		std::fs::write(&path, b"definitely not a model").unwrap();

		assert!(matches!(CropModel::load(&path), Err(Error::Artifact(_))));
	}

	#[test]
	fn rejects_truncated_files() {
		let mut bytes = Vec::new();
		model().serialize(&mut bytes).unwrap();
		bytes.truncate(bytes.len() - 3);

		assert!(CropModel::deserialize(&mut bytes.as_slice()).is_err());
	}

	#[test]
	fn missing_file_is_an_artifact_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(CropModel::load(&dir.path().join("missing.bin")), Err(Error::Artifact(_))));
	}

	#[test]
	fn oversized_label_is_refused() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		let model = model();
		let classes = vec!["chickpea".to_string(), "r".repeat(70_000)];
		let long = CropModel::new(model.feature_names().to_vec(), classes, model.forest().clone());

		match long.save(&path) {
			Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
			other => panic!("unexpected result {other:?}"),
		}
	}

	#[test]
	fn rejects_feature_count_mismatch() {
		let forest = model().forest().clone();
		let narrow = CropModel::new(vec!["a".to_string()], vec!["chickpea".to_string(), "rice".to_string()], forest);

		assert!(matches!(narrow.predict_label(&FeatureVector::EXAMPLE), Err(Error::Artifact(_))));
	}
}
