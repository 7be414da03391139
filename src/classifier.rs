use std::io::{Read, Write};

/// The capabilities the trainer and predictor need from a fitted model.
pub trait Classifier: Sized {
	/// Predicted class index for one feature row.
	fn predict(&self, x: &[f64]) -> usize;

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self>;
}
