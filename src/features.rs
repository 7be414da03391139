use std::fmt;

use crate::error::{Error, Result};

pub const FEATURE_NAMES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Soil and climate readings in training column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; 7]);

impl FeatureVector {
	/// The sample the trainer classifies after saving its model.
	pub const EXAMPLE: FeatureVector = FeatureVector([90.0, 42.0, 43.0, 20.87, 82.0, 6.5, 203.0]);

	pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
		if args.len() != FEATURE_NAMES.len() {
			return Err(Error::Usage { expected: FEATURE_NAMES.len() });
		}

		let mut values = [0.0; 7];
		for (i, (arg, value)) in args.iter().zip(values.iter_mut()).enumerate() {
			let arg = arg.as_ref();
			*value = arg
				.trim()
				.parse::<f64>()
				.ok()
				.filter(|v| v.is_finite())
				.ok_or_else(|| Error::InvalidFeature {
					position: i + 1,
					name: FEATURE_NAMES[i],
					value: arg.to_string(),
				})?;
		}

		Ok(Self(values))
	}

	pub fn as_slice(&self) -> &[f64] {
		&self.0
	}
}

impl fmt::Display for FeatureVector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [n, p, k, temp, hum, ph, rain] = self.0;
		write!(f, "N={n},P={p},K={k},temp={temp},hum={hum},pH={ph},rain={rain}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_seven_numbers() {
		let args = ["90", "42", "43", "20.87", "82", "6.5", "203"];
		assert_eq!(FeatureVector::parse(&args).unwrap(), FeatureVector::EXAMPLE);
	}

	#[test]
	fn negative_and_exponent_values_parse() {
		let args = ["-1", "0", "1e2", "2.5", "3", "4", "5"];
		let features = FeatureVector::parse(&args).unwrap();
		assert_eq!(features.as_slice()[0], -1.0);
		assert_eq!(features.as_slice()[2], 100.0);
	}

	#[test]
	fn wrong_count_is_a_usage_error() {
		for n in [0, 1, 6, 8] {
			let args = vec!["1"; n];
			let err = FeatureVector::parse(&args).unwrap_err();
			assert!(matches!(err, Error::Usage { expected: 7 }), "{n} args");
		}
	}

	#[test]
	fn non_numeric_is_reported_with_position() {
		let args = ["90", "42", "abc", "20.87", "82", "6.5", "203"];
		match FeatureVector::parse(&args).unwrap_err() {
			Error::InvalidFeature { position, name, value } => {
				assert_eq!(position, 3);
				assert_eq!(name, "K");
				assert_eq!(value, "abc");
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn non_finite_is_rejected() {
		let args = ["NaN", "42", "43", "20.87", "82", "6.5", "inf"];
		assert!(FeatureVector::parse(&args).unwrap_err().is_usage());
	}

	#[test]
	fn display_matches_trainer_report() {
		assert_eq!(
			FeatureVector::EXAMPLE.to_string(),
			"N=90,P=42,K=43,temp=20.87,hum=82,pH=6.5,rain=203"
		);
	}
}
