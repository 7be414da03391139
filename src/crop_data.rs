use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::dataset::Table;
use crate::error::{Error, Result};

/// Reads a headed CSV file; `label_column` holds the crop name and every other
/// column is a numeric feature.
pub fn read(dataset_location: &Path, label_column: &str) -> Result<Table> {
	let file = fs::File::open(dataset_location).map_err(|e| {
		Error::Dataset(format!("cannot open {}: {e}", dataset_location.display()))
	})?;

	let table = read_from(io::BufReader::new(file), label_column)?;
	info!(
		"read {} rows, {} features, {} classes from {}",
		table.rows_len(),
		table.feature_names().len(),
		table.classes().len(),
		dataset_location.display()
	);

	Ok(table)
}

pub fn read_from<R: io::Read>(reader: R, label_column: &str) -> Result<Table> {
	let mut reader = csv::ReaderBuilder::new()
		.trim(csv::Trim::All)
		.from_reader(reader);

	let headers = reader.headers()?.clone();
	let label_index = headers
		.iter()
		.position(|name| name == label_column)
		.ok_or_else(|| Error::Dataset(format!("missing label column {label_column:?}")))?;

	let feature_names = headers
		.iter()
		.enumerate()
		.filter(|&(i, _)| i != label_index)
		.map(|(_, name)| name.to_string())
		.collect::<Vec<_>>();

	if feature_names.is_empty() {
		return Err(Error::Dataset("no feature columns".to_string()));
	}

	// Records are buffered so class indices can follow the sorted label order.
	let mut rows = Vec::new();
	for (i, record) in reader.records().enumerate() {
		let record = record?;
		// Line 1 is the header.
		let line = i + 2;

		let mut x = Vec::with_capacity(feature_names.len());
		for (j, cell) in record.iter().enumerate() {
			if j == label_index {
				continue;
			}
			let value = cell.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
				Error::Dataset(format!("line {line}: column {:?} is not a number: {cell:?}", &headers[j]))
			})?;
			x.push(value);
		}

		let label = record[label_index].to_string();
		if label.is_empty() {
			return Err(Error::Dataset(format!("line {line}: empty label")));
		}

		rows.push((x, label));
	}

	if rows.is_empty() {
		return Err(Error::Dataset("no data rows".to_string()));
	}

	let classes = rows
		.iter()
		.map(|(_, label)| label.clone())
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	debug!("classes: {:?}", classes);

	let mut table = Table::new(feature_names, label_column.to_string(), classes);
	for (x, label) in rows {
		let y = table
			.classes()
			.binary_search(&label)
			.map_err(|_| Error::Dataset(format!("unknown label {label:?}")))?;
		table.add(&x, y);
	}

	Ok(table)
}
