use crate::classifier::Classifier;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::fmt::Write as _;
use std::ops::Range;
use rand::seq::SliceRandom;
use rand::Rng;
use ordered_float::OrderedFloat;

/// A view over the rows of a [`Table`].
///
/// Views share the table's columns and only own a permutation of row indices,
/// so sorting, splitting and bootstrapping never copy feature values.
#[derive(Clone, Debug)]
pub struct Dataset<'a> {
	columns: &'a [Vec<f64>],
	targets: &'a [usize],
	n_classes: usize,

	index: Vec<usize>,
	range: Range<usize>,
}

impl<'a, 'b> Dataset<'a> {
	/// Fraction of rows the classifier labels correctly.
	pub fn evaluate<C: Classifier + Sync>(&self, classifier: &C) -> f64 {
		if self.rows_len() == 0 {
			return 0.0;
		}

		self.rows()
			.zip(self.targets())
			.collect::<Vec<_>>()
			.into_par_iter()
			.filter(|(x, y)| classifier.predict(x) == *y)
			.count() as f64 / self.rows_len() as f64
	}

	pub fn sort(&mut self, column: usize) {
		let columns = self.columns;
		let values = &columns[column];
		self.index[self.range.start..self.range.end]
			.sort_by_key(|&x| OrderedFloat(values[x]));
	}

	/// Candidate thresholds for a column that is already sorted: the number of
	/// rows left of each boundary between distinct values, and the midpoint.
	pub fn get_splits(&'b self, column: usize) -> impl 'b + Iterator<Item = (usize, f64)> {
		let column = &self.columns[column];
		let values = self.indices().map(move |x| column[x]);

		values.clone()
			.zip(values.skip(1))
			.enumerate()
			.filter(|(_, (prev, next))| next > prev)
			.map(|(i, (prev, next))| (i + 1, prev + (next - prev) / 2.0))
	}

	pub fn split<F, T>(&mut self, row: usize, mut f: F) -> (T, T)
	where
		F: FnMut(&mut Self) -> T,
	{
		let row = row + self.range.start;
		let original = self.range.clone();

		self.range.end = row;
		let left = f(self);
		self.range.end = original.end;

		self.range.start = row;
		let right = f(self);
		self.range.start = original.start;

		(left, right)
	}

	/// Shuffles the rows and holds out `ceil(rows * test_rate)` of them.
	/// Returns `(train, test)`.
	pub fn train_test_split<R: Rng + ?Sized>(mut self, rng: &mut R, test_rate: f64) -> (Self, Self) {
		self.index[self.range.start..self.range.end].shuffle(rng);
		let test_num = ((self.rows_len() as f64 * test_rate).ceil() as usize).min(self.rows_len());

		let mut train = self.clone();
		let mut test = self;
		test.range.end = test.range.start + test_num;
		train.range.start = test.range.end;

		(train, test)
	}

	/// Samples `max_samples` rows with replacement. An empty view stays empty.
	pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R, max_samples: usize) -> Self {
		let samples = if self.rows_len() == 0 { 0 } else { max_samples.max(1) };

		let index = (0..samples)
			.map(|_| self.index[rng.gen_range(self.range.start, self.range.end)])
			.collect::<Vec<_>>();

		Self {
			range: 0..index.len(),
			index,
			columns: self.columns,
			targets: self.targets,
			n_classes: self.n_classes,
		}
	}

	fn indices(&'b self) -> impl 'b + Iterator<Item = usize> + Clone {
		self.index[self.range.start..self.range.end]
			.iter()
			.copied()
	}

	pub fn targets(&'b self) -> impl 'b + Iterator<Item = usize> {
		self.indices()
			.map(|i| self.targets[i])
	}

	pub fn column(&'b self, column: usize) -> impl 'b + Iterator<Item = f64> {
		let column = &self.columns[column];

		self.indices()
			.map(|i| column[i])
	}

	pub fn features_len(&self) -> usize {
		self.columns.len()
	}

	pub fn classes_len(&self) -> usize {
		self.n_classes
	}

	pub fn rows_len(&self) -> usize {
		self.range.end - self.range.start
	}

	pub fn rows(&'b self) -> impl 'b + Iterator<Item = Vec<f64>> {
		self.indices().map(move |i| {
			(0..self.columns.len())
				.map(|j| self.columns[j][i])
				.collect()
		})
	}

	#[cfg(test)]
	pub fn classify<C: Classifier>(&self, classifier: &C) -> Vec<usize> {
		self.rows()
			.map(|x| classifier.predict(&x))
			.collect()
	}
}

/// Column-major storage for a labelled table.
#[derive(Debug, Clone, Default)]
pub struct Table {
	feature_names: Vec<String>,
	label_name: String,
	classes: Vec<String>,

	columns: Vec<Vec<f64>>,
	targets: Vec<usize>,
}

impl Table {
	/// `classes` must already be in the order used for the class indices passed to [`Table::add`].
	pub fn new(feature_names: Vec<String>, label_name: String, classes: Vec<String>) -> Self {
		Self {
			columns: vec![Vec::new(); feature_names.len()],
			feature_names,
			label_name,
			classes,
			targets: Vec::new(),
		}
	}

	pub fn build(&self) -> Dataset<'_> {
		let range = 0..self.targets.len();

		Dataset {
			columns: &self.columns,
			targets: &self.targets,
			n_classes: self.classes.len(),

			range: range.clone(),
			index: range.collect(),
		}
	}

	pub fn add(&mut self, x: &[f64], y: usize) {
		debug_assert_eq!(x.len(), self.columns.len());
		debug_assert!(y < self.classes.len());

		for (column, value) in self.columns.iter_mut().zip(x) {
			column.push(*value);
		}

		self.targets.push(y);
	}

	pub fn feature_names(&self) -> &[String] {
		&self.feature_names
	}

	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	pub fn rows_len(&self) -> usize {
		self.targets.len()
	}

	/// `(rows, columns)`, counting the label column.
	pub fn shape(&self) -> (usize, usize) {
		(self.rows_len(), self.feature_names.len() + 1)
	}

	/// Number of rows carrying each class, in class order.
	pub fn class_support(&self) -> Vec<(&str, usize)> {
		let mut counts = vec![0; self.classes.len()];
		for &y in &self.targets {
			counts[y] += 1;
		}

		self.classes.iter().map(String::as_str).zip(counts).collect()
	}

	/// Renders the first `n` rows as an aligned text table with a row index.
	pub fn preview(&self, n: usize) -> String {
		let rows = n.min(self.rows_len());

		let mut header = vec![String::new()];
		header.extend(self.feature_names.iter().cloned());
		header.push(self.label_name.clone());

		let mut lines = vec![header];
		for i in 0..rows {
			let mut line = vec![i.to_string()];
			line.extend(self.columns.iter().map(|column| column[i].to_string()));
			line.push(self.classes[self.targets[i]].clone());
			lines.push(line);
		}

		let widths = (0..lines[0].len())
			.map(|j| lines.iter().map(|line| line[j].len()).max().unwrap_or(0))
			.collect::<Vec<_>>();

		let mut out = String::new();
		for line in &lines {
			let cells = line
				.iter()
				.zip(&widths)
				.enumerate()
				.map(|(j, (cell, &width))| if j == 0 { format!("{cell:<width$}") } else { format!("{cell:>width$}") })
				.collect::<Vec<_>>();
			let _ = writeln!(out, "{}", cells.join("  ").trim_end());
		}

		out
	}
}
