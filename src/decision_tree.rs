use std::io::{Read, Write};
use rand::Rng;
use rand::seq::SliceRandom as _;

use crate::dataset::Dataset;
use crate::node::{Node, Split};
use crate::classifier::Classifier;
use crate::functions::Histogram;

struct NodeBuilder<'r, R: ?Sized> {
	max_features: usize,
	max_depth: Option<usize>,
	rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> NodeBuilder<'r, R> {
	fn build(&mut self, dataset: &mut Dataset, depth: usize) -> Node {
		let histogram = Histogram::new(dataset.classes_len(), dataset.targets());

		if histogram.is_pure() || histogram.len() < 2 || self.max_depth.map_or(false, |max| depth > max) {
			return Node::Leaf(histogram.most_frequent());
		}

		let impurity = histogram.gini();

		let mut best_split: Option<Split> = None;
		let mut best_gain = f64::MIN;
		let columns = (0..dataset.features_len()).collect::<Vec<usize>>();
		let max_features = std::cmp::min(columns.len(), self.max_features);

		for &column in columns.choose_multiple(&mut *self.rng, max_features) {
			dataset.sort(column);

			let targets = dataset.targets().collect::<Vec<_>>();
			let mut left = Histogram::empty(dataset.classes_len());
			let mut right = histogram.clone();
			let mut moved = 0;

			for (row, value) in dataset.get_splits(column) {
				// Slide the rows that crossed the threshold from right to left.
				for &class in &targets[moved..row] {
					left.inc(class);
					right.dec(class);
				}
				moved = row;

				let ratio_l = left.len() as f64 / targets.len() as f64;
				let ratio_r = 1.0 - ratio_l;

				let gain = impurity - (ratio_l * left.gini() + ratio_r * right.gini());

				if best_gain < gain {
					best_split = Some(Split { column, value });
					best_gain = gain;
				}
			}
		}

		if let Some(split) = best_split {
			self.build_children(dataset, split, depth)
		} else {
			Node::Leaf(histogram.most_frequent())
		}
	}

	fn build_children(&mut self, dataset: &mut Dataset, split: Split, depth: usize) -> Node {
		dataset.sort(split.column);

		let split_row = dataset
			.column(split.column)
			.take_while(|&f| f <= split.value)
			.count();

		// Midpoints of adjacent floats can round onto a neighbour.
		if split_row == 0 || split_row == dataset.rows_len() {
			return Node::Leaf(Histogram::new(dataset.classes_len(), dataset.targets()).most_frequent());
		}

		let (left, right) = dataset.split(split_row, |x| Box::new(self.build(x, depth + 1)));

		Node::Children {
			left, right, split
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
	root: Node,
}

impl DecisionTree {
	pub fn root(&self) -> &Node {
		&self.root
	}
}

impl Classifier for DecisionTree {
	fn predict(&self, x: &[f64]) -> usize {
		self.root.predict(x)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		self.root.serialize(writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let root = Node::deserialize(reader)?;

		Ok(Self {
			root
		})
	}
}

pub struct DecisionTreeBuilder {
	/// Candidate columns drawn per node; `None` tries every column.
	pub max_features: Option<usize>,
	/// Number of splits allowed on any root-to-leaf path.
	pub max_depth: Option<usize>,
}

impl Default for DecisionTreeBuilder {
	fn default() -> Self {
		Self {
			max_features: None,
			max_depth: None,
		}
	}
}

impl DecisionTreeBuilder {
	pub fn fit<R: Rng + ?Sized>(&self, rng: &mut R, mut dataset: Dataset) -> DecisionTree {
		let max_features = self.max_features.unwrap_or(dataset.features_len());
		let root = (NodeBuilder {
			max_features,
			max_depth: self.max_depth,
			rng,
		}).build(&mut dataset, 1);

		DecisionTree { root }
	}
}
