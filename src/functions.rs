/// Per-class counts over a set of targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
	counts: Vec<usize>,
	len: usize,
}

impl Histogram {
	pub fn empty(n_classes: usize) -> Self {
		Self {
			counts: vec![0; n_classes],
			len: 0,
		}
	}

	pub fn new(n_classes: usize, values: impl Iterator<Item = usize>) -> Self {
		let mut histogram = Self::empty(n_classes);
		for value in values {
			histogram.inc(value);
		}
		histogram
	}

	pub fn inc(&mut self, class: usize) {
		self.counts[class] += 1;
		self.len += 1;
	}

	pub fn dec(&mut self, class: usize) {
		self.counts[class] -= 1;
		self.len -= 1;
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn is_pure(&self) -> bool {
		self.counts.iter().filter(|&&n| n > 0).count() <= 1
	}

	pub fn gini(&self) -> f64 {
		if self.is_empty() {
			return 0.0;
		}

		1.0 - self.counts
			.iter()
			.map(|&n| (n as f64 / self.len as f64).powi(2))
			.sum::<f64>()
	}

	/// Most frequent class; ties go to the lowest class index.
	pub fn most_frequent(&self) -> usize {
		self.counts
			.iter()
			.enumerate()
			.fold((0, 0), |best, (class, &n)| if n > best.1 { (class, n) } else { best })
			.0
	}
}

pub fn most_frequent(n_classes: usize, values: impl Iterator<Item = usize>) -> usize {
	Histogram::new(n_classes, values).most_frequent()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gini(n_classes: usize, values: impl Iterator<Item = usize>) -> f64 {
		Histogram::new(n_classes, values).gini()
	}

	#[test]
	fn gini_of_pure_set_is_zero() {
		assert_eq!(gini(3, [1, 1, 1].into_iter()), 0.0);
	}

	#[test]
	fn gini_of_even_split() {
		assert!((gini(2, [0, 1, 0, 1].into_iter()) - 0.5).abs() < 1e-12);
	}

	#[test]
	fn incremental_counts_track_gini() {
		let mut left = Histogram::empty(3);
		let mut right = Histogram::new(3, [0, 0, 1, 2].into_iter());

		left.inc(0);
		right.dec(0);

		assert_eq!(left.gini(), 0.0);
		assert_eq!(right.gini(), gini(3, [0, 1, 2].into_iter()));
		assert_eq!(right.len(), 3);
	}

	#[test]
	fn empty_histogram_has_no_impurity() {
		let histogram = Histogram::empty(3);
		assert!(histogram.is_empty());
		assert_eq!(histogram.gini(), 0.0);
	}

	#[test]
	fn ties_go_to_lowest_class() {
		assert_eq!(most_frequent(4, [3, 2, 3, 2].into_iter()), 2);
		assert_eq!(most_frequent(4, [1, 3, 3].into_iter()), 3);
	}
}
