use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::dataset::Dataset;
use crate::classifier::Classifier;
use crate::decision_tree::{DecisionTreeBuilder, DecisionTree};
use crate::functions::most_frequent;
use crate::node::to_u16;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestBuilder {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub bag_amount: f64,
    pub seed: u64,
}

impl Default for RandomForestBuilder {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            bag_amount: 1.0,
            seed: 42,
        }
    }
}

impl RandomForestBuilder {
    pub fn fit(&self, dataset: Dataset) -> RandomForestClassifier {
        let feature_len = (dataset.features_len() as f64).sqrt().ceil() as usize;
        let n_classes = dataset.classes_len();

        let start = Instant::now();
        let done = AtomicUsize::new(0);

        // Rngs are drawn up front so tree `i` always sees the same stream,
        // whichever thread ends up fitting it.
        let forest = self.get_rngs()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|mut rng| {
                let tree = self.fit_tree(&mut rng, &dataset, feature_len);

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    "[{:.1}%] fitted tree {}/{} ({} levels)",
                    finished as f64 / self.n_trees as f64 * 100.0,
                    finished,
                    self.n_trees,
                    tree.root().depth(),
                );

                tree
            })
            .collect::<Vec<_>>();

        debug!("fitted {} trees in {:.2?}", forest.len(), start.elapsed());

        RandomForestClassifier {
            forest,
            n_classes,
        }
    }

    fn fit_tree<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset, feature_len: usize) -> DecisionTree {
        let builder = DecisionTreeBuilder {
            max_features: Some(feature_len),
            max_depth: self.max_depth,
        };

        let max_samples = (dataset.rows_len() as f64 * self.bag_amount).round() as usize;
        let bootstrapped = dataset.bootstrap(rng, max_samples);

        builder.fit(rng, bootstrapped)
    }

    fn get_rngs(&self) -> impl Iterator<Item = StdRng> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.n_trees).map(move |_| StdRng::seed_from_u64(rng.gen()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestClassifier {
    forest: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForestClassifier {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.forest
    }

    pub fn classes_len(&self) -> usize {
        self.n_classes
    }
}

impl Classifier for RandomForestClassifier {
    /// Majority vote over the trees; ties go to the lowest class index.
    fn predict(&self, x: &[f64]) -> usize {
        most_frequent(self.n_classes, self.forest.iter().map(|v| v.predict(x)))
    }

    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u16::<BigEndian>(to_u16(self.n_classes, "class count")?)?;
        writer.write_u16::<BigEndian>(to_u16(self.forest.len(), "tree count")?)?;

        for tree in &self.forest {
            tree.serialize(writer)?;
        }

        Ok(())
    }

    fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let n_classes = reader.read_u16::<BigEndian>()? as usize;
        let len = reader.read_u16::<BigEndian>()?;

        let forest = (0..len)
            .map(|_| DecisionTree::deserialize(reader))
            .collect::<std::io::Result<Vec<DecisionTree>>>()?;

        for tree in &forest {
            let (class, _) = tree.root().max_indices();
            if class >= n_classes {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("tree predicts class {} of {}", class, n_classes),
                ));
            }
        }

        if forest.is_empty() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "empty forest"));
        }

        Ok(Self {
            forest,
            n_classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;

    fn blobs() -> Table {
        let mut table = Table::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            "label".to_string(),
            vec!["left".to_string(), "right".to_string()],
        );
        for i in 0..40 {
            let class = i % 2;
            let offset = class as f64 * 100.0;
            table.add(&[offset + i as f64, offset - i as f64, (i % 3) as f64], class);
        }
        table
    }

    fn small() -> RandomForestBuilder {
        RandomForestBuilder {
            n_trees: 15,
            ..RandomForestBuilder::default()
        }
    }

    #[test]
    fn same_seed_same_forest() {
        let table = blobs();
        let a = small().fit(table.build());
        let b = small().fit(table.build());

        assert_eq!(a, b);
        assert_eq!(a.trees().len(), 15);
    }

    #[test]
    fn separable_data_is_learned() {
        let table = blobs();
        let forest = small().fit(table.build());

        assert_eq!(table.build().evaluate(&forest), 1.0);
        assert_eq!(forest.predict(&[150.0, 90.0, 1.0]), 1);
        assert_eq!(forest.predict(&[5.0, -5.0, 1.0]), 0);
    }

    #[test]
    fn serialization_works() -> std::io::Result<()> {
        let table = blobs();
        let forest = small().fit(table.build());

        let mut bytes = Vec::new();
        forest.serialize(&mut bytes)?;
        let restored = RandomForestClassifier::deserialize(&mut bytes.as_slice())?;

        assert_eq!(restored, forest);
        assert_eq!(table.build().classify(&restored), table.build().classify(&forest));
        Ok(())
    }

    #[test]
    fn truncated_forest_fails() {
        let table = blobs();
        let forest = small().fit(table.build());

        let mut bytes = Vec::new();
        forest.serialize(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);

        assert!(RandomForestClassifier::deserialize(&mut bytes.as_slice()).is_err());
    }
}
