use std::cmp::Ordering;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    domain::Label,
    features::{Dataset, SparseVector},
};

use super::{check_training_set, BinaryClassifier, ModelError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 30,
            max_depth: 24,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        spam_fraction: f64,
    },
    Split {
        column: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn spam_fraction(&self, row: &SparseVector) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { spam_fraction } => return *spam_fraction,
                Node::Split {
                    column,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row.get(*column) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Bagged CART trees split on Gini impurity, each split drawn from a random
/// subset of √width columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    width: usize,
    trees: Vec<Node>,
}

struct TreeBuilder<'d> {
    data: &'d Dataset,
    params: ForestParams,
    max_features: usize,
    columns: Vec<usize>,
}

impl RandomForest {
    pub fn fit(data: &Dataset, params: &ForestParams) -> Result<Self, ModelError> {
        check_training_set(data)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut builder = TreeBuilder {
            data,
            params: *params,
            max_features: ((data.width as f64).sqrt().round() as usize).max(1),
            columns: (0..data.width).collect(),
        };

        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let bootstrap: Vec<usize> = (0..data.len())
                    .map(|_| rng.gen_range(0..data.len()))
                    .collect();
                builder.build(&bootstrap, 0, &mut rng)
            })
            .collect();

        Ok(Self {
            width: data.width,
            trees,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl BinaryClassifier for RandomForest {
    fn predict(&self, row: &SparseVector) -> Label {
        match self.spam_probability(row) {
            Some(p) if p > 0.5 => Label::Spam,
            _ => Label::Ham,
        }
    }

    fn spam_probability(&self, row: &SparseVector) -> Option<f64> {
        let total: f64 = self.trees.iter().map(|tree| tree.spam_fraction(row)).sum();
        Some(total / self.trees.len() as f64)
    }
}

impl TreeBuilder<'_> {
    fn build(&mut self, samples: &[usize], depth: usize, rng: &mut StdRng) -> Node {
        let spam = samples
            .iter()
            .filter(|&&i| self.data.labels[i] == Label::Spam)
            .count();
        let spam_fraction = spam as f64 / samples.len() as f64;

        let pure = spam == 0 || spam == samples.len();
        if pure || depth >= self.params.max_depth || samples.len() < self.params.min_samples_split {
            return Node::Leaf { spam_fraction };
        }

        let Some((column, threshold)) = self.best_split(samples, spam, rng) else {
            return Node::Leaf { spam_fraction };
        };
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.data.rows[i].get(column) <= threshold);

        Node::Split {
            column,
            threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    fn best_split(&mut self, samples: &[usize], spam: usize, rng: &mut StdRng) -> Option<(usize, f64)> {
        let n = samples.len() as f64;
        let parent = gini(spam as f64, n);
        let mut best: Option<(f64, usize, f64)> = None;
        let mut evaluated = 0;

        self.columns.shuffle(rng);
        let mut values: Vec<(f64, bool)> = Vec::with_capacity(samples.len());
        for &column in &self.columns {
            if evaluated >= self.max_features {
                break;
            }
            values.clear();
            values.extend(samples.iter().map(|&i| {
                (self.data.rows[i].get(column), self.data.labels[i] == Label::Spam)
            }));
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            if values[0].0 == values[values.len() - 1].0 {
                continue;
            }
            evaluated += 1;

            let mut left_spam = 0.0;
            for k in 1..values.len() {
                if values[k - 1].1 {
                    left_spam += 1.0;
                }
                if values[k].0 <= values[k - 1].0 {
                    continue;
                }
                let left_n = k as f64;
                let right_n = n - left_n;
                let impurity = (left_n * gini(left_spam, left_n)
                    + right_n * gini(spam as f64 - left_spam, right_n))
                    / n;
                if best.map_or(true, |(score, _, _)| impurity < score) {
                    let threshold = (values[k - 1].0 + values[k].0) / 2.0;
                    best = Some((impurity, column, threshold));
                }
            }
        }

        best.filter(|(impurity, _, _)| *impurity < parent)
            .map(|(_, column, threshold)| (column, threshold))
    }
}

fn gini(spam: f64, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    let p = spam / n;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
            let weight = 0.5 + i as f64 * 0.03;
            rows.push(SparseVector::new(vec![(0, weight), (2, 0.1)]));
            labels.push(Label::Ham);
            rows.push(SparseVector::new(vec![(1, weight), (3, 0.1)]));
            labels.push(Label::Spam);
        }
        Dataset::new(4, "fp".into(), rows, labels).unwrap()
    }

    #[test]
    fn forest_votes_with_probabilities() {
        let model = RandomForest::fit(&data(), &ForestParams::default()).unwrap();
        let spammy = SparseVector::new(vec![(1, 0.8), (3, 0.1)]);
        let hammy = SparseVector::new(vec![(0, 0.8), (2, 0.1)]);
        assert_eq!(model.predict(&spammy), Label::Spam);
        assert_eq!(model.predict(&hammy), Label::Ham);
        let p = model.spam_probability(&spammy).unwrap();
        assert!(p > 0.5 && p <= 1.0);
    }

    #[test]
    fn forest_is_reproducible_for_a_seed() {
        let a = RandomForest::fit(&data(), &ForestParams::default()).unwrap();
        let b = RandomForest::fit(&data(), &ForestParams::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn gini_of_pure_node_is_zero() {
        assert_eq!(gini(0.0, 4.0), 0.0);
        assert_eq!(gini(4.0, 4.0), 0.0);
        assert!((gini(2.0, 4.0) - 0.5).abs() < 1e-12);
    }
}
