use serde::{Deserialize, Serialize};

use crate::domain::Label;

use super::FeatureError;

/// Sparse feature row: `(column, weight)` pairs sorted by column, zeros omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn new(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, value)| *value != 0.0);
        entries.sort_by_key(|(column, _)| *column);
        entries.dedup_by(|next, prev| {
            if next.0 == prev.0 {
                prev.1 += next.1;
                true
            } else {
                false
            }
        });
        Self { entries }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }

    pub fn max_column(&self) -> Option<usize> {
        self.entries.last().map(|(column, _)| *column)
    }

    pub fn dot_dense(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(column, value)| weights[*column] * value)
            .sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.entries.iter().map(|(_, value)| value * value).sum()
    }

    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        let mut total = 0.0;
        self.merge_with(other, |a, b| total += (a - b) * (a - b));
        total
    }

    /// `self + gap * (other - self)`, the point `gap` of the way towards `other`.
    pub fn interpolate(&self, other: &SparseVector, gap: f64) -> SparseVector {
        let mut entries = Vec::with_capacity(self.entries.len().max(other.entries.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() || j < other.entries.len() {
            let left = self.entries.get(i).copied();
            let right = other.entries.get(j).copied();
            let (column, a, b) = match (left, right) {
                (Some((ca, va)), Some((cb, vb))) if ca == cb => {
                    i += 1;
                    j += 1;
                    (ca, va, vb)
                }
                (Some((ca, va)), Some((cb, _))) if ca < cb => {
                    i += 1;
                    (ca, va, 0.0)
                }
                (Some((ca, va)), None) => {
                    i += 1;
                    (ca, va, 0.0)
                }
                (_, Some((cb, vb))) => {
                    j += 1;
                    (cb, 0.0, vb)
                }
                (None, None) => break,
            };
            entries.push((column, a + gap * (b - a)));
        }
        SparseVector::new(entries)
    }

    fn merge_with(&self, other: &SparseVector, mut visit: impl FnMut(f64, f64)) {
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, va) = self.entries[i];
            let (cb, vb) = other.entries[j];
            if ca == cb {
                visit(va, vb);
                i += 1;
                j += 1;
            } else if ca < cb {
                visit(va, 0.0);
                i += 1;
            } else {
                visit(0.0, vb);
                j += 1;
            }
        }
        self.entries[i..].iter().for_each(|(_, v)| visit(*v, 0.0));
        other.entries[j..].iter().for_each(|(_, v)| visit(0.0, *v));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub width: usize,
    pub fingerprint: String,
    pub rows: Vec<SparseVector>,
    pub labels: Vec<Label>,
}

impl Dataset {
    pub fn new(
        width: usize,
        fingerprint: String,
        rows: Vec<SparseVector>,
        labels: Vec<Label>,
    ) -> Result<Self, FeatureError> {
        let dataset = Self {
            width,
            fingerprint,
            rows,
            labels,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SparseVector, Label)> + '_ {
        self.rows.iter().zip(self.labels.iter().copied())
    }

    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            width: self.width,
            fingerprint: self.fingerprint.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.rows.len() != self.labels.len() {
            return Err(FeatureError::LengthMismatch {
                rows: self.rows.len(),
                labels: self.labels.len(),
            });
        }
        if let Some(found) = self.rows.iter().filter_map(SparseVector::max_column).max() {
            if found >= self.width {
                return Err(FeatureError::WidthMismatch {
                    expected: self.width,
                    found: found + 1,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_sorts_and_drops_zeros() {
        let v = SparseVector::new(vec![(4, 1.0), (1, 0.0), (2, 0.5)]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(2, 0.5), (4, 1.0)]);
        assert_eq!(v.get(4), 1.0);
        assert_eq!(v.get(3), 0.0);
    }

    #[test]
    fn interpolation_covers_both_supports() {
        let a = SparseVector::new(vec![(0, 1.0), (2, 2.0)]);
        let b = SparseVector::new(vec![(1, 4.0), (2, 4.0)]);
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.iter().collect::<Vec<_>>(), vec![(0, 0.5), (1, 2.0), (2, 3.0)]);
        assert_eq!(a.interpolate(&b, 0.0), a);
    }

    #[test]
    fn squared_distance_matches_dense_computation() {
        let a = SparseVector::new(vec![(0, 1.0), (3, 2.0)]);
        let b = SparseVector::new(vec![(3, 1.0), (5, 2.0)]);
        assert!((a.squared_distance(&b) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn dataset_rejects_out_of_range_columns() {
        let rows = vec![SparseVector::new(vec![(5, 1.0)])];
        let err = Dataset::new(3, "fp".into(), rows, vec![Label::Ham]).unwrap_err();
        assert!(matches!(err, FeatureError::WidthMismatch { expected: 3, found: 6 }));
    }
}
