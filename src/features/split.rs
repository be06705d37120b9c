use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::{matrix::Dataset, FeatureError};

/// The test share is rounded up, so any non-empty fraction keeps at least one
/// row for evaluation.
pub fn train_test_split(
    data: &Dataset,
    test_size: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), FeatureError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(FeatureError::InvalidTestSize(test_size));
    }
    let n = data.len();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(FeatureError::EmptySplit { rows: n, test_size });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok((data.select(train_idx), data.select(test_idx)))
}
