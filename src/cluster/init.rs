// Greedy k-means++ seeding.
//
// The first centroid is a uniformly random row. Each following centroid is
// picked from a handful of candidates sampled with probability proportional
// to D(x)², the squared distance to the nearest centroid chosen so far; the
// candidate that leaves the smallest total potential wins. Rows with D = 0
// (already a centroid, or a duplicate of one) are never sampled while any
// row with positive distance remains.

use rand::Rng;

use crate::vectorize::matrix::WeightMatrix;

/// Candidates tried per centroid: `2 + ⌊ln k⌋`.
fn local_trials(k: usize) -> usize {
    2 + (k as f64).ln().floor() as usize
}

/// Squared distances from every row to one row-shaped point.
fn distances_to(matrix: &WeightMatrix, row_norms: &[f64], point: &[f64], point_norm: f64) -> Vec<f64> {
    matrix
        .rows()
        .iter()
        .zip(row_norms)
        .map(|(row, &norm)| row.squared_distance(norm, point, point_norm))
        .collect()
}

/// Draw a row index with probability ∝ `weights`, skipping zero weights.
///
/// Falls back to the last positive-weight row when rounding keeps the
/// cumulative sum just under the threshold.
fn sample_weighted(weights: &[f64], total: f64, rng: &mut impl Rng) -> usize {
    let threshold = rng.random::<f64>() * total;
    let mut cumsum = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumsum += w;
        last_positive = i;
        if cumsum >= threshold {
            return i;
        }
    }
    last_positive
}

/// Pick `k` initial centroids (dense, one per row of the result).
///
/// Callers guarantee `1 <= k <= matrix.n_rows()`.
pub fn kmeans_plus_plus(
    matrix: &WeightMatrix,
    row_norms: &[f64],
    k: usize,
    rng: &mut impl Rng,
) -> Vec<Vec<f64>> {
    let n = matrix.n_rows();
    let d = matrix.n_cols();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    let first_point = matrix.row(first).to_dense(d);
    let mut closest = distances_to(matrix, row_norms, &first_point, row_norms[first]);
    centroids.push(first_point);

    let trials = local_trials(k);

    for _ in 1..k {
        let total: f64 = closest.iter().sum();

        // Every row already coincides with a centroid: any row will do
        if total <= 0.0 {
            let idx = rng.random_range(0..n);
            centroids.push(matrix.row(idx).to_dense(d));
            continue;
        }

        let mut best: Option<(f64, Vec<f64>, Vec<f64>)> = None;
        for _ in 0..trials {
            let candidate = sample_weighted(&closest, total, rng);
            let point = matrix.row(candidate).to_dense(d);
            let dist = distances_to(matrix, row_norms, &point, row_norms[candidate]);
            let potential: f64 = closest.iter().zip(&dist).map(|(a, b)| a.min(*b)).sum();

            if best.as_ref().map_or(true, |(p, _, _)| potential < *p) {
                best = Some((potential, point, dist));
            }
        }

        if let Some((_, point, dist)) = best {
            for (c, new) in closest.iter_mut().zip(dist) {
                if new < *c {
                    *c = new;
                }
            }
            centroids.push(point);
        }
    }

    centroids
}
