// K-means cluster engine.
//
// Lloyd refinement on top of greedy k-means++ seeding. Documents are sparse
// TF-IDF rows, centroids are dense vectors of vocabulary width. Distances use
// ||x - c||² = ||x||² - 2·x·c + ||c||² so each row costs O(nnz) per centroid.
//
// A run stops when the summed squared centroid shift drops to the tolerance
// (scaled by the mean column variance of the data) or after `max_iterations`,
// whichever comes first. `num_inits` runs execute in parallel with seeds
// `seed, seed + 1, ...`; the lowest inertia wins, ties going to the earlier
// run, so the result only depends on the seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::init::kmeans_plus_plus;
use crate::error::{PipelineError, Result};
use crate::vectorize::matrix::WeightMatrix;

/// Tuning knobs for a k-means fit.
///
/// `num_inits == 1` returns the single run unconditionally, even when a
/// different seed would have found a better optimum. Raise it to trade speed
/// for quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Upper bound on Lloyd iterations per run (default 100)
    pub max_iterations: usize,
    /// Independent seeded runs; best inertia kept (default 1)
    pub num_inits: usize,
    /// Convergence tolerance on centroid shift, relative to data variance (default 1e-4)
    pub tolerance: f64,
    /// Base seed. `None` draws one from the OS RNG; it is logged and stored on the model.
    pub seed: Option<u64>,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            num_inits: 1,
            tolerance: 1e-4,
            seed: None,
        }
    }
}

impl KMeansParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_num_inits(mut self, num_inits: usize) -> Self {
        self.num_inits = num_inits;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.num_inits == 0 {
            return Err(PipelineError::invalid_parameter(
                "num_inits",
                "at least one initialization is required",
            ));
        }
        if self.max_iterations == 0 {
            return Err(PipelineError::invalid_parameter(
                "max_iterations",
                "at least one iteration is required",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(PipelineError::invalid_parameter(
                "tolerance",
                format!("must be a finite non-negative number, got {}", self.tolerance),
            ));
        }
        Ok(())
    }

    /// The seed this fit will use: the configured one, or a fresh draw.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::rng().random();
                info!(seed, "No seed configured, drew one for this fit");
                seed
            }
        }
    }
}

/// A fitted partition of the training rows into `k` clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    assignments: Vec<usize>,
    inertia: f64,
    iterations: usize,
    seed: u64,
}

impl ClusterModel {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Width of each centroid; equals the vocabulary size it was fit on.
    pub fn dimensions(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Training-row assignments, each in `0..k`.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Sum of squared distances from each training row to its centroid.
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Lloyd iterations performed by the winning run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Base seed the fit was run with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of training rows in each cluster. Empty clusters report 0.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        count_assignments(&self.assignments, self.k())
    }

    /// Assign new rows to their nearest centroid without touching the model.
    pub fn predict(&self, matrix: &WeightMatrix) -> Result<Vec<usize>> {
        if matrix.n_cols() != self.dimensions() {
            return Err(PipelineError::dimension_mismatch(
                self.dimensions(),
                matrix.n_cols(),
            ));
        }
        let row_norms = row_norms(matrix);
        let centroid_norms = squared_norms(&self.centroids);
        let (labels, _) = assign(matrix, &row_norms, &self.centroids, &centroid_norms);
        Ok(labels)
    }
}

/// Count how many entries of `assignments` fall into each of `k` clusters.
pub fn count_assignments(assignments: &[usize], k: usize) -> Vec<usize> {
    let mut counts = vec![0; k];
    for &a in assignments {
        if let Some(c) = counts.get_mut(a) {
            *c += 1;
        }
    }
    counts
}

/// Fit `k` clusters over the rows of `matrix`.
pub fn fit(matrix: &WeightMatrix, k: usize, params: &KMeansParams) -> Result<ClusterModel> {
    let n = matrix.n_rows();
    if k == 0 || k > n {
        return Err(PipelineError::InvalidClusterCount {
            requested: k,
            documents: n,
        });
    }
    params.validate()?;

    let seed = params.resolve_seed();
    let row_norms = row_norms(matrix);
    let tolerance = params.tolerance * matrix.mean_column_variance();

    let runs: Vec<Run> = (0..params.num_inits)
        .into_par_iter()
        .map(|i| {
            single_run(
                matrix,
                &row_norms,
                k,
                params.max_iterations,
                tolerance,
                seed.wrapping_add(i as u64),
            )
        })
        .collect();

    // Strict `<` keeps the earliest run on ties
    let mut best_index = 0;
    for (i, run) in runs.iter().enumerate().skip(1) {
        if run.inertia < runs[best_index].inertia {
            best_index = i;
        }
    }
    let Some(best) = runs.into_iter().nth(best_index) else {
        return Err(PipelineError::invalid_parameter(
            "num_inits",
            "no k-means run completed",
        ));
    };

    info!(
        k,
        documents = n,
        inertia = best.inertia,
        iterations = best.iterations,
        seed,
        best_init = best_index,
        "Fitted k-means model"
    );

    Ok(ClusterModel {
        centroids: best.centroids,
        assignments: best.labels,
        inertia: best.inertia,
        iterations: best.iterations,
        seed,
    })
}

struct Run {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

fn single_run(
    matrix: &WeightMatrix,
    row_norms: &[f64],
    k: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
) -> Run {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = kmeans_plus_plus(matrix, row_norms, k, &mut rng);
    let mut iterations = 0;

    for iter in 0..max_iterations {
        iterations = iter + 1;

        let centroid_norms = squared_norms(&centroids);
        let (labels, _) = assign(matrix, row_norms, &centroids, &centroid_norms);
        let updated = update_centroids(matrix, &labels, &centroids);

        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .flat_map(|(old, new)| old.iter().zip(new).map(|(a, b)| (a - b) * (a - b)))
            .sum();
        centroids = updated;

        if shift <= tolerance {
            debug!(seed, iterations, shift, "k-means run converged");
            break;
        }
    }

    // Final E-step so labels and inertia agree with the returned centroids
    let centroid_norms = squared_norms(&centroids);
    let (labels, inertia) = assign(matrix, row_norms, &centroids, &centroid_norms);

    Run {
        centroids,
        labels,
        inertia,
        iterations,
    }
}

fn row_norms(matrix: &WeightMatrix) -> Vec<f64> {
    matrix.rows().iter().map(|r| r.squared_norm()).collect()
}

fn squared_norms(points: &[Vec<f64>]) -> Vec<f64> {
    points
        .iter()
        .map(|p| p.iter().map(|v| v * v).sum())
        .collect()
}

/// Nearest centroid per row (ties to the lowest index) and the total inertia.
fn assign(
    matrix: &WeightMatrix,
    row_norms: &[f64],
    centroids: &[Vec<f64>],
    centroid_norms: &[f64],
) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = matrix
        .rows()
        .iter()
        .zip(row_norms)
        .map(|(row, &norm)| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, (centroid, &c_norm)) in centroids.iter().zip(centroid_norms).enumerate() {
                let dist = row.squared_distance(norm, centroid, c_norm);
                if dist < best_dist {
                    best = c;
                    best_dist = dist;
                }
            }
            inertia += best_dist;
            best
        })
        .collect();
    (labels, inertia)
}

/// Mean of each cluster's rows. An emptied cluster keeps its old centroid.
fn update_centroids(matrix: &WeightMatrix, labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let d = matrix.n_cols();
    let mut sums = vec![vec![0.0; d]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (row, &label) in matrix.rows().iter().zip(labels) {
        counts[label] += 1;
        for (col, v) in row.iter() {
            sums[label][col] += v;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), old)| {
            if count == 0 {
                return old.clone();
            }
            let scale = count as f64;
            for v in &mut sum {
                *v /= scale;
            }
            sum
        })
        .collect()
}
