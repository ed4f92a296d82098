// Elbow curve — inertia as a function of the cluster count.
//
// Fits one model per candidate k and records its inertia. The curve is
// exploratory output: something downstream (a person reading the chart, or
// knee::knee_point) picks the working k. With single-init fits the curve is
// only non-increasing in expectation; a bump is logged, not corrected.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::kmeans::{fit, KMeansParams};
use crate::error::{PipelineError, Result};
use crate::vectorize::matrix::WeightMatrix;

/// Candidate cluster counts tried when the caller has no preference.
pub const DEFAULT_K_RANGE: RangeInclusive<usize> = 1..=14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

/// `(k, inertia)` points in ascending `k` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElbowCurve {
    points: Vec<ElbowPoint>,
}

impl ElbowCurve {
    pub fn new(points: Vec<ElbowPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ElbowPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn inertia_for(&self, k: usize) -> Option<f64> {
        self.points.iter().find(|p| p.k == k).map(|p| p.inertia)
    }

    /// True when no point has higher inertia than the one before it.
    pub fn is_non_increasing(&self) -> bool {
        self.points.windows(2).all(|w| w[1].inertia <= w[0].inertia)
    }
}

/// Fit every `k` in `k_range` and collect the resulting curve.
pub fn compute_elbow_curve(
    matrix: &WeightMatrix,
    k_range: impl IntoIterator<Item = usize>,
    params: &KMeansParams,
) -> Result<ElbowCurve> {
    compute_elbow_curve_with(matrix, k_range, params, |_| {})
}

/// Like `compute_elbow_curve`, calling `on_point` after each fit.
pub fn compute_elbow_curve_with(
    matrix: &WeightMatrix,
    k_range: impl IntoIterator<Item = usize>,
    params: &KMeansParams,
    mut on_point: impl FnMut(&ElbowPoint),
) -> Result<ElbowCurve> {
    let ks: Vec<usize> = k_range.into_iter().collect();
    if ks.is_empty() {
        return Err(PipelineError::invalid_parameter(
            "k_range",
            "at least one candidate k is required",
        ));
    }
    if ks.windows(2).any(|w| w[1] <= w[0]) {
        return Err(PipelineError::invalid_parameter(
            "k_range",
            "candidate k values must be strictly ascending",
        ));
    }

    // One seed for the whole sweep keeps the curve reproducible
    let seed = params.resolve_seed();
    let params = KMeansParams {
        seed: Some(seed),
        ..params.clone()
    };

    let mut points: Vec<ElbowPoint> = Vec::with_capacity(ks.len());
    for k in ks {
        let model = fit(matrix, k, &params)?;
        let point = ElbowPoint {
            k,
            inertia: model.inertia(),
        };

        if let Some(prev) = points.last() {
            if point.inertia > prev.inertia {
                debug!(
                    k,
                    inertia = point.inertia,
                    previous = prev.inertia,
                    "Inertia rose with k (single-init fit)"
                );
            }
        }

        on_point(&point);
        points.push(point);
    }

    info!(
        points = points.len(),
        seed,
        "Computed elbow curve"
    );

    Ok(ElbowCurve::new(points))
}
