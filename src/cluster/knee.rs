// Automated knee detection on an elbow curve.
//
// A drop-in for the human reading the chart. Kneedle over (k, inertia) as a
// convex, decreasing curve: the knee is where adding clusters stops paying off.

use kneed::knee_locator::{InterpMethod, KneeLocator, KneeLocatorParams, ValidCurve, ValidDirection};
use tracing::debug;

use super::elbow::ElbowCurve;

/// Kneedle sensitivity; 1.0 is the usual offline setting.
const SENSITIVITY: f64 = 1.0;

/// Suggest a cluster count from `curve`, or `None` if it has no knee.
///
/// Needs at least three points and some drop in inertia. The suggestion is
/// always one of the k values on the curve.
pub fn knee_point(curve: &ElbowCurve) -> Option<usize> {
    let points = curve.points();
    if points.len() < 3 {
        return None;
    }

    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.inertia), hi.max(p.inertia))
    });
    if max <= min {
        return None;
    }

    let x: Vec<f64> = points.iter().map(|p| p.k as f64).collect();
    let y: Vec<f64> = points.iter().map(|p| p.inertia).collect();

    let params = KneeLocatorParams::new(
        ValidCurve::Convex,
        ValidDirection::Decreasing,
        InterpMethod::Interp1d,
    );

    let Some(knee) = KneeLocator::new(x, y, SENSITIVITY, params)
        .ok()
        .and_then(|locator| locator.knee)
    else {
        debug!(points = points.len(), "No knee in elbow curve");
        return None;
    };

    let k = knee.round() as usize;
    curve.inertia_for(k).map(|_| k)
}
