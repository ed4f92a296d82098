// Unit tests for the cluster engine, elbow selector and labeler.
//
// Uses small synthetic matrices so every expected value can be worked out by
// hand: assignment completeness, inertia bounds, the k = 1 and k = n
// boundaries, the seed determinism contract, and label ordering.

use tweetclust::cluster::elbow::{compute_elbow_curve, DEFAULT_K_RANGE};
use tweetclust::cluster::kmeans::{fit, KMeansParams};
use tweetclust::cluster::knee::knee_point;
use tweetclust::cluster::labels::{label_clusters, summarize_clusters, ClusterId};
use tweetclust::error::PipelineError;
use tweetclust::vectorize::matrix::{Vocabulary, WeightMatrix};

fn points() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.9, 0.1, 0.0, 0.0],
        vec![0.8, 0.0, 0.2, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.1, 0.9, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.9, 0.1],
        vec![0.0, 0.0, 0.0, 1.0],
    ]
}

fn matrix() -> WeightMatrix {
    WeightMatrix::from_dense(&points())
}

fn seeded() -> KMeansParams {
    KMeansParams::default().with_seed(2024)
}

fn total_variance(points: &[Vec<f64>]) -> f64 {
    let n = points.len() as f64;
    let d = points[0].len();
    let mean: Vec<f64> = (0..d)
        .map(|j| points.iter().map(|p| p[j]).sum::<f64>() / n)
        .collect();
    points
        .iter()
        .map(|p| p.iter().zip(&mean).map(|(a, b)| (a - b) * (a - b)).sum::<f64>())
        .sum()
}

// ============================================================
// Assignment completeness and inertia
// ============================================================

#[test]
fn every_row_gets_one_assignment_in_range() {
    for k in 1..=8 {
        let model = fit(&matrix(), k, &seeded()).unwrap();
        assert_eq!(model.k(), k);
        assert_eq!(model.assignments().len(), 8);
        assert!(model.assignments().iter().all(|&a| a < k));
        assert_eq!(model.cluster_sizes().iter().sum::<usize>(), 8);
        assert_eq!(model.dimensions(), 4);
    }
}

#[test]
fn inertia_is_never_negative() {
    for k in 1..=8 {
        let model = fit(&matrix(), k, &seeded()).unwrap();
        assert!(model.inertia() >= 0.0, "k={k} inertia {}", model.inertia());
    }
}

#[test]
fn k_one_inertia_equals_total_variance() {
    let model = fit(&matrix(), 1, &seeded()).unwrap();
    let expected = total_variance(&points());
    assert!(
        (model.inertia() - expected).abs() < 1e-9,
        "got {} expected {expected}",
        model.inertia()
    );
    assert!(model.assignments().iter().all(|&a| a == 0));
}

#[test]
fn k_equal_to_n_has_zero_inertia() {
    let model = fit(&matrix(), 8, &seeded()).unwrap();
    assert!(model.inertia().abs() < 1e-12, "inertia {}", model.inertia());
    let mut seen = model.assignments().to_vec();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 8, "each row should own a cluster");
}

#[test]
fn identical_rows_have_zero_inertia_at_k_one() {
    let m = WeightMatrix::from_dense(&[vec![0.5, 0.5], vec![0.5, 0.5], vec![0.5, 0.5]]);
    let model = fit(&m, 1, &seeded()).unwrap();
    assert!(model.inertia().abs() < 1e-12);
}

#[test]
fn empty_clusters_are_permitted() {
    // Three identical rows, three clusters: at least two clusters stay empty
    let m = WeightMatrix::from_dense(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
    let model = fit(&m, 3, &seeded()).unwrap();
    assert_eq!(model.cluster_sizes().iter().sum::<usize>(), 3);
    assert!(model.cluster_sizes().iter().filter(|&&c| c == 0).count() >= 2);
}

// ============================================================
// Invalid k
// ============================================================

#[test]
fn k_above_document_count_fails() {
    let err = fit(&matrix(), 9, &seeded()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidClusterCount {
            requested: 9,
            documents: 8
        }
    ));
}

#[test]
fn k_zero_fails() {
    let err = fit(&matrix(), 0, &seeded()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidClusterCount { .. }));
}

// ============================================================
// Determinism and multiple inits
// ============================================================

#[test]
fn same_seed_same_assignments() {
    let a = fit(&matrix(), 3, &seeded()).unwrap();
    let b = fit(&matrix(), 3, &seeded()).unwrap();
    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.centroids(), b.centroids());
    assert_eq!(a.seed(), 2024);
}

#[test]
fn parallel_inits_are_deterministic() {
    let params = seeded().with_num_inits(6);
    let a = fit(&matrix(), 3, &params).unwrap();
    let b = fit(&matrix(), 3, &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn more_inits_never_worse_than_first_run() {
    let single = fit(&matrix(), 3, &seeded()).unwrap();
    let multi = fit(&matrix(), 3, &seeded().with_num_inits(8)).unwrap();
    // Run 0 of the multi-init fit is exactly the single-init fit
    assert!(multi.inertia() <= single.inertia());
}

#[test]
fn max_iterations_bounds_the_run() {
    let model = fit(&matrix(), 3, &seeded().with_max_iterations(1)).unwrap();
    assert_eq!(model.iterations(), 1);
}

#[test]
fn predict_on_training_rows_matches_assignments() {
    let model = fit(&matrix(), 3, &seeded()).unwrap();
    assert_eq!(model.predict(&matrix()).unwrap(), model.assignments());
}

// ============================================================
// Elbow curve
// ============================================================

#[test]
fn elbow_curve_length_matches_range() {
    let curve = compute_elbow_curve(&matrix(), 1..=6, &seeded()).unwrap();
    assert_eq!(curve.len(), 6);
    assert!(curve.points().iter().all(|p| p.inertia >= 0.0));
}

#[test]
fn elbow_ends_at_zero_when_k_reaches_n() {
    let curve = compute_elbow_curve(&matrix(), 1..=8, &seeded()).unwrap();
    let last = curve.points().last().unwrap();
    assert_eq!(last.k, 8);
    assert!(last.inertia.abs() < 1e-12);
    assert!(curve.points()[0].inertia > last.inertia);
}

#[test]
fn default_range_is_one_through_fourteen() {
    assert_eq!(DEFAULT_K_RANGE.clone().count(), 14);
    assert_eq!(*DEFAULT_K_RANGE.start(), 1);
}

#[test]
fn knee_of_real_curve_is_inside_range() {
    let curve = compute_elbow_curve(&matrix(), 1..=8, &seeded()).unwrap();
    if let Some(k) = knee_point(&curve) {
        assert!((1..=8).contains(&k));
    }
}

// ============================================================
// Labels
// ============================================================

#[test]
fn labels_are_in_strictly_descending_weight_order() {
    // Two documents, three terms, known weights
    let m = WeightMatrix::from_dense(&[vec![0.9, 0.3, 0.1], vec![0.1, 0.2, 0.8]]);
    let vocab = Vocabulary::new(vec!["alpha".into(), "beta".into(), "gamma".into()]);
    let model = fit(&m, 2, &seeded()).unwrap();

    let labels = label_clusters(&model, &vocab, 3).unwrap();
    assert_eq!(labels.len(), 2);

    let first_doc_cluster = ClusterId::from_index(model.assignments()[0]);
    let second_doc_cluster = ClusterId::from_index(model.assignments()[1]);
    assert_eq!(labels[&first_doc_cluster], vec!["alpha", "beta", "gamma"]);
    assert_eq!(labels[&second_doc_cluster], vec!["gamma", "beta", "alpha"]);

    for (id, terms) in &labels {
        let centroid = &model.centroids()[id.index()];
        let weights: Vec<f64> = terms
            .iter()
            .map(|t| centroid[vocab.index_of(t).unwrap()])
            .collect();
        assert!(weights.windows(2).all(|w| w[0] > w[1]));
    }
}

#[test]
fn labels_are_keyed_from_one() {
    let vocab = Vocabulary::new(vec!["a1".into(), "b1".into(), "c1".into(), "d1".into()]);
    let model = fit(&matrix(), 3, &seeded()).unwrap();
    let labels = label_clusters(&model, &vocab, 2).unwrap();
    let ids: Vec<usize> = labels.keys().map(|id| id.get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn top_n_larger_than_vocabulary_is_clamped() {
    let vocab = Vocabulary::new(vec!["a1".into(), "b1".into(), "c1".into(), "d1".into()]);
    let model = fit(&matrix(), 2, &seeded()).unwrap();
    let labels = label_clusters(&model, &vocab, 50).unwrap();
    assert!(labels.values().all(|terms| terms.len() == 4));
}

#[test]
fn label_with_wrong_vocabulary_fails() {
    let vocab = Vocabulary::new(vec!["only".into(), "two".into()]);
    let model = fit(&matrix(), 2, &seeded()).unwrap();
    let err = label_clusters(&model, &vocab, 5).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DimensionMismatch {
            expected: 2,
            actual: 4
        }
    ));
}

#[test]
fn summaries_count_documents_per_cluster() {
    let vocab = Vocabulary::new(vec!["a1".into(), "b1".into(), "c1".into(), "d1".into()]);
    let model = fit(&matrix(), 3, &seeded()).unwrap();
    let summaries = summarize_clusters(&model, &vocab, model.assignments(), 2).unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries.iter().map(|s| s.documents).sum::<usize>(), 8);
    assert_eq!(summaries[0].id.get(), 1);
    assert!(summaries.iter().all(|s| s.top_terms.len() == 2));
}

#[test]
fn summaries_reject_out_of_range_assignments() {
    let vocab = Vocabulary::new(vec!["a1".into(), "b1".into(), "c1".into(), "d1".into()]);
    let model = fit(&matrix(), 2, &seeded()).unwrap();
    let err = summarize_clusters(&model, &vocab, &[0, 1, 2], 2).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter { .. }));
}
