// Training pipeline: corpus → TF-IDF → (elbow → chosen k) → k-means → store.
//
// The choice of k is the one interactive step. When no k is given up front,
// the elbow curve is computed and handed to `choose_k`, which may prompt a
// person or run knee detection. Either way the store is only written after a
// complete fit.

use std::ops::RangeInclusive;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::cluster::elbow::{compute_elbow_curve_with, ElbowCurve, DEFAULT_K_RANGE};
use crate::cluster::kmeans::{self, ClusterModel, KMeansParams};
use crate::config::TopicConfig;
use crate::corpus;
use crate::store::key::ModelKey;
use crate::store::traits::ModelStore;
use crate::vectorize::matrix::WeightMatrix;
use crate::vectorize::tfidf::TfIdfVectorizer;

/// Knobs for one training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Fixed cluster count; `None` runs the elbow sweep and asks `choose_k`
    pub k: Option<usize>,
    /// Candidate k values for the elbow sweep
    pub k_range: RangeInclusive<usize>,
    pub params: KMeansParams,
    /// Label part of the saved key; defaults to the topic's model label
    pub label: Option<String>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            k: None,
            k_range: DEFAULT_K_RANGE,
            params: KMeansParams::default(),
            label: None,
        }
    }
}

/// Result of a completed (and persisted) training run.
#[derive(Debug)]
pub struct TrainOutcome {
    pub key: ModelKey,
    pub vectorizer: TfIdfVectorizer,
    pub model: ClusterModel,
    pub curve: Option<ElbowCurve>,
    pub documents: usize,
}

/// Clamp the sweep so it never asks for more clusters than documents.
pub fn clamp_k_range(range: &RangeInclusive<usize>, documents: usize) -> RangeInclusive<usize> {
    let start = (*range.start()).max(1);
    let end = (*range.end()).min(documents);
    if end < *range.end() {
        warn!(
            requested = *range.end(),
            documents,
            "Elbow range truncated to the number of documents"
        );
    }
    start..=end
}

/// Run the elbow sweep with a terminal progress bar.
pub fn elbow_with_progress(
    matrix: &WeightMatrix,
    k_range: RangeInclusive<usize>,
    params: &KMeansParams,
) -> Result<ElbowCurve> {
    let pb = ProgressBar::new(k_range.clone().count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Elbow [{bar:30}] {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let curve = compute_elbow_curve_with(matrix, k_range, params, |point| {
        pb.set_message(format!("k={} inertia={:.2}", point.k, point.inertia));
        pb.inc(1);
    });
    pb.finish_and_clear();

    curve.context("Elbow sweep failed")
}

/// Train a model for `topic` and persist it in `store`.
pub fn run(
    topic: &TopicConfig,
    store: &dyn ModelStore,
    options: &TrainOptions,
    choose_k: impl FnOnce(&ElbowCurve) -> Result<usize>,
) -> Result<TrainOutcome> {
    let documents = corpus::load_documents(&topic.corpus_path)?;
    let (vectorizer, matrix) = TfIdfVectorizer::fit(&documents)
        .with_context(|| format!("Failed to vectorize {}", topic.corpus_path.display()))?;

    let (k, curve) = match options.k {
        Some(k) => (k, None),
        None => {
            let range = clamp_k_range(&options.k_range, matrix.n_rows());
            let curve = elbow_with_progress(&matrix, range, &options.params)?;
            let k = choose_k(&curve)?;
            (k, Some(curve))
        }
    };

    let model = kmeans::fit(&matrix, k, &options.params)
        .with_context(|| format!("Failed to fit {k} clusters"))?;

    let label = options.label.as_deref().unwrap_or(&topic.model_label);
    let key = ModelKey::new(model.k(), label)?;
    store
        .save(&model, &vectorizer, key.as_str())
        .with_context(|| format!("Failed to save model '{key}'"))?;

    info!(
        topic = topic.topic.slug(),
        key = key.as_str(),
        k,
        inertia = model.inertia(),
        "Training run complete"
    );

    Ok(TrainOutcome {
        key,
        vectorizer,
        model,
        curve,
        documents: documents.len(),
    })
}
