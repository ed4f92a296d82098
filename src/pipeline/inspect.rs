// Inference over a stored model: re-label clusters or classify new tweets
// without re-fitting anything.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::info;

use crate::cluster::labels::{label_clusters, summarize_clusters, ClusterId, ClusterSummary};
use crate::config::TopicConfig;
use crate::error::PipelineError;
use crate::store::key::ModelKey;
use crate::store::traits::{LoadedModel, ModelStore};
use crate::vectorize::traits::Vectorizer;

/// Resolve which key to use for `topic`: explicit override, then the pinned
/// key from config, then the newest record carrying the topic's label.
pub fn resolve_key(
    store: &dyn ModelStore,
    topic: &TopicConfig,
    key_override: Option<&str>,
) -> Result<ModelKey> {
    if let Some(key) = key_override.or(topic.model_key.as_deref()) {
        return Ok(ModelKey::parse(key)?);
    }
    store.latest_for_label(&topic.model_label).with_context(|| {
        format!(
            "No trained model for '{}'. Run `tweetclust train --topic {}` first.",
            topic.topic.slug(),
            topic.topic.slug()
        )
    })
}

/// The key of a record that actually exists in `store` for `topic`, if any.
///
/// A pinned key only counts when its file is present; otherwise the newest
/// record with the topic's label is used.
pub fn trained_key(store: &dyn ModelStore, topic: &TopicConfig) -> Result<Option<ModelKey>> {
    if let Some(pinned) = topic.model_key.as_deref() {
        let key = ModelKey::parse(pinned)?;
        let present = store.list()?.iter().any(|m| m.key == key);
        return Ok(present.then_some(key));
    }
    match store.latest_for_label(&topic.model_label) {
        Ok(key) => Ok(Some(key)),
        Err(PipelineError::ModelNotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load the model for `topic`.
pub fn load_model(
    store: &dyn ModelStore,
    topic: &TopicConfig,
    key_override: Option<&str>,
) -> Result<(ModelKey, LoadedModel)> {
    let key = resolve_key(store, topic, key_override)?;
    let loaded = store
        .load(key.as_str())
        .with_context(|| format!("Failed to load model '{key}'"))?;
    Ok((key, loaded))
}

/// Top terms per cluster of a loaded model.
pub fn cluster_labels(loaded: &LoadedModel, top_n: usize) -> Result<BTreeMap<ClusterId, Vec<String>>> {
    Ok(label_clusters(
        &loaded.model,
        loaded.vectorizer.vocabulary(),
        top_n,
    )?)
}

/// Summaries for the training corpus the model was fit on.
pub fn training_summaries(loaded: &LoadedModel, top_n: usize) -> Result<Vec<ClusterSummary>> {
    Ok(summarize_clusters(
        &loaded.model,
        loaded.vectorizer.vocabulary(),
        loaded.model.assignments(),
        top_n,
    )?)
}

/// Assign `documents` to the stored clusters and summarize the counts.
pub fn classify(
    loaded: &LoadedModel,
    documents: &[String],
    top_n: usize,
) -> Result<Vec<ClusterSummary>> {
    let matrix = loaded
        .vectorizer
        .transform(documents)
        .context("Failed to vectorize documents with the stored vocabulary")?;
    let predictions = loaded.model.predict(&matrix)?;

    info!(
        documents = documents.len(),
        clusters = loaded.model.k(),
        "Classified documents"
    );

    Ok(summarize_clusters(
        &loaded.model,
        loaded.vectorizer.vocabulary(),
        &predictions,
        top_n,
    )?)
}
