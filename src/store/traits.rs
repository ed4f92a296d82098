// Model store trait — where fitted (vectorizer, model) pairs live between runs.
//
// Implementors: FileModelStore (one bincode file per key in a directory).
// Records are written once per training run and read many times for
// labeling and classification; retraining writes a new key instead of
// mutating an old record.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::key::ModelKey;
use crate::cluster::kmeans::ClusterModel;
use crate::error::Result;
use crate::vectorize::tfidf::TfIdfVectorizer;

/// Everything `load` hands back: the pair plus the `k` recovered from the key.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub vectorizer: TfIdfVectorizer,
    pub model: ClusterModel,
    pub k: usize,
    pub trained_at: DateTime<Utc>,
}

/// A record found by `list`.
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub key: ModelKey,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub trait ModelStore {
    /// Persist a fitted pair under `key`. The key's `k` must match the model.
    fn save(&self, model: &ClusterModel, vectorizer: &TfIdfVectorizer, key: &str) -> Result<()>;

    /// Read back the pair stored under `key`, checking it is self-consistent.
    fn load(&self, key: &str) -> Result<LoadedModel>;

    /// All records currently in the store, ordered by key.
    fn list(&self) -> Result<Vec<StoredModel>>;

    /// The most recently written record whose key label is `label`.
    fn latest_for_label(&self, label: &str) -> Result<ModelKey>;
}
