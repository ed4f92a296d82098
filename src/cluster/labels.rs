// Cluster labeling — the dominant vocabulary of each centroid.
//
// Internally clusters are 0-based indices into the model's centroid list.
// Everything a person sees is 1-based. `ClusterId` is the only place that
// offset is applied, in both directions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kmeans::{count_assignments, ClusterModel};
use crate::error::{PipelineError, Result};
use crate::vectorize::matrix::Vocabulary;

/// User-facing (1-based) cluster number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(usize);

impl ClusterId {
    /// Convert a 0-based model index into a display id.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Parse a display number; `0` is not a valid cluster id.
    pub fn new(display: usize) -> Option<Self> {
        (display >= 1).then_some(Self(display))
    }

    /// The 0-based model index this id refers to.
    pub fn index(self) -> usize {
        self.0 - 1
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of cluster output: id, size and the terms that define it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    /// Documents assigned to this cluster
    pub documents: usize,
    /// Top terms, highest centroid weight first
    pub top_terms: Vec<String>,
}

impl ClusterSummary {
    /// Space-separated top terms, the form used for chart annotations.
    pub fn label(&self) -> String {
        self.top_terms.join(" ")
    }
}

/// Column indices of `centroid` sorted by descending weight, first `top_n`.
///
/// Equal weights keep ascending column order.
pub fn top_term_indices(centroid: &[f64], top_n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..centroid.len()).collect();
    order.sort_by(|&a, &b| centroid[b].total_cmp(&centroid[a]).then(a.cmp(&b)));
    order.truncate(top_n.min(centroid.len()));
    order
}

fn check_dimensions(model: &ClusterModel, vocabulary: &Vocabulary) -> Result<()> {
    if model.dimensions() != vocabulary.len() {
        return Err(PipelineError::dimension_mismatch(
            vocabulary.len(),
            model.dimensions(),
        ));
    }
    Ok(())
}

fn terms_for(vocabulary: &Vocabulary, centroid: &[f64], top_n: usize) -> Vec<String> {
    top_term_indices(centroid, top_n)
        .into_iter()
        .filter_map(|i| vocabulary.term(i).map(str::to_string))
        .collect()
}

/// Top `top_n` terms per cluster, keyed by 1-based id.
///
/// `top_n` larger than the vocabulary is clamped.
pub fn label_clusters(
    model: &ClusterModel,
    vocabulary: &Vocabulary,
    top_n: usize,
) -> Result<BTreeMap<ClusterId, Vec<String>>> {
    check_dimensions(model, vocabulary)?;

    Ok(model
        .centroids()
        .iter()
        .enumerate()
        .map(|(i, centroid)| (ClusterId::from_index(i), terms_for(vocabulary, centroid, top_n)))
        .collect())
}

/// Per-cluster summaries with document counts taken from `assignments`.
///
/// Pass `model.assignments()` for the training corpus, or the output of
/// `ClusterModel::predict` for new documents.
pub fn summarize_clusters(
    model: &ClusterModel,
    vocabulary: &Vocabulary,
    assignments: &[usize],
    top_n: usize,
) -> Result<Vec<ClusterSummary>> {
    check_dimensions(model, vocabulary)?;
    if let Some(&bad) = assignments.iter().find(|&&a| a >= model.k()) {
        return Err(PipelineError::invalid_parameter(
            "assignments",
            format!("cluster index {bad} is outside 0..{}", model.k()),
        ));
    }

    let counts = count_assignments(assignments, model.k());
    Ok(model
        .centroids()
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (centroid, documents))| ClusterSummary {
            id: ClusterId::from_index(i),
            documents,
            top_terms: terms_for(vocabulary, centroid, top_n),
        })
        .collect())
}
