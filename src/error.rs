// Error types for the vectorize → cluster → label pipeline.
//
// Every variant is a deterministic input error: nothing here is worth
// retrying. The core modules return these directly; the application layer
// (pipeline, CLI) wraps them in anyhow with context.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for the core pipeline modules.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors surfaced by vectorization, clustering, labeling and the model store.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No documents were supplied to the vectorizer.
    #[error("empty corpus: no documents to vectorize")]
    EmptyCorpus,

    /// Every token was filtered out, so there is no feature space.
    #[error("empty vocabulary: {documents} documents contained only stop words or short tokens")]
    EmptyVocabulary { documents: usize },

    /// Requested cluster count is outside `1..=documents`.
    #[error("invalid cluster count: cannot create {requested} clusters from {documents} documents")]
    InvalidClusterCount { requested: usize, documents: usize },

    /// A tuning parameter has an unusable value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// A model key does not follow the `<k>_<label>.<ext>` convention.
    #[error("corrupt model key '{key}': {reason}")]
    CorruptModelKey { key: String, reason: String },

    /// No persisted record exists for a key.
    #[error("model not found: '{key}' (looked for {})", path.display())]
    ModelNotFound { key: String, path: PathBuf },

    /// Vocabulary size and centroid dimensionality disagree.
    #[error("dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl PipelineError {
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub fn corrupt_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptModelKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let errors = vec![
            PipelineError::EmptyCorpus,
            PipelineError::InvalidClusterCount {
                requested: 5,
                documents: 2,
            },
            PipelineError::corrupt_key("abc_x.bin", "no leading integer"),
            PipelineError::dimension_mismatch(10, 8),
        ];
        let expected = ["empty corpus", "5 clusters from 2", "abc_x.bin", "expected 10"];

        for (err, needle) in errors.iter().zip(expected.iter()) {
            let display = err.to_string();
            assert!(
                display.contains(needle),
                "Display for {err:?} should contain '{needle}', got: {display}"
            );
        }
    }
}
