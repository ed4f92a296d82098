// Model keys — `<k>_<label>.<ext>`.
//
// The cluster count lives in the key itself: everything before the first
// underscore must parse as an integer >= 1. This is bookkeeping for our own
// files, not a trust boundary; the only extra rule is that a key is a bare
// file name so it cannot point outside the store directory.

use std::fmt;
use std::str::FromStr;

use crate::error::{PipelineError, Result};

/// Extension for records written by this crate.
pub const MODEL_EXTENSION: &str = "bin";

/// Separates the leading cluster count from the label.
pub const KEY_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    raw: String,
    k: usize,
    label: String,
}

impl ModelKey {
    /// Build the canonical key `<k>_<label>.bin`.
    pub fn new(k: usize, label: &str) -> Result<Self> {
        if label.is_empty() {
            return Err(PipelineError::corrupt_key(
                format!("{k}{KEY_SEPARATOR}.{MODEL_EXTENSION}"),
                "label must not be empty",
            ));
        }
        Self::parse(&format!("{k}{KEY_SEPARATOR}{label}.{MODEL_EXTENSION}"))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(PipelineError::corrupt_key(raw, "key is empty"));
        }
        if raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(PipelineError::corrupt_key(
                raw,
                "key must be a plain file name",
            ));
        }

        let (prefix, rest) = raw.split_once(KEY_SEPARATOR).unwrap_or((raw, ""));
        let k: usize = prefix.parse().map_err(|_| {
            PipelineError::corrupt_key(
                raw,
                format!("expected a cluster count before '{KEY_SEPARATOR}', found '{prefix}'"),
            )
        })?;
        if k == 0 {
            return Err(PipelineError::corrupt_key(
                raw,
                "cluster count must be at least 1",
            ));
        }

        let label = rest.rsplit_once('.').map_or(rest, |(stem, _)| stem);

        Ok(Self {
            raw: raw.to_string(),
            k,
            label: label.to_string(),
        })
    }

    /// Cluster count encoded in the key.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Text between the separator and the extension.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ModelKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let key = ModelKey::parse("6_brexit.bin").unwrap();
        assert_eq!(key.k(), 6);
        assert_eq!(key.label(), "brexit");
    }

    #[test]
    fn test_label_may_contain_separator() {
        let key = ModelKey::parse("4_corona_march.pkl").unwrap();
        assert_eq!(key.k(), 4);
        assert_eq!(key.label(), "corona_march");
    }

    #[test]
    fn test_new_round_trips() {
        let key = ModelKey::new(3, "test").unwrap();
        assert_eq!(key.as_str(), "3_test.bin");
        assert_eq!(key.k(), 3);
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["notanumber_x.ext", "", "0_zero.bin", "_x.bin", "5.bin", "../3_x.bin", "3_a/b.bin"] {
            let err = ModelKey::parse(raw).unwrap_err();
            assert!(
                matches!(err, PipelineError::CorruptModelKey { .. }),
                "{raw:?} should be corrupt, got {err:?}"
            );
        }
    }

    #[test]
    fn test_new_rejects_empty_label() {
        assert!(ModelKey::new(2, "").is_err());
    }
}
