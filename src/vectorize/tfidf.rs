// TF-IDF vectorizer — the default feature space for tweet clustering.
//
// Each tweet is one document. Tokens are runs of two or more word characters
// (Unicode letters, digits, underscore), so accented words stay whole;
// English stop words (from the `stop-words` crate) are dropped before any
// counting. Weights are raw term counts times a smoothed IDF, and each row is
// L2-normalized so long and short tweets land on the same scale:
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// The vocabulary is kept in lexicographic order, which makes column indices
// reproducible for a given corpus. Labeling depends on that.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use super::matrix::{SparseRow, Vocabulary, WeightMatrix};
use super::traits::Vectorizer;
use crate::error::{PipelineError, Result};

/// Shortest token kept, in characters.
const MIN_TOKEN_CHARS: usize = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn english_stop_words() -> &'static HashSet<String> {
    static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_string())
            .collect()
    })
}

/// Split a document into lower-cased, stopword-filtered tokens.
pub fn tokenize(document: &str) -> Vec<String> {
    let lower = document.to_lowercase();
    let stop_words = english_stop_words();
    lower
        .split(|c: char| !is_word_char(c))
        .filter(|tok| tok.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|tok| !stop_words.contains(*tok))
        .map(str::to_string)
        .collect()
}

/// Fitted TF-IDF state: vocabulary plus one IDF weight per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on `documents` and return the fitted vectorizer with the matrix.
    pub fn fit(documents: &[String]) -> Result<(Self, WeightMatrix)> {
        let mut vectorizer = Self::new();
        let matrix = vectorizer.fit_transform(documents)?;
        Ok((vectorizer, matrix))
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Weight one tokenized document against the fitted vocabulary.
    fn weigh(&self, tokens: &[String]) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for tok in tokens {
            if let Some(col) = self.vocabulary.index_of(tok) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut pairs: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();

        let norm = pairs.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut pairs {
                *w /= norm;
            }
        }

        SparseRow::from_pairs(pairs)
    }
}

impl Vectorizer for TfIdfVectorizer {
    fn fit_transform(&mut self, documents: &[String]) -> Result<WeightMatrix> {
        if documents.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        // Document frequency per term; BTreeMap keeps the vocabulary sorted
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                documents: documents.len(),
            });
        }

        let n = documents.len() as f64;
        self.idf = df
            .values()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = Vocabulary::new(df.keys().map(|t| t.to_string()).collect());

        let rows: Vec<SparseRow> = tokenized.iter().map(|t| self.weigh(t)).collect();
        let empty_rows = rows.iter().filter(|r| r.nnz() == 0).count();
        if empty_rows > 0 {
            debug!(empty_rows, "Documents with no surviving terms");
        }

        info!(
            documents = documents.len(),
            vocabulary = self.vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Ok(WeightMatrix::new(self.vocabulary.len(), rows))
    }

    fn transform(&self, documents: &[String]) -> Result<WeightMatrix> {
        if documents.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        if self.vocabulary.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                documents: documents.len(),
            });
        }

        let rows = documents.iter().map(|d| self.weigh(&tokenize(d))).collect();
        Ok(WeightMatrix::new(self.vocabulary.len(), rows))
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}
