// Vectorizer adapter — turns normalized documents into a TF-IDF weight matrix.

pub mod matrix;
pub mod tfidf;
pub mod traits;

use crate::error::Result;
use matrix::{Vocabulary, WeightMatrix};
use tfidf::TfIdfVectorizer;
use traits::Vectorizer;

/// Fit a fresh TF-IDF vectorizer and return the matrix with its vocabulary.
///
/// Use `TfIdfVectorizer::fit` instead when the fitted vectorizer needs to be
/// kept (for persistence or for transforming new documents).
pub fn vectorize(documents: &[String]) -> Result<(WeightMatrix, Vocabulary)> {
    let mut vectorizer = TfIdfVectorizer::new();
    let matrix = vectorizer.fit_transform(documents)?;
    Ok((matrix, vectorizer.vocabulary().clone()))
}
