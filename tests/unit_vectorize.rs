// Unit tests for the TF-IDF vectorizer adapter.
//
// Covers the alignment invariant between matrix and vocabulary, the empty
// corpus failure, determinism of the vocabulary order, and transform over a
// fitted vocabulary.

use tweetclust::error::PipelineError;
use tweetclust::vectorize::tfidf::TfIdfVectorizer;
use tweetclust::vectorize::traits::Vectorizer;
use tweetclust::vectorize::vectorize;

fn docs(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

fn sample_tweets() -> Vec<String> {
    docs(&[
        "brexit tariff parliament johnson",
        "parliament votes on brexit withdrawal",
        "coronavirus lockdown hospital",
        "hospital vaccine coronavirus trial",
        "johnson announces lockdown",
    ])
}

// ============================================================
// Alignment: rows == documents, cols == vocabulary
// ============================================================

#[test]
fn matrix_aligns_with_documents_and_vocabulary() {
    let tweets = sample_tweets();
    let (matrix, vocabulary) = vectorize(&tweets).unwrap();
    assert_eq!(matrix.n_rows(), tweets.len());
    assert_eq!(matrix.n_cols(), vocabulary.len());
    for row in matrix.rows() {
        assert!(row.indices.iter().all(|&c| c < vocabulary.len()));
        assert!(row.indices.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn single_document_corpus_aligns() {
    let (matrix, vocabulary) = vectorize(&docs(&["brexit parliament"])).unwrap();
    assert_eq!(matrix.n_rows(), 1);
    assert_eq!(vocabulary.len(), 2);
}

#[test]
fn document_with_only_stop_words_keeps_its_row() {
    let tweets = docs(&["brexit parliament", "the and of"]);
    let (matrix, _vocabulary) = vectorize(&tweets).unwrap();
    assert_eq!(matrix.n_rows(), 2);
    assert_eq!(matrix.row(1).nnz(), 0);
}

// ============================================================
// Empty corpus
// ============================================================

#[test]
fn empty_corpus_fails() {
    let err = vectorize(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyCorpus));
}

#[test]
fn empty_corpus_fails_for_transform_too() {
    let (vectorizer, _m) = TfIdfVectorizer::fit(&sample_tweets()).unwrap();
    let err = vectorizer.transform(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyCorpus));
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn vocabulary_order_is_deterministic() {
    let (_m1, v1) = vectorize(&sample_tweets()).unwrap();
    let (_m2, v2) = vectorize(&sample_tweets()).unwrap();
    assert_eq!(v1, v2);
    let mut sorted = v1.terms().to_vec();
    sorted.sort();
    assert_eq!(v1.terms(), sorted.as_slice());
}

#[test]
fn weights_are_identical_across_fits() {
    let (m1, _) = vectorize(&sample_tweets()).unwrap();
    let (m2, _) = vectorize(&sample_tweets()).unwrap();
    assert_eq!(m1, m2);
}

// ============================================================
// transform
// ============================================================

#[test]
fn transform_of_training_docs_matches_fit() {
    let tweets = sample_tweets();
    let (vectorizer, fitted) = TfIdfVectorizer::fit(&tweets).unwrap();
    let transformed = vectorizer.transform(&tweets).unwrap();
    assert_eq!(fitted, transformed);
}

#[test]
fn transform_with_no_known_terms_yields_zero_row() {
    let (vectorizer, _m) = TfIdfVectorizer::fit(&sample_tweets()).unwrap();
    let matrix = vectorizer.transform(&docs(&["unicorn rainbow"])).unwrap();
    assert_eq!(matrix.n_rows(), 1);
    assert_eq!(matrix.row(0).nnz(), 0);
    assert_eq!(matrix.n_cols(), vectorizer.vocabulary().len());
}

#[test]
fn idf_has_one_weight_per_term() {
    let (vectorizer, _m) = TfIdfVectorizer::fit(&sample_tweets()).unwrap();
    assert_eq!(vectorizer.idf().len(), vectorizer.vocabulary().len());
    assert!(vectorizer.idf().iter().all(|&w| w >= 1.0));
}
