// Vectorizer trait — the boundary between raw text and the feature space.
//
// Anything that can learn a vocabulary from documents and emit a weight
// matrix whose columns line up with that vocabulary fits here. The default
// implementation is TF-IDF; the cluster engine only ever sees the matrix.

use super::matrix::{Vocabulary, WeightMatrix};
use crate::error::Result;

pub trait Vectorizer {
    /// Learn the vocabulary (and weighting statistics) from `documents` and
    /// return their weight matrix. Row `i` corresponds to `documents[i]`.
    fn fit_transform(&mut self, documents: &[String]) -> Result<WeightMatrix>;

    /// Weight new documents against the already-fitted vocabulary.
    fn transform(&self, documents: &[String]) -> Result<WeightMatrix>;

    /// The fitted vocabulary; empty before `fit_transform`.
    fn vocabulary(&self) -> &Vocabulary;
}
