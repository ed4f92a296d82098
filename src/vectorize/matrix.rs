// Sparse document-term weight matrix and the vocabulary that names its columns.
//
// Tweets are short, so each row touches a handful of columns out of a
// vocabulary of thousands. Rows are stored as sorted (column, weight) pairs;
// centroids stay dense (see cluster::kmeans).

use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated terms. Index `j` names column `j` of the matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    /// Build from terms already in their final (sorted, unique) order.
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Column index of a term. Terms are sorted, so this is a binary search.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// One document's non-zero weights, columns strictly increasing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    /// Build a row from (column, weight) pairs. Pairs are sorted by column.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(col, _)| col);
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// Dot product against a dense vector of the full column width.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(col, v)| v * dense[col]).sum()
    }

    /// Squared Euclidean distance to a dense point, given both squared norms.
    ///
    /// `||x - c||² = ||x||² - 2·x·c + ||c||²`, clamped at zero against
    /// rounding.
    pub fn squared_distance(&self, self_norm: f64, dense: &[f64], dense_norm: f64) -> f64 {
        (self_norm - 2.0 * self.dot_dense(dense) + dense_norm).max(0.0)
    }

    pub fn to_dense(&self, n_cols: usize) -> Vec<f64> {
        let mut out = vec![0.0; n_cols];
        for (col, v) in self.iter() {
            out[col] = v;
        }
        out
    }
}

/// Rows = documents, columns = vocabulary terms, cells = TF-IDF weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    n_cols: usize,
    rows: Vec<SparseRow>,
}

impl WeightMatrix {
    pub fn new(n_cols: usize, rows: Vec<SparseRow>) -> Self {
        debug_assert!(rows
            .iter()
            .all(|r| r.indices.last().map_or(true, |&c| c < n_cols)));
        Self { n_cols, rows }
    }

    /// Build from dense rows, dropping zeros. Mostly useful for tests and
    /// small synthetic inputs.
    pub fn from_dense(dense: &[Vec<f64>]) -> Self {
        let n_cols = dense.first().map_or(0, Vec::len);
        let rows = dense
            .iter()
            .map(|row| {
                let pairs = row
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(i, v)| (i, *v))
                    .collect();
                SparseRow::from_pairs(pairs)
            })
            .collect();
        Self { n_cols, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &SparseRow {
        &self.rows[index]
    }

    /// Mean of each column's variance. Used to scale the k-means tolerance.
    pub fn mean_column_variance(&self) -> f64 {
        if self.rows.is_empty() || self.n_cols == 0 {
            return 0.0;
        }
        let n = self.rows.len() as f64;
        let mut sum = vec![0.0; self.n_cols];
        let mut sum_sq = vec![0.0; self.n_cols];
        for row in &self.rows {
            for (col, v) in row.iter() {
                sum[col] += v;
                sum_sq[col] += v * v;
            }
        }
        let total: f64 = sum
            .iter()
            .zip(&sum_sq)
            .map(|(s, sq)| {
                let mean = s / n;
                (sq / n - mean * mean).max(0.0)
            })
            .sum();
        total / self.n_cols as f64
    }
}
