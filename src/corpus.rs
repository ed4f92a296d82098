// Corpus loading — one tweet per line.
//
// Lines are newline-stripped and lower-cased. Blank lines carry no terms and
// are skipped, so row i of the weight matrix is the i-th non-blank line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Normalize one raw line into a document.
pub fn normalize_document(line: &str) -> String {
    line.trim_end_matches(['\n', '\r']).to_lowercase()
}

/// Normalize raw text into documents, one per non-blank line.
pub fn parse_documents(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_document)
        .filter(|doc| !doc.trim().is_empty())
        .collect()
}

/// Read a corpus file from disk.
pub fn load_documents(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
    let documents = parse_documents(&text);
    info!(path = %path.display(), documents = documents.len(), "Loaded corpus");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips() {
        assert_eq!(normalize_document("Brexit Day\r\n"), "brexit day");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let docs = parse_documents("First TWEET\n\n   \nSecond tweet\n");
        assert_eq!(docs, vec!["first tweet", "second tweet"]);
    }
}
