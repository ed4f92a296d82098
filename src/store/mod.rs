// Model store — persisted (vectorizer, model) pairs keyed by `<k>_<label>.<ext>`.

pub mod file;
pub mod key;
pub mod traits;
