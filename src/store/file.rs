// Directory-backed model store.
//
// One file per key, holding a bincode-encoded record:
//   format version, training timestamp, vectorizer, cluster model.
// Writes go to a hidden temp file in the same directory and are renamed into
// place, so a reader never sees half a record. Two writers racing on the same
// key are not coordinated: the last rename wins.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::key::ModelKey;
use super::traits::{LoadedModel, ModelStore, StoredModel};
use crate::cluster::kmeans::ClusterModel;
use crate::error::{PipelineError, Result};
use crate::vectorize::tfidf::TfIdfVectorizer;
use crate::vectorize::traits::Vectorizer;

/// Bumped whenever the record layout changes.
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct RecordRef<'a> {
    format_version: u32,
    trained_at: DateTime<Utc>,
    vectorizer: &'a TfIdfVectorizer,
    model: &'a ClusterModel,
}

#[derive(Deserialize)]
struct Record {
    format_version: u32,
    trained_at: DateTime<Utc>,
    vectorizer: TfIdfVectorizer,
    model: ClusterModel,
}

pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ModelKey) -> PathBuf {
        self.dir.join(key.as_str())
    }
}

fn write_record(path: &Path, record: &RecordRef<'_>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, record)?;
    writer.flush()?;
    Ok(())
}

/// Vocabulary width and centroid width must agree, or labels would silently
/// point at the wrong terms.
fn check_consistency(key: &ModelKey, vectorizer: &TfIdfVectorizer, model: &ClusterModel) -> Result<()> {
    if vectorizer.vocabulary().len() != model.dimensions() {
        return Err(PipelineError::dimension_mismatch(
            vectorizer.vocabulary().len(),
            model.dimensions(),
        ));
    }
    if key.k() != model.k() {
        return Err(PipelineError::corrupt_key(
            key.as_str(),
            format!("key encodes k={} but the model has {} clusters", key.k(), model.k()),
        ));
    }
    Ok(())
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &ClusterModel, vectorizer: &TfIdfVectorizer, key: &str) -> Result<()> {
        let key = ModelKey::parse(key)?;
        check_consistency(&key, vectorizer, model)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&key);
        let tmp_path = self.dir.join(format!(".{}.tmp", key.as_str()));

        let record = RecordRef {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            vectorizer,
            model,
        };

        let written = write_record(&tmp_path, &record)
            .and_then(|()| fs::rename(&tmp_path, &path).map_err(PipelineError::from));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                debug!(path = %tmp_path.display(), error = %cleanup, "Temp record not removed");
            }
            return Err(e);
        }

        info!(
            key = key.as_str(),
            k = model.k(),
            vocabulary = vectorizer.vocabulary().len(),
            path = %path.display(),
            "Saved model"
        );
        Ok(())
    }

    fn load(&self, key: &str) -> Result<LoadedModel> {
        let key = ModelKey::parse(key)?;
        let path = self.path_for(&key);
        if !path.is_file() {
            return Err(PipelineError::ModelNotFound {
                key: key.as_str().to_string(),
                path,
            });
        }

        let reader = BufReader::new(File::open(&path)?);
        let record: Record = bincode::deserialize_from(reader)?;
        if record.format_version != FORMAT_VERSION {
            return Err(PipelineError::Serialization(Box::new(
                bincode::ErrorKind::Custom(format!(
                    "unsupported record format {} (expected {FORMAT_VERSION})",
                    record.format_version
                )),
            )));
        }
        check_consistency(&key, &record.vectorizer, &record.model)?;

        debug!(key = key.as_str(), k = key.k(), "Loaded model");

        Ok(LoadedModel {
            vectorizer: record.vectorizer,
            model: record.model,
            k: key.k(),
            trained_at: record.trained_at,
        })
    }

    fn list(&self) -> Result<Vec<StoredModel>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut models = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = match ModelKey::parse(&name) {
                Ok(key) => key,
                Err(e) => {
                    debug!(file = %name, error = %e, "Skipping non-model file");
                    continue;
                }
            };
            models.push(StoredModel {
                key,
                path: entry.path(),
                size_bytes: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        models.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(models)
    }

    fn latest_for_label(&self, label: &str) -> Result<ModelKey> {
        self.list()?
            .into_iter()
            .filter(|m| m.key.label() == label)
            .max_by(|a, b| {
                a.modified
                    .cmp(&b.modified)
                    .then_with(|| a.key.as_str().cmp(b.key.as_str()))
            })
            .map(|m| m.key)
            .ok_or_else(|| PipelineError::ModelNotFound {
                key: format!("<k>_{label}.{}", super::key::MODEL_EXTENSION),
                path: self.dir.clone(),
            })
    }
}
