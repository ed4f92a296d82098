use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::store::key::ModelKey;

/// The closed set of subjects we collect and cluster tweets for.
///
/// Adding a topic means adding a variant here and a row in `Topic::defaults`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Brexit,
    Corona,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::Brexit, Topic::Corona];

    /// Short lowercase name, used as the model label and in env var names.
    pub fn slug(self) -> &'static str {
        match self {
            Topic::Brexit => "brexit",
            Topic::Corona => "corona",
        }
    }

    /// (corpus file name, streaming track keywords)
    fn defaults(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Topic::Brexit => ("brexit_tweets.txt", &["brexit"]),
            Topic::Corona => (
                "corona_tweets.txt",
                &["corona virus", "corona", "coronavirus"],
            ),
        }
    }

    fn env_prefix(self) -> String {
        format!("TWEETCLUST_{}", self.slug().to_uppercase())
    }
}

/// Everything the pipeline needs to know about one topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicConfig {
    pub topic: Topic,
    /// One tweet per line
    pub corpus_path: PathBuf,
    /// Label part of model keys for this topic (`<k>_<label>.bin`)
    pub model_label: String,
    /// Pinned model key; when unset the newest record with `model_label` is used
    pub model_key: Option<String>,
    /// Keywords the collector tracks when streaming tweets for this topic
    pub streaming_keywords: Vec<String>,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Nothing here is global:
/// callers pass the config (or one of its topic records) into each step.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the per-topic corpus files
    pub data_dir: PathBuf,
    /// Directory for persisted model records
    pub model_dir: PathBuf,
    pub topics: Vec<TopicConfig>,
}

/// Returns the default directory for storing model records.
/// Uses the platform data directory: ~/.local/share/tweetclust/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tweetclust")
        .join("models")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup("TWEETCLUST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let model_dir = lookup("TWEETCLUST_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_model_dir);

        let mut topics = Vec::with_capacity(Topic::ALL.len());
        for topic in Topic::ALL {
            let (corpus_file, keywords) = topic.defaults();
            let prefix = topic.env_prefix();

            let corpus_path = lookup(&format!("{prefix}_CORPUS"))
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(corpus_file));

            let model_key = lookup(&format!("{prefix}_MODEL"));
            if let Some(key) = &model_key {
                ModelKey::parse(key)
                    .with_context(|| format!("{prefix}_MODEL is not a valid model key"))?;
            }

            topics.push(TopicConfig {
                topic,
                corpus_path,
                model_label: topic.slug().to_string(),
                model_key,
                streaming_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            });
        }

        Ok(Self {
            data_dir,
            model_dir,
            topics,
        })
    }

    /// The record for `topic`.
    pub fn topic(&self, topic: Topic) -> Result<&TopicConfig> {
        self.topics
            .iter()
            .find(|t| t.topic == topic)
            .with_context(|| format!("no configuration for topic '{}'", topic.slug()))
    }

    /// Check that the topic's corpus file exists.
    /// Call this before any operation that reads tweets from disk.
    pub fn require_corpus(&self, topic: Topic) -> Result<&TopicConfig> {
        let record = self.topic(topic)?;
        if !record.corpus_path.is_file() {
            anyhow::bail!(
                "Corpus file for '{}' not found at {}\n\
                 Set TWEETCLUST_DATA_DIR or {}_CORPUS to point at it.",
                topic.slug(),
                record.corpus_path.display(),
                topic.env_prefix()
            );
        }
        Ok(record)
    }
}
