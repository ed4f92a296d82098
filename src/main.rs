use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use tweetclust::cluster::elbow::DEFAULT_K_RANGE;
use tweetclust::cluster::kmeans::KMeansParams;
use tweetclust::cluster::knee::knee_point;
use tweetclust::cluster::labels::label_clusters;
use tweetclust::config::{Config, Topic};
use tweetclust::output::{export, terminal};
use tweetclust::pipeline::{inspect, train};
use tweetclust::store::file::FileModelStore;
use tweetclust::store::traits::ModelStore;
use tweetclust::vectorize::tfidf::TfIdfVectorizer;
use tweetclust::vectorize::traits::Vectorizer;

/// tweetclust: unsupervised topic clusters for tweet corpora.
///
/// Vectorizes tweets with TF-IDF, picks a cluster count with the elbow
/// method, fits k-means and reports the dominant terms of each cluster.
#[derive(Parser)]
#[command(name = "tweetclust", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct FitArgs {
    /// Independent k-means runs per fit; best inertia kept (default: 1)
    #[arg(long, default_value = "1")]
    n_init: usize,

    /// Max Lloyd iterations per run (default: 100)
    #[arg(long, default_value = "100")]
    max_iter: usize,

    /// Seed for k-means++ initialization (random when omitted, always logged)
    #[arg(long)]
    seed: Option<u64>,
}

impl FitArgs {
    fn params(&self) -> KMeansParams {
        let params = KMeansParams::default()
            .with_num_inits(self.n_init)
            .with_max_iterations(self.max_iter);
        match self.seed {
            Some(seed) => params.with_seed(seed),
            None => params,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List configured topics, their corpus files and trained models
    Topics,

    /// Compute the elbow curve (inertia vs. k) for a topic
    Elbow {
        #[arg(long, value_enum)]
        topic: Topic,

        /// Smallest k to try
        #[arg(long, default_value_t = *DEFAULT_K_RANGE.start())]
        k_min: usize,

        /// Largest k to try
        #[arg(long, default_value_t = *DEFAULT_K_RANGE.end())]
        k_max: usize,

        #[command(flatten)]
        fit: FitArgs,

        /// Also write the curve as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Train a new model for a topic and store it
    Train {
        #[arg(long, value_enum)]
        topic: Topic,

        /// Number of clusters (skips the elbow sweep)
        #[arg(long, conflicts_with = "auto_k")]
        k: Option<usize>,

        /// Pick k automatically from the knee of the elbow curve
        #[arg(long)]
        auto_k: bool,

        /// Largest k tried by the elbow sweep
        #[arg(long, default_value_t = *DEFAULT_K_RANGE.end())]
        k_max: usize,

        /// Label for the saved model key (<k>_<name>.bin); defaults to the topic
        #[arg(long)]
        name: Option<String>,

        /// Terms shown per cluster
        #[arg(long, default_value = "20")]
        top_n: usize,

        #[command(flatten)]
        fit: FitArgs,
    },

    /// Show the top terms of each cluster in a stored model
    Labels {
        #[arg(long, value_enum)]
        topic: Topic,

        /// Exact model key to load (default: newest for the topic)
        #[arg(long)]
        key: Option<String>,

        /// Terms shown per cluster
        #[arg(long, default_value = "20")]
        top_n: usize,

        /// Also write the cluster summaries as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Assign tweets to the clusters of a stored model and chart the counts
    Classify {
        #[arg(long, value_enum)]
        topic: Topic,

        /// Exact model key to load (default: newest for the topic)
        #[arg(long)]
        key: Option<String>,

        /// Tweets to classify, one per line (default: the topic's corpus)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Terms shown per cluster
        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Also write the cluster summaries as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List stored models
    Models,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tweetclust=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = FileModelStore::new(&config.model_dir);

    match cli.command {
        Commands::Topics => {
            let mut rows = Vec::with_capacity(config.topics.len());
            for topic in &config.topics {
                let model = inspect::trained_key(&store, topic)?.map(|key| key.to_string());
                rows.push((topic.clone(), model));
            }
            terminal::display_topics(&rows);
            println!("Model store: {}", store.dir().display());
        }

        Commands::Elbow {
            topic,
            k_min,
            k_max,
            fit,
            export: export_path,
        } => {
            let record = config.require_corpus(topic)?;
            let documents = tweetclust::corpus::load_documents(&record.corpus_path)?;
            println!("Vectorizing {} tweets...", documents.len());
            let (_vectorizer, matrix) = TfIdfVectorizer::fit(&documents)?;
            println!(
                "Feature space: {} documents x {} terms",
                matrix.n_rows(),
                matrix.n_cols()
            );

            let range = train::clamp_k_range(&(k_min..=k_max), matrix.n_rows());
            let curve = train::elbow_with_progress(&matrix, range, &fit.params())?;
            let knee = knee_point(&curve);
            terminal::display_elbow_curve(&curve, knee);

            match knee {
                Some(k) => println!("Suggested k (knee): {}", k.to_string().bold()),
                None => println!("{}", "No clear knee in this curve.".dimmed()),
            }

            if let Some(path) = export_path {
                export::write_json(&path, &curve)?;
                println!("Curve written to {}", path.display());
            }
        }

        Commands::Train {
            topic,
            k,
            auto_k,
            k_max,
            name,
            top_n,
            fit,
        } => {
            let record = config.require_corpus(topic)?;
            let options = train::TrainOptions {
                k,
                k_range: *DEFAULT_K_RANGE.start()..=k_max,
                params: fit.params(),
                label: name,
            };

            println!("Training a model for '{}'...", topic.slug());
            let outcome = train::run(record, &store, &options, |curve| {
                let knee = knee_point(curve);
                terminal::display_elbow_curve(curve, knee);
                if auto_k {
                    knee.context("No knee found in the elbow curve; pass --k explicitly")
                } else {
                    prompt_for_k(knee)
                }
            })?;

            let labels = label_clusters(&outcome.model, outcome.vectorizer.vocabulary(), top_n)?;
            terminal::display_cluster_labels(&labels);

            println!(
                "Fitted {} clusters over {} tweets (inertia {:.4}, seed {})",
                outcome.model.k(),
                outcome.documents,
                outcome.model.inertia(),
                outcome.model.seed()
            );
            println!(
                "{}",
                format!(
                    "Model saved to {}",
                    store.dir().join(outcome.key.as_str()).display()
                )
                .bold()
            );
        }

        Commands::Labels {
            topic,
            key,
            top_n,
            export: export_path,
        } => {
            let record = config.topic(topic)?;
            let (key, loaded) = inspect::load_model(&store, record, key.as_deref())?;
            info!(key = key.as_str(), k = loaded.k, "Labeling stored model");

            println!(
                "Model {} (k={}, trained {})",
                key.as_str().bold(),
                loaded.k,
                loaded.trained_at.format("%Y-%m-%d %H:%M UTC")
            );
            let labels = inspect::cluster_labels(&loaded, top_n)?;
            terminal::display_cluster_labels(&labels);

            if let Some(path) = export_path {
                let summaries = inspect::training_summaries(&loaded, top_n)?;
                export::write_json(&path, &summaries)?;
                println!("Cluster summaries written to {}", path.display());
            }
        }

        Commands::Classify {
            topic,
            key,
            input,
            top_n,
            export: export_path,
        } => {
            let record = config.topic(topic)?;
            let (key, loaded) = inspect::load_model(&store, record, key.as_deref())?;

            let input_path = input.unwrap_or_else(|| record.corpus_path.clone());
            let documents = tweetclust::corpus::load_documents(&input_path)?;
            let summaries = inspect::classify(&loaded, &documents, top_n)?;

            terminal::display_cluster_summaries(
                &format!("Tweets per cluster, model {}", key.as_str()),
                &summaries,
            );

            if let Some(path) = export_path {
                export::write_json(&path, &summaries)?;
                println!("Cluster summaries written to {}", path.display());
            }
        }

        Commands::Models => {
            let models = store.list()?;
            terminal::display_models(&models);
        }
    }

    Ok(())
}

/// Ask for a cluster count on stdin after the elbow chart has been shown.
///
/// Any k >= 1 is accepted; the fit itself rejects k above the document count.
fn prompt_for_k(suggested: Option<usize>) -> Result<usize> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match suggested {
            Some(k) => print!("Number of clusters needed [{k}]: "),
            None => print!("Number of clusters needed: "),
        }
        io::stdout().flush()?;

        let line = lines
            .next()
            .context("No cluster count entered (stdin closed)")??;
        let answer = line.trim();

        if answer.is_empty() {
            if let Some(k) = suggested {
                return Ok(k);
            }
            continue;
        }

        match answer.parse::<usize>() {
            Ok(k) if k >= 1 => return Ok(k),
            _ => println!("  {} enter a whole number of at least 1", "!".yellow()),
        }
    }
}
