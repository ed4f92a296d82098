// Colored terminal output for elbow curves, cluster labels and cluster sizes.
//
// These are the terminal stand-ins for the elbow plot and the per-cluster bar
// chart. main.rs delegates all formatting here.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::cluster::elbow::ElbowCurve;
use crate::cluster::labels::{ClusterId, ClusterSummary};
use crate::config::TopicConfig;
use crate::store::traits::StoredModel;

const BAR_WIDTH: usize = 30;

fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "=".repeat(filled), " ".repeat(width.saturating_sub(filled)))
}

/// Display the elbow curve as one bar per k, scaled to the largest inertia.
pub fn display_elbow_curve(curve: &ElbowCurve, suggested_k: Option<usize>) {
    println!("\n{}", "=== Elbow Method: inertia by k ===".bold());
    println!();

    let max = curve
        .points()
        .iter()
        .map(|p| p.inertia)
        .fold(0.0_f64, f64::max);

    for point in curve.points() {
        let fraction = if max > 0.0 { point.inertia / max } else { 0.0 };
        let line = format!(
            "  k={:>3} {} {:>12.4}",
            point.k,
            bar(fraction, BAR_WIDTH),
            point.inertia
        );
        if suggested_k == Some(point.k) {
            println!("{}  {}", line.bright_green(), "<- knee".bright_green().bold());
        } else {
            println!("{line}");
        }
    }

    if !curve.is_non_increasing() {
        println!(
            "\n  {}",
            "Note: inertia rose somewhere along the curve (single-init fits are noisy).".dimmed()
        );
    }
    println!();
}

/// Display top terms per cluster, 1-based.
pub fn display_cluster_labels(labels: &BTreeMap<ClusterId, Vec<String>>) {
    for (id, terms) in labels {
        println!("\n{}", format!("Cluster {id}:").bold());
        println!("  {}", terms.join(" "));
    }
    println!();
}

/// Display documents per cluster as a horizontal bar chart annotated with
/// each cluster's top terms.
pub fn display_cluster_summaries(title: &str, summaries: &[ClusterSummary]) {
    let total: usize = summaries.iter().map(|s| s.documents).sum();
    println!(
        "\n{}",
        format!("=== {title} ({total} tweets, {} clusters) ===", summaries.len()).bold()
    );
    println!();

    let max = summaries.iter().map(|s| s.documents).max().unwrap_or(0);

    for summary in summaries {
        let fraction = if max > 0 {
            summary.documents as f64 / max as f64
        } else {
            0.0
        };
        let share = if total > 0 {
            summary.documents as f64 / total as f64
        } else {
            0.0
        };

        let bar = bar(fraction, BAR_WIDTH);
        let colored_bar = if share >= 0.25 {
            bar.bright_green()
        } else if share >= 0.10 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>3}. {} {:>6} tweets ({:>5.1}%)",
            summary.id,
            colored_bar,
            summary.documents,
            share * 100.0
        );
        println!("       {}", summary.label().dimmed());
    }
    println!();
}

/// Display the configured topics and whether a model exists for each.
pub fn display_topics(topics: &[(TopicConfig, Option<String>)]) {
    println!("\n{}", "=== Topics ===".bold());
    for (topic, model) in topics {
        let corpus_state = if topic.corpus_path.is_file() {
            "found".green()
        } else {
            "missing".red()
        };
        println!("\n  {}", topic.topic.slug().bold());
        println!(
            "    Corpus:   {} ({})",
            topic.corpus_path.display(),
            corpus_state
        );
        println!("    Keywords: {}", topic.streaming_keywords.join(", "));
        match model {
            Some(key) => println!("    Model:    {key}"),
            None => println!("    Model:    {}", "not trained".dimmed()),
        }
    }
    println!();
}

/// Display the records in the model store.
pub fn display_models(models: &[StoredModel]) {
    if models.is_empty() {
        println!("No stored models. Run `tweetclust train --topic <topic>` first.");
        return;
    }

    println!("\n{}", format!("=== Stored models ({}) ===", models.len()).bold());
    println!(
        "  {:<32} {:>4}  {:>10}  {}",
        "Key".dimmed(),
        "k".dimmed(),
        "Size".dimmed(),
        "Modified".dimmed()
    );
    for m in models {
        let modified = m
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:<32} {:>4}  {:>10}  {}",
            m.key.as_str(),
            m.key.k(),
            format_bytes(m.size_bytes),
            modified
        );
    }
    println!();
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
