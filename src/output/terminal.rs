// Colored terminal output for classifier listings and classification results.
//
// This module handles all terminal-specific formatting: colors, tables,
// bars. The main.rs display functions delegate here.

use colored::Colorize;

use crate::classifier::{Classifier, Score};
use crate::db::models::ClassifierSummary;

/// Width of the confidence bar, in characters.
const BAR_WIDTH: usize = 30;

/// Display ranked classification results.
pub fn display_scores(scores: &[Score]) {
    if scores.is_empty() {
        println!("No classifiers matched.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Classification ({} classifiers) ===", scores.len()).bold()
    );
    println!();

    println!(
        "  {:>4}  {:<28} {:>10}  {}",
        "Rank".dimmed(),
        "Classifier".dimmed(),
        "Confidence".dimmed(),
        "".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (i, score) in scores.iter().enumerate() {
        let name = super::truncate_chars(&score.name, 25);
        println!(
            "  {:>4}. {:<28} {:>9.1}%  {}",
            i + 1,
            name,
            score.confidence * 100.0,
            colorize_bar(score.confidence),
        );
    }
    println!();
}

/// Display the stored classifiers as a table.
pub fn display_classifier_list(summaries: &[ClassifierSummary]) {
    if summaries.is_empty() {
        println!("No classifiers yet. Run `inkprint train` to create one.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Classifiers ({}) ===", summaries.len()).bold()
    );
    println!();

    println!(
        "  {:<36}  {:<24} {:>3} {:>7} {:>7} {:>6}  {}",
        "ID".dimmed(),
        "Name".dimmed(),
        "n".dimmed(),
        "Model".dimmed(),
        "Vocab".dimmed(),
        "Texts".dimmed(),
        "Trained".dimmed(),
    );
    println!("  {}", "-".repeat(110).dimmed());

    for s in summaries {
        println!(
            "  {:<36}  {:<24} {:>3} {:>7} {:>7} {:>6}  {}",
            s.id.to_string().dimmed(),
            super::truncate_chars(&s.name, 21),
            s.multiplicity,
            s.model_size,
            s.vocabulary_size,
            s.training_texts,
            s.trained_at,
        );
    }
    println!();
}

/// Display one classifier's model in detail, including up to `max_shingles`
/// of its retained fingerprints.
pub fn display_classifier_detail(classifier: &Classifier, max_shingles: usize) {
    println!(
        "\n{}",
        format!("=== Classifier {} ===", classifier.name()).bold()
    );

    println!("  ID: {}", classifier.id());
    println!("  Trained: {}", classifier.trained_at().to_rfc3339());
    println!("  Training texts: {}", classifier.training_texts());
    println!("  Multiplicity: {}", classifier.multiplicity());
    println!("  TF-IDF cutoff: {}", classifier.tfidf_cutoff());
    println!(
        "  Model: {} of {} fingerprints retained ({:.1}%)",
        classifier.model_size(),
        classifier.vocabulary_size(),
        retention_percent(classifier.model_size(), classifier.vocabulary_size()),
    );
    println!(
        "  Normalization factor: {:.4}",
        classifier.normalization_factor()
    );

    let config = classifier.pipeline().config();
    println!("\n  Pipeline:");
    println!("    Line breaks: {}", config.line_breaks);
    println!("    Punctuation kept: {:?}", config.punctuation);
    println!(
        "    Stop words: {} (+{} extra)",
        config.stop_word_list,
        config.extra_stop_words.len()
    );
    println!(
        "    Vocabulary: {} words, distance <= {}",
        config.vocabulary.len(),
        config.levenshtein_threshold
    );

    let model = classifier.model();
    if model.is_empty() {
        return;
    }
    println!(
        "\n  Fingerprints (showing {} of {}):",
        model.len().min(max_shingles),
        model.len()
    );
    for (shingle, count) in model.iter().take(max_shingles) {
        let text = super::truncate_chars(&shingle.text().replace('\n', "\\n"), 60);
        let df = classifier.document_frequency(&shingle.hash()).unwrap_or(0);
        println!(
            "    {}  {:<62} {}",
            shingle.hash().to_hex()[..16].dimmed(),
            text,
            format!("x{count} in {df} text(s)").dimmed(),
        );
    }
}

fn retention_percent(kept: usize, seen: usize) -> f64 {
    if seen == 0 {
        0.0
    } else {
        kept as f64 / seen as f64 * 100.0
    }
}

/// A bar of `width` cells, filled in proportion to `confidence` (clamped to [0, 1]).
pub fn confidence_bar(confidence: f64, width: usize) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// Colorize a confidence bar by strength.
fn colorize_bar(confidence: f64) -> colored::ColoredString {
    let bar = confidence_bar(confidence, BAR_WIDTH);
    match confidence {
        c if c >= 0.75 => bar.green().bold(),
        c if c >= 0.5 => bar.green(),
        c if c >= 0.25 => bar.yellow(),
        c if c > 0.0 => bar.red(),
        _ => bar.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_bar_fill() {
        assert_eq!(confidence_bar(0.0, 4), "....");
        assert_eq!(confidence_bar(0.5, 4), "##..");
        assert_eq!(confidence_bar(1.0, 4), "####");
    }

    #[test]
    fn test_confidence_bar_clamps() {
        assert_eq!(confidence_bar(1.7, 3), "###");
        assert_eq!(confidence_bar(-0.2, 3), "...");
    }

    #[test]
    fn test_retention_percent() {
        assert_eq!(retention_percent(0, 0), 0.0);
        assert!((retention_percent(2, 5) - 40.0).abs() < 1e-12);
    }
}
