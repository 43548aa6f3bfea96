//! In-process extractive summarizer.
//!
//! Scores sentences by the normalized frequency of their content words and
//! keeps the best ones, in document order, until the minimum length is met
//! without passing the maximum. Deterministic for a given input and bounds,
//! so it doubles as the reference backend in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::inference::backend::{InferenceError, SummaryParams, Summarizer};
use crate::inference::tokens;

/// Words that carry no topical weight.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "i", "if", "in", "into", "is", "it", "its", "more", "no", "not", "of", "on",
    "or", "our", "she", "so", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "to", "up", "was", "we", "were", "what", "when", "which", "who", "will",
    "with", "would", "you", "your",
];

/// Extractive backend. Holds no model state.
#[derive(Debug, Default, Clone)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError> {
        let text = text.to_owned();
        let params = params.clone();
        tokio::task::spawn_blocking(move || summarize_text(&text, &params))
            .await
            .map_err(|e| InferenceError::Unavailable(format!("summarizer task failed: {e}")))
    }
}

/// Synchronous summarization over `text`.
pub fn summarize_text(text: &str, params: &SummaryParams) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() || params.max_length == 0 {
        return String::new();
    }

    let frequencies = term_frequencies(&sentences);
    let max_freq = frequencies.values().copied().max().unwrap_or(0);

    let mut ranked: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, s)| (idx, sentence_score(s, &frequencies, max_freq)))
        .collect();
    // Highest score first; earlier sentences win ties.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut selected = Vec::new();
    let mut length = 0;
    for (idx, _) in &ranked {
        let n = tokens::count(sentences[*idx]);
        if length + n > params.max_length {
            continue;
        }
        selected.push(*idx);
        length += n;
        if length >= params.min_length {
            break;
        }
    }

    if selected.is_empty() {
        // Every sentence alone is over the bound: cut the best one.
        let best = sentences[ranked[0].0];
        return tokens::truncate(best, params.max_length).to_string();
    }

    selected.sort_unstable();
    debug!(
        sentences = sentences.len(),
        selected = selected.len(),
        tokens = length,
        "Extractive summary built"
    );

    selected
        .iter()
        .map(|&idx| sentences[idx])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split on `.`, `!` or `?` followed by whitespace (or end of text), and on
/// line breaks.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let boundary = match ch {
            '\n' => Some(idx),
            '.' | '!' | '?' => match chars.peek() {
                None => Some(idx + ch.len_utf8()),
                Some((_, next)) if next.is_whitespace() => Some(idx + ch.len_utf8()),
                _ => None,
            },
            _ => None,
        };

        if let Some(end) = boundary {
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

/// Lowercased alphanumeric core of each content word.
fn content_terms(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|term| !term.is_empty() && !STOPWORDS.contains(&term.as_str()))
}

fn term_frequencies(sentences: &[&str]) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for sentence in sentences {
        for term in content_terms(sentence) {
            *frequencies.entry(term).or_insert(0) += 1;
        }
    }
    frequencies
}

/// Mean normalized frequency of the sentence's content words.
fn sentence_score(sentence: &str, frequencies: &HashMap<String, usize>, max_freq: usize) -> f64 {
    if max_freq == 0 {
        return 0.0;
    }
    let (sum, n) = content_terms(sentence).fold((0.0, 0usize), |(sum, n), term| {
        let freq = frequencies.get(&term).copied().unwrap_or(0);
        (sum + freq as f64 / max_freq as f64, n + 1)
    });
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "The city council approved the new transit budget on Monday. \
        The transit budget expands bus service to the northern districts. \
        Several residents spoke at the meeting. \
        Council members said the budget keeps fares unchanged for two years. \
        Weather on Monday was mild.";

    fn params(min_length: usize, max_length: usize) -> SummaryParams {
        SummaryParams {
            min_length,
            max_length,
            do_sample: false,
        }
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("First one. Second one!\nThird? v1.2 stays whole");
        assert_eq!(
            sentences,
            vec!["First one.", "Second one!", "Third?", "v1.2 stays whole"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(summarize_text("", &params(30, 130)), "");
        assert_eq!(summarize_text("  \n\t ", &params(30, 130)), "");
    }

    #[test]
    fn test_respects_max_length() {
        for max in [1, 5, 12, 20, 130] {
            let summary = summarize_text(ARTICLE, &params(max.min(30), max));
            assert!(
                tokens::count(&summary) <= max,
                "summary over {max} tokens: {summary:?}"
            );
            assert!(!summary.is_empty());
        }
    }

    #[test]
    fn test_prefers_central_sentences() {
        let summary = summarize_text(ARTICLE, &params(5, 12));
        assert!(summary.contains("transit budget"), "got {summary:?}");
        assert!(!summary.contains("Weather"));
    }

    #[test]
    fn test_short_input_returned_whole() {
        let text = "Only one short sentence here.";
        assert_eq!(summarize_text(text, &params(30, 130)), text);
    }

    #[test]
    fn test_keeps_document_order() {
        let summary = summarize_text(ARTICLE, &params(130, 130));
        let first = summary.find("approved").unwrap();
        let last = summary.find("fares").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_deterministic() {
        let a = summarize_text(ARTICLE, &params(10, 25));
        let b = summarize_text(ARTICLE, &params(10, 25));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_trait_call_respects_bounds() {
        let summarizer = ExtractiveSummarizer::new();
        let summary = summarizer.summarize(ARTICLE, &params(5, 20)).await.unwrap();
        assert!(tokens::count(&summary) <= 20);
        assert_eq!(summarizer.name(), "extractive");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_runtime_thread_free_during_summarization() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        // With one runtime thread, the ticker can only run if the
        // summarization yields it instead of running inline.
        let ticked = Arc::new(AtomicBool::new(false));
        let ticker = {
            let ticked = ticked.clone();
            tokio::spawn(async move { ticked.store(true, Ordering::SeqCst) })
        };

        let text = ARTICLE.repeat(3000);
        let summary = ExtractiveSummarizer::new()
            .summarize(&text, &params(5, 20))
            .await
            .unwrap();

        assert!(
            ticked.load(Ordering::SeqCst),
            "runtime thread was blocked for the whole summarization"
        );
        assert!(tokens::count(&summary) <= 20);
        ticker.await.unwrap();
    }
}
