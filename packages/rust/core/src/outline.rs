//! Pure transforms from retrieval output to slide content.

use std::sync::LazyLock;

use regex::Regex;

use wikideck_deck::Presentation;
use wikideck_shared::PageRecord;

/// Longest bullet point before truncation.
const MAX_POINT_CHARS: usize = 220;

/// Split prose into sentences on terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    static SENTENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]*").expect("valid regex"));

    SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Derive up to `max_points` bullet points for a page.
///
/// Prefers the page summary; falls back to the body when the summary is
/// empty. Overlong sentences are truncated on a character boundary.
pub fn bullet_points(record: &PageRecord, max_points: usize) -> Vec<String> {
    let source = if record.summary.trim().is_empty() {
        &record.content
    } else {
        &record.summary
    };

    split_sentences(source)
        .into_iter()
        .take(max_points)
        .map(|sentence| truncate_point(&sentence))
        .collect()
}

/// Assemble a deck: a title slide, one content slide per record, and a
/// closing sources slide.
pub fn deck_from_records(
    title: &str,
    subtitle: &str,
    records: &[PageRecord],
    max_points: usize,
) -> Presentation {
    let mut presentation = Presentation::new();
    presentation.add_title_slide(title, subtitle);

    for record in records {
        let points = bullet_points(record, max_points);
        presentation.add_content_slide(&record.title, &points);
    }

    if !records.is_empty() {
        let sources: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
        presentation.add_content_slide("Sources", &sources);
    }

    presentation
}

fn truncate_point(sentence: &str) -> String {
    if sentence.chars().count() <= MAX_POINT_CHARS {
        return sentence.to_string();
    }

    let truncated: String = sentence.chars().take(MAX_POINT_CHARS - 1).collect();
    format!("{}…", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(summary: &str, content: &str) -> PageRecord {
        PageRecord {
            title: "Topic".into(),
            content: content.into(),
            url: "https://en.wikipedia.org/wiki/Topic".into(),
            summary: summary.into(),
            categories: vec![],
            links: vec![],
        }
    }

    #[test]
    fn split_sentences_on_terminators() {
        let sentences = split_sentences("One. Two! Three? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn split_sentences_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn bullet_points_prefer_summary() {
        let record = record("From summary. Second point.", "From body. Ignored.");
        let points = bullet_points(&record, 5);
        assert_eq!(points, vec!["From summary.", "Second point."]);
    }

    #[test]
    fn bullet_points_fall_back_to_content() {
        let record = record("  ", "Body one. Body two. Body three.");
        let points = bullet_points(&record, 2);
        assert_eq!(points, vec!["Body one.", "Body two."]);
    }

    #[test]
    fn bullet_points_truncate_overlong_sentences() {
        let long = "word ".repeat(100);
        let record = record(&long, "");
        let points = bullet_points(&record, 1);
        assert_eq!(points.len(), 1);
        assert!(points[0].chars().count() <= MAX_POINT_CHARS);
        assert!(points[0].ends_with('…'));
    }

    #[test]
    fn deck_contains_title_topics_and_sources() {
        let records = vec![
            record("Alpha is first.", ""),
            record("Beta is second.", ""),
        ];
        let deck = deck_from_records("My Deck", "Generated", &records, 3);

        // Title + 2 topics + sources.
        assert_eq!(deck.slide_count(), 4);
        assert!(deck.slide_text(0).contains("My Deck"));
        assert!(deck.slide_text(1).contains("Alpha is first."));
        assert!(deck.slide_text(3).contains("https://en.wikipedia.org/wiki/Topic"));
    }

    #[test]
    fn empty_records_yield_title_only() {
        let deck = deck_from_records("Empty", "", &[], 3);
        assert_eq!(deck.slide_count(), 1);
    }
}
