//! Plain-text cleanup passes for encyclopedia markup.
//!
//! Each pass is a pure `&str -> String` transform applied in sequence.
//! [`extract_text`] normalizes page HTML into plain prose; [`clean_snippet`]
//! handles the lighter search-snippet case where HTML entities must also be
//! decoded. Both pipelines are idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Extract plain text from page HTML.
///
/// Removes tag spans, drops bracketed numeric reference markers, collapses
/// whitespace runs to a single space, and trims the ends. Reference markers
/// are removed before whitespace collapses so the result is stable under
/// re-application.
pub fn extract_text(html: &str) -> String {
    let text = strip_tags(html);
    let text = strip_reference_markers(&text);
    let text = collapse_whitespace(&text);
    text.trim().to_string()
}

/// Clean a search snippet: strip tags, then decode common HTML entities.
pub fn clean_snippet(text: &str) -> String {
    let text = strip_tags(text);
    let text = decode_entities(&text);
    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Strip tag spans
// ---------------------------------------------------------------------------

/// Remove every `<...>` span.
fn strip_tags(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    TAG_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Strip reference markers
// ---------------------------------------------------------------------------

/// Remove bracketed all-digit reference markers like `[12]`.
fn strip_reference_markers(text: &str) -> String {
    static REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid regex"));

    REF_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Collapse whitespace
// ---------------------------------------------------------------------------

/// Collapse any run of whitespace to a single space.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Decode entities
// ---------------------------------------------------------------------------

/// Decode the HTML entities the search API emits in snippets.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_removes_tags_and_references() {
        let html = "<p>Machine learning<sup>[1]</sup> is a field\n\n of study.[23]</p>";
        let result = extract_text(html);
        assert_eq!(result, "Machine learning is a field of study.");
        assert!(!result.contains('<'));
        assert!(!result.contains('>'));
    }

    #[test]
    fn extract_text_is_idempotent() {
        let html = "<div><b>Alpha</b>  beta[4]\tgamma   [56] delta</div>";
        let once = extract_text(html);
        let twice = extract_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn extract_text_clears_every_tag_and_marker() {
        let html = "<a href=\"/wiki/X\">X</a> one[1] <span>two</span>[2] <i>three</i>[3]";
        let result = extract_text(html);
        assert_eq!(result.matches('<').count(), 0);
        assert_eq!(result.matches('>').count(), 0);
        assert!(!result.contains('['));
        assert_eq!(result, "X one two three");
    }

    #[test]
    fn extract_text_keeps_non_numeric_brackets() {
        let result = extract_text("citation [needed] and [12] gone");
        assert_eq!(result, "citation [needed] and gone");
    }

    #[test]
    fn extract_text_empty_input() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("   \n\t  "), "");
    }

    #[test]
    fn clean_snippet_strips_match_highlighting() {
        let snippet =
            "<span class=\"searchmatch\">Artificial</span> intelligence is &quot;smart&quot;";
        let result = clean_snippet(snippet);
        assert_eq!(result, "Artificial intelligence is \"smart\"");
    }

    #[test]
    fn clean_snippet_decodes_entities() {
        assert_eq!(clean_snippet("Tom &amp; Jerry&#39;s"), "Tom & Jerry's");
        assert_eq!(clean_snippet("a&nbsp;b"), "a b");
    }

    #[test]
    fn clean_snippet_is_idempotent_on_plain_text() {
        let text = "plain snippet without markup";
        assert_eq!(clean_snippet(text), text);
        assert_eq!(clean_snippet(&clean_snippet(text)), text);
    }
}
