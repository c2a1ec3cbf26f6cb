//! Markup text estimators
//!
//! Page and word estimation over the concatenated spine markup of a
//! reflowable book: body-text extraction, the paragraph-density page count
//! state machine, the fast character-based fallback count, and word
//! tokenization.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Plain-text characters per synthetic line inside a paragraph.
const CHARS_PER_LINE: u32 = 70;

/// Synthetic lines per page. 31 rather than the APNX 32 keeps the numbers
/// close to the reference reader.
const LINES_PER_PAGE: usize = 31;

/// Characters per page for the fast fallback count.
const CHARS_PER_PAGE_FAST: usize = 2400;

static RE_HTML_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("body pattern"));
static RE_STRIP_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Extract the body text of an HTML document with all tags stripped.
///
/// Documents without a `<body>` element yield an empty string. A space is
/// inserted after each period so that sentence boundaries survive the
/// concatenation of adjacent text nodes.
pub fn extract_body_text(document: &str) -> String {
    match RE_HTML_BODY.captures(document) {
        Some(captures) => {
            let body = captures.get(1).map_or("", |m| m.as_str());
            RE_STRIP_MARKUP.replace_all(body, "").replace('.', ". ")
        }
        None => String::new(),
    }
}

/// Strip every spine document to its body text and concatenate in order.
pub fn strip_spine_documents(documents: &[String]) -> String {
    documents
        .iter()
        .map(|doc| extract_body_text(doc).trim().to_string())
        .collect::<Vec<_>>()
        .join("")
}

/// Count the words of an already-stripped text blob.
pub fn word_count(text: &str) -> u64 {
    text.unicode_words().count() as u64
}

/// Fast page count: one page per 2400 characters, never less than one.
pub fn fast_page_count(markup: &str) -> u32 {
    (markup.chars().count() / CHARS_PER_PAGE_FAST) as u32 + 1
}

/// Paragraph-density page count over the concatenated spine markup.
///
/// A single pass over the lowercased character stream tracks paragraph
/// boundaries on the more frequent of `<p` / `<div` (ties pick div) and
/// records a synthetic line at each paragraph start and every 70 plain-text
/// characters inside one. Pages are `lines / 31`, floored. A fast
/// character-based count backstops pathological markup; the larger of the
/// two is returned.
pub fn paragraph_density_page_count(markup: &str) -> u32 {
    let html = markup.to_lowercase();

    let num_divs = html.matches("<div").count();
    let num_paras = html.matches("<p").count();
    let split_char = if num_paras > num_divs { 'p' } else { 'd' };

    let mut in_tag = false;
    let mut in_p = false;
    let mut check_p = false;
    let mut closing = false;
    let mut p_char_count = 0u32;

    // A line is either a paragraph starting or every 70 characters within
    // one. Only the total matters, but paragraph starts are recorded at
    // their position minus two, which can go below zero for a tag at the
    // very start of the stream.
    let mut lines: Vec<i64> = Vec::new();
    let mut pos: i64 = -1;

    for c in html.chars() {
        pos += 1;

        if check_p {
            if c == '/' {
                closing = true;
                continue;
            } else if c == split_char {
                if closing {
                    in_p = false;
                } else {
                    in_p = true;
                    lines.push(pos - 2);
                }
            }
            check_p = false;
            closing = false;
            continue;
        }

        if c == '<' {
            in_tag = true;
            check_p = true;
            continue;
        } else if c == '>' {
            in_tag = false;
            check_p = false;
            continue;
        }

        if in_p && !in_tag {
            p_char_count += 1;
            if p_char_count == CHARS_PER_LINE {
                lines.push(pos);
                p_char_count = 0;
            }
        }
    }

    let count = (lines.len() / LINES_PER_PAGE) as u32;
    let fast_count = fast_page_count(&html);
    debug!(
        "paragraph density: lines={} divs={} paras={} count={} fast={}",
        lines.len(),
        num_divs,
        num_paras,
        count,
        fast_count
    );
    count.max(fast_count)
}
