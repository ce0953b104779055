//! URL detection on the visible screen.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?|file)://[^\s<>"'`]+"#)
        .expect("link detector: static regex pattern must compile")
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}'];

/// A clickable link on the visible screen. `row` is a viewport row and
/// `col` a character column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub row: usize,
    pub col: usize,
    pub url: String,
}

/// Finds URLs in rows of screen text.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkDetector;

impl LinkDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect<S: AsRef<str>>(&self, rows: &[S]) -> Vec<Link> {
        let mut links = Vec::new();
        for (row, text) in rows.iter().enumerate() {
            let text = text.as_ref();
            for mat in URL_RE.find_iter(text) {
                let url = trim_url(mat.as_str());
                if url.contains("://") && !url.ends_with("://") {
                    links.push(Link {
                        row,
                        col: text[..mat.start()].chars().count(),
                        url: url.to_string(),
                    });
                }
            }
        }
        links
    }
}

/// Drop trailing punctuation, keeping a closing paren that has a partner
/// inside the URL.
fn trim_url(raw: &str) -> &str {
    let mut url = raw;
    while let Some(last) = url.chars().last() {
        if !TRAILING_PUNCTUATION.contains(&last) {
            break;
        }
        if last == ')' && url.matches('(').count() >= url.matches(')').count() {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}
