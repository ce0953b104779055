//! Terminal search: find text in the scrollback buffer and visible screen.
//!
//! Matching is a case-insensitive literal match. Lines use the absolute
//! indexing shared with selection: `0..history` is scrollback, the rest are
//! screen rows.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// A single search hit. `col` and `len` are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

impl SearchMatch {
    fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }
}

/// Manages the active search term, found matches, and cursor.
#[derive(Debug, Default)]
pub struct SearchState {
    term: Option<String>,
    matches: Vec<SearchMatch>,
    current_match: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next match after the current one, wrapping at the end.
    ///
    /// The buffer is searched again on every call so output that arrived
    /// since the last call is included. A new term starts from the top.
    pub fn find_next(&mut self, term: &str, lines: &[String]) -> Option<SearchMatch> {
        let anchor = self.anchor_for(term);
        self.search(term, lines);
        let idx = match anchor {
            Some(pos) => self
                .matches
                .iter()
                .position(|m| m.position() > pos)
                .unwrap_or(0),
            None => 0,
        };
        self.select(idx)
    }

    /// Move to the match before the current one, wrapping at the start.
    /// A new term starts from the bottom.
    pub fn find_previous(&mut self, term: &str, lines: &[String]) -> Option<SearchMatch> {
        let anchor = self.anchor_for(term);
        self.search(term, lines);
        let last = self.matches.len().checked_sub(1)?;
        let idx = match anchor {
            Some(pos) => self
                .matches
                .iter()
                .rposition(|m| m.position() < pos)
                .unwrap_or(last),
            None => last,
        };
        self.select(idx)
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.current_match.and_then(|i| self.matches.get(i))
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Reset the search state entirely.
    pub fn clear(&mut self) {
        self.term = None;
        self.matches.clear();
        self.current_match = None;
    }

    /// Returns `true` if the character at (`line`, `col`) falls within any
    /// match.
    pub fn is_match_at(&self, line: usize, col: usize) -> bool {
        self.matches
            .iter()
            .any(|m| m.line == line && col >= m.col && col < m.col + m.len)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn anchor_for(&self, term: &str) -> Option<(usize, usize)> {
        if self.term.as_deref() == Some(term) {
            self.current().map(SearchMatch::position)
        } else {
            None
        }
    }

    fn select(&mut self, idx: usize) -> Option<SearchMatch> {
        let found = self.matches.get(idx).copied();
        self.current_match = found.map(|_| idx);
        found
    }

    fn search(&mut self, term: &str, lines: &[String]) {
        self.term = Some(term.to_string());
        self.matches.clear();
        self.current_match = None;

        if term.is_empty() {
            return;
        }

        let Some(re) = literal_regex(term) else {
            return;
        };

        for (line_idx, text) in lines.iter().enumerate() {
            for mat in re.find_iter(text) {
                if mat.is_empty() {
                    continue;
                }
                self.matches.push(SearchMatch {
                    line: line_idx,
                    col: text[..mat.start()].chars().count(),
                    len: mat.as_str().chars().count(),
                });
            }
        }
    }
}

fn literal_regex(term: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        [
            "scrollback hello line",
            "another line",
            "hello world",
            "foo bar baz",
            "HELLO again",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn finds_case_insensitive_literal_matches() {
        let mut state = SearchState::new();
        let first = state.find_next("hello", &lines()).unwrap();
        assert_eq!(first, SearchMatch { line: 0, col: 11, len: 5 });
        assert_eq!(state.match_count(), 3);
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let mut state = SearchState::new();
        let text = vec!["a.b axb".to_string()];
        let hit = state.find_next("a.b", &text).unwrap();
        assert_eq!(hit.col, 0);
        assert_eq!(state.match_count(), 1);
    }

    #[test]
    fn next_match_cycles_through() {
        let mut state = SearchState::new();
        let buf = lines();
        assert_eq!(state.find_next("hello", &buf).unwrap().line, 0);
        assert_eq!(state.find_next("hello", &buf).unwrap().line, 2);
        assert_eq!(state.find_next("hello", &buf).unwrap().line, 4);
        // Wrap around back to the first.
        assert_eq!(state.find_next("hello", &buf).unwrap().line, 0);
    }

    #[test]
    fn previous_starts_from_bottom_and_wraps() {
        let mut state = SearchState::new();
        let buf = lines();
        assert_eq!(state.find_previous("hello", &buf).unwrap().line, 4);
        assert_eq!(state.find_previous("hello", &buf).unwrap().line, 2);
        assert_eq!(state.find_previous("hello", &buf).unwrap().line, 0);
        assert_eq!(state.find_previous("hello", &buf).unwrap().line, 4);
    }

    #[test]
    fn changing_term_restarts() {
        let mut state = SearchState::new();
        let buf = lines();
        state.find_next("hello", &buf);
        state.find_next("hello", &buf);
        let hit = state.find_next("line", &buf).unwrap();
        assert_eq!(hit.line, 0);
        assert_eq!(state.term(), Some("line"));
    }

    #[test]
    fn columns_count_characters() {
        let mut state = SearchState::new();
        let text = vec!["héllo wörld".to_string()];
        let hit = state.find_next("wörld", &text).unwrap();
        assert_eq!(hit, SearchMatch { line: 0, col: 6, len: 5 });
    }

    #[test]
    fn clear_resets() {
        let mut state = SearchState::new();
        state.find_next("hello", &lines());
        assert!(state.match_count() > 0);

        state.clear();
        assert_eq!(state.match_count(), 0);
        assert!(state.current().is_none());
        assert!(state.term().is_none());
    }

    #[test]
    fn no_matches_returns_none() {
        let mut state = SearchState::new();
        assert!(state.find_next("zzzzz", &lines()).is_none());
        assert!(state.find_previous("zzzzz", &lines()).is_none());
        assert!(state.current().is_none());
    }

    #[test]
    fn empty_term_matches_nothing() {
        let mut state = SearchState::new();
        assert!(state.find_next("", &lines()).is_none());
    }

    #[test]
    fn is_match_at_works() {
        let mut state = SearchState::new();
        state.find_next("foo", &lines());
        assert!(state.is_match_at(3, 0));
        assert!(state.is_match_at(3, 2));
        assert!(!state.is_match_at(3, 3));
    }
}
