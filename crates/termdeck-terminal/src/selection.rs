//! Text selection over the scrollback buffer and visible screen.
//!
//! Points use absolute line indices, the same ones search matches use, so a
//! selection stays on its text while the viewport scrolls.

/// A single point in the buffer. `col` is a character index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionPoint {
    pub line: usize,
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// An ordered, inclusive range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: SelectionPoint,
    pub end: SelectionPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    /// Character range from start to end.
    #[default]
    Normal,
    /// Whole lines.
    Line,
}

/// Tracks the current text selection.
#[derive(Debug, Default)]
pub struct Selection {
    anchor: Option<SelectionPoint>,
    active: Option<SelectionPoint>,
    kind: SelectionKind,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a selection at `point`.
    pub fn start(&mut self, point: SelectionPoint, kind: SelectionKind) {
        self.anchor = Some(point);
        self.active = Some(point);
        self.kind = kind;
    }

    /// Extend the selection to `point`.
    pub fn update(&mut self, point: SelectionPoint) {
        if self.anchor.is_some() {
            self.active = Some(point);
        }
    }

    /// Select `len` characters starting at `start` on a single line.
    pub fn select_span(&mut self, start: SelectionPoint, len: usize) {
        let end = SelectionPoint::new(start.line, start.col + len.saturating_sub(1));
        self.start(start, SelectionKind::Normal);
        self.update(end);
    }

    /// Select every line in a buffer of `line_count` lines.
    pub fn select_lines(&mut self, line_count: usize) {
        if line_count == 0 {
            self.clear();
            return;
        }
        self.start(SelectionPoint::new(0, 0), SelectionKind::Line);
        self.update(SelectionPoint::new(line_count - 1, 0));
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some() && self.active.is_some()
    }

    /// Return the normalized range, or `None` if nothing is selected.
    pub fn range(&self) -> Option<SelectionRange> {
        match (self.anchor, self.active) {
            (Some(a), Some(b)) => {
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                Some(SelectionRange { start, end })
            }
            _ => None,
        }
    }

    /// Returns `true` if the cell at (`line`, `col`) is selected.
    pub fn contains(&self, line: usize, col: usize) -> bool {
        let Some(range) = self.range() else {
            return false;
        };
        match self.kind {
            SelectionKind::Normal => {
                let point = SelectionPoint::new(line, col);
                point >= range.start && point <= range.end
            }
            SelectionKind::Line => line >= range.start.line && line <= range.end.line,
        }
    }

    /// Extract the selected text from `lines`. Empty when nothing is
    /// selected. Trailing blanks of each line are dropped.
    pub fn selected_text(&self, lines: &[String]) -> String {
        let Some(range) = self.range() else {
            return String::new();
        };

        let last = range.end.line.min(lines.len().saturating_sub(1));
        let mut out: Vec<String> = Vec::new();
        for line in range.start.line..=last {
            let Some(text) = lines.get(line) else {
                break;
            };
            let chars: Vec<char> = text.trim_end().chars().collect();
            let segment: String = match self.kind {
                SelectionKind::Line => chars.iter().collect(),
                SelectionKind::Normal => {
                    let from = if line == range.start.line {
                        range.start.col
                    } else {
                        0
                    };
                    let to = if line == range.end.line {
                        range.end.col + 1
                    } else {
                        chars.len()
                    };
                    let to = to.min(chars.len());
                    chars[from.min(to)..to].iter().collect()
                }
            };
            out.push(segment);
        }
        out.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
