//! One terminal engine instance: a vt100 parser plus the fit, link, search
//! and selection capabilities layered over it.
//!
//! Line numbers handed out by this module are absolute: `0..history_len()`
//! is scrollback (oldest first), followed by the screen rows.

use termdeck_common::{ContainerId, Rect, SessionId, TermError};
use termdeck_config::schema::TerminalConfig;
use tracing::debug;

use crate::event::{EngineEvent, Listeners};
use crate::links::{Link, LinkDetector};
use crate::search::SearchState;
use crate::selection::{Selection, SelectionPoint};
use crate::size::SizeInfo;
use crate::theme::EngineTheme;

const BRACKETED_PASTE_START: &str = "\x1b[200~";
const BRACKETED_PASTE_END: &str = "\x1b[201~";

// =============================================================================
// OPTIONS
// =============================================================================

/// Settings every instance is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub scrollback_lines: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub padding: f64,
    pub theme: EngineTheme,
    /// Grid size before the first fit.
    pub initial_cols: u16,
    pub initial_rows: u16,
}

impl From<&TerminalConfig> for EngineOptions {
    fn from(config: &TerminalConfig) -> Self {
        Self {
            scrollback_lines: config.scrollback_lines as usize,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            padding: f64::from(config.padding),
            theme: EngineTheme::from(&config.theme),
            initial_cols: 80,
            initial_rows: 24,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&TerminalConfig::default())
    }
}

// =============================================================================
// PARSER CALLBACKS
// =============================================================================

/// Remembers the last window title the program set (OSC 0/2).
#[derive(Debug, Default)]
struct TitleTracker {
    title: String,
}

impl vt100::Callbacks for TitleTracker {
    fn set_window_title(&mut self, _: &mut vt100::Screen, title: &[u8]) {
        self.title = String::from_utf8_lossy(title).into_owned();
    }
}

fn new_parser(rows: u16, cols: u16, scrollback: usize) -> vt100::Parser<TitleTracker> {
    vt100::Parser::new_with_callbacks(
        rows.max(1),
        cols.max(1),
        scrollback,
        TitleTracker::default(),
    )
}

// =============================================================================
// ATTACHMENT
// =============================================================================

/// Where the instance's surface currently lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attachment {
    /// Never opened in any container.
    Unopened,
    Attached { container: ContainerId, bounds: Rect },
    /// Opened before, currently hidden. Buffer and scrollback are intact.
    Detached { last: ContainerId },
}

// =============================================================================
// ENGINE INSTANCE
// =============================================================================

pub struct EngineInstance {
    session_id: SessionId,
    parser: vt100::Parser<TitleTracker>,
    options: EngineOptions,
    attachment: Attachment,
    opened_in: Option<ContainerId>,
    pending_fit: bool,
    focused: bool,
    search: SearchState,
    selection: Selection,
    links: LinkDetector,
    listeners: Listeners,
}

impl EngineInstance {
    pub fn new(session_id: SessionId, options: EngineOptions) -> Self {
        let parser = new_parser(
            options.initial_rows,
            options.initial_cols,
            options.scrollback_lines,
        );
        Self {
            session_id,
            parser,
            options,
            attachment: Attachment::Unopened,
            opened_in: None,
            pending_fit: false,
            focused: false,
            search: SearchState::new(),
            selection: Selection::new(),
            links: LinkDetector::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn theme(&self) -> &EngineTheme {
        &self.options.theme
    }

    // -------------------------------------------------------------------------
    // Attachment
    // -------------------------------------------------------------------------

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    /// The container the surface was first opened in.
    pub fn opened_in(&self) -> Option<ContainerId> {
        self.opened_in
    }

    /// Bind the surface to `container`. The first call opens it; later calls
    /// reparent the same parser. A fit is scheduled either way.
    pub fn attach(&mut self, container: ContainerId, bounds: Rect) {
        match self.opened_in {
            None => {
                debug!(session_id = %self.session_id, %container, "opening engine surface");
                self.opened_in = Some(container);
            }
            Some(_) => {
                debug!(session_id = %self.session_id, %container, "reparenting engine surface");
            }
        }
        self.attachment = Attachment::Attached { container, bounds };
        self.pending_fit = true;
    }

    pub fn detach(&mut self) {
        if let Attachment::Attached { container, .. } = self.attachment {
            self.attachment = Attachment::Detached { last: container };
        }
        self.pending_fit = false;
        self.focused = false;
    }

    /// Update the bound container's bounds. `false` when not attached.
    pub fn set_bounds(&mut self, new_bounds: Rect) -> bool {
        match &mut self.attachment {
            Attachment::Attached { bounds, .. } => {
                *bounds = new_bounds;
                true
            }
            _ => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.attachment, Attachment::Attached { .. })
    }

    pub fn pending_fit(&self) -> bool {
        self.pending_fit && self.is_attached()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // -------------------------------------------------------------------------
    // Fit
    // -------------------------------------------------------------------------

    /// Current grid size as `(cols, rows)`.
    pub fn dimensions(&self) -> (u16, u16) {
        let (rows, cols) = self.parser.screen().size();
        (cols, rows)
    }

    /// `(cols, rows)` the bound container would fit, without applying it.
    pub fn propose_dimensions(&self) -> Result<(u16, u16), TermError> {
        let Attachment::Attached { bounds, .. } = self.attachment else {
            return Err(TermError::Fit("surface is not attached".into()));
        };
        let size = SizeInfo::from_pixels(
            bounds,
            self.options.cell_width,
            self.options.cell_height,
            self.options.padding,
        )?;
        Ok(size.dimensions())
    }

    /// Resize the grid to fit the bound container. Returns the resize event
    /// when the dimensions changed.
    pub fn fit(&mut self) -> Result<Option<EngineEvent>, TermError> {
        self.pending_fit = false;
        let (cols, rows) = self.propose_dimensions()?;
        if (cols, rows) == self.dimensions() {
            return Ok(None);
        }
        self.parser.screen_mut().set_size(rows, cols);
        Ok(Some(EngineEvent::Resize { cols, rows }))
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Feed process output to the parser.
    ///
    /// A viewport at the bottom follows the new output. A viewport scrolled
    /// into history keeps showing the same top line.
    pub fn write(&mut self, data: &str) -> Option<EngineEvent> {
        let offset = self.parser.screen().scrollback();
        let title_before = self.parser.callbacks().title.clone();

        if offset == 0 {
            self.parser.process(data.as_bytes());
            self.set_offset(0);
        } else {
            let top = self.history_len().saturating_sub(offset);
            self.parser.process(data.as_bytes());
            let history = self.history_len();
            self.set_offset(history.saturating_sub(top));
        }

        let title = &self.parser.callbacks().title;
        (*title != title_before && !title.is_empty())
            .then(|| EngineEvent::TitleChanged(title.clone()))
    }

    /// Write a colored `[Error] ...` line.
    pub fn write_error(&mut self, message: &str) {
        let line = self.options.theme.error_line(message);
        self.write(&format!("{line}\r\n"));
    }

    /// Drop scrollback and screen, keeping only the cursor's line at the top.
    pub fn clear(&mut self) {
        let (rows, cols) = self.parser.screen().size();
        self.set_offset(0);
        let (cursor_row, _) = self.parser.screen().cursor_position();
        let current_line = self
            .parser
            .screen()
            .rows(0, cols)
            .nth(usize::from(cursor_row))
            .unwrap_or_default();

        self.parser = new_parser(rows, cols, self.options.scrollback_lines);
        self.parser.process(current_line.trim_end().as_bytes());
        self.selection.clear();
        self.search.clear();
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    pub fn input(&self, data: &str) -> EngineEvent {
        EngineEvent::Input(data.to_string())
    }

    /// Turn pasted text into input. Newlines become carriage returns, and
    /// the text is bracketed when the application asked for it.
    pub fn paste(&self, text: &str) -> EngineEvent {
        let normalized = text.replace("\r\n", "\r").replace('\n', "\r");
        if self.parser.screen().bracketed_paste() {
            EngineEvent::Input(format!(
                "{BRACKETED_PASTE_START}{normalized}{BRACKETED_PASTE_END}"
            ))
        } else {
            EngineEvent::Input(normalized)
        }
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Number of lines currently held in scrollback.
    pub fn history_len(&mut self) -> usize {
        let current = self.parser.screen().scrollback();
        self.set_offset(usize::MAX);
        let len = self.parser.screen().scrollback();
        self.set_offset(current);
        len
    }

    /// Lines the viewport sits above the bottom, clamped to the history.
    fn set_offset(&mut self, rows: usize) {
        self.parser.screen_mut().set_scrollback(rows);
    }

    pub fn is_at_bottom(&self) -> bool {
        self.parser.screen().scrollback() == 0
    }

    /// Absolute index of the first visible line.
    pub fn viewport_top(&mut self) -> usize {
        let offset = self.parser.screen().scrollback();
        self.history_len().saturating_sub(offset)
    }

    /// Scroll by `delta` lines: negative moves up into history.
    pub fn scroll_lines(&mut self, delta: isize) {
        let history = self.history_len();
        let offset = self.parser.screen().scrollback() as isize;
        let next = (offset - delta).clamp(0, history as isize);
        self.set_offset(next as usize);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.set_offset(0);
    }

    /// Scroll the minimum needed for absolute `line` to be visible.
    pub fn scroll_to_line(&mut self, line: usize) {
        let history = self.history_len();
        let rows = usize::from(self.parser.screen().size().0);
        let top = self.viewport_top();
        if line < top {
            self.set_offset(history - line.min(history));
        } else if line >= top + rows {
            let new_top = (line + 1).saturating_sub(rows).min(history);
            self.set_offset(history - new_top);
        }
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Visible text, one entry per screen row.
    pub fn visible_rows(&self) -> Vec<String> {
        let (_, cols) = self.parser.screen().size();
        self.parser
            .screen()
            .rows(0, cols)
            .map(|row| row.trim_end().to_string())
            .collect()
    }

    /// Visible text as one string.
    pub fn contents(&self) -> String {
        self.parser.screen().contents()
    }

    /// Every line of scrollback followed by every screen row, trailing
    /// blanks trimmed.
    pub fn buffer_lines(&mut self) -> Vec<String> {
        let saved = self.parser.screen().scrollback();
        let history = self.history_len();
        let (rows, cols) = self.parser.screen().size();
        let rows = usize::from(rows).max(1);

        let mut lines = Vec::with_capacity(history + rows);
        let mut start = 0;
        while start < history {
            self.set_offset(history - start);
            let take = rows.min(history - start);
            lines.extend(
                self.parser
                    .screen()
                    .rows(0, cols)
                    .take(take)
                    .map(|row| row.trim_end().to_string()),
            );
            start += take;
        }
        self.set_offset(0);
        lines.extend(self.visible_rows());
        self.set_offset(saved);
        lines
    }

    pub fn links(&self) -> Vec<Link> {
        self.links.detect(&self.visible_rows())
    }

    // -------------------------------------------------------------------------
    // Search & selection
    // -------------------------------------------------------------------------

    pub fn find_next(&mut self, term: &str) -> bool {
        let lines = self.buffer_lines();
        let found = self.search.find_next(term, &lines);
        self.reveal_match(found.map(|m| (m.line, m.col, m.len)))
    }

    pub fn find_previous(&mut self, term: &str) -> bool {
        let lines = self.buffer_lines();
        let found = self.search.find_previous(term, &lines);
        self.reveal_match(found.map(|m| (m.line, m.col, m.len)))
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.selection.clear();
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn get_selection(&mut self) -> String {
        if !self.selection.is_active() {
            return String::new();
        }
        let lines = self.buffer_lines();
        self.selection.selected_text(&lines)
    }

    /// Select everything up to the last line that has text.
    pub fn select_all(&mut self) {
        let lines = self.buffer_lines();
        let used = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        self.selection.select_lines(used);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn reveal_match(&mut self, found: Option<(usize, usize, usize)>) -> bool {
        match found {
            Some((line, col, len)) => {
                self.selection.select_span(SelectionPoint::new(line, col), len);
                self.scroll_to_line(line);
                true
            }
            None => {
                self.selection.clear();
                false
            }
        }
    }
}

impl std::fmt::Debug for EngineInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInstance")
            .field("session_id", &self.session_id)
            .field("attachment", &self.attachment)
            .field("dimensions", &self.dimensions())
            .field("focused", &self.focused)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
