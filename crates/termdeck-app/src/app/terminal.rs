//! Per-pane terminal actions on the active session: typing, clipboard,
//! search, clear.

use termdeck_common::{SessionId, TermError};

use super::{SearchBar, TermdeckApp};

impl TermdeckApp {
    fn active(&self) -> Result<SessionId, TermError> {
        self.registry
            .active_id()
            .ok_or_else(|| TermError::Other("no active terminal".into()))
    }

    /// Keystrokes typed into the active pane.
    pub fn send_input(&self, data: &str) -> Result<(), TermError> {
        let id = self.active()?;
        self.instances().input(&id, data);
        Ok(())
    }

    /// Visible rows of a session's screen.
    pub fn screen(&self, id: &SessionId) -> Vec<String> {
        self.instances().visible_rows(id)
    }

    pub fn clear_terminal(&self) -> Result<(), TermError> {
        let id = self.active()?;
        self.instances().clear(&id);
        Ok(())
    }

    pub fn scroll_to_bottom(&self) -> Result<(), TermError> {
        let id = self.active()?;
        self.instances().scroll_to_bottom(&id);
        Ok(())
    }

    pub fn select_all(&self) -> Result<(), TermError> {
        let id = self.active()?;
        self.instances().select_all(&id);
        Ok(())
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copy the active selection. `false` when nothing is selected.
    pub fn copy(&mut self) -> Result<bool, TermError> {
        let id = self.active()?;
        let text = self.instances().get_selection(&id);
        if text.is_empty() {
            return Ok(false);
        }
        self.clipboard.set_text(&text)?;
        Ok(true)
    }

    pub fn paste(&mut self) -> Result<(), TermError> {
        let id = self.active()?;
        let text = self.clipboard.get_text()?;
        if !text.is_empty() {
            self.instances().paste(&id, &text);
        }
        Ok(())
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn open_search(&mut self) -> Result<(), TermError> {
        let id = self.active()?;
        if self.search.as_ref().map(|bar| &bar.session_id) != Some(&id) {
            self.search = Some(SearchBar {
                session_id: id,
                term: String::new(),
            });
        }
        Ok(())
    }

    /// Set the search term and jump to its next match.
    pub fn search(&mut self, term: &str) -> Result<bool, TermError> {
        self.set_search_term(term)?;
        self.search_next()
    }

    /// Set the search term and jump to its previous match.
    pub fn search_backward(&mut self, term: &str) -> Result<bool, TermError> {
        self.set_search_term(term)?;
        self.search_prev()
    }

    fn set_search_term(&mut self, term: &str) -> Result<(), TermError> {
        self.open_search()?;
        if let Some(bar) = self.search.as_mut() {
            bar.term = term.to_string();
        }
        Ok(())
    }

    pub fn search_next(&self) -> Result<bool, TermError> {
        Ok(match &self.search {
            Some(bar) if !bar.term.is_empty() => {
                self.instances().find_next(&bar.session_id, &bar.term)
            }
            _ => false,
        })
    }

    pub fn search_prev(&self) -> Result<bool, TermError> {
        Ok(match &self.search {
            Some(bar) if !bar.term.is_empty() => {
                self.instances().find_previous(&bar.session_id, &bar.term)
            }
            _ => false,
        })
    }

    pub fn close_search(&mut self) {
        if let Some(bar) = self.search.take() {
            self.instances().clear_search(&bar.session_id);
        }
    }

    /// Text currently selected in the active pane.
    pub fn selection(&self) -> String {
        self.registry
            .active_id()
            .map(|id| self.instances().get_selection(&id))
            .unwrap_or_default()
    }
}
