use termdeck_common::TermError;
use termdeck_session::NewSession;

use super::TermdeckApp;
use crate::actions::Action;
use crate::keymap::KeyCombo;

impl TermdeckApp {
    /// Run the action bound to `combo`. `false` if nothing is bound.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> Result<bool, TermError> {
        let Some(action) = self.keymap.lookup(combo).cloned() else {
            return Ok(false);
        };
        self.dispatch(action)?;
        Ok(true)
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), TermError> {
        tracing::debug!(action = action.label(), "dispatch");
        match action {
            Action::NewTerminal => self.new_terminal(NewSession::default()).map(drop),
            Action::CloseTerminal => self.close_active(),
            Action::NextSession => {
                self.next_session();
                Ok(())
            }
            Action::PrevSession => {
                self.prev_session();
                Ok(())
            }
            Action::FocusSession(index) => {
                self.focus_index(index);
                Ok(())
            }
            Action::SearchOpen => self.open_search(),
            Action::SearchNext => self.search_next().map(drop),
            Action::SearchPrev => self.search_prev().map(drop),
            Action::SearchClose => {
                self.close_search();
                Ok(())
            }
            Action::Copy => self.copy().map(drop),
            Action::Paste => self.paste(),
            Action::SelectAll => self.select_all(),
            Action::ClearTerminal => self.clear_terminal(),
            Action::ScrollToBottom => self.scroll_to_bottom(),
            Action::Quit => {
                self.quit_requested = true;
                Ok(())
            }
            Action::None => Ok(()),
        }
    }
}
