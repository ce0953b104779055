use serde::{Deserialize, Serialize};

/// Every user-triggerable action.
///
/// Key bindings and the command driver both resolve to an `Action`; the
/// app dispatches on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // -- Sessions --
    NewTerminal,
    CloseTerminal,
    NextSession,
    PrevSession,
    /// Zero-based pane index.
    FocusSession(usize),

    // -- Search --
    SearchOpen,
    SearchNext,
    SearchPrev,
    SearchClose,

    // -- Terminal --
    Copy,
    Paste,
    SelectAll,
    ClearTerminal,
    ScrollToBottom,

    Quit,
    None,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::NewTerminal => "New Terminal",
            Action::CloseTerminal => "Close Terminal",
            Action::NextSession => "Next Terminal",
            Action::PrevSession => "Previous Terminal",
            Action::FocusSession(0) => "Focus Terminal 1",
            Action::FocusSession(1) => "Focus Terminal 2",
            Action::FocusSession(2) => "Focus Terminal 3",
            Action::FocusSession(3) => "Focus Terminal 4",
            Action::FocusSession(_) => "Focus Terminal",
            Action::SearchOpen => "Find",
            Action::SearchNext => "Find Next",
            Action::SearchPrev => "Find Previous",
            Action::SearchClose => "Close Find",
            Action::Copy => "Copy",
            Action::Paste => "Paste",
            Action::SelectAll => "Select All",
            Action::ClearTerminal => "Clear Terminal",
            Action::ScrollToBottom => "Scroll to Bottom",
            Action::Quit => "Quit",
            Action::None => "None",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Action::NewTerminal.label(), "New Terminal");
        assert_eq!(Action::FocusSession(2).label(), "Focus Terminal 3");
        assert_eq!(Action::FocusSession(9).label(), "Focus Terminal");
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&Action::FocusSession(1)).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::FocusSession(1));
    }
}
