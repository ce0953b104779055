//! Line-oriented command driver for running the app without a window.
//!
//! Plain lines are typed into the active terminal. Lines starting with `:`
//! are commands; `::` escapes a literal leading colon. Lines starting with
//! `{` are raw IPC requests and are handled by the caller.

use termdeck_common::TermError;
use termdeck_session::NewSession;

use crate::actions::Action;
use crate::app::TermdeckApp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text typed into the active terminal, followed by a newline.
    Input(String),
    Action(Action),
    /// Open a terminal in a specific directory.
    NewIn(String),
    /// One-based, as shown to the user.
    Focus(usize),
    Rename(String),
    Find(String),
    FindPrev(String),
    List,
    Screen,
    Help,
    Raw(String),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        if line.starts_with('{') {
            return Self::Raw(line.to_string());
        }
        if let Some(literal) = line.strip_prefix("::") {
            return Self::Input(format!(":{literal}"));
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Input(line.to_string());
        };

        let (name, arg) = match command.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match (name, arg) {
            ("new", "") => Self::Action(Action::NewTerminal),
            ("new", dir) => Self::NewIn(dir.to_string()),
            ("close", _) => Self::Action(Action::CloseTerminal),
            ("next", _) => Self::Action(Action::NextSession),
            ("prev", _) => Self::Action(Action::PrevSession),
            ("focus", n) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Focus(n),
                _ => Self::Unknown(line.to_string()),
            },
            ("rename", title) if !title.is_empty() => Self::Rename(title.to_string()),
            ("find", term) if !term.is_empty() => Self::Find(term.to_string()),
            ("find", _) => Self::Action(Action::SearchNext),
            ("findprev", term) if !term.is_empty() => Self::FindPrev(term.to_string()),
            ("findprev", _) => Self::Action(Action::SearchPrev),
            ("nofind", _) => Self::Action(Action::SearchClose),
            ("copy", _) => Self::Action(Action::Copy),
            ("paste", _) => Self::Action(Action::Paste),
            ("selectall", _) => Self::Action(Action::SelectAll),
            ("clear", _) => Self::Action(Action::ClearTerminal),
            ("bottom", _) => Self::Action(Action::ScrollToBottom),
            ("list", _) => Self::List,
            ("screen", _) => Self::Screen,
            ("help", _) => Self::Help,
            ("quit" | "q", _) => Self::Action(Action::Quit),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
:new [DIR]       open a terminal
:close           close the active terminal
:next / :prev    switch terminals
:focus N         activate terminal N
:rename TITLE    rename the active terminal
:find TERM       search forward (:findprev backward, :nofind to close)
:copy / :paste   clipboard
:selectall       select the whole buffer
:clear           clear the active terminal
:bottom          scroll to the bottom
:list            list terminals as JSON
:screen          print the active screen
:quit            exit
{...}            raw IPC request
::TEXT           type TEXT starting with ':'";

/// Run `command` against `app`. Returns text to show the user, if any.
/// Raw IPC requests are not handled here.
pub fn execute(app: &mut TermdeckApp, command: Command) -> Result<Option<String>, TermError> {
    match command {
        Command::Input(text) => {
            app.send_input(&format!("{text}\n"))?;
            Ok(None)
        }
        Command::Action(action) => {
            app.dispatch(action)?;
            Ok(None)
        }
        Command::NewIn(cwd) => {
            let id = app.new_terminal(NewSession {
                cwd: Some(cwd),
                ..Default::default()
            })?;
            Ok(Some(format!("opened {id}")))
        }
        Command::Focus(n) => match app.focus_index(n - 1) {
            Some(_) => Ok(None),
            None => Ok(Some(format!("no terminal {n}"))),
        },
        Command::Rename(title) => {
            if let Some(id) = app.active_id() {
                app.rename(&id, &title);
            }
            Ok(None)
        }
        Command::Find(term) => {
            let found = app.search(&term)?;
            Ok((!found).then(|| format!("'{term}' not found")))
        }
        Command::FindPrev(term) => {
            let found = app.search_backward(&term)?;
            Ok((!found).then(|| format!("'{term}' not found")))
        }
        Command::List => {
            let json = serde_json::to_string_pretty(&app.sessions())
                .map_err(|e| TermError::Other(e.to_string()))?;
            Ok(Some(json))
        }
        Command::Screen => Ok(app.active_id().map(|id| app.screen(&id).join("\n"))),
        Command::Help => Ok(Some(HELP.to_string())),
        Command::Raw(_) => Ok(None),
        Command::Unknown(line) => Ok(Some(format!("unknown command: {line} (try :help)"))),
    }
}
