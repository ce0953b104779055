//! Keyboard shortcuts: parse `"Ctrl+Shift+T"`-style strings and map them
//! to actions.

use std::collections::HashMap;

use termdeck_common::TermError;

use crate::actions::Action;

const MOD_CTRL: u8 = 0b0001;
const MOD_ALT: u8 = 0b0010;
const MOD_SHIFT: u8 = 0b0100;
const MOD_SUPER: u8 = 0b1000;

/// Modifier bitmask plus a normalized key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub mods: u8,
    pub key: String,
}

impl KeyCombo {
    pub fn new(ctrl: bool, alt: bool, shift: bool, super_key: bool, key: &str) -> Self {
        let mut mods = 0u8;
        if ctrl {
            mods |= MOD_CTRL;
        }
        if alt {
            mods |= MOD_ALT;
        }
        if shift {
            mods |= MOD_SHIFT;
        }
        if super_key {
            mods |= MOD_SUPER;
        }
        Self {
            mods,
            key: normalize_key(key),
        }
    }

    /// Parse `"Ctrl+Shift+T"`. The last token is the key.
    pub fn parse(s: &str) -> Result<Self, TermError> {
        let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = tokens.split_last() else {
            return Err(TermError::Other("empty key binding".into()));
        };
        if key.is_empty() {
            return Err(TermError::Other(format!("key binding has no key: '{s}'")));
        }

        let mut mods = 0u8;
        for token in modifiers {
            mods |= match token.to_lowercase().as_str() {
                "ctrl" | "control" => MOD_CTRL,
                "alt" | "option" | "opt" => MOD_ALT,
                "shift" => MOD_SHIFT,
                "cmd" | "command" if cfg!(target_os = "macos") => MOD_SUPER,
                "cmd" | "command" => MOD_CTRL,
                "super" | "win" | "meta" => MOD_SUPER,
                _ => {
                    return Err(TermError::Other(format!(
                        "unrecognized modifier: {token}"
                    )))
                }
            };
        }
        Ok(Self {
            mods,
            key: normalize_key(key),
        })
    }
}

fn normalize_key(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "esc" | "escape" => "Escape".into(),
        "tab" => "Tab".into(),
        "enter" | "return" => "Enter".into(),
        k if k.len() > 1 && k.starts_with('f') && k[1..].chars().all(|c| c.is_ascii_digit()) => {
            k.to_uppercase()
        }
        k if k.chars().count() == 1 => k.to_uppercase(),
        _ => key.to_string(),
    }
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("Ctrl+Shift+T", Action::NewTerminal),
    ("Ctrl+Shift+W", Action::CloseTerminal),
    ("Ctrl+Tab", Action::NextSession),
    ("Ctrl+Shift+Tab", Action::PrevSession),
    ("Alt+1", Action::FocusSession(0)),
    ("Alt+2", Action::FocusSession(1)),
    ("Alt+3", Action::FocusSession(2)),
    ("Alt+4", Action::FocusSession(3)),
    ("Ctrl+Shift+F", Action::SearchOpen),
    ("F3", Action::SearchNext),
    ("Shift+F3", Action::SearchPrev),
    ("Escape", Action::SearchClose),
    ("Ctrl+Shift+C", Action::Copy),
    ("Ctrl+Shift+V", Action::Paste),
    ("Ctrl+Shift+A", Action::SelectAll),
    ("Ctrl+Shift+K", Action::ClearTerminal),
    ("Ctrl+Shift+Q", Action::Quit),
];

#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, Action>,
}

impl Keymap {
    pub fn lookup(&self, combo: &KeyCombo) -> Option<&Action> {
        self.bindings.get(combo)
    }

    /// Bind `spec` to `action`, replacing any previous binding.
    pub fn bind(&mut self, spec: &str, action: Action) -> Result<(), TermError> {
        let combo = KeyCombo::parse(spec)?;
        self.bindings.insert(combo, action);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        for (spec, action) in DEFAULT_BINDINGS {
            if let Err(e) = keymap.bind(spec, action.clone()) {
                tracing::warn!(binding = %spec, error = %e, "skipping default key binding");
            }
        }
        keymap
    }
}
