//! Application layer: UI actions, key bindings, clipboard and the
//! headless command driver on top of the session and layout crates.

pub mod actions;
pub mod app;
pub mod cli;
pub mod clipboard;
pub mod driver;
pub mod keymap;

pub use actions::Action;
pub use app::{SearchBar, TermdeckApp};
pub use clipboard::{default_clipboard, ClipboardProvider, MemoryClipboard, SystemClipboard};
pub use keymap::{KeyCombo, Keymap};
