//! Pane layout for up to four terminal sessions: layout modes, split
//! ratios with drag resizing, and pane change detection.

pub mod borders;
pub mod layout;
pub mod multiplexer;
pub mod observer;
pub mod tree;

pub use borders::SplitBorder;
pub use layout::{LayoutEngine, LayoutMode, MAX_PANES};
pub use multiplexer::{Multiplexer, PaneLayout};
pub use observer::ResizeObserver;
pub use tree::{Direction, SplitNode};
