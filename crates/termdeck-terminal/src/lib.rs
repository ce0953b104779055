//! Terminal engine instances for termdeck.
//!
//! Each session gets one [`EngineInstance`]: a `vt100` parser holding the
//! screen and scrollback, plus fit, link detection, search and selection.
//! The [`InstanceManager`] owns them all and outlives any surface they are
//! shown in.

pub mod event;
pub mod instance;
pub mod links;
pub mod manager;
pub mod search;
pub mod selection;
pub mod size;
pub mod theme;

pub use event::{EngineEvent, Listener, Listeners, Subscription};
pub use instance::{Attachment, EngineInstance, EngineOptions};
pub use links::{Link, LinkDetector};
pub use manager::InstanceManager;
pub use search::{SearchMatch, SearchState};
pub use selection::{Selection, SelectionKind, SelectionPoint, SelectionRange};
pub use size::{SizeInfo, MAX_DIMENSION};
pub use theme::{EngineTheme, Rgb};
