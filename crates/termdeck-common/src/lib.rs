pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, TermError};
pub use events::{PtyEvent, PtyEventBus};
pub use id::{new_id, SessionId};
pub use types::{ContainerId, Rect};

pub type Result<T> = std::result::Result<T, TermError>;
