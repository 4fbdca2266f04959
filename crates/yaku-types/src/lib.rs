pub mod events;
pub mod types;

pub use events::StatusEvents;
pub use types::{EndpointHealth, StatusEvent, SwitchReason};
