//! Event system for the recast player
//!
//! Re-exports the shared event types from recast-common so engine code and
//! hosts import everything from one place.

pub use recast_common::events::{EventBus, ItemStatus, PlaybackState, PlayerEvent};
