//! # Recast Common Library
//!
//! Shared code for the recast virtual-radio workspace:
//! - Event types (`PlayerEvent` enum) and `EventBus`
//! - Shared playback/item state enums
//! - Compact broadcast timestamp parsing (`YYYYMMDDHHmmss`)
//! - Human-readable time formatting for UI collaborators

pub mod compact_time;
pub mod events;
pub mod human_time;

pub use events::{EventBus, ItemStatus, PlaybackState, PlayerEvent};
