//! Playback engine module
//!
//! **Module Structure:**
//! - `core.rs`: Engine struct, construction, lifecycle, shared helpers
//! - `sync.rs`: Wall-clock synchronization (locate scan, head fallback)
//! - `continuity.rs`: Continuity state machine (advance, error skip,
//!   progress tick, manual jump)

mod continuity;
mod core;
mod sync;

// Re-export the engine and its typed synchronization result
pub use core::PlaybackEngine;
pub use sync::SyncOutcome;
