//! Default media bindings for the environment ports
//!
//! - [`SymphoniaProber`]: duration probe over local media files
//! - [`HttpFetcher`]: reqwest-backed payload warm-up
//!
//! Hosts with other runtimes (a browser audio element, a streaming
//! client) supply their own port implementations instead.

mod fetcher;
mod prober;

pub use fetcher::HttpFetcher;
pub use prober::SymphoniaProber;
