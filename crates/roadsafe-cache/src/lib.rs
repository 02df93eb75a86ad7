//! RoadSafe Cache
//!
//! A best-effort, in-memory key/value store with per-read TTL checks. It is
//! an explicit object handed to whoever needs it, never a global.

pub mod clock;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{CacheEntry, TtlCache, DEFAULT_TTL};
