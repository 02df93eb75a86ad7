//! RoadSafe client state
//!
//! Read-through slices of backend data (debts, fines, rewards, vehicles,
//! licenses) cached in a shared [`roadsafe_cache::TtlCache`]. Mutations
//! invalidate the affected slice family and refetch.

pub mod keys;
pub mod store;

pub use store::ClientStore;
