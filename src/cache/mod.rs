//! In-memory keyed cache for record collections.
//!
//! This module provides the store that mirrors the remote collection:
//! - Collections are kept in order under a query key
//! - Single records are inserted, replaced or removed without a round trip
//! - Nothing is persisted; an entry only changes when told to

mod keys;
mod store;
mod traits;

pub use keys::UserQueryKey;
pub use store::CacheStore;
pub use traits::QueryKey;
