//! Core traits for the caching system.

use std::fmt::Debug;

/// Trait for records that can live in a cached collection.
///
/// The cache key identifies a record within its collection; updates and
/// removals match on it.
pub trait Cacheable: Clone + Send + 'static {
  type Key: PartialEq + Debug;

  /// Identifier of this record within its collection (e.g. user id)
  fn cache_key(&self) -> Self::Key;
}

/// Trait for keys that name a cached query result.
pub trait QueryKey {
  /// Stable string used as the storage key
  fn cache_hash(&self) -> String;

  /// Human readable description for logs
  fn description(&self) -> String;
}
