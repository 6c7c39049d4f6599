//! Process-local cache store.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use super::traits::{Cacheable, QueryKey};

/// A cached collection and when it was last written.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  /// The cached records in order
  pub entities: Vec<T>,
  /// When the entry was last seeded or patched
  pub updated_at: DateTime<Utc>,
}

/// Keyed store of record collections.
///
/// The store is owned by whoever drives the UI loop and handed to the
/// coordinators by reference, so every read-modify-write happens on one
/// thread. Tests build their own instance.
#[derive(Debug)]
pub struct CacheStore<T: Cacheable> {
  entries: HashMap<String, CacheEntry<T>>,
}

impl<T: Cacheable> Default for CacheStore<T> {
  fn default() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }
}

impl<T: Cacheable> CacheStore<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Cached records for `key`, if the entry exists.
  pub fn get(&self, key: &impl QueryKey) -> Option<&[T]> {
    self
      .entries
      .get(&key.cache_hash())
      .map(|entry| entry.entities.as_slice())
  }

  /// Full entry for `key`, including its timestamp.
  pub fn entry(&self, key: &impl QueryKey) -> Option<&CacheEntry<T>> {
    self.entries.get(&key.cache_hash())
  }

  /// Replace the entry for `key` with a freshly fetched collection.
  pub fn set(&mut self, key: &impl QueryKey, entities: Vec<T>) {
    debug!(query = %key.description(), count = entities.len(), "cache seeded");
    self.entries.insert(
      key.cache_hash(),
      CacheEntry {
        entities,
        updated_at: Utc::now(),
      },
    );
  }

  /// Apply `f` to the collection for `key`, starting from an empty one if
  /// the entry does not exist yet.
  pub fn update<R>(&mut self, key: &impl QueryKey, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
    let entry = self
      .entries
      .entry(key.cache_hash())
      .or_insert_with(|| CacheEntry {
        entities: Vec::new(),
        updated_at: Utc::now(),
      });
    let result = f(&mut entry.entities);
    entry.updated_at = Utc::now();
    result
  }

  /// Append a record to the end of the collection.
  pub fn insert(&mut self, key: &impl QueryKey, entity: T) {
    self.update(key, |entities| entities.push(entity));
  }

  /// Replace every record whose cache key matches `entity`'s.
  ///
  /// Returns whether anything was replaced.
  pub fn replace(&mut self, key: &impl QueryKey, entity: T) -> bool {
    let id = entity.cache_key();
    self.update(key, |entities| {
      let mut replaced = false;
      for existing in entities.iter_mut().filter(|e| e.cache_key() == id) {
        *existing = entity.clone();
        replaced = true;
      }
      replaced
    })
  }

  /// Remove every record with the given cache key.
  ///
  /// Returns the number of records removed.
  pub fn remove(&mut self, key: &impl QueryKey, id: &T::Key) -> usize {
    self.update(key, |entities| {
      let before = entities.len();
      entities.retain(|e| &e.cache_key() != id);
      before - entities.len()
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::User;
  use crate::cache::UserQueryKey;

  const KEY: UserQueryKey = UserQueryKey::Users;

  fn user(id: u64, name: &str) -> User {
    User {
      id,
      name: name.to_string(),
      email: format!("{}@example.com", name.to_lowercase()),
    }
  }

  fn seeded() -> CacheStore<User> {
    let mut store = CacheStore::new();
    store.set(&KEY, vec![user(1, "Leanne"), user(2, "Ervin"), user(3, "Clementine")]);
    store
  }

  #[test]
  fn test_get_missing_entry() {
    let store: CacheStore<User> = CacheStore::new();
    assert!(store.get(&KEY).is_none());
  }

  #[test]
  fn test_insert_appends() {
    let mut store = seeded();
    store.insert(&KEY, user(11, "Kim"));

    let users = store.get(&KEY).unwrap();
    assert_eq!(users.len(), 4);
    assert_eq!(users.last().unwrap().name, "Kim");
  }

  #[test]
  fn test_insert_into_empty_store_creates_entry() {
    let mut store = CacheStore::new();
    store.insert(&KEY, user(11, "Kim"));
    assert_eq!(store.get(&KEY).unwrap(), &[user(11, "Kim")]);
  }

  #[test]
  fn test_replace_keeps_position_and_length() {
    let mut store = seeded();
    let mut updated = user(2, "Ervin");
    updated.email = "new@example.com".into();

    assert!(store.replace(&KEY, updated.clone()));

    let users = store.get(&KEY).unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[1], updated);
  }

  #[test]
  fn test_replace_unknown_id_is_noop() {
    let mut store = seeded();
    assert!(!store.replace(&KEY, user(42, "Ghost")));
    assert_eq!(store.get(&KEY).unwrap().len(), 3);
  }

  #[test]
  fn test_remove_filters_by_id() {
    let mut store = seeded();
    assert_eq!(store.remove(&KEY, &2), 1);

    let ids: Vec<u64> = store.get(&KEY).unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 3]);
  }

  #[test]
  fn test_remove_absent_id() {
    let mut store = seeded();
    assert_eq!(store.remove(&KEY, &42), 0);
    assert_eq!(store.get(&KEY).unwrap().len(), 3);
  }

  #[test]
  fn test_set_overwrites_and_stamps_entry() {
    let mut store = seeded();
    let seeded_at = store.entry(&KEY).unwrap().updated_at;

    store.set(&KEY, vec![user(7, "Kurtis")]);
    let entry = store.entry(&KEY).unwrap();
    assert_eq!(entry.entities, vec![user(7, "Kurtis")]);
    assert!(entry.updated_at >= seeded_at);
  }
}
