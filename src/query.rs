//! Async query abstraction for data fetching.
//!
//! A `Query<T>` owns a fetcher closure and walks an explicit state machine:
//! Idle → Loading → Success(data) | Error(message). Results come back from a
//! spawned task over a channel and are applied by `poll()` on the UI thread.
//! There is no background refetch; `refetch()` is the only way to reload.
//!
//! # Example
//!
//! ```ignore
//! let client = user_client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.list_users().await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use crate::api::{User, UserClient};
use crate::cache::{CacheStore, QueryKey, UserQueryKey};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Async query for data fetching with state management.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` starts a
  /// request.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || fetcher().boxed()),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  pub fn refetch(&mut self) {
    // Dropping the receiver discards whatever the pending fetch returns
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver may have been dropped by a refetch
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("pending", &self.receiver.is_some())
      .finish_non_exhaustive()
  }
}

/// Query coordinator for the user collection.
///
/// Wraps a `Query<Vec<User>>` and seeds the cache store whenever a list
/// arrives.
#[derive(Debug)]
pub struct UsersQuery {
  query: Query<Vec<User>>,
}

impl UsersQuery {
  pub fn new(client: UserClient) -> Self {
    let query = Query::new(move || {
      let client = client.clone();
      async move { client.list_users().await.map_err(|e| e.to_string()) }
    });

    Self { query }
  }

  pub fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  pub fn is_error(&self) -> bool {
    self.query.is_error()
  }

  pub fn error(&self) -> Option<&str> {
    self.query.error()
  }

  pub fn fetch(&mut self) {
    self.query.fetch();
  }

  pub fn refetch(&mut self) {
    info!("refreshing user list");
    self.query.refetch();
  }

  /// Apply an arrived result. On success the cache entry is replaced.
  pub fn poll(&mut self, cache: &mut CacheStore<User>) -> bool {
    if !self.query.poll() {
      return false;
    }

    match self.query.state() {
      QueryState::Success(users) => {
        info!(count = users.len(), query = %UserQueryKey::Users.description(), "users loaded");
        cache.set(&UserQueryKey::Users, users.clone());
      }
      QueryState::Error(e) => warn!(error = %e, "failed to load users"),
      _ => {}
    }
    true
  }
}
