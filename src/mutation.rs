//! Write-side counterpart of [`crate::query`].
//!
//! A `Mutation<I, O>` runs a single-shot async operation per `mutate(input)`
//! call. Several calls may be in flight at once; each outcome comes back with
//! the input that produced it and is picked up by `poll()` on the UI thread.
//! Nothing is retried.
//!
//! `UserMutations` wires create/update/delete to the record client, patches
//! the cache on success and turns every outcome into a notification.

use crate::api::{TransportError, User, UserClient, UserData};
use crate::cache::{CacheStore, UserQueryKey};
use crate::notify::Notifications;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Result of one mutation, paired with its input
#[derive(Debug)]
pub enum MutationOutcome<I, O> {
  Success { input: I, output: O },
  Failure { input: I, error: TransportError },
}

type MutateFn<I, O> = Box<dyn Fn(I) -> BoxFuture<'static, Result<O, TransportError>> + Send + Sync>;
type Message<I, O> = (I, Result<O, TransportError>);

pub struct Mutation<I, O> {
  mutate_fn: MutateFn<I, O>,
  tx: mpsc::UnboundedSender<Message<I, O>>,
  rx: mpsc::UnboundedReceiver<Message<I, O>>,
  in_flight: usize,
}

impl<I, O> Mutation<I, O>
where
  I: Clone + Send + 'static,
  O: Send + 'static,
{
  pub fn new<F, Fut>(mutate_fn: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, TransportError>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      mutate_fn: Box::new(move |input| mutate_fn(input).boxed()),
      tx,
      rx,
      in_flight: 0,
    }
  }

  /// Dispatch the operation for `input`
  pub fn mutate(&mut self, input: I) {
    let future = (self.mutate_fn)(input.clone());
    let tx = self.tx.clone();
    self.in_flight += 1;

    tokio::spawn(async move {
      let result = future.await;
      let _ = tx.send((input, result));
    });
  }

  pub fn is_pending(&self) -> bool {
    self.in_flight > 0
  }

  /// Take the next finished outcome, if any
  pub fn poll(&mut self) -> Option<MutationOutcome<I, O>> {
    let (input, result) = self.rx.try_recv().ok()?;
    self.in_flight = self.in_flight.saturating_sub(1);

    Some(match result {
      Ok(output) => MutationOutcome::Success { input, output },
      Err(error) => MutationOutcome::Failure { input, error },
    })
  }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mutation")
      .field("in_flight", &self.in_flight)
      .finish_non_exhaustive()
  }
}

/// Identifies one create or update submission
pub type Ticket = u64;

/// What happened to a user mutation, for the views to react to.
///
/// Create and update outcomes carry the ticket returned when they were
/// dispatched, so a form only reacts to its own submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
  Created(Ticket, User),
  CreateFailed(Ticket),
  Updated(Ticket, User),
  UpdateFailed(Ticket, u64),
  Deleted(u64),
  DeleteFailed(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
  /// Another update or delete for the same id has not finished yet
  #[error("A change to this user is already in progress")]
  InFlight(u64),
}

/// Mutation coordinator for user records.
#[derive(Debug)]
pub struct UserMutations {
  create: Mutation<(Ticket, UserData), User>,
  update: Mutation<(Ticket, User), User>,
  delete: Mutation<u64, Value>,
  /// Ids with an update or delete in flight
  busy: HashSet<u64>,
  last_ticket: Ticket,
}

impl UserMutations {
  pub fn new(client: UserClient) -> Self {
    let create_client = client.clone();
    let update_client = client.clone();
    let delete_client = client;

    Self {
      create: Mutation::new(move |(_, data): (Ticket, UserData)| {
        let client = create_client.clone();
        async move { client.create_user(&data).await }
      }),
      update: Mutation::new(move |(_, user): (Ticket, User)| {
        let client = update_client.clone();
        async move { client.update_user(user.id, &user.data()).await }
      }),
      delete: Mutation::new(move |id: u64| {
        let client = delete_client.clone();
        async move { client.delete_user(id).await }
      }),
      busy: HashSet::new(),
      last_ticket: 0,
    }
  }

  fn next_ticket(&mut self) -> Ticket {
    self.last_ticket += 1;
    self.last_ticket
  }

  pub fn create(&mut self, data: UserData) -> Ticket {
    let ticket = self.next_ticket();
    info!(ticket, name = %data.name, "creating user");
    self.create.mutate((ticket, data));
    ticket
  }

  pub fn update(&mut self, user: User) -> Result<Ticket, MutationError> {
    self.claim(user.id)?;
    let ticket = self.next_ticket();
    info!(ticket, id = user.id, "updating user");
    self.update.mutate((ticket, user));
    Ok(ticket)
  }

  pub fn delete(&mut self, id: u64) -> Result<(), MutationError> {
    self.claim(id)?;
    info!(id, "deleting user");
    self.delete.mutate(id);
    Ok(())
  }

  /// Whether an update or delete for `id` is still running
  pub fn is_busy(&self, id: u64) -> bool {
    self.busy.contains(&id)
  }

  pub fn is_pending(&self) -> bool {
    self.create.is_pending() || self.update.is_pending() || self.delete.is_pending()
  }

  fn claim(&mut self, id: u64) -> Result<(), MutationError> {
    if !self.busy.insert(id) {
      warn!(id, "rejected overlapping change");
      return Err(MutationError::InFlight(id));
    }
    Ok(())
  }

  /// Apply every finished mutation to the cache and notify.
  pub fn poll(
    &mut self,
    cache: &mut CacheStore<User>,
    notifications: &mut Notifications,
  ) -> Vec<MutationEvent> {
    let mut events = Vec::new();
    let key = UserQueryKey::Users;

    while let Some(outcome) = self.create.poll() {
      match outcome {
        MutationOutcome::Success {
          input: (ticket, _),
          output,
        } => {
          cache.insert(&key, output.clone());
          notifications.success("User created successfully");
          events.push(MutationEvent::Created(ticket, output));
        }
        MutationOutcome::Failure {
          input: (ticket, _),
          error,
        } => {
          warn!(ticket, status = ?error.status(), %error, "create failed");
          notifications.error("Failed to create user");
          events.push(MutationEvent::CreateFailed(ticket));
        }
      }
    }

    while let Some(outcome) = self.update.poll() {
      match outcome {
        MutationOutcome::Success {
          input: (ticket, input),
          output,
        } => {
          self.busy.remove(&input.id);
          // Matched on the id the service echoed back
          if !cache.replace(&key, output.clone()) {
            warn!(id = output.id, "updated user not in cache");
          }
          notifications.success("User updated successfully");
          events.push(MutationEvent::Updated(ticket, output));
        }
        MutationOutcome::Failure {
          input: (ticket, input),
          error,
        } => {
          self.busy.remove(&input.id);
          warn!(id = input.id, status = ?error.status(), %error, "update failed");
          notifications.error("Failed to update user");
          events.push(MutationEvent::UpdateFailed(ticket, input.id));
        }
      }
    }

    while let Some(outcome) = self.delete.poll() {
      match outcome {
        MutationOutcome::Success { input: id, .. } => {
          self.busy.remove(&id);
          cache.remove(&key, &id);
          notifications.success("User deleted successfully");
          events.push(MutationEvent::Deleted(id));
        }
        MutationOutcome::Failure { input: id, error } => {
          self.busy.remove(&id);
          warn!(id, status = ?error.status(), %error, "delete failed");
          notifications.error("Failed to delete user");
          events.push(MutationEvent::DeleteFailed(id));
        }
      }
    }

    events
  }
}
