//! Remote record-keeping service: wire types, domain types and the HTTP client.

pub mod api_types;
pub mod client;
pub mod error;
pub mod types;

pub use client::UserClient;
pub use error::TransportError;
pub use types::{User, UserData};
