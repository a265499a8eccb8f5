//! recall-service — the long-lived graph client shared by request handlers
//! and background workers.
//!
//! The hosting service used to build a client per request and close it on
//! response, tearing the connection down under in-flight background work,
//! and its embedder silently ignored the configured embedding model. This
//! crate fixes both: [`RecallClient::connect`] applies the full
//! environment-derived model configuration, and [`SharedClient`] keeps one
//! lazily-created instance alive for the life of the process.

pub mod client;
pub mod error;
pub mod shared;

pub use client::RecallClient;
pub use error::ServiceError;
pub use shared::{Shared, SharedClient};
