//! Storage configuration and backend selection.
//!
//! [`StorageConfig`] is read once at startup; [`Selector`] turns it into a
//! ready [`ArtifactClient`], probing the hosted and self-hosted backends in
//! order and falling back to the local mock store.

pub mod config;
mod selector;

pub use config::StorageConfig;
pub use oblivion_core::{ArtifactClient, BackendKind};
pub use selector::{ProbeAttempt, ProbeOutcome, Resolution, Selector};
