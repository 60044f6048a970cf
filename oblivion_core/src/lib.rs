//! Core OBLIVION artifact storage types and traits.
//!
//! Worker nodes publish and fetch job inputs and outputs (model weights,
//! datasets, proofs) by content identifier. This crate defines what every
//! storage backend has in common:
//!
//! - Content identifiers (`cid::Cid`) and their normalization rules
//! - The stored object model (`object::ObjectMeta`, `object::ObjectKind`)
//! - The error taxonomy shared by all backends (`error::StoreError`)
//! - The backend contract (`store::ArtifactStore`) and request timeouts
//! - The `ArtifactClient` facade handed out by the backend selector
//!
//! Concrete backends live in their own crates (`oblivion_store_pinata`,
//! `oblivion_store_ipfs`, `oblivion_store_mock`); backend selection lives in
//! `oblivion_storage`.

pub mod cid;
pub mod client;
pub mod error;
pub mod hash;
#[cfg(feature = "http")]
pub mod http;
pub mod object;
pub mod store;

// Test utilities (behind feature flag)
#[cfg(feature = "testutil")]
pub mod testutil;

pub use cid::Cid;
pub use client::ArtifactClient;
pub use error::{StoreError, StoreResult};
pub use hash::Hash;
pub use object::{ObjectKind, ObjectMeta, StoredObject};
pub use store::{ArtifactStore, BackendKind, Timeouts};
