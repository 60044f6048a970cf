//! Pinata hosted pinning backend.
//!
//! Uploads go through the pinning API (`/pinning/*`), reads through the
//! public gateway (`{gateway}/ipfs/{cid}`).

mod config;
mod store;

pub use config::{DEFAULT_API_URL, DEFAULT_GATEWAY_URL, PinataAuth, PinataStoreConfig};
pub use store::PinataStore;

use thiserror::Error;

/// Errors constructing a [`PinataStore`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no Pinata credentials: set a jwt, or both api_key and secret_key")]
    MissingCredentials,

    #[error(transparent)]
    HttpInvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
