//! Self-hosted IPFS node backend.
//!
//! Talks to the daemon's RPC API (`/api/v0/*`, unauthenticated) for writes
//! and to its HTTP gateway for reads.

mod store;

pub use store::IpfsNodeStore;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct IpfsNodeConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_owned()
}

impl Default for IpfsNodeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            gateway_url: default_gateway_url(),
        }
    }
}

/// Errors constructing an [`IpfsNodeStore`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
