use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{cid::Cid, error::StoreResult};

/// Contract shared by the hosted, self-hosted and mock backends.
///
/// Identifiers passed in are already normalized. Implementations must
/// report failures as `Err` values and log them; they never retry.
#[async_trait]
pub trait ArtifactStore: fmt::Debug + Send + Sync + 'static {
    fn backend(&self) -> BackendKind;

    /// Stores `bytes` under the display name `name` and returns its CID.
    async fn upload(&self, bytes: Bytes, name: &str) -> StoreResult<Cid>;

    async fn upload_json(&self, doc: &serde_json::Value, name: &str) -> StoreResult<Cid>;

    async fn download(&self, cid: &Cid) -> StoreResult<Bytes>;

    async fn download_json(&self, cid: &Cid) -> StoreResult<serde_json::Value>;

    /// Marks `cid` as retained. Pinning twice is not an error.
    async fn pin(&self, cid: &Cid, name: Option<&str>) -> StoreResult<()>;

    /// URL under which the content can be fetched with a plain GET.
    fn gateway_url(&self, cid: &Cid) -> String;

    /// Issues one bounded identity or authentication request.
    async fn probe(&self) -> StoreResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Hosted,
    SelfHosted,
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Hosted => "hosted",
            BackendKind::SelfHosted => "self-hosted",
            BackendKind::Mock => "mock",
        })
    }
}

/// Per-request time limits for network backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Binary uploads and downloads.
    pub transfer_secs: u64,
    /// JSON uploads, JSON downloads and pin requests.
    pub request_secs: u64,
    /// Identity / authentication probe.
    pub probe_secs: u64,
}

impl Timeouts {
    pub fn transfer(&self) -> Duration {
        Duration::from_secs(self.transfer_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            transfer_secs: 120,
            request_secs: 60,
            probe_secs: 10,
        }
    }
}
