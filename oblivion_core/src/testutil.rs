//! Test utilities for `ArtifactStore` implementations.
//!
//! This module provides a test suite that can be run against any backend
//! that keeps state (the mock store, or a live node in integration setups)
//! to verify it honors the `ArtifactStore` contract.
//!
//! # Usage
//!
//! In your store crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! oblivion_core = { workspace = true, features = ["testutil"] }
//! ```
//!
//! In your test file:
//!
//! ```ignore
//! use oblivion_core::{ArtifactClient, testutil::StoreTests};
//!
//! #[tokio::test]
//! async fn test_my_store() {
//!     let client = ArtifactClient::new(MyStore::new(...));
//!     StoreTests::new(&client).run_all().await.unwrap();
//! }
//! ```

use anyhow::{Result, ensure};
use bytes::Bytes;
use rand::Rng;

use crate::{ArtifactClient, StoreError};

/// Test suite for `ArtifactStore` implementations, driven through the
/// [`ArtifactClient`] facade so identifier normalization is covered too.
pub struct StoreTests<'a> {
    client: &'a ArtifactClient,
    /// Well-formed identifier the backend is known not to hold.
    missing_cid: Option<String>,
    /// Tag mixed into payloads so parallel runs don't share content.
    tag: u32,
}

impl<'a> StoreTests<'a> {
    pub fn new(client: &'a ArtifactClient) -> Self {
        Self {
            client,
            missing_cid: None,
            tag: rand::rng().random::<u32>(),
        }
    }

    /// Also check that reading `cid` reports [`StoreError::NotFound`].
    pub fn with_missing_cid(mut self, cid: impl Into<String>) -> Self {
        self.missing_cid = Some(cid.into());
        self
    }

    fn payload(&self, name: &str) -> Bytes {
        Bytes::from(format!("{name}-{}", self.tag))
    }

    /// Run all tests.
    pub async fn run_all(&self) -> Result<()> {
        self.test_round_trip().await?;
        self.test_random_round_trip().await?;
        self.test_empty_round_trip().await?;
        self.test_idempotent_upload().await?;
        self.test_json_round_trip().await?;
        self.test_normalized_reads().await?;
        self.test_pin_twice().await?;
        self.test_gateway_url().await?;
        if self.missing_cid.is_some() {
            self.test_missing().await?;
        }
        Ok(())
    }

    /// `download(upload(P)) == P`.
    pub async fn test_round_trip(&self) -> Result<()> {
        let data = self.payload("round_trip");
        let cid = self.client.upload(data.clone(), "round_trip.bin").await?;
        let retrieved = self.client.download(cid.as_str()).await?;
        ensure!(retrieved == data, "retrieved data should match original");
        Ok(())
    }

    pub async fn test_random_round_trip(&self) -> Result<()> {
        let mut data = vec![0u8; 64 * 1024];
        rand::rng().fill(&mut data[..]);
        let cid = self.client.upload(data.clone(), "random.bin").await?;
        let retrieved = self.client.download(cid.as_str()).await?;
        ensure!(retrieved.len() == data.len(), "length should match");
        ensure!(retrieved.as_ref() == data.as_slice(), "bytes should match");
        Ok(())
    }

    pub async fn test_empty_round_trip(&self) -> Result<()> {
        let cid = self.client.upload(Bytes::new(), "empty.bin").await?;
        let retrieved = self.client.download(cid.as_str()).await?;
        ensure!(retrieved.is_empty(), "empty blob should stay empty");
        Ok(())
    }

    /// Identical bytes yield the identical CID.
    pub async fn test_idempotent_upload(&self) -> Result<()> {
        let data = self.payload("idempotent");
        let first = self.client.upload(data.clone(), "first.bin").await?;
        let second = self.client.upload(data, "second.bin").await?;
        ensure!(first == second, "re-upload should return the same cid");

        let other = self.client.upload(self.payload("other"), "other.bin").await?;
        ensure!(other != first, "different bytes should get a different cid");
        Ok(())
    }

    pub async fn test_json_round_trip(&self) -> Result<()> {
        let doc = serde_json::json!({
            "model": "test",
            "accuracy": 0.95,
            "tag": self.tag,
        });
        let cid = self.client.upload_json(&doc, "test_model.json").await?;
        let back: serde_json::Value = self.client.download_json(cid.as_str()).await?;
        ensure!(back == doc, "json document should round trip");
        Ok(())
    }

    /// `ipfs://X`, ` X ` and `X` all resolve to the same content.
    pub async fn test_normalized_reads(&self) -> Result<()> {
        let data = self.payload("normalized");
        let cid = self.client.upload(data.clone(), "normalized.bin").await?;
        for spelling in [
            cid.to_uri(),
            format!("  {cid}\n"),
            cid.as_str().to_owned(),
        ] {
            let retrieved = self.client.download(&spelling).await?;
            ensure!(retrieved == data, "'{spelling}' should resolve to the upload");
        }
        Ok(())
    }

    pub async fn test_pin_twice(&self) -> Result<()> {
        let cid = self.client.upload(self.payload("pin"), "pin.bin").await?;
        self.client.pin(cid.as_str(), Some("pinned.bin")).await?;
        self.client.pin(&cid.to_uri(), None).await?;
        Ok(())
    }

    pub async fn test_gateway_url(&self) -> Result<()> {
        let cid = self.client.upload(self.payload("gateway"), "gateway.bin").await?;
        let url = self.client.gateway_url(&cid.to_uri())?;
        ensure!(url.contains(cid.as_str()), "gateway url {url} should contain {cid}");
        Ok(())
    }

    pub async fn test_missing(&self) -> Result<()> {
        let Some(missing) = &self.missing_cid else {
            return Ok(());
        };
        match self.client.download(missing).await {
            Err(StoreError::NotFound(cid)) => {
                ensure!(cid.as_str() == missing.trim(), "error should name the cid");
            }
            other => anyhow::bail!("expected NotFound, got {other:?}"),
        }
        Ok(())
    }
}
