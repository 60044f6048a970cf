use async_trait::async_trait;
use bytes::Bytes;
use oblivion_core::{
    ArtifactStore, BackendKind, Cid, StoreError, StoreResult, Timeouts,
    http::{read_bytes, read_json, send},
};
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{Error, IpfsNodeConfig};

#[derive(Debug, Clone)]
pub struct IpfsNodeStore {
    add_url: String,
    pin_add_url: String,
    id_url: String,
    gateway_url: String,
    timeouts: Timeouts,
    http_client: reqwest::Client,
}

impl IpfsNodeStore {
    pub fn create(config: IpfsNodeConfig, timeouts: Timeouts) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("oblivion/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = config.api_url.trim_end_matches('/');
        Ok(Self {
            add_url: format!("{api_url}/api/v0/add"),
            pin_add_url: format!("{api_url}/api/v0/pin/add"),
            id_url: format!("{api_url}/api/v0/id"),
            gateway_url: config.gateway_url.trim_end_matches('/').to_owned(),
            timeouts,
            http_client,
        })
    }

    fn content_url(&self, cid: &Cid) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }

    /// Adds `bytes` as a single file and returns the node's CID for it.
    async fn add(&self, bytes: Bytes, name: &str, timeout: std::time::Duration) -> StoreResult<Cid> {
        let len = bytes.len() as u64;
        let form = Form::new().part(
            "file",
            Part::stream_with_length(bytes, len).file_name(name.to_owned()),
        );
        let request = self.http_client.post(&self.add_url).multipart(form).timeout(timeout);

        let response = send(request, &self.add_url, None).await?;
        let body: IpfsAddRes = read_json(response, &self.add_url).await?;
        Cid::parse(&body.hash)
            .map_err(|_| StoreError::MalformedResponse("empty Hash in add response".into()))
    }

    async fn fetch(&self, cid: &Cid, timeout: std::time::Duration) -> StoreResult<Response> {
        let url = self.content_url(cid);
        debug!("downloading {} from local gateway", cid.fmt_short());
        send(self.http_client.get(&url).timeout(timeout), &url, Some(cid)).await
    }
}

#[async_trait]
impl ArtifactStore for IpfsNodeStore {
    fn backend(&self) -> BackendKind {
        BackendKind::SelfHosted
    }

    async fn upload(&self, bytes: Bytes, name: &str) -> StoreResult<Cid> {
        let cid = self
            .add(bytes, name, self.timeouts.transfer())
            .await
            .inspect_err(|e| warn!("ipfs upload of {name} failed: {e}"))?;
        info!("uploaded {name} to local ipfs: {cid}");
        Ok(cid)
    }

    async fn upload_json(&self, doc: &serde_json::Value, name: &str) -> StoreResult<Cid> {
        let bytes = serde_json::to_vec(doc).map_err(StoreError::Encode)?;
        let cid = self
            .add(bytes.into(), name, self.timeouts.request())
            .await
            .inspect_err(|e| warn!("ipfs json upload of {name} failed: {e}"))?;
        info!("uploaded json {name} to local ipfs: {cid}");
        Ok(cid)
    }

    async fn download(&self, cid: &Cid) -> StoreResult<Bytes> {
        let url = self.content_url(cid);
        let result = async {
            let response = self.fetch(cid, self.timeouts.transfer()).await?;
            read_bytes(response, &url).await
        }
        .await;
        result.inspect_err(|e| warn!("ipfs download of {cid} failed: {e}"))
    }

    async fn download_json(&self, cid: &Cid) -> StoreResult<serde_json::Value> {
        let url = self.content_url(cid);
        let result = async {
            let response = self.fetch(cid, self.timeouts.request()).await?;
            read_json(response, &url).await
        }
        .await;
        result.inspect_err(|e| warn!("ipfs json download of {cid} failed: {e}"))
    }

    /// The daemon has no pin names, so `_name` is ignored.
    async fn pin(&self, cid: &Cid, _name: Option<&str>) -> StoreResult<()> {
        let request = self
            .http_client
            .post(&self.pin_add_url)
            .query(&[("arg", cid.as_str())])
            .timeout(self.timeouts.request());
        send(request, &self.pin_add_url, None)
            .await
            .inspect_err(|e| warn!("ipfs pin of {cid} failed: {e}"))?;
        info!("pinned {cid} on local ipfs");
        Ok(())
    }

    fn gateway_url(&self, cid: &Cid) -> String {
        self.content_url(cid)
    }

    async fn probe(&self) -> StoreResult<()> {
        let request = self.http_client.post(&self.id_url).timeout(self.timeouts.probe());
        let response = send(request, &self.id_url, None)
            .await
            .inspect_err(|e| warn!("local ipfs node unreachable: {e}"))?;
        let id: IpfsIdRes = read_json(response, &self.id_url).await.unwrap_or_default();
        info!("local ipfs connection successful (peer {})", id.id.as_deref().unwrap_or("unknown"));
        Ok(())
    }
}

// Models

#[derive(Deserialize)]
struct IpfsAddRes {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize, Default)]
struct IpfsIdRes {
    #[serde(rename = "ID")]
    id: Option<String>,
}
