use async_trait::async_trait;
use bytes::Bytes;
use oblivion_core::{
    ArtifactStore, BackendKind, Cid, StoreError, StoreResult, Timeouts,
    http::{read_bytes, read_json, send},
};
use reqwest::{
    RequestBuilder, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error,
    config::{PinataAuth, PinataStoreConfig},
};

#[derive(Debug, Clone)]
pub struct PinataStore {
    pin_file_url: String,
    pin_json_url: String,
    pin_by_hash_url: String,
    test_auth_url: String,
    gateway_url: String,
    auth_headers: HeaderMap,
    timeouts: Timeouts,
    http_client: reqwest::Client,
}

impl PinataStore {
    /// Builds a store from `config`.
    ///
    /// Fails without contacting the service if the config carries no
    /// complete credential.
    pub fn create(config: PinataStoreConfig, timeouts: Timeouts) -> Result<Self, Error> {
        let auth = config.auth().ok_or(Error::MissingCredentials)?;

        let mut auth_headers = HeaderMap::new();
        match auth {
            PinataAuth::Bearer(token) => {
                auth_headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
            }
            PinataAuth::ApiKey { key, secret } => {
                auth_headers.insert("pinata_api_key", HeaderValue::from_str(&key)?);
                auth_headers.insert("pinata_secret_api_key", HeaderValue::from_str(&secret)?);
            }
        }
        for value in auth_headers.values_mut() {
            value.set_sensitive(true);
        }

        // Gateway reads are anonymous; credentials go on API requests only.
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("oblivion/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = config.api_url.trim_end_matches('/');
        Ok(Self {
            pin_file_url: format!("{api_url}/pinning/pinFileToIPFS"),
            pin_json_url: format!("{api_url}/pinning/pinJSONToIPFS"),
            pin_by_hash_url: format!("{api_url}/pinning/pinByHash"),
            test_auth_url: format!("{api_url}/data/testAuthentication"),
            gateway_url: config.gateway_url.trim_end_matches('/').to_owned(),
            auth_headers,
            timeouts,
            http_client,
        })
    }

    fn api_post(&self, url: &str) -> RequestBuilder {
        self.http_client.post(url).headers(self.auth_headers.clone())
    }

    fn content_url(&self, cid: &Cid) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }

    async fn pin_response(&self, request: RequestBuilder, url: &str) -> StoreResult<Cid> {
        let response = send(request, url, None).await?;
        let body: PinataPinRes = read_json(response, url).await?;
        Cid::parse(&body.ipfs_hash)
            .map_err(|_| StoreError::MalformedResponse("empty IpfsHash in pin response".into()))
    }

    async fn fetch(&self, cid: &Cid, timeout: std::time::Duration) -> StoreResult<Response> {
        let url = self.content_url(cid);
        debug!("downloading {} from pinata gateway", cid.fmt_short());
        send(self.http_client.get(&url).timeout(timeout), &url, Some(cid)).await
    }
}

#[async_trait]
impl ArtifactStore for PinataStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Hosted
    }

    async fn upload(&self, bytes: Bytes, name: &str) -> StoreResult<Cid> {
        let metadata = serde_json::to_string(&PinataMetadata { name }).map_err(StoreError::Encode)?;
        let len = bytes.len() as u64;
        let form = Form::new()
            .part(
                "file",
                Part::stream_with_length(bytes, len).file_name(name.to_owned()),
            )
            .text("pinataMetadata", metadata);
        let request = self
            .api_post(&self.pin_file_url)
            .multipart(form)
            .timeout(self.timeouts.transfer());

        let cid = self
            .pin_response(request, &self.pin_file_url)
            .await
            .inspect_err(|e| warn!("pinata upload of {name} failed: {e}"))?;
        info!("uploaded {name} to pinata: {cid}");
        Ok(cid)
    }

    async fn upload_json(&self, doc: &serde_json::Value, name: &str) -> StoreResult<Cid> {
        let body = PinataPinJsonReq {
            pinata_content: doc,
            pinata_metadata: PinataMetadata { name },
        };
        let request = self
            .api_post(&self.pin_json_url)
            .json(&body)
            .timeout(self.timeouts.request());

        let cid = self
            .pin_response(request, &self.pin_json_url)
            .await
            .inspect_err(|e| warn!("pinata json upload of {name} failed: {e}"))?;
        info!("uploaded json {name} to pinata: {cid}");
        Ok(cid)
    }

    async fn download(&self, cid: &Cid) -> StoreResult<Bytes> {
        let url = self.content_url(cid);
        let result = async {
            let response = self.fetch(cid, self.timeouts.transfer()).await?;
            read_bytes(response, &url).await
        }
        .await;
        result.inspect_err(|e| warn!("pinata download of {cid} failed: {e}"))
    }

    async fn download_json(&self, cid: &Cid) -> StoreResult<serde_json::Value> {
        let url = self.content_url(cid);
        let result = async {
            let response = self.fetch(cid, self.timeouts.request()).await?;
            read_json(response, &url).await
        }
        .await;
        result.inspect_err(|e| warn!("pinata json download of {cid} failed: {e}"))
    }

    async fn pin(&self, cid: &Cid, name: Option<&str>) -> StoreResult<()> {
        let body = PinataPinByHashReq {
            hash_to_pin: cid.as_str(),
            pinata_metadata: name.map(|name| PinataMetadata { name }),
        };
        let request = self
            .api_post(&self.pin_by_hash_url)
            .json(&body)
            .timeout(self.timeouts.request());

        send(request, &self.pin_by_hash_url, None)
            .await
            .inspect_err(|e| warn!("pinata pin of {cid} failed: {e}"))?;
        info!("pinned {cid} on pinata");
        Ok(())
    }

    fn gateway_url(&self, cid: &Cid) -> String {
        self.content_url(cid)
    }

    async fn probe(&self) -> StoreResult<()> {
        let request = self
            .http_client
            .get(&self.test_auth_url)
            .headers(self.auth_headers.clone())
            .timeout(self.timeouts.probe());
        send(request, &self.test_auth_url, None)
            .await
            .inspect_err(|e| warn!("pinata authentication check failed: {e}"))?;
        info!("pinata connection successful");
        Ok(())
    }
}

// Models

#[derive(Serialize)]
struct PinataMetadata<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinataPinJsonReq<'a> {
    pinata_content: &'a serde_json::Value,
    pinata_metadata: PinataMetadata<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinataPinByHashReq<'a> {
    hash_to_pin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinata_metadata: Option<PinataMetadata<'a>>,
}

#[derive(Deserialize)]
struct PinataPinRes {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}
