//! Response handling shared by the HTTP backends.
//!
//! Transport failures become [`StoreError::Connectivity`], non-2xx statuses
//! go through [`StoreError::from_status`], and undecodable bodies become
//! [`StoreError::MalformedResponse`].

use bytes::Bytes;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{Cid, StoreError, StoreResult};

/// Sends `request` and returns the response if its status is a success.
///
/// `cid` is the identifier being read, if any, so a 404 can be reported as
/// [`StoreError::NotFound`].
pub async fn send(request: RequestBuilder, url: &str, cid: Option<&Cid>) -> StoreResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::connectivity(url, e))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::from_status(status.as_u16(), body, cid))
}

pub async fn read_bytes(response: Response, url: &str) -> StoreResult<Bytes> {
    response
        .bytes()
        .await
        .map_err(|e| StoreError::connectivity(url, e))
}

pub async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> StoreResult<T> {
    let bytes = read_bytes(response, url).await?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::MalformedResponse(e.to_string()))
}
