use std::{path::Path, sync::Arc};

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    cid::Cid,
    error::{StoreError, StoreResult},
    store::{ArtifactStore, BackendKind},
};

/// Handle to the active storage backend.
///
/// Accepts identifiers in any spelling callers pass around (`ipfs://X`,
/// padded strings) and normalizes them before they reach the backend.
/// Cloning is cheap; all clones share the same backend.
#[derive(Debug, Clone)]
pub struct ArtifactClient {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactClient {
    pub fn new<S>(store: S) -> Self
    where
        S: ArtifactStore,
    {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.store.backend()
    }

    pub async fn upload(&self, bytes: impl Into<Bytes>, name: &str) -> StoreResult<Cid> {
        self.store.upload(bytes.into(), name).await
    }

    /// Uploads any serializable document as JSON.
    pub async fn upload_json<T>(&self, doc: &T, name: &str) -> StoreResult<Cid>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(doc).map_err(StoreError::Encode)?;
        self.store.upload_json(&value, name).await
    }

    /// Uploads the contents of a local file.
    ///
    /// The object is named after the file unless `name` is given. A missing
    /// file fails before the backend is contacted.
    pub async fn upload_file(&self, path: impl AsRef<Path>, name: Option<&str>) -> StoreResult<Cid> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.inspect_err(|e| {
            warn!("cannot read {}: {e}", path.display());
        })?;
        let name = match name {
            Some(name) => name.to_owned(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_owned()),
        };
        self.store.upload(Bytes::from(bytes), &name).await
    }

    pub async fn download(&self, cid: &str) -> StoreResult<Bytes> {
        let cid = Cid::parse(cid)?;
        self.store.download(&cid).await
    }

    /// Downloads a JSON document and decodes it into `T`.
    pub async fn download_json<T>(&self, cid: &str) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let cid = Cid::parse(cid)?;
        let value = self.store.download_json(&cid).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!("document {} has unexpected shape: {e}", cid.fmt_short());
            StoreError::MalformedResponse(e.to_string())
        })
    }

    /// Downloads `cid` into the file at `out`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    pub async fn download_to_file(&self, cid: &str, out: impl AsRef<Path>) -> StoreResult<u64> {
        let out = out.as_ref();
        let bytes = self.download(cid).await?;
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out, &bytes).await?;
        debug!("wrote {} bytes to {}", bytes.len(), out.display());
        Ok(bytes.len() as u64)
    }

    pub async fn pin(&self, cid: &str, name: Option<&str>) -> StoreResult<()> {
        let cid = Cid::parse(cid)?;
        self.store.pin(&cid, name).await
    }

    pub fn gateway_url(&self, cid: &str) -> StoreResult<String> {
        let cid = Cid::parse(cid)?;
        Ok(self.store.gateway_url(&cid))
    }

    pub async fn probe(&self) -> StoreResult<()> {
        self.store.probe().await
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::Hash;

    /// Keeps blobs in a map keyed by their hex hash.
    #[derive(Debug, Default)]
    struct MapStore {
        blobs: Mutex<HashMap<Cid, Bytes>>,
    }

    #[async_trait]
    impl ArtifactStore for MapStore {
        fn backend(&self) -> BackendKind {
            BackendKind::Mock
        }

        async fn upload(&self, bytes: Bytes, _name: &str) -> StoreResult<Cid> {
            let cid = Cid::parse(&Hash::new(&bytes).to_hex())?;
            self.blobs.lock().unwrap().insert(cid.clone(), bytes);
            Ok(cid)
        }

        async fn upload_json(&self, doc: &serde_json::Value, name: &str) -> StoreResult<Cid> {
            let bytes = serde_json::to_vec(doc).map_err(StoreError::Encode)?;
            self.upload(bytes.into(), name).await
        }

        async fn download(&self, cid: &Cid) -> StoreResult<Bytes> {
            self.blobs
                .lock()
                .unwrap()
                .get(cid)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(cid.clone()))
        }

        async fn download_json(&self, cid: &Cid) -> StoreResult<serde_json::Value> {
            let bytes = self.download(cid).await?;
            serde_json::from_slice(&bytes).map_err(|e| StoreError::MalformedResponse(e.to_string()))
        }

        async fn pin(&self, cid: &Cid, _name: Option<&str>) -> StoreResult<()> {
            self.download(cid).await.map(|_| ())
        }

        fn gateway_url(&self, cid: &Cid) -> String {
            format!("memory://{cid}")
        }

        async fn probe(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Report {
        model: String,
        accuracy: f64,
    }

    #[tokio::test]
    async fn typed_json_round_trip() {
        let client = ArtifactClient::new(MapStore::default());
        let report = Report {
            model: "test".into(),
            accuracy: 0.95,
        };
        let cid = client.upload_json(&report, "report.json").await.unwrap();
        let back: Report = client.download_json(&cid.to_uri()).await.unwrap();
        assert_eq!(back, report);
    }

    #[tokio::test]
    async fn wrong_shape_is_malformed() {
        let client = ArtifactClient::new(MapStore::default());
        let cid = client.upload_json(&[1, 2, 3], "list.json").await.unwrap();
        let err = client
            .download_json::<Report>(cid.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn invalid_cid_never_reaches_backend() {
        let client = ArtifactClient::new(MapStore::default());
        assert!(matches!(
            client.download("  ").await,
            Err(StoreError::InvalidCid(_))
        ));
        assert!(client.gateway_url("ipfs://").is_err());
    }

    #[tokio::test]
    async fn file_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("weights.bin");
        tokio::fs::write(&src, b"weights").await.unwrap();

        let client = ArtifactClient::new(MapStore::default());
        let cid = client.upload_file(&src, None).await.unwrap();

        let out = dir.path().join("nested").join("out").join("weights.bin");
        let written = client.download_to_file(cid.as_str(), &out).await.unwrap();
        assert_eq!(written, 7);
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"weights");

        let missing = client
            .upload_file(dir.path().join("absent.bin"), None)
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
