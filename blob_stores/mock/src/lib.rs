//! Deterministic artifact store backed by a local directory.
//!
//! Blobs are written as `<dir>/<cid>`, where the CID is derived from the
//! content hash, so uploading the same bytes twice is a no-op that returns
//! the same identifier. `<dir>/metadata.json` records name, size, kind and
//! pin state per CID and survives restarts.
//!
//! The index assumes a single writing process. Within a process, all index
//! updates go through one async mutex.

mod index;

pub use index::MetadataIndex;

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use oblivion_core::{
    ArtifactStore, BackendKind, Cid, Hash, ObjectKind, ObjectMeta, StoreError, StoreResult,
    StoredObject,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub const METADATA_FILE: &str = "metadata.json";
pub const DEFAULT_BASE_PATH: &str = "./ipfs_mock";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct MockStoreConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_owned()
}

impl Default for MockStoreConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockStore {
    base_path: PathBuf,
    // Loaded on first use.
    index: Arc<Mutex<Option<MetadataIndex>>>,
}

impl MockStore {
    /// Creates a store rooted at `base_path`.
    ///
    /// Nothing touches the filesystem until the first operation.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        MockStore {
            base_path: base_path.into(),
            index: Arc::new(Mutex::new(None)),
        }
    }

    pub fn create(config: MockStoreConfig) -> Self {
        Self::new(config.base_path)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Metadata recorded for `cid`, if it was uploaded or pinned here.
    pub async fn meta(&self, cid: &Cid) -> StoreResult<Option<ObjectMeta>> {
        Ok(self.lock_index().await?.get(cid).cloned())
    }

    pub async fn is_pinned(&self, cid: &Cid) -> StoreResult<bool> {
        Ok(self.meta(cid).await?.is_some_and(|m| m.pinned))
    }

    /// All identifiers in the index.
    pub async fn list(&self) -> StoreResult<Vec<Cid>> {
        Ok(self.lock_index().await?.cids().cloned().collect())
    }

    fn index_path(&self) -> PathBuf {
        self.base_path.join(METADATA_FILE)
    }

    fn resolve_path(&self, cid: &Cid) -> StoreResult<PathBuf> {
        let name = cid.as_str();
        if name.contains(['/', '\\']) || name.starts_with('.') || name == METADATA_FILE {
            return Err(StoreError::InvalidCid(name.to_owned()));
        }
        Ok(self.base_path.join(name))
    }

    async fn lock_index(&self) -> StoreResult<MappedMutexGuard<'_, MetadataIndex>> {
        let mut guard = self.index.lock().await;
        if guard.is_none() {
            *guard = Some(MetadataIndex::load(&self.index_path()).await?);
        }
        Ok(MutexGuard::map(guard, |slot| {
            slot.get_or_insert_with(MetadataIndex::default)
        }))
    }

    /// Applies `update` to a copy of the index and keeps the copy only once
    /// it is on disk.
    async fn update_index<T>(
        &self,
        update: impl FnOnce(&mut MetadataIndex) -> T,
    ) -> StoreResult<T> {
        let mut index = self.lock_index().await?;
        let mut updated = index.clone();
        let out = update(&mut updated);
        updated.save(&self.index_path()).await?;
        *index = updated;
        Ok(out)
    }

    async fn put_object(&self, object: StoredObject) -> StoreResult<Cid> {
        let cid = Cid::from_content_hash(&Hash::new(&object.bytes));
        let path = self.resolve_path(&cid)?;

        tokio::fs::create_dir_all(&self.base_path).await?;
        self.write_blob(&cid, &path, &object.bytes).await?;

        let meta = object.meta(cid.as_str());
        self.update_index(|index| index.record(cid.clone(), meta)).await?;
        Ok(cid)
    }

    /// Writes the blob for `cid` unless it is already in place.
    ///
    /// Content is written to a temp file and renamed over `path`, so readers
    /// never see a partial blob.
    async fn write_blob(&self, cid: &Cid, path: &Path, bytes: &Bytes) -> StoreResult<()> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() == bytes.len() as u64 => {
                debug!("[mock] {} already stored", cid.fmt_short());
                return Ok(());
            }
            Ok(_) => warn!("[mock] replacing blob {cid} with unexpected size"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .base_path
            .join(format!(".{cid}.{}-{seq}.tmp", std::process::id()));
        if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn read_blob(&self, cid: &Cid) -> StoreResult<Bytes> {
        let path = self.resolve_path(cid)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("[mock] cid not found: {cid}");
                Err(StoreError::NotFound(cid.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn upload(&self, bytes: Bytes, name: &str) -> StoreResult<Cid> {
        let cid = self
            .put_object(StoredObject::file(bytes, Some(name.to_owned())))
            .await
            .inspect_err(|e| warn!("[mock] upload of {name} failed: {e}"))?;
        info!("[mock] uploaded {name}: {cid}");
        Ok(cid)
    }

    async fn upload_json(&self, doc: &serde_json::Value, name: &str) -> StoreResult<Cid> {
        let object = StoredObject::json(doc, Some(name.to_owned())).map_err(StoreError::Encode)?;
        let cid = self
            .put_object(object)
            .await
            .inspect_err(|e| warn!("[mock] json upload of {name} failed: {e}"))?;
        info!("[mock] json uploaded {name}: {cid}");
        Ok(cid)
    }

    async fn download(&self, cid: &Cid) -> StoreResult<Bytes> {
        let bytes = self.read_blob(cid).await?;
        debug!("[mock] read {} bytes for {}", bytes.len(), cid.fmt_short());
        Ok(bytes)
    }

    async fn download_json(&self, cid: &Cid) -> StoreResult<serde_json::Value> {
        let bytes = self.read_blob(cid).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("[mock] {cid} is not json: {e}");
            StoreError::MalformedResponse(e.to_string())
        })
    }

    async fn pin(&self, cid: &Cid, name: Option<&str>) -> StoreResult<()> {
        let path = self.resolve_path(cid)?;
        let size = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("[mock] cannot pin unknown cid {cid}");
                return Err(StoreError::NotFound(cid.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if self.is_pinned(cid).await? {
            debug!("[mock] {cid} already pinned");
            return Ok(());
        }
        self.update_index(|index| {
            index.pin(cid, || ObjectMeta {
                name: name.unwrap_or(cid.as_str()).to_owned(),
                size,
                kind: ObjectKind::Unknown,
                pinned: false,
            })
        })
        .await?;
        info!("[mock] pinned {cid}");
        Ok(())
    }

    fn gateway_url(&self, cid: &Cid) -> String {
        format!("file://{}/{}", self.base_path.display(), cid)
    }

    async fn probe(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        info!("[mock] store ready at {}", self.base_path.display());
        Ok(())
    }
}
