use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use oblivion_core::{Cid, ObjectMeta, StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Sidecar index mapping each stored CID to its metadata.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataIndex {
    entries: BTreeMap<Cid, ObjectMeta>,
}

impl MetadataIndex {
    /// Reads the index at `path`; a missing file is an empty index.
    pub async fn load(path: &Path) -> StoreResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::MalformedResponse(format!("corrupt index {}: {e}", path.display()))
        })
    }

    /// Replaces the index file at `path` atomically.
    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(StoreError::Encode)?;
        let tmp_path = tmp_path_for(path);
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    pub fn get(&self, cid: &Cid) -> Option<&ObjectMeta> {
        self.entries.get(cid)
    }

    /// Records an upload. A previous pin on the same content is kept.
    pub fn record(&mut self, cid: Cid, mut meta: ObjectMeta) {
        if let Some(previous) = self.entries.get(&cid) {
            meta.pinned |= previous.pinned;
        }
        self.entries.insert(cid, meta);
    }

    /// Sets the retained flag, creating an entry with `fallback` if needed.
    ///
    /// Returns true if the flag changed.
    pub fn pin(&mut self, cid: &Cid, fallback: impl FnOnce() -> ObjectMeta) -> bool {
        let entry = self.entries.entry(cid.clone()).or_insert_with(fallback);
        !std::mem::replace(&mut entry.pinned, true)
    }

    pub fn cids(&self) -> impl Iterator<Item = &Cid> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}
