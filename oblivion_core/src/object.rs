use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// How a blob was uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    File,
    Json,
    /// Content pinned without an upload record.
    Unknown,
}

/// Sidecar metadata kept for a stored blob.
///
/// `pinned` is the retained flag of the blob's pin record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub size: u64,
    #[serde(alias = "type")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub pinned: bool,
}

/// An immutable blob together with the metadata it was uploaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub name: Option<String>,
    pub kind: ObjectKind,
}

impl StoredObject {
    pub fn file(bytes: impl Into<Bytes>, name: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            name,
            kind: ObjectKind::File,
        }
    }

    pub fn json(doc: &serde_json::Value, name: Option<String>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            bytes: serde_json::to_vec(doc)?.into(),
            name,
            kind: ObjectKind::Json,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Metadata record for this object, using `fallback_name` when unnamed.
    pub fn meta(&self, fallback_name: &str) -> ObjectMeta {
        ObjectMeta {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_owned()),
            size: self.size(),
            kind: self.kind,
            pinned: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_reads_legacy_type_key() {
        let meta: ObjectMeta =
            serde_json::from_str(r#"{"name":"a.json","size":3,"type":"json"}"#).unwrap();
        assert_eq!(meta.kind, ObjectKind::Json);
        assert!(!meta.pinned);
    }

    #[test]
    fn json_object_is_compact() {
        let doc = serde_json::json!({"a": 1});
        let obj = StoredObject::json(&doc, None).unwrap();
        assert_eq!(obj.bytes.as_ref(), br#"{"a":1}"#);
        assert_eq!(obj.size(), 7);
        let meta = obj.meta("data.json");
        assert_eq!(meta.name, "data.json");
        assert_eq!(meta.kind, ObjectKind::Json);
    }
}
