use thiserror::Error;

use crate::cid::Cid;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a storage operation produced no result.
///
/// Backends never panic on a failed request; every failure comes back as
/// one of these variants and is logged where it happens. Callers decide
/// whether to retry (see [`StoreError::is_retryable`]).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The backend could not be reached, or the request timed out.
    #[error("could not reach {url}: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The backend rejected the configured credentials.
    #[error("credentials rejected with HTTP {status}")]
    Authentication { status: u16 },

    #[error("content not found: {0}")]
    NotFound(Cid),

    /// The backend answered, but not with the payload we expected.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("Got HTTP {status} with content '{body}'")]
    Http { status: u16, body: String },

    #[error("invalid content identifier '{0}'")]
    InvalidCid(String),

    #[error("could not encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn connectivity(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StoreError::Connectivity {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Maps a non-success HTTP status to an error.
    ///
    /// `cid` is the identifier being read, if any; a 404 on a read becomes
    /// [`StoreError::NotFound`].
    pub fn from_status(status: u16, body: String, cid: Option<&Cid>) -> Self {
        match (status, cid) {
            (401 | 403, _) => StoreError::Authentication { status },
            (404, Some(cid)) => StoreError::NotFound(cid.clone()),
            _ => StoreError::Http { status, body },
        }
    }

    /// True for failures that may succeed when the same call is repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Connectivity { .. } => true,
            StoreError::Http { status, .. } => *status == 429 || *status >= 500,
            // Gateways answer 404 until content propagates.
            StoreError::NotFound(_) => true,
            StoreError::Io(_) => true,
            StoreError::Authentication { .. }
            | StoreError::MalformedResponse(_)
            | StoreError::InvalidCid(_)
            | StoreError::Encode(_) => false,
        }
    }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
