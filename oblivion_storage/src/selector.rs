use std::fmt;

use oblivion_core::{ArtifactClient, ArtifactStore, BackendKind, StoreError};
use oblivion_store_ipfs::IpfsNodeStore;
use oblivion_store_mock::MockStore;
use oblivion_store_pinata::PinataStore;
use tracing::{debug, info, warn};

use crate::StorageConfig;

/// Picks the first usable backend from a [`StorageConfig`].
///
/// Order: mock when asked for, then the hosted service if credentials are
/// configured and it answers its probe, then the self-hosted node if
/// configured and reachable, then the mock store. Resolution never fails.
#[derive(Debug, Clone)]
pub struct Selector {
    config: StorageConfig,
}

/// The outcome of one backend probe made during resolution.
#[derive(Debug)]
pub struct ProbeAttempt {
    pub backend: BackendKind,
    pub outcome: ProbeOutcome,
}

#[derive(Debug)]
pub enum ProbeOutcome {
    Reachable,
    Unavailable(StoreError),
    /// The store could not be built from its config, so no request was made.
    Misconfigured(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Reachable => f.write_str("reachable"),
            ProbeOutcome::Unavailable(err) => write!(f, "unavailable: {err}"),
            ProbeOutcome::Misconfigured(reason) => write!(f, "misconfigured: {reason}"),
        }
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub client: ArtifactClient,
    pub attempts: Vec<ProbeAttempt>,
}

impl Resolution {
    pub fn backend(&self) -> BackendKind {
        self.client.backend()
    }
}

impl Selector {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub async fn resolve(&self, prefer_mock: bool) -> ArtifactClient {
        self.resolve_with_report(prefer_mock).await.client
    }

    pub async fn resolve_with_report(&self, prefer_mock: bool) -> Resolution {
        let mut attempts = Vec::new();

        if prefer_mock {
            info!("mock backend requested");
            return Resolution {
                client: self.mock(),
                attempts,
            };
        }

        let timeouts = self.config.timeouts;

        match &self.config.pinata {
            Some(pinata) if pinata.has_credentials() => {
                match PinataStore::create(pinata.clone(), timeouts) {
                    Ok(store) => {
                        if let Some(client) = try_backend(store, &mut attempts).await {
                            return Resolution { client, attempts };
                        }
                    }
                    Err(err) => misconfigured(BackendKind::Hosted, err, &mut attempts),
                }
            }
            Some(_) => debug!("pinata configured without complete credentials, skipping"),
            None => {}
        }

        if let Some(ipfs) = &self.config.ipfs {
            match IpfsNodeStore::create(ipfs.clone(), timeouts) {
                Ok(store) => {
                    if let Some(client) = try_backend(store, &mut attempts).await {
                        return Resolution { client, attempts };
                    }
                }
                Err(err) => misconfigured(BackendKind::SelfHosted, err, &mut attempts),
            }
        }

        warn!(
            "no IPFS service available, using mock store at {}",
            self.config.mock.base_path
        );
        Resolution {
            client: self.mock(),
            attempts,
        }
    }

    fn mock(&self) -> ArtifactClient {
        ArtifactClient::new(MockStore::create(self.config.mock.clone()))
    }
}

async fn try_backend<S: ArtifactStore>(
    store: S,
    attempts: &mut Vec<ProbeAttempt>,
) -> Option<ArtifactClient> {
    let backend = store.backend();
    match store.probe().await {
        Ok(()) => {
            info!("using {backend} backend");
            attempts.push(ProbeAttempt {
                backend,
                outcome: ProbeOutcome::Reachable,
            });
            Some(ArtifactClient::new(store))
        }
        Err(err) => {
            warn!("{backend} backend unavailable, trying next: {err}");
            attempts.push(ProbeAttempt {
                backend,
                outcome: ProbeOutcome::Unavailable(err),
            });
            None
        }
    }
}

fn misconfigured(backend: BackendKind, err: impl fmt::Display, attempts: &mut Vec<ProbeAttempt>) {
    warn!("could not build {backend} backend: {err}");
    attempts.push(ProbeAttempt {
        backend,
        outcome: ProbeOutcome::Misconfigured(err.to_string()),
    });
}
