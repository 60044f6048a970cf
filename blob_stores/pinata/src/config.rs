use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinataStoreConfig {
    /// Bearer token; preferred over the key pair when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_owned()
}

impl Default for PinataStoreConfig {
    fn default() -> Self {
        Self {
            jwt: None,
            api_key: None,
            secret_key: None,
            api_url: default_api_url(),
            gateway_url: default_gateway_url(),
        }
    }
}

impl PinataStoreConfig {
    /// The credential requests will be signed with, if the config has a
    /// complete one.
    pub fn auth(&self) -> Option<PinataAuth> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        if let Some(jwt) = non_empty(&self.jwt) {
            return Some(PinataAuth::Bearer(jwt.trim().to_owned()));
        }
        match (non_empty(&self.api_key), non_empty(&self.secret_key)) {
            (Some(key), Some(secret)) => Some(PinataAuth::ApiKey {
                key: key.trim().to_owned(),
                secret: secret.trim().to_owned(),
            }),
            _ => None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.auth().is_some()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum PinataAuth {
    Bearer(String),
    ApiKey { key: String, secret: String },
}

impl fmt::Debug for PinataAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinataAuth::Bearer(_) => f.write_str("Bearer(..)"),
            PinataAuth::ApiKey { key, .. } => {
                f.debug_struct("ApiKey").field("key", key).finish_non_exhaustive()
            }
        }
    }
}
