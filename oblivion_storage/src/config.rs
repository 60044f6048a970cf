use oblivion_core::Timeouts;
use oblivion_store_ipfs::IpfsNodeConfig;
use oblivion_store_mock::MockStoreConfig;
use oblivion_store_pinata::PinataStoreConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PINATA_JWT: &str = "PINATA_JWT";
pub const ENV_PINATA_API_KEY: &str = "PINATA_API_KEY";
pub const ENV_PINATA_SECRET_KEY: &str = "PINATA_SECRET_KEY";
pub const ENV_PINATA_GATEWAY: &str = "PINATA_GATEWAY";
pub const ENV_IPFS_API_URL: &str = "IPFS_API_URL";
pub const ENV_IPFS_GATEWAY: &str = "IPFS_GATEWAY";
pub const ENV_IPFS_MOCK_DIR: &str = "IPFS_MOCK_DIR";

/// Everything needed to pick and build a backend.
///
/// A missing `[pinata]` or `[ipfs]` table means that backend is never tried.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinata: Option<PinataStoreConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs: Option<IpfsNodeConfig>,
    #[serde(default)]
    pub mock: MockStoreConfig,
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl StorageConfig {
    /// Applies the conventional environment variables on top of this config.
    ///
    /// Credentials and `IPFS_API_URL` enable their backend; the gateway
    /// variables only adjust a backend that is already enabled. Blank
    /// values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(jwt) = var(ENV_PINATA_JWT) {
            self.pinata.get_or_insert_default().jwt = Some(jwt);
        }
        if let Some(key) = var(ENV_PINATA_API_KEY) {
            self.pinata.get_or_insert_default().api_key = Some(key);
        }
        if let Some(secret) = var(ENV_PINATA_SECRET_KEY) {
            self.pinata.get_or_insert_default().secret_key = Some(secret);
        }
        if let Some(gateway) = var(ENV_PINATA_GATEWAY)
            && let Some(pinata) = self.pinata.as_mut()
        {
            pinata.gateway_url = gateway;
        }

        if let Some(api_url) = var(ENV_IPFS_API_URL) {
            self.ipfs.get_or_insert_default().api_url = api_url;
        }
        if let Some(gateway) = var(ENV_IPFS_GATEWAY)
            && let Some(ipfs) = self.ipfs.as_mut()
        {
            ipfs.gateway_url = gateway;
        }

        if let Some(dir) = var(ENV_IPFS_MOCK_DIR) {
            self.mock.base_path = dir;
        }
        self
    }

    /// True if neither remote backend could be attempted.
    pub fn is_mock_only(&self) -> bool {
        let hosted = self.pinata.as_ref().is_some_and(|p| p.has_credentials());
        !hosted && self.ipfs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_config_is_mock_only() {
        let config = StorageConfig::default();
        assert!(config.is_mock_only());
        assert_eq!(config.mock.base_path, "./ipfs_mock");
        assert_eq!(config.timeouts, Timeouts::default());
    }

    #[test]
    fn parses_toml() {
        let config: StorageConfig = toml::from_str(
            r#"
            [pinata]
            jwt = "token"

            [ipfs]
            api_url = "http://10.0.0.5:5001"

            [mock]
            base_path = "/var/lib/oblivion/mock"

            [timeouts]
            probe_secs = 3
            "#,
        )
        .unwrap();

        let pinata = config.pinata.as_ref().unwrap();
        assert_eq!(pinata.jwt.as_deref(), Some("token"));
        assert_eq!(pinata.gateway_url, "https://gateway.pinata.cloud");
        let ipfs = config.ipfs.as_ref().unwrap();
        assert_eq!(ipfs.api_url, "http://10.0.0.5:5001");
        assert_eq!(ipfs.gateway_url, "http://localhost:8080");
        assert_eq!(config.mock.base_path, "/var/lib/oblivion/mock");
        assert_eq!(config.timeouts.probe_secs, 3);
        assert_eq!(config.timeouts.transfer_secs, 120);
        assert!(!config.is_mock_only());
    }

    #[test]
    fn toml_round_trips() {
        let config = StorageConfig::default().with_env_overrides(env(&[
            (ENV_PINATA_API_KEY, "key"),
            (ENV_PINATA_SECRET_KEY, "secret"),
        ]));
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("[ipfs]"));
        assert_eq!(toml::from_str::<StorageConfig>(&text).unwrap(), config);
    }

    #[test]
    fn env_enables_backends() {
        let config = StorageConfig::default().with_env_overrides(env(&[
            (ENV_PINATA_JWT, "jwt"),
            (ENV_PINATA_GATEWAY, "https://example.mypinata.cloud"),
            (ENV_IPFS_API_URL, "http://node:5001"),
            (ENV_IPFS_GATEWAY, "http://node:8080"),
            (ENV_IPFS_MOCK_DIR, "/tmp/mock"),
        ]));

        let pinata = config.pinata.unwrap();
        assert_eq!(pinata.jwt.as_deref(), Some("jwt"));
        assert_eq!(pinata.gateway_url, "https://example.mypinata.cloud");
        let ipfs = config.ipfs.unwrap();
        assert_eq!(ipfs.api_url, "http://node:5001");
        assert_eq!(ipfs.gateway_url, "http://node:8080");
        assert_eq!(config.mock.base_path, "/tmp/mock");
    }

    #[test]
    fn gateways_alone_enable_nothing() {
        let config = StorageConfig::default().with_env_overrides(env(&[
            (ENV_PINATA_GATEWAY, "https://example.mypinata.cloud"),
            (ENV_IPFS_GATEWAY, "http://node:8080"),
            (ENV_PINATA_JWT, "   "),
        ]));
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn env_overrides_file_values() {
        let file = StorageConfig {
            pinata: Some(PinataStoreConfig {
                jwt: Some("from-file".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = file.with_env_overrides(env(&[(ENV_PINATA_JWT, "from-env")]));
        assert_eq!(config.pinata.unwrap().jwt.as_deref(), Some("from-env"));
    }

    #[test]
    fn half_a_key_pair_is_still_mock_only() {
        let config =
            StorageConfig::default().with_env_overrides(env(&[(ENV_PINATA_API_KEY, "key")]));
        assert!(config.pinata.is_some());
        assert!(config.is_mock_only());
    }
}
