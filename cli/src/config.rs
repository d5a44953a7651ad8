//! Client configuration: a JSON file, overridable by environment and flags.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anchor_client::{
    solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey},
    Cluster,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/nft-engine/config.json";
pub const DEFAULT_SESSION_PATH: &str = "~/.config/nft-engine/session.json";
pub const RPC_URL_ENV: &str = "NFT_ENGINE_RPC_URL";
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 400_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cluster name (`devnet`, `mainnet`, `localnet`, ...) or RPC URL.
    pub cluster: String,
    pub program_id: String,
    pub commitment: String,
    pub compute_unit_limit: u32,
    pub session_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: String::from("devnet"),
            program_id: nft_engine::ID.to_string(),
            commitment: String::from("confirmed"),
            compute_unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
            session_file: String::from(DEFAULT_SESSION_PATH),
        }
    }
}

impl ClientConfig {
    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &str) -> ClientResult<Self> {
        let path = expand_path(path);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&contents)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &str) -> ClientResult<()> {
        let path = expand_path(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `NFT_ENGINE_RPC_URL` replaces the configured cluster.
    pub fn with_env(self) -> Self {
        self.with_rpc_override(std::env::var(RPC_URL_ENV).ok())
    }

    pub fn with_rpc_override(mut self, rpc_url: Option<String>) -> Self {
        if let Some(url) = rpc_url.filter(|u| !u.is_empty()) {
            self.cluster = url;
        }
        self
    }

    pub fn cluster(&self) -> ClientResult<Cluster> {
        Cluster::from_str(&self.cluster)
            .map_err(|e| ClientError::InvalidCluster(format!("{}: {}", self.cluster, e)))
    }

    pub fn rpc_url(&self) -> ClientResult<String> {
        Ok(self.cluster()?.url().to_string())
    }

    pub fn program_id(&self) -> ClientResult<Pubkey> {
        Ok(Pubkey::from_str(&self.program_id)?)
    }

    pub fn commitment(&self) -> ClientResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| ClientError::InvalidCommitment(self.commitment.clone()))
    }

    pub fn session_path(&self) -> PathBuf {
        expand_path(&self.session_file)
    }
}

pub fn expand_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let raw = path.as_ref().to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nft-engine-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = temp_path("missing.json");
        let _ = fs::remove_file(&path);
        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.program_id().unwrap(), nft_engine::ID);
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_path("saved.json");
        let config = ClientConfig {
            cluster: String::from("localnet"),
            compute_unit_limit: 250_000,
            ..ClientConfig::default()
        };
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ClientConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rpc_url().unwrap(), "http://127.0.0.1:8899");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "commitment": "finalized" }"#).unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.commitment, "finalized");
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.commitment().unwrap(), CommitmentConfig::finalized());
    }

    #[test]
    fn rpc_override_replaces_cluster() {
        let config = ClientConfig::default()
            .with_rpc_override(Some(String::from("http://10.0.0.1:8899")));
        assert_eq!(config.rpc_url().unwrap(), "http://10.0.0.1:8899");

        let config = ClientConfig::default().with_rpc_override(Some(String::new()));
        assert_eq!(config.cluster, "devnet");
    }

    #[test]
    fn bad_values_are_reported() {
        let config = ClientConfig {
            commitment: String::from("eventually"),
            program_id: String::from("not-a-key"),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.commitment(),
            Err(ClientError::InvalidCommitment(_))
        ));
        assert!(matches!(
            config.program_id(),
            Err(ClientError::InvalidPubkey(_))
        ));
    }

    #[test]
    fn tilde_is_expanded() {
        let expanded = expand_path("~/nft-engine");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
