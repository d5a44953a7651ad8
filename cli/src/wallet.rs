//! Wallet session: which signer is active and how it was connected.
//!
//! The chosen connector is remembered in a small JSON file so the next run
//! can `restore` it without asking again.

use std::{fs, path::PathBuf};

use anchor_client::solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::expand_path,
    error::{ClientError, ClientResult},
};

/// Environment variable holding a keypair as a JSON byte array.
pub const KEYPAIR_ENV: &str = "NFT_ENGINE_KEYPAIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Connector {
    KeypairFile(PathBuf),
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct WalletSession {
    state: SessionState,
    connector: Option<Connector>,
    signer: Option<Keypair>,
    store: PathBuf,
}

impl WalletSession {
    /// `store` is where the active connector is persisted.
    pub fn new(store: PathBuf) -> Self {
        Self {
            state: SessionState::Disconnected,
            connector: None,
            signer: None,
            store,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connector(&self) -> Option<&Connector> {
        self.connector.as_ref()
    }

    pub fn pubkey(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|s| s.pubkey())
    }

    pub fn signer(&self) -> ClientResult<&Keypair> {
        self.signer.as_ref().ok_or(ClientError::NotConnected)
    }

    /// Owned copy of the active signer.
    pub fn keypair(&self) -> ClientResult<Keypair> {
        let signer = self.signer()?;
        Keypair::from_bytes(&signer.to_bytes())
            .map_err(|e| ClientError::InvalidKeypair(e.to_string()))
    }

    pub fn activate(&mut self, connector: Connector) -> ClientResult<Pubkey> {
        self.state = SessionState::Connecting;

        let keypair = match load_keypair(&connector) {
            Ok(keypair) => keypair,
            Err(e) => {
                warn!("Wallet connection failed: {}", e);
                self.reset();
                return Err(e);
            }
        };

        if let Err(e) = self.persist(&connector) {
            self.reset();
            return Err(e);
        }

        let pubkey = keypair.pubkey();
        info!("Wallet connected: {}", pubkey);
        self.signer = Some(keypair);
        self.connector = Some(connector);
        self.state = SessionState::Connected;
        Ok(pubkey)
    }

    pub fn deactivate(&mut self) -> ClientResult<()> {
        self.reset();
        if self.store.exists() {
            fs::remove_file(&self.store)?;
        }
        info!("Wallet disconnected");
        Ok(())
    }

    /// Re-activates the persisted connector, if any.
    pub fn restore(&mut self) -> ClientResult<Option<Pubkey>> {
        if !self.store.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.store)?;
        let connector: Connector = serde_json::from_str(&contents)?;
        self.activate(connector).map(Some)
    }

    fn persist(&self, connector: &Connector) -> ClientResult<()> {
        if let Some(parent) = self.store.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.store, serde_json::to_string(connector)?)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.state = SessionState::Disconnected;
        self.connector = None;
        self.signer = None;
    }
}

fn load_keypair(connector: &Connector) -> ClientResult<Keypair> {
    match connector {
        Connector::KeypairFile(path) => read_keypair_file(expand_path(path))
            .map_err(|e| ClientError::InvalidKeypair(format!("{}: {}", path.display(), e))),
        Connector::Environment => {
            let raw = std::env::var(KEYPAIR_ENV)
                .map_err(|_| ClientError::InvalidKeypair(format!("{} is not set", KEYPAIR_ENV)))?;
            keypair_from_json(&raw)
        }
    }
}

/// Parses the `[u8; 64]` JSON form used by Solana keypair files.
pub fn keypair_from_json(raw: &str) -> ClientResult<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw.trim())?;
    Keypair::from_bytes(&bytes).map_err(|e| ClientError::InvalidKeypair(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_client::solana_sdk::signature::write_keypair_file;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nft-engine-wallet-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn starts_disconnected() {
        let dir = temp_dir("fresh");
        let session = WalletSession::new(dir.join("session.json"));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(matches!(session.signer(), Err(ClientError::NotConnected)));
        assert!(session.pubkey().is_none());
    }

    #[test]
    fn activate_persists_and_restore_reconnects() {
        let dir = temp_dir("restore");
        let keypair = Keypair::new();
        let key_path = dir.join("id.json");
        write_keypair_file(&keypair, &key_path).unwrap();
        let store = dir.join("session.json");

        let mut session = WalletSession::new(store.clone());
        let pubkey = session
            .activate(Connector::KeypairFile(key_path.clone()))
            .unwrap();
        assert_eq!(pubkey, keypair.pubkey());
        assert_eq!(session.state(), SessionState::Connected);
        assert!(store.exists());

        let mut restored = WalletSession::new(store);
        assert_eq!(restored.restore().unwrap(), Some(keypair.pubkey()));
        assert_eq!(restored.connector(), Some(&Connector::KeypairFile(key_path)));
        assert_eq!(restored.keypair().unwrap().pubkey(), keypair.pubkey());
    }

    #[test]
    fn failed_activation_returns_to_disconnected() {
        let dir = temp_dir("failed");
        let store = dir.join("session.json");
        let mut session = WalletSession::new(store.clone());

        let res = session.activate(Connector::KeypairFile(dir.join("missing.json")));
        assert!(matches!(res, Err(ClientError::InvalidKeypair(_))));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!store.exists());
    }

    #[test]
    fn deactivate_clears_signer_and_store() {
        let dir = temp_dir("deactivate");
        let key_path = dir.join("id.json");
        write_keypair_file(&Keypair::new(), &key_path).unwrap();
        let store = dir.join("session.json");

        let mut session = WalletSession::new(store.clone());
        session.activate(Connector::KeypairFile(key_path)).unwrap();
        session.deactivate().unwrap();

        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!store.exists());
        assert!(matches!(session.signer(), Err(ClientError::NotConnected)));
        assert_eq!(session.restore().unwrap(), None);
    }

    #[test]
    fn keypair_json_round_trips() {
        let keypair = Keypair::new();
        let raw = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        assert_eq!(keypair_from_json(&raw).unwrap().pubkey(), keypair.pubkey());

        assert!(matches!(
            keypair_from_json("[1, 2, 3]"),
            Err(ClientError::InvalidKeypair(_))
        ));
        assert!(matches!(keypair_from_json("nope"), Err(ClientError::Json(_))));
    }

    #[test]
    fn connector_file_format() {
        let json = serde_json::to_string(&Connector::Environment).unwrap();
        assert_eq!(json, r#"{"kind":"environment"}"#);
        let parsed: Connector =
            serde_json::from_str(r#"{"kind":"keypair_file","path":"/tmp/id.json"}"#).unwrap();
        assert_eq!(parsed, Connector::KeypairFile(PathBuf::from("/tmp/id.json")));
    }
}
