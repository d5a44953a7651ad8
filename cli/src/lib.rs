//! Client library for the NFT Engine program: read-only queries, signed
//! marketplace operations and wallet session handling.

pub mod client;
pub mod config;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod reader;
pub mod wallet;

pub use client::EngineClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use reader::{EngineReader, Listing, Page};
pub use wallet::{Connector, SessionState, WalletSession};
