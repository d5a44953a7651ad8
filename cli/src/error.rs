use anchor_client::solana_client::client_error::ClientError as RpcError;
use anchor_client::solana_sdk::{
    program_error::ProgramError,
    pubkey::{ParsePubkeyError, Pubkey},
};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Account {0} could not be decoded: {1}")]
    InvalidAccount(Pubkey, String),

    #[error("Nft contract for {0} is not registered")]
    UnregisteredNftContract(String),

    #[error("Payment contract for {0} is not registered")]
    UnregisteredPaymentContract(String),

    #[error("{0} is not accepted here")]
    UnsupportedPaymentType(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Invalid cluster: {0}")]
    InvalidCluster(String),

    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),

    #[error(transparent)]
    InvalidPubkey(#[from] ParsePubkeyError),

    #[error("Failed to build instruction: {0}")]
    Instruction(#[from] ProgramError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
