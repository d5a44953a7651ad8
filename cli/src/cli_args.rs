//! Command line structure.

use std::{path::PathBuf, str::FromStr};

use anchor_client::solana_sdk::pubkey::Pubkey;
use clap::{Parser, Subcommand};
use nft_engine::state::{NftType, PaymentType};
use nft_engine_cli::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "nft-engine")]
#[command(about = "Fixed price sales and auctions on the NFT Engine program")]
#[command(version)]
pub struct CliArgs {
    /// Path to the client config file.
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH), value_name = "FILE")]
    pub config: String,

    /// RPC endpoint or cluster name, overrides config and environment.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Program id, overrides config.
    #[arg(long, value_name = "PUBKEY")]
    pub program_id: Option<String>,

    /// Log filter (trace, debug, info, warn, error).
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect a wallet and remember it for later runs.
    Connect {
        /// Keypair file; reads NFT_ENGINE_KEYPAIR when omitted.
        #[arg(short, long, value_name = "FILE")]
        keypair: Option<PathBuf>,
    },
    /// Forget the connected wallet.
    Disconnect,
    /// Show the wallet session.
    Status,

    /// Show engine configuration and registry.
    Engine,
    InitEngine {
        #[arg(long, value_name = "PUBKEY")]
        treasury: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        backend: Pubkey,
        #[arg(long, value_name = "BPS")]
        fee_bps: u16,
    },
    UpdateEngine {
        #[arg(long, value_name = "PUBKEY")]
        treasury: Pubkey,
        #[arg(long, value_name = "PUBKEY")]
        backend: Pubkey,
        #[arg(long, value_name = "BPS")]
        fee_bps: u16,
    },
    /// Register the collection traded as NFT_TYPE.
    SetNftContract {
        #[arg(value_parser = parse_nft_type)]
        nft_type: NftType,
        collection: Pubkey,
    },
    /// Register the SPL mint settling PAY_TYPE (usdc, pbrt).
    SetPaymentContract {
        #[arg(value_parser = parse_pay_type)]
        pay_type: PaymentType,
        mint: Pubkey,
    },

    /// List sales of a collection, ordered by mint.
    Sales {
        #[arg(value_parser = parse_nft_type)]
        nft_type: NftType,
        #[arg(long)]
        begin: Option<usize>,
        #[arg(long)]
        size: Option<usize>,
    },
    Sale {
        mint: Pubkey,
    },
    /// List auctions of a collection, ordered by mint.
    Auctions {
        #[arg(value_parser = parse_nft_type)]
        nft_type: NftType,
        #[arg(long)]
        begin: Option<usize>,
        #[arg(long)]
        size: Option<usize>,
    },
    Auction {
        mint: Pubkey,
    },

    CreateSale {
        mint: Pubkey,
        #[arg(long, value_parser = parse_nft_type)]
        nft_type: NftType,
        #[arg(long, value_parser = parse_pay_type)]
        pay_type: PaymentType,
        /// Price in base units (lamports or token base units).
        #[arg(long)]
        price: u64,
        /// Fee share as RECIPIENT:BPS, repeatable.
        #[arg(long = "fee", value_parser = parse_fee)]
        fees: Vec<(Pubkey, u16)>,
    },
    WithdrawSale {
        mint: Pubkey,
    },
    Buy {
        mint: Pubkey,
        /// Fiat purchases: wallet receiving the NFT (backend only).
        #[arg(long, value_name = "PUBKEY")]
        recipient: Option<Pubkey>,
    },

    CreateAuction {
        mint: Pubkey,
        #[arg(long, value_parser = parse_nft_type)]
        nft_type: NftType,
        #[arg(long, value_parser = parse_pay_type)]
        pay_type: PaymentType,
        #[arg(long)]
        min_price: u64,
        #[arg(long)]
        buy_now_price: u64,
        /// Seconds; 0 uses the default period.
        #[arg(long, default_value_t = 0)]
        bid_period: i64,
        #[arg(long = "fee", value_parser = parse_fee)]
        fees: Vec<(Pubkey, u16)>,
    },
    Bid {
        mint: Pubkey,
        amount: u64,
    },
    WithdrawBid {
        mint: Pubkey,
    },
    Settle {
        mint: Pubkey,
    },
    TakeHighestBid {
        mint: Pubkey,
    },
    WithdrawAuction {
        mint: Pubkey,
    },
}

pub fn parse_nft_type(s: &str) -> Result<NftType, String> {
    match s.to_ascii_lowercase().as_str() {
        "membership" => Ok(NftType::Membership),
        "peas" => Ok(NftType::Peas),
        "pnft" => Ok(NftType::Pnft),
        "custom" => Ok(NftType::Custom),
        other => Err(format!("unknown nft type `{}`", other)),
    }
}

pub fn parse_pay_type(s: &str) -> Result<PaymentType, String> {
    match s.to_ascii_lowercase().as_str() {
        "native" | "sol" => Ok(PaymentType::Native),
        "usdc" => Ok(PaymentType::Usdc),
        "pbrt" => Ok(PaymentType::Pbrt),
        "fiat" => Ok(PaymentType::Fiat),
        other => Err(format!("unknown payment type `{}`", other)),
    }
}

pub fn parse_fee(s: &str) -> Result<(Pubkey, u16), String> {
    let (recipient, bps) = s
        .split_once(':')
        .ok_or_else(|| format!("expected RECIPIENT:BPS, got `{}`", s))?;
    let recipient = Pubkey::from_str(recipient).map_err(|e| e.to_string())?;
    let bps = bps.parse::<u16>().map_err(|e| e.to_string())?;
    Ok((recipient, bps))
}
