mod cli_args;

use std::str::FromStr;

use anchor_client::solana_sdk::pubkey::Pubkey;
use anyhow::{anyhow, Result};
use clap::Parser;
use cli_args::{CliArgs, Commands};
use nft_engine::state::{Auction, Engine, NftType, Sale};
use nft_engine_cli::{
    instructions::{AuctionArgs, SaleArgs},
    wallet::KEYPAIR_ENV,
    ClientConfig, Connector, EngineClient, EngineReader, Listing, Page, WalletSession,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn setup_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::from_str(level)
            .map_err(|_| anyhow!("Invalid log level: {}", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to set up logging: {}", e))
}

fn page(begin: Option<usize>, size: Option<usize>) -> Option<Page> {
    match (begin, size) {
        (None, None) => None,
        (begin, size) => Some(Page {
            begin: begin.unwrap_or(0),
            size: size.unwrap_or(usize::MAX),
        }),
    }
}

fn split_fees(fees: Vec<(Pubkey, u16)>) -> (Vec<Pubkey>, Vec<u16>) {
    fees.into_iter().unzip()
}

fn print_engine(engine: &Engine) {
    println!("Engine::authority - {}", engine.authority);
    println!("Engine::treasury - {}", engine.treasury);
    println!("Engine::backend - {}", engine.backend);
    println!("Engine::fee_bps - {}", engine.fee_bps);
    for nft_type in NftType::ALL {
        println!(
            "Engine::nft_contract({:?}) - {}",
            nft_type,
            engine.nft_collections[nft_type.index()]
        );
    }
    println!("Engine::payment_contract(Usdc) - {}", engine.payment_mints[0]);
    println!("Engine::payment_contract(Pbrt) - {}", engine.payment_mints[1]);
}

fn print_sale(sale: &Sale) {
    println!("Sale::mint - {}", sale.mint);
    println!("Sale::seller - {}", sale.seller);
    println!("Sale::collection - {}", sale.collection);
    println!("Sale::pay_type - {:?}", sale.pay_type);
    println!("Sale::price - {}", sale.price);
    for share in &sale.fee_shares {
        println!("Sale::fee_share - {} {}bps", share.recipient, share.bps);
    }
}

fn print_auction(auction: &Auction) {
    println!("Auction::mint - {}", auction.mint);
    println!("Auction::seller - {}", auction.seller);
    println!("Auction::collection - {}", auction.collection);
    println!("Auction::pay_type - {:?}", auction.pay_type);
    println!("Auction::min_price - {}", auction.min_price);
    println!("Auction::buy_now_price - {}", auction.buy_now_price);
    println!("Auction::end_ts - {}", auction.end_ts);
    println!("Auction::highest_bid - {}", auction.highest_bid);
    println!("Auction::highest_bidder - {}", auction.highest_bidder);
    for share in &auction.fee_shares {
        println!("Auction::fee_share - {} {}bps", share.recipient, share.bps);
    }
}

fn print_listings<T>(listings: &[Listing<T>], print: fn(&T)) {
    if listings.is_empty() {
        println!("<none>");
    }
    for listing in listings {
        println!("-- {}", listing.address);
        print(&listing.account);
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.log_level.as_deref())?;

    let mut config = ClientConfig::load(&args.config)?
        .with_env()
        .with_rpc_override(args.url.clone());
    if let Some(program_id) = args.program_id.clone() {
        config.program_id = program_id;
    }

    let mut session = WalletSession::new(config.session_path());

    // Session commands do not need the cluster.
    match &args.command {
        Commands::Connect { keypair } => {
            let connector = match keypair {
                Some(path) => Connector::KeypairFile(path.clone()),
                None => Connector::Environment,
            };
            let pubkey = session.activate(connector)?;
            println!("Connected: {}", pubkey);
            return Ok(());
        }
        Commands::Disconnect => {
            session.deactivate()?;
            println!("Disconnected");
            return Ok(());
        }
        Commands::Status => {
            let restored = session.restore()?;
            match (restored, session.connector()) {
                (Some(pubkey), Some(Connector::KeypairFile(path))) => {
                    println!("Connected: {} ({})", pubkey, path.display())
                }
                (Some(pubkey), _) => println!("Connected: {} (${})", pubkey, KEYPAIR_ENV),
                (None, _) => println!("Disconnected"),
            }
            return Ok(());
        }
        _ => {}
    }

    let reader = EngineReader::from_config(&config)?;
    info!("Using {} with program {}", config.rpc_url()?, reader.program_id());

    match args.command {
        Commands::Engine => {
            print_engine(&reader.engine()?);
            return Ok(());
        }
        Commands::Sales { nft_type, begin, size } => {
            let sales = reader.get_token_infos_on_sale(nft_type, page(begin, size))?;
            print_listings(&sales, print_sale);
            return Ok(());
        }
        Commands::Auctions { nft_type, begin, size } => {
            let auctions = reader.get_token_infos_on_auction(nft_type, page(begin, size))?;
            print_listings(&auctions, print_auction);
            return Ok(());
        }
        Commands::Sale { mint } => {
            match reader.get_token_sale_info(&mint)? {
                Some(sale) => print_sale(&sale),
                None => println!("{} is not on sale", mint),
            }
            return Ok(());
        }
        Commands::Auction { mint } => {
            match reader.get_token_auction_info(&mint)? {
                Some(auction) => print_auction(&auction),
                None => println!("{} is not on auction", mint),
            }
            return Ok(());
        }
        command => {
            session.restore()?;
            let signer = session.keypair().ok();
            let client = EngineClient::new(reader, signer, config.compute_unit_limit);

            let signature = match command {
                Commands::InitEngine { treasury, backend, fee_bps } => {
                    client.initialize_engine(treasury, backend, fee_bps)?
                }
                Commands::UpdateEngine { treasury, backend, fee_bps } => {
                    client.update_engine(treasury, backend, fee_bps)?
                }
                Commands::SetNftContract { nft_type, collection } => {
                    client.set_nft_contract(nft_type, collection)?
                }
                Commands::SetPaymentContract { pay_type, mint } => {
                    client.set_payment_contract(pay_type, mint)?
                }
                Commands::CreateSale { mint, nft_type, pay_type, price, fees } => {
                    let (fee_recipients, fee_percentages) = split_fees(fees);
                    client.create_sale(
                        &mint,
                        SaleArgs {
                            nft_type,
                            pay_type,
                            price,
                            fee_recipients,
                            fee_percentages,
                        },
                    )?
                }
                Commands::WithdrawSale { mint } => client.withdraw_sale(&mint)?,
                Commands::Buy { mint, recipient } => match recipient {
                    Some(recipient) => client.buy_nft_for(&mint, &recipient)?,
                    None => client.buy_nft(&mint)?,
                },
                Commands::CreateAuction {
                    mint,
                    nft_type,
                    pay_type,
                    min_price,
                    buy_now_price,
                    bid_period,
                    fees,
                } => {
                    let (fee_recipients, fee_percentages) = split_fees(fees);
                    client.create_auction(
                        &mint,
                        AuctionArgs {
                            nft_type,
                            pay_type,
                            min_price,
                            buy_now_price,
                            bid_period,
                            fee_recipients,
                            fee_percentages,
                        },
                    )?
                }
                Commands::Bid { mint, amount } => client.make_bid(&mint, amount)?,
                Commands::WithdrawBid { mint } => client.withdraw_bid(&mint)?,
                Commands::Settle { mint } => client.settle_auction(&mint)?,
                Commands::TakeHighestBid { mint } => client.take_highest_bid(&mint)?,
                Commands::WithdrawAuction { mint } => client.withdraw_auction(&mint)?,
                other => return Err(anyhow!("Unhandled command {:?}", other)),
            };

            println!("Signature: {}", signature);
        }
    }

    Ok(())
}
