//! Instruction builders for the `nft_engine` program.
//!
//! Everything here is pure: accounts are derived from the arguments, nothing
//! touches the network.

use anchor_client::solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use anchor_lang::{system_program, InstructionData, ToAccountMetas};
use anchor_spl::{
    associated_token::{self, spl_associated_token_account},
    token::{self, spl_token},
};
use nft_engine::state::{NftType, PaymentType};

use crate::{
    error::ClientResult,
    pda::{
        find_auction_address, find_engine_address, find_metadata_address, find_sale_address,
        token_account,
    },
};

/// Fixed price listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleArgs {
    pub nft_type: NftType,
    pub pay_type: PaymentType,
    pub price: u64,
    pub fee_recipients: Vec<Pubkey>,
    pub fee_percentages: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionArgs {
    pub nft_type: NftType,
    pub pay_type: PaymentType,
    pub min_price: u64,
    pub buy_now_price: u64,
    /// Seconds; zero selects the default period.
    pub bid_period: i64,
    pub fee_recipients: Vec<Pubkey>,
    pub fee_percentages: Vec<u16>,
}

/// Where the proceeds of a purchase go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRoute {
    pub pay_type: PaymentType,
    /// Registered SPL mint, default key for lamports and fiat.
    pub payment_mint: Pubkey,
    pub treasury: Pubkey,
    pub seller: Pubkey,
    pub fee_recipients: Vec<Pubkey>,
}

impl PaymentRoute {
    /// Token account receiving funds for `wallet`, when paying in SPL tokens.
    pub fn token_account(&self, wallet: &Pubkey) -> Option<Pubkey> {
        self.pay_type
            .is_token()
            .then(|| token_account(wallet, &self.payment_mint))
    }

    /// Fee share destinations in table order, passed as remaining accounts.
    pub fn fee_accounts(&self) -> Vec<AccountMeta> {
        self.fee_recipients
            .iter()
            .map(|wallet| {
                let destination = self.token_account(wallet).unwrap_or(*wallet);
                AccountMeta::new(destination, false)
            })
            .collect()
    }

    /// Wallets whose token accounts must exist before funds arrive.
    pub fn receivers(&self) -> Vec<Pubkey> {
        let mut wallets = vec![self.treasury, self.seller];
        wallets.extend(self.fee_recipients.iter().copied());
        wallets
    }
}

/// Native listings show their fee share wallets at creation, so the engine
/// can check they are funded.
fn fee_wallets(pay_type: PaymentType, recipients: &[Pubkey]) -> Vec<AccountMeta> {
    if pay_type != PaymentType::Native {
        return vec![];
    }
    recipients
        .iter()
        .map(|wallet| AccountMeta::new_readonly(*wallet, false))
        .collect()
}

pub fn set_compute_unit_limit(units: u32) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_limit(units)
}

/// Creates `owner`'s token account of `mint` unless it already exists.
pub fn create_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        &token::ID,
    )
}

/// Delegates the seller's NFT to the auction PDA so the first bid can escrow it.
pub fn approve_auction(
    program_id: &Pubkey,
    seller: &Pubkey,
    mint: &Pubkey,
) -> ClientResult<Instruction> {
    let (auction, _) = find_auction_address(program_id, mint);
    Ok(spl_token::instruction::approve(
        &token::ID,
        &token_account(seller, mint),
        &auction,
        seller,
        &[],
        1,
    )?)
}

pub fn initialize_engine(
    program_id: &Pubkey,
    authority: &Pubkey,
    treasury: Pubkey,
    backend: Pubkey,
    fee_bps: u16,
) -> Instruction {
    let accounts = nft_engine::accounts::InitializeEngine {
        engine: find_engine_address(program_id).0,
        authority: *authority,
        system_program: system_program::ID,
    }
    .to_account_metas(None);

    let data = nft_engine::instruction::InitializeEngine {
        treasury,
        backend,
        fee_bps,
    }
    .data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn update_engine(
    program_id: &Pubkey,
    authority: &Pubkey,
    treasury: Pubkey,
    backend: Pubkey,
    fee_bps: u16,
) -> Instruction {
    let accounts = nft_engine::accounts::UpdateEngine {
        engine: find_engine_address(program_id).0,
        authority: *authority,
    }
    .to_account_metas(None);

    let data = nft_engine::instruction::UpdateEngine {
        treasury,
        backend,
        fee_bps,
    }
    .data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn set_nft_contract(
    program_id: &Pubkey,
    authority: &Pubkey,
    nft_type: NftType,
    collection: Pubkey,
) -> Instruction {
    let accounts = nft_engine::accounts::SetNftContract {
        engine: find_engine_address(program_id).0,
        authority: *authority,
    }
    .to_account_metas(None);

    let data = nft_engine::instruction::SetNftContract {
        nft_type,
        collection,
    }
    .data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn set_payment_contract(
    program_id: &Pubkey,
    authority: &Pubkey,
    pay_type: PaymentType,
    payment_mint: Pubkey,
) -> Instruction {
    let accounts = nft_engine::accounts::SetPaymentContract {
        engine: find_engine_address(program_id).0,
        authority: *authority,
        payment_mint,
    }
    .to_account_metas(None);

    let data = nft_engine::instruction::SetPaymentContract { pay_type }.data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn create_sale(program_id: &Pubkey, seller: &Pubkey, mint: &Pubkey, args: SaleArgs) -> Instruction {
    let (sale, _) = find_sale_address(program_id, mint);
    let mut accounts = nft_engine::accounts::CreateSale {
        sale,
        auction: find_auction_address(program_id, mint).0,
        engine: find_engine_address(program_id).0,
        seller: *seller,
        seller_token_account: token_account(seller, mint),
        nft_vault: token_account(&sale, mint),
        mint: *mint,
        metadata: find_metadata_address(mint),
        system_program: system_program::ID,
        token_program: token::ID,
        associated_token_program: associated_token::ID,
    }
    .to_account_metas(None);
    accounts.extend(fee_wallets(args.pay_type, &args.fee_recipients));

    let data = nft_engine::instruction::CreateSale {
        nft_type: args.nft_type,
        pay_type: args.pay_type,
        price: args.price,
        fee_recipients: args.fee_recipients,
        fee_percentages: args.fee_percentages,
    }
    .data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn withdraw_sale(program_id: &Pubkey, seller: &Pubkey, mint: &Pubkey) -> Instruction {
    let (sale, _) = find_sale_address(program_id, mint);
    let accounts = nft_engine::accounts::WithdrawSale {
        sale,
        nft_vault: token_account(&sale, mint),
        seller: *seller,
        seller_token_account: token_account(seller, mint),
        token_program: token::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts,
        data: nft_engine::instruction::WithdrawSale {}.data(),
    }
}

/// `buyer` signs; for fiat sales it is the backend and `recipient` the
/// purchaser receiving the NFT.
pub fn buy_nft(
    program_id: &Pubkey,
    buyer: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    route: &PaymentRoute,
) -> Instruction {
    let (sale, _) = find_sale_address(program_id, mint);
    let mut accounts = nft_engine::accounts::BuyNft {
        sale,
        engine: find_engine_address(program_id).0,
        nft_vault: token_account(&sale, mint),
        buyer: *buyer,
        buyer_nft_account: token_account(recipient, mint),
        seller: route.seller,
        treasury: route.treasury,
        buyer_payment_account: route.token_account(buyer),
        seller_payment_account: route.token_account(&route.seller),
        treasury_payment_account: route.token_account(&route.treasury),
        system_program: system_program::ID,
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(route.fee_accounts());

    Instruction {
        program_id: *program_id,
        accounts,
        data: nft_engine::instruction::BuyNft {}.data(),
    }
}

pub fn create_auction(
    program_id: &Pubkey,
    seller: &Pubkey,
    mint: &Pubkey,
    args: AuctionArgs,
) -> Instruction {
    let (auction, _) = find_auction_address(program_id, mint);
    let mut accounts = nft_engine::accounts::CreateAuction {
        auction,
        sale: find_sale_address(program_id, mint).0,
        engine: find_engine_address(program_id).0,
        seller: *seller,
        seller_token_account: token_account(seller, mint),
        nft_vault: token_account(&auction, mint),
        mint: *mint,
        metadata: find_metadata_address(mint),
        system_program: system_program::ID,
        token_program: token::ID,
        associated_token_program: associated_token::ID,
    }
    .to_account_metas(None);
    accounts.extend(fee_wallets(args.pay_type, &args.fee_recipients));

    let data = nft_engine::instruction::CreateAuction {
        nft_type: args.nft_type,
        pay_type: args.pay_type,
        min_price: args.min_price,
        buy_now_price: args.buy_now_price,
        bid_period: args.bid_period,
        fee_recipients: args.fee_recipients,
        fee_percentages: args.fee_percentages,
    }
    .data();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// `previous_bidder` is the current highest bidder, refunded by this bid.
/// Once the NFT is `escrowed` the seller's token account is left out.
pub fn make_bid(
    program_id: &Pubkey,
    bidder: &Pubkey,
    mint: &Pubkey,
    route: &PaymentRoute,
    previous_bidder: Option<Pubkey>,
    escrowed: bool,
    amount: u64,
) -> Instruction {
    let (auction, _) = find_auction_address(program_id, mint);
    let mut accounts = nft_engine::accounts::MakeBid {
        auction,
        engine: find_engine_address(program_id).0,
        bidder: *bidder,
        seller_token_account: (!escrowed).then(|| token_account(&route.seller, mint)),
        nft_vault: token_account(&auction, mint),
        bidder_nft_account: Some(token_account(bidder, mint)),
        bidder_payment_account: route.token_account(bidder),
        bid_escrow: route.token_account(&auction),
        previous_bidder,
        previous_bidder_payment_account: previous_bidder
            .and_then(|previous| route.token_account(&previous)),
        seller: route.seller,
        seller_payment_account: route.token_account(&route.seller),
        treasury: route.treasury,
        treasury_payment_account: route.token_account(&route.treasury),
        system_program: system_program::ID,
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(route.fee_accounts());

    Instruction {
        program_id: *program_id,
        accounts,
        data: nft_engine::instruction::MakeBid { amount }.data(),
    }
}

pub fn withdraw_bid(
    program_id: &Pubkey,
    bidder: &Pubkey,
    mint: &Pubkey,
    route: &PaymentRoute,
) -> Instruction {
    let (auction, _) = find_auction_address(program_id, mint);
    let accounts = nft_engine::accounts::WithdrawBid {
        auction,
        bidder: *bidder,
        bid_escrow: route.token_account(&auction),
        bidder_payment_account: route.token_account(bidder),
        token_program: token::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts,
        data: nft_engine::instruction::WithdrawBid {}.data(),
    }
}

fn settle_accounts(
    program_id: &Pubkey,
    caller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &PaymentRoute,
) -> Vec<AccountMeta> {
    let (auction, _) = find_auction_address(program_id, mint);
    let mut accounts = nft_engine::accounts::SettleAuction {
        auction,
        engine: find_engine_address(program_id).0,
        caller: *caller,
        nft_vault: token_account(&auction, mint),
        winner_nft_account: token_account(winner, mint),
        bid_escrow: route.token_account(&auction),
        seller: route.seller,
        seller_payment_account: route.token_account(&route.seller),
        treasury: route.treasury,
        treasury_payment_account: route.token_account(&route.treasury),
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(route.fee_accounts());
    accounts
}

pub fn settle_auction(
    program_id: &Pubkey,
    caller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &PaymentRoute,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: settle_accounts(program_id, caller, mint, winner, route),
        data: nft_engine::instruction::SettleAuction {}.data(),
    }
}

pub fn take_highest_bid(
    program_id: &Pubkey,
    seller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &PaymentRoute,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: settle_accounts(program_id, seller, mint, winner, route),
        data: nft_engine::instruction::TakeHighestBid {}.data(),
    }
}

pub fn withdraw_auction(program_id: &Pubkey, seller: &Pubkey, mint: &Pubkey) -> Instruction {
    let (auction, _) = find_auction_address(program_id, mint);
    let accounts = nft_engine::accounts::WithdrawAuction {
        auction,
        nft_vault: token_account(&auction, mint),
        seller: *seller,
        seller_token_account: token_account(seller, mint),
        token_program: token::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts,
        data: nft_engine::instruction::WithdrawAuction {}.data(),
    }
}
