use anchor_lang::prelude::*;

pub mod error;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;
use state::{NftType, PaymentType};

declare_id!("HJN6vpZjBiQM5P4X2UnCrABL54siBeiVLkP5fHbApoNb");

#[program]
pub mod nft_engine {
    use super::*;

    /// Create the engine registry with its treasury, backend and fee
    pub fn initialize_engine(
        ctx: Context<InitializeEngine>,
        treasury: Pubkey,
        backend: Pubkey,
        fee_bps: u16,
    ) -> Result<()> {
        initialize_engine::handler(ctx, treasury, backend, fee_bps)
    }

    pub fn update_engine(
        ctx: Context<UpdateEngine>,
        treasury: Pubkey,
        backend: Pubkey,
        fee_bps: u16,
    ) -> Result<()> {
        update_engine::handler(ctx, treasury, backend, fee_bps)
    }

    /// Register the verified collection accepted for `nft_type`
    pub fn set_nft_contract(
        ctx: Context<SetNftContract>,
        nft_type: NftType,
        collection: Pubkey,
    ) -> Result<()> {
        set_nft_contract::handler(ctx, nft_type, collection)
    }

    /// Register the SPL mint that settles `pay_type`
    pub fn set_payment_contract(
        ctx: Context<SetPaymentContract>,
        pay_type: PaymentType,
    ) -> Result<()> {
        set_payment_contract::handler(ctx, pay_type)
    }

    /// List an NFT at a fixed price (NFT moves into the sale vault)
    pub fn create_sale(
        ctx: Context<CreateSale>,
        nft_type: NftType,
        pay_type: PaymentType,
        price: u64,
        fee_recipients: Vec<Pubkey>,
        fee_percentages: Vec<u16>,
    ) -> Result<()> {
        create_sale::handler(ctx, nft_type, pay_type, price, fee_recipients, fee_percentages)
    }

    pub fn withdraw_sale(ctx: Context<WithdrawSale>) -> Result<()> {
        withdraw_sale::handler(ctx)
    }

    /// Buy a listed NFT; fiat sales are completed by the backend
    pub fn buy_nft<'info>(ctx: Context<'_, '_, '_, 'info, BuyNft<'info>>) -> Result<()> {
        buy_nft::handler(ctx)
    }

    /// Start an auction over a delegated NFT
    #[allow(clippy::too_many_arguments)]
    pub fn create_auction(
        ctx: Context<CreateAuction>,
        nft_type: NftType,
        pay_type: PaymentType,
        min_price: u64,
        buy_now_price: u64,
        bid_period: i64,
        fee_recipients: Vec<Pubkey>,
        fee_percentages: Vec<u16>,
    ) -> Result<()> {
        create_auction::handler(
            ctx,
            nft_type,
            pay_type,
            min_price,
            buy_now_price,
            bid_period,
            fee_recipients,
            fee_percentages,
        )
    }

    /// Bid on an auction; a bid at the buy now price completes it
    pub fn make_bid<'info>(
        ctx: Context<'_, '_, '_, 'info, MakeBid<'info>>,
        amount: u64,
    ) -> Result<()> {
        make_bid::handler(ctx, amount)
    }

    pub fn withdraw_bid(ctx: Context<WithdrawBid>) -> Result<()> {
        withdraw_bid::handler(ctx)
    }

    /// Pay out the highest bid once the auction ended (seller may settle early)
    pub fn settle_auction<'info>(
        ctx: Context<'_, '_, '_, 'info, SettleAuction<'info>>,
    ) -> Result<()> {
        settle_auction::handler(ctx)
    }

    pub fn take_highest_bid<'info>(
        ctx: Context<'_, '_, '_, 'info, SettleAuction<'info>>,
    ) -> Result<()> {
        take_highest_bid::handler(ctx)
    }

    /// Cancel an auction that has no bid and return the NFT
    pub fn withdraw_auction(ctx: Context<WithdrawAuction>) -> Result<()> {
        withdraw_auction::handler(ctx)
    }
}
