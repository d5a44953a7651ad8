use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};
use solana_program::program_option::COption;
use crate::state::{
    resolve_bid_period, validate_auction_prices, Auction, Engine, FeeShare, NftType,
    PaymentType, AUCTION_SEED, ENGINE_SEED, SALE_SEED,
};
use crate::events::NftAuctionCreated;
use crate::error::EngineError;
use crate::utils::{
    assert_funded_recipients, assert_nft_mint, assert_not_listed, assert_registered_collection,
};

/// The NFT stays with the seller, delegated to the auction PDA, until the
/// first bid arrives. Native auctions pass their fee share wallets as
/// remaining accounts, in fee table order.
#[derive(Accounts)]
pub struct CreateAuction<'info> {
    #[account(
        init,
        payer = seller,
        space = Auction::LEN,
        seeds = [AUCTION_SEED, mint.key().as_ref()],
        bump
    )]
    pub auction: Box<Account<'info, Auction>>,

    /// Sale slot for the same mint, must be unused.
    /// CHECK: Only its data length is inspected
    #[account(
        seeds = [SALE_SEED, mint.key().as_ref()],
        bump
    )]
    pub sale: UncheckedAccount<'info>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine.bump
    )]
    pub engine: Box<Account<'info, Engine>>,

    #[account(mut)]
    pub seller: Signer<'info>,

    #[account(
        constraint = seller_token_account.owner == seller.key() @ EngineError::NotTokenOwner,
        constraint = seller_token_account.mint == mint.key() @ EngineError::TokenAccountMismatch,
        constraint = seller_token_account.amount == 1 @ EngineError::NotTokenOwner
    )]
    pub seller_token_account: Box<Account<'info, TokenAccount>>,

    /// Auction-owned ATA the NFT moves into on the first bid. Reused when
    /// someone created it beforehand.
    #[account(
        init_if_needed,
        payer = seller,
        associated_token::mint = mint,
        associated_token::authority = auction
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    pub mint: Box<Account<'info, Mint>>,

    /// CHECK: Validated against the registered collection
    pub metadata: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

#[allow(clippy::too_many_arguments)]
pub fn handler(
    ctx: Context<CreateAuction>,
    nft_type: NftType,
    pay_type: PaymentType,
    min_price: u64,
    buy_now_price: u64,
    bid_period: i64,
    fee_recipients: Vec<Pubkey>,
    fee_percentages: Vec<u16>,
) -> Result<()> {
    require!(pay_type != PaymentType::Fiat, EngineError::InvalidPaymentType);
    validate_auction_prices(min_price, buy_now_price)?;
    let bid_period = resolve_bid_period(bid_period)?;
    assert_not_listed(&ctx.accounts.sale)?;
    assert_nft_mint(&ctx.accounts.mint)?;

    let auction_key = ctx.accounts.auction.key();
    let token_account = &ctx.accounts.seller_token_account;
    require!(
        token_account.delegate == COption::Some(auction_key) && token_account.delegated_amount >= 1,
        EngineError::NotApprovedToken
    );

    let mint = ctx.accounts.mint.key();
    let collection = ctx.accounts.engine.collection_for(nft_type)?;
    let payment_mint = ctx.accounts.engine.payment_mint_for(pay_type)?;
    assert_registered_collection(&ctx.accounts.metadata, &mint, &collection)?;
    let fee_shares = FeeShare::table(fee_recipients, fee_percentages)?;
    assert_funded_recipients(pay_type, &fee_shares, ctx.remaining_accounts, &Rent::get()?)?;

    let now = Clock::get()?.unix_timestamp;
    let end_ts = now
        .checked_add(bid_period)
        .ok_or(EngineError::ArithmeticOverflow)?;

    let seller = ctx.accounts.seller.key();
    let auction = &mut ctx.accounts.auction;
    auction.seller = seller;
    auction.mint = mint;
    auction.collection = collection;
    auction.nft_type = nft_type;
    auction.pay_type = pay_type;
    auction.payment_mint = payment_mint;
    auction.min_price = min_price;
    auction.buy_now_price = buy_now_price;
    auction.start_ts = now;
    auction.end_ts = end_ts;
    auction.highest_bid = 0;
    auction.highest_bidder = Pubkey::default();
    auction.escrowed = false;
    auction.fee_shares = fee_shares;
    auction.bump = ctx.bumps.auction;

    emit!(NftAuctionCreated {
        collection,
        mint,
        seller,
        pay_type,
        min_price,
        buy_now_price,
        end_ts,
    });

    msg!(
        "Auction created: mint={}, min={}, buy_now={}, ends={}",
        mint,
        min_price,
        buy_now_price,
        end_ts
    );
    Ok(())
}
