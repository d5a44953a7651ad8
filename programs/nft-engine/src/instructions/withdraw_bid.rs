use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{Auction, AUCTION_SEED};
use crate::events::NftAuctionBidWithdrawn;
use crate::utils::{assert_payee, optional_info, payment_destination, Funding};

/// Highest bidder pulls an unsettled bid back once the grace period after
/// the auction end has passed. The NFT stays in escrow for the seller.
#[derive(Accounts)]
pub struct WithdrawBid<'info> {
    #[account(
        mut,
        seeds = [AUCTION_SEED, auction.mint.as_ref()],
        bump = auction.bump
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(mut)]
    pub bidder: Signer<'info>,

    #[account(mut)]
    pub bid_escrow: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub bidder_payment_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawBid>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let bidder = ctx.accounts.bidder.key();
    let auction = &ctx.accounts.auction;
    auction.check_withdraw_bid(&bidder, now)?;

    let amount = auction.highest_bid;
    let bump = [auction.bump];
    let seeds: &[&[u8]] = &[AUCTION_SEED, auction.mint.as_ref(), &bump];
    let signer = &[seeds];

    let auction_info = auction.to_account_info();
    let token_program = ctx.accounts.token_program.to_account_info();
    let bid_escrow = optional_info(&ctx.accounts.bid_escrow);

    let refund_to = payment_destination(
        auction.pay_type,
        &ctx.accounts.bidder,
        optional_info(&ctx.accounts.bidder_payment_account),
    )?;
    assert_payee(&refund_to, &bidder, &auction.payment_mint)?;

    let escrow = Funding::from_auction(
        auction.pay_type,
        &auction.payment_mint,
        &auction_info,
        bid_escrow.as_ref(),
        &token_program,
        signer,
    )?;
    escrow.pay(&refund_to, amount)?;

    let collection = auction.collection;
    let mint = auction.mint;

    let auction = &mut ctx.accounts.auction;
    auction.highest_bid = 0;
    auction.highest_bidder = Pubkey::default();

    emit!(NftAuctionBidWithdrawn {
        collection,
        mint,
        bidder,
        amount,
    });

    msg!("Bid withdrawn: mint={}, bidder={}, amount={}", mint, bidder, amount);
    Ok(())
}
