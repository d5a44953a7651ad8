use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{Auction, Engine, AUCTION_SEED, ENGINE_SEED};
use crate::events::NftAuctionSettled;
use crate::error::EngineError;
use crate::utils::{
    close_vault_signed, distribute, optional_info, payment_destination, transfer_nft_signed,
    Funding, Payees,
};

/// Pays the highest bid out of escrow and hands the NFT to the winner.
/// Shared by `settle_auction` and `take_highest_bid`; fee share
/// destinations come as remaining accounts.
#[derive(Accounts)]
pub struct SettleAuction<'info> {
    #[account(
        mut,
        close = seller,
        seeds = [AUCTION_SEED, auction.mint.as_ref()],
        bump = auction.bump
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine.bump
    )]
    pub engine: Box<Account<'info, Engine>>,

    pub caller: Signer<'info>,

    #[account(
        mut,
        constraint = nft_vault.owner == auction.key() @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = winner_nft_account.owner == auction.highest_bidder @ EngineError::TokenAccountMismatch,
        constraint = winner_nft_account.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub winner_nft_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub bid_escrow: Option<Account<'info, TokenAccount>>,

    /// CHECK: Validated via auction.seller
    #[account(
        mut,
        constraint = seller.key() == auction.seller @ EngineError::PaymentAccountMismatch
    )]
    pub seller: UncheckedAccount<'info>,

    #[account(mut)]
    pub seller_payment_account: Option<Account<'info, TokenAccount>>,

    /// CHECK: Validated via engine.treasury
    #[account(
        mut,
        constraint = treasury.key() == engine.treasury @ EngineError::PaymentAccountMismatch
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub treasury_payment_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

impl<'info> SettleAuction<'info> {
    /// Returns the winner and the amount paid.
    pub fn complete(&self, fee_recipients: &[AccountInfo<'info>]) -> Result<(Pubkey, u64)> {
        let auction = &self.auction;
        let bump = [auction.bump];
        let seeds: &[&[u8]] = &[AUCTION_SEED, auction.mint.as_ref(), &bump];
        let signer = &[seeds];

        let auction_info = auction.to_account_info();
        let token_program = self.token_program.to_account_info();
        let bid_escrow = optional_info(&self.bid_escrow);

        let funding = Funding::from_auction(
            auction.pay_type,
            &auction.payment_mint,
            &auction_info,
            bid_escrow.as_ref(),
            &token_program,
            signer,
        )?;
        let treasury = payment_destination(
            auction.pay_type,
            &self.treasury,
            optional_info(&self.treasury_payment_account),
        )?;
        let seller = payment_destination(
            auction.pay_type,
            &self.seller,
            optional_info(&self.seller_payment_account),
        )?;
        let payees = Payees {
            treasury: (&treasury, self.engine.treasury),
            seller: (&seller, auction.seller),
            fee_recipients,
        };
        distribute(
            &funding,
            &payees,
            auction.highest_bid,
            self.engine.fee_bps,
            &auction.fee_shares,
            &auction.payment_mint,
        )?;

        let vault = self.nft_vault.to_account_info();
        let seller_info = self.seller.to_account_info();
        transfer_nft_signed(
            &token_program,
            &vault,
            &self.winner_nft_account.to_account_info(),
            &auction_info,
            signer,
        )?;
        close_vault_signed(&token_program, &vault, &seller_info, &auction_info, signer)?;

        Ok((auction.highest_bidder, auction.highest_bid))
    }
}

pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, SettleAuction<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    ctx.accounts
        .auction
        .check_settle(&ctx.accounts.caller.key(), now)?;

    let (winner, amount) = ctx.accounts.complete(ctx.remaining_accounts)?;

    let auction = &ctx.accounts.auction;
    emit!(NftAuctionSettled {
        collection: auction.collection,
        mint: auction.mint,
        seller: auction.seller,
        winner,
        amount,
    });

    msg!(
        "Auction settled: mint={}, winner={}, amount={}",
        auction.mint,
        winner,
        amount
    );
    Ok(())
}
