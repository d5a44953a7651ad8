use anchor_lang::prelude::*;
use anchor_spl::token::{self, Revoke, Token, TokenAccount};
use crate::state::{Auction, AUCTION_SEED};
use crate::events::NftAuctionWithdrawn;
use crate::error::EngineError;
use crate::utils::{close_vault_signed, transfer_nft_signed};

#[derive(Accounts)]
pub struct WithdrawAuction<'info> {
    #[account(
        mut,
        close = seller,
        seeds = [AUCTION_SEED, auction.mint.as_ref()],
        bump = auction.bump
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        mut,
        constraint = nft_vault.owner == auction.key() @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub seller: Signer<'info>,

    #[account(
        mut,
        constraint = seller_token_account.owner == seller.key() @ EngineError::NotTokenOwner,
        constraint = seller_token_account.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub seller_token_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawAuction>) -> Result<()> {
    let auction = &ctx.accounts.auction;
    auction.check_withdraw(&ctx.accounts.seller.key())?;

    let bump = [auction.bump];
    let seeds: &[&[u8]] = &[AUCTION_SEED, auction.mint.as_ref(), &bump];
    let signer = &[seeds];

    let token_program = ctx.accounts.token_program.to_account_info();
    let vault = ctx.accounts.nft_vault.to_account_info();
    let authority = auction.to_account_info();
    let seller_token_account = ctx.accounts.seller_token_account.to_account_info();
    let seller = ctx.accounts.seller.to_account_info();

    if auction.escrowed {
        transfer_nft_signed(&token_program, &vault, &seller_token_account, &authority, signer)?;
    }
    close_vault_signed(&token_program, &vault, &seller, &authority, signer)?;

    // Drop whatever delegation the seller granted the auction.
    let cpi_accounts = Revoke {
        source: seller_token_account,
        authority: seller,
    };
    token::revoke(CpiContext::new(token_program, cpi_accounts))?;

    emit!(NftAuctionWithdrawn {
        collection: auction.collection,
        mint: auction.mint,
        seller: auction.seller,
    });

    msg!("Auction withdrawn: mint={}, escrowed={}", auction.mint, auction.escrowed);
    Ok(())
}
