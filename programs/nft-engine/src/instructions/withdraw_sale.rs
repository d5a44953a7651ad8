use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{Sale, SALE_SEED};
use crate::events::NftTokenSaleWithdrawn;
use crate::error::EngineError;
use crate::utils::{close_vault_signed, transfer_nft_signed};

#[derive(Accounts)]
pub struct WithdrawSale<'info> {
    #[account(
        mut,
        close = seller,
        seeds = [SALE_SEED, sale.mint.as_ref()],
        bump = sale.bump,
        constraint = sale.seller == seller.key() @ EngineError::NotSaleSeller
    )]
    pub sale: Box<Account<'info, Sale>>,

    #[account(
        mut,
        constraint = nft_vault.owner == sale.key() @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.mint == sale.mint @ EngineError::TokenAccountMismatch
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub seller: Signer<'info>,

    #[account(
        mut,
        constraint = seller_token_account.owner == seller.key() @ EngineError::NotTokenOwner,
        constraint = seller_token_account.mint == sale.mint @ EngineError::TokenAccountMismatch
    )]
    pub seller_token_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawSale>) -> Result<()> {
    let sale = &ctx.accounts.sale;
    let seeds: &[&[u8]] = &[SALE_SEED, sale.mint.as_ref(), &[sale.bump]];
    let signer = &[seeds];

    let token_program = ctx.accounts.token_program.to_account_info();
    let vault = ctx.accounts.nft_vault.to_account_info();
    let authority = sale.to_account_info();

    transfer_nft_signed(
        &token_program,
        &vault,
        &ctx.accounts.seller_token_account.to_account_info(),
        &authority,
        signer,
    )?;
    close_vault_signed(
        &token_program,
        &vault,
        &ctx.accounts.seller.to_account_info(),
        &authority,
        signer,
    )?;

    emit!(NftTokenSaleWithdrawn {
        collection: sale.collection,
        mint: sale.mint,
        seller: sale.seller,
    });

    msg!("Sale withdrawn: mint={}", sale.mint);
    Ok(())
}
