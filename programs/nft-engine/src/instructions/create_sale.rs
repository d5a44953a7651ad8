use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, Token, TokenAccount, Transfer},
};
use crate::state::{
    Engine, FeeShare, NftType, PaymentType, Sale, AUCTION_SEED, ENGINE_SEED, SALE_SEED,
};
use crate::events::NftTokenSaleCreated;
use crate::error::EngineError;
use crate::utils::{
    assert_funded_recipients, assert_nft_mint, assert_not_listed, assert_registered_collection,
};

/// Native listings pass their fee share wallets as remaining accounts, in
/// fee table order.
#[derive(Accounts)]
pub struct CreateSale<'info> {
    #[account(
        init,
        payer = seller,
        space = Sale::LEN,
        seeds = [SALE_SEED, mint.key().as_ref()],
        bump
    )]
    pub sale: Box<Account<'info, Sale>>,

    /// Auction slot for the same mint, must be unused.
    /// CHECK: Only its data length is inspected
    #[account(
        seeds = [AUCTION_SEED, mint.key().as_ref()],
        bump
    )]
    pub auction: UncheckedAccount<'info>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine.bump
    )]
    pub engine: Box<Account<'info, Engine>>,

    #[account(mut)]
    pub seller: Signer<'info>,

    #[account(
        mut,
        constraint = seller_token_account.owner == seller.key() @ EngineError::NotTokenOwner,
        constraint = seller_token_account.mint == mint.key() @ EngineError::TokenAccountMismatch,
        constraint = seller_token_account.amount == 1 @ EngineError::NotTokenOwner
    )]
    pub seller_token_account: Box<Account<'info, TokenAccount>>,

    /// Sale-owned ATA that holds the NFT while listed. Anyone can create it
    /// ahead of the seller, so an existing one is reused.
    #[account(
        init_if_needed,
        payer = seller,
        associated_token::mint = mint,
        associated_token::authority = sale
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    pub mint: Box<Account<'info, Mint>>,

    /// CHECK: Validated against the registered collection
    pub metadata: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

pub fn handler(
    ctx: Context<CreateSale>,
    nft_type: NftType,
    pay_type: PaymentType,
    price: u64,
    fee_recipients: Vec<Pubkey>,
    fee_percentages: Vec<u16>,
) -> Result<()> {
    require!(price > 0, EngineError::InvalidPrice);
    assert_not_listed(&ctx.accounts.auction)?;
    assert_nft_mint(&ctx.accounts.mint)?;

    let mint = ctx.accounts.mint.key();
    let collection = ctx.accounts.engine.collection_for(nft_type)?;
    let payment_mint = ctx.accounts.engine.payment_mint_for(pay_type)?;
    assert_registered_collection(&ctx.accounts.metadata, &mint, &collection)?;
    let fee_shares = FeeShare::table(fee_recipients, fee_percentages)?;
    assert_funded_recipients(pay_type, &fee_shares, ctx.remaining_accounts, &Rent::get()?)?;

    // Escrow the NFT
    let cpi_accounts = Transfer {
        from: ctx.accounts.seller_token_account.to_account_info(),
        to: ctx.accounts.nft_vault.to_account_info(),
        authority: ctx.accounts.seller.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::transfer(cpi_ctx, 1)?;

    let clock = Clock::get()?;
    let seller = ctx.accounts.seller.key();
    let sale = &mut ctx.accounts.sale;
    sale.seller = seller;
    sale.mint = mint;
    sale.collection = collection;
    sale.nft_type = nft_type;
    sale.pay_type = pay_type;
    sale.payment_mint = payment_mint;
    sale.price = price;
    sale.fee_shares = fee_shares;
    sale.created_at = clock.unix_timestamp;
    sale.bump = ctx.bumps.sale;

    emit!(NftTokenSaleCreated {
        collection,
        mint,
        seller,
        pay_type,
        price,
    });

    msg!(
        "Sale created: mint={}, type={:?}, pay={:?}, price={}",
        mint,
        nft_type,
        pay_type,
        price
    );
    Ok(())
}
