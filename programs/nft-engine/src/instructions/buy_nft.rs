use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{Engine, PaymentType, Sale, ENGINE_SEED, SALE_SEED};
use crate::events::NftTokenSaleClosed;
use crate::error::EngineError;
use crate::utils::{
    close_vault_signed, distribute, optional_info, payment_destination, transfer_nft_signed,
    Funding, Payees,
};

/// Fee share destinations are passed as remaining accounts, in fee table
/// order.
#[derive(Accounts)]
pub struct BuyNft<'info> {
    #[account(
        mut,
        close = seller,
        seeds = [SALE_SEED, sale.mint.as_ref()],
        bump = sale.bump
    )]
    pub sale: Box<Account<'info, Sale>>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine.bump
    )]
    pub engine: Box<Account<'info, Engine>>,

    #[account(
        mut,
        constraint = nft_vault.owner == sale.key() @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.mint == sale.mint @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.amount == 1 @ EngineError::TokenAccountMismatch
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    /// Buyer, or the backend for fiat sales
    #[account(mut)]
    pub buyer: Signer<'info>,

    /// Receives the NFT
    #[account(
        mut,
        constraint = buyer_nft_account.mint == sale.mint @ EngineError::TokenAccountMismatch
    )]
    pub buyer_nft_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: Validated via sale.seller
    #[account(
        mut,
        constraint = seller.key() == sale.seller @ EngineError::PaymentAccountMismatch
    )]
    pub seller: UncheckedAccount<'info>,

    /// CHECK: Validated via engine.treasury
    #[account(
        mut,
        constraint = treasury.key() == engine.treasury @ EngineError::PaymentAccountMismatch
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub buyer_payment_account: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub seller_payment_account: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub treasury_payment_account: Option<Account<'info, TokenAccount>>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, BuyNft<'info>>) -> Result<()> {
    let sale = &ctx.accounts.sale;
    let engine = &ctx.accounts.engine;
    let buyer = ctx.accounts.buyer.key();
    let price = sale.price;

    require_keys_neq!(buyer, sale.seller, EngineError::SellerCannotBuy);

    let token_program = ctx.accounts.token_program.to_account_info();

    if sale.pay_type == PaymentType::Fiat {
        // Paid off-chain; the backend delivers to the purchaser's account.
        require_keys_eq!(buyer, engine.backend, EngineError::FiatBackendOnly);
    } else {
        require_keys_eq!(
            ctx.accounts.buyer_nft_account.owner,
            buyer,
            EngineError::TokenAccountMismatch
        );

        let buyer_info = ctx.accounts.buyer.to_account_info();
        let system_program = ctx.accounts.system_program.to_account_info();
        let buyer_payment = optional_info(&ctx.accounts.buyer_payment_account);
        let funding = Funding::from_signer(
            sale.pay_type,
            &sale.payment_mint,
            &buyer_info,
            buyer_payment.as_ref(),
            &system_program,
            &token_program,
        )?;

        let treasury = payment_destination(
            sale.pay_type,
            &ctx.accounts.treasury,
            optional_info(&ctx.accounts.treasury_payment_account),
        )?;
        let seller = payment_destination(
            sale.pay_type,
            &ctx.accounts.seller,
            optional_info(&ctx.accounts.seller_payment_account),
        )?;
        let payees = Payees {
            treasury: (&treasury, engine.treasury),
            seller: (&seller, sale.seller),
            fee_recipients: ctx.remaining_accounts,
        };

        distribute(
            &funding,
            &payees,
            price,
            engine.fee_bps,
            &sale.fee_shares,
            &sale.payment_mint,
        )?;
    }

    let seeds: &[&[u8]] = &[SALE_SEED, sale.mint.as_ref(), &[sale.bump]];
    let signer = &[seeds];
    let vault = ctx.accounts.nft_vault.to_account_info();
    let authority = sale.to_account_info();

    transfer_nft_signed(
        &token_program,
        &vault,
        &ctx.accounts.buyer_nft_account.to_account_info(),
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

    emit!(NftTokenSaleClosed {
        collection: sale.collection,
        mint: sale.mint,
        seller: sale.seller,
        buyer: ctx.accounts.buyer_nft_account.owner,
        pay_type: sale.pay_type,
        price,
    });

    msg!(
        "NFT sold: mint={}, buyer={}, price={}",
        sale.mint,
        ctx.accounts.buyer_nft_account.owner,
        price
    );
    Ok(())
}
