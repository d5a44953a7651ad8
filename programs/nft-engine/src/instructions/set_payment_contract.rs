use anchor_lang::prelude::*;
use anchor_spl::token::Mint;
use crate::state::{Engine, PaymentType, ENGINE_SEED};
use crate::error::EngineError;

/// Registers the SPL mint used to settle `pay_type`.
#[derive(Accounts)]
pub struct SetPaymentContract<'info> {
    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine.bump,
        has_one = authority @ EngineError::Unauthorized
    )]
    pub engine: Account<'info, Engine>,

    pub authority: Signer<'info>,

    pub payment_mint: Account<'info, Mint>,
}

pub fn handler(ctx: Context<SetPaymentContract>, pay_type: PaymentType) -> Result<()> {
    let slot = pay_type.slot().ok_or(EngineError::InvalidPaymentType)?;
    let mint = ctx.accounts.payment_mint.key();

    ctx.accounts.engine.payment_mints[slot] = mint;

    msg!("Payment contract set: type={:?}, mint={}", pay_type, mint);
    Ok(())
}
