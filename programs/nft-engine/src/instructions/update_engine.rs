use anchor_lang::prelude::*;
use crate::state::{Engine, ENGINE_SEED, MAX_ENGINE_FEE_BPS};
use crate::error::EngineError;

#[derive(Accounts)]
pub struct UpdateEngine<'info> {
    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine.bump,
        has_one = authority @ EngineError::Unauthorized
    )]
    pub engine: Account<'info, Engine>,

    pub authority: Signer<'info>,
}

pub fn handler(
    ctx: Context<UpdateEngine>,
    treasury: Pubkey,
    backend: Pubkey,
    fee_bps: u16,
) -> Result<()> {
    require!(fee_bps <= MAX_ENGINE_FEE_BPS, EngineError::InvalidEngineFee);

    let engine = &mut ctx.accounts.engine;
    engine.treasury = treasury;
    engine.backend = backend;
    engine.fee_bps = fee_bps;

    msg!(
        "NFT engine updated: treasury={}, backend={}, fee={}bps",
        treasury,
        backend,
        fee_bps
    );
    Ok(())
}
