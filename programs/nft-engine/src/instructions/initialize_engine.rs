use anchor_lang::prelude::*;
use crate::state::{Engine, ENGINE_SEED, MAX_ENGINE_FEE_BPS, NFT_TYPE_COUNT, PAYMENT_CONTRACT_COUNT};
use crate::error::EngineError;

#[derive(Accounts)]
pub struct InitializeEngine<'info> {
    #[account(
        init,
        payer = authority,
        space = Engine::LEN,
        seeds = [ENGINE_SEED],
        bump
    )]
    pub engine: Account<'info, Engine>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeEngine>,
    treasury: Pubkey,
    backend: Pubkey,
    fee_bps: u16,
) -> Result<()> {
    require!(fee_bps <= MAX_ENGINE_FEE_BPS, EngineError::InvalidEngineFee);

    let engine = &mut ctx.accounts.engine;
    engine.authority = ctx.accounts.authority.key();
    engine.treasury = treasury;
    engine.backend = backend;
    engine.fee_bps = fee_bps;
    engine.nft_collections = [Pubkey::default(); NFT_TYPE_COUNT];
    engine.payment_mints = [Pubkey::default(); PAYMENT_CONTRACT_COUNT];
    engine.bump = ctx.bumps.engine;

    msg!(
        "NFT engine initialized: authority={}, treasury={}, fee={}bps",
        engine.authority,
        treasury,
        fee_bps
    );
    Ok(())
}
