use anchor_lang::prelude::*;
use crate::state::{Engine, NftType, ENGINE_SEED};
use crate::error::EngineError;

/// Registers the collection mint traded under `nft_type`.
#[derive(Accounts)]
pub struct SetNftContract<'info> {
    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine.bump,
        has_one = authority @ EngineError::Unauthorized
    )]
    pub engine: Account<'info, Engine>,

    pub authority: Signer<'info>,
}

pub fn handler(ctx: Context<SetNftContract>, nft_type: NftType, collection: Pubkey) -> Result<()> {
    require_keys_neq!(
        collection,
        Pubkey::default(),
        EngineError::InvalidContractAddress
    );

    ctx.accounts.engine.nft_collections[nft_type.index()] = collection;

    msg!("NFT contract set: type={:?}, collection={}", nft_type, collection);
    Ok(())
}
