use anchor_lang::prelude::*;
use crate::events::NftAuctionHighestBidTaken;
use crate::instructions::settle_auction::SettleAuction;

/// Seller accepts the current highest bid without waiting for the end.
pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, SettleAuction<'info>>) -> Result<()> {
    ctx.accounts
        .auction
        .check_take_highest_bid(&ctx.accounts.caller.key())?;

    let (winner, amount) = ctx.accounts.complete(ctx.remaining_accounts)?;

    let auction = &ctx.accounts.auction;
    emit!(NftAuctionHighestBidTaken {
        collection: auction.collection,
        mint: auction.mint,
        seller: auction.seller,
        winner,
        amount,
    });

    msg!("Highest bid taken: mint={}, winner={}, amount={}", auction.mint, winner, amount);
    Ok(())
}
