use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{Auction, BidOutcome, Engine, AUCTION_SEED, ENGINE_SEED};
use crate::events::{NftAuctionBidMade, NftAuctionPaid};
use crate::error::EngineError;
use crate::utils::{
    assert_payee, close_vault_signed, distribute, optional_info, payment_destination,
    transfer_nft_signed, Funding, Payees,
};

/// Fee share destinations are passed as remaining accounts, in fee table
/// order. They are only read when the bid reaches the buy now price.
#[derive(Accounts)]
pub struct MakeBid<'info> {
    #[account(
        mut,
        seeds = [AUCTION_SEED, auction.mint.as_ref()],
        bump = auction.bump
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine.bump
    )]
    pub engine: Box<Account<'info, Engine>>,

    #[account(mut)]
    pub bidder: Signer<'info>,

    /// Seller's NFT account, delegated to the auction until the first bid.
    /// Only read while the NFT is not escrowed yet.
    #[account(
        mut,
        constraint = seller_token_account.owner == auction.seller @ EngineError::TokenAccountMismatch,
        constraint = seller_token_account.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub seller_token_account: Option<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = nft_vault.owner == auction.key() @ EngineError::TokenAccountMismatch,
        constraint = nft_vault.mint == auction.mint @ EngineError::TokenAccountMismatch
    )]
    pub nft_vault: Box<Account<'info, TokenAccount>>,

    /// Receives the NFT when the bid reaches the buy now price
    #[account(mut)]
    pub bidder_nft_account: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub bidder_payment_account: Option<Account<'info, TokenAccount>>,

    /// Auction-owned token account holding SPL bids
    #[account(mut)]
    pub bid_escrow: Option<Account<'info, TokenAccount>>,

    /// CHECK: Must be the current highest bidder; only receives a refund
    #[account(mut)]
    pub previous_bidder: Option<UncheckedAccount<'info>>,

    #[account(mut)]
    pub previous_bidder_payment_account: Option<Account<'info, TokenAccount>>,

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

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, MakeBid<'info>>,
    amount: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let bidder = ctx.accounts.bidder.key();
    let auction = &ctx.accounts.auction;
    let outcome = auction.check_bid(&bidder, amount, now)?;

    let mint = auction.mint;
    let collection = auction.collection;
    let seller = auction.seller;
    let pay_type = auction.pay_type;
    let payment_mint = auction.payment_mint;
    let (previous_bidder, previous_bid) = (auction.highest_bidder, auction.highest_bid);
    let had_bid = auction.has_bid();
    let escrowed = auction.escrowed;

    let bump = [auction.bump];
    let seeds: &[&[u8]] = &[AUCTION_SEED, mint.as_ref(), &bump];
    let signer = &[seeds];

    let auction_info = ctx.accounts.auction.to_account_info();
    let bidder_info = ctx.accounts.bidder.to_account_info();
    let token_program = ctx.accounts.token_program.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let vault = ctx.accounts.nft_vault.to_account_info();
    let bid_escrow = optional_info(&ctx.accounts.bid_escrow);

    if !escrowed {
        // First bid: pull the NFT in through the seller's delegation.
        let seller_nft = ctx
            .accounts
            .seller_token_account
            .as_ref()
            .ok_or(EngineError::TokenAccountMismatch)?;
        transfer_nft_signed(
            &token_program,
            &seller_nft.to_account_info(),
            &vault,
            &auction_info,
            signer,
        )?;
    }

    if had_bid {
        let previous = ctx
            .accounts
            .previous_bidder
            .as_ref()
            .ok_or(EngineError::MissingPaymentAccount)?;
        let refund_to = payment_destination(
            pay_type,
            previous,
            optional_info(&ctx.accounts.previous_bidder_payment_account),
        )?;
        assert_payee(&refund_to, &previous_bidder, &payment_mint)?;

        let escrow = Funding::from_auction(
            pay_type,
            &payment_mint,
            &auction_info,
            bid_escrow.as_ref(),
            &token_program,
            signer,
        )?;
        escrow.pay(&refund_to, previous_bid)?;
        msg!("Refunded previous bid: bidder={}, amount={}", previous_bidder, previous_bid);
    }

    let bidder_payment = optional_info(&ctx.accounts.bidder_payment_account);
    let funding = Funding::from_signer(
        pay_type,
        &payment_mint,
        &bidder_info,
        bidder_payment.as_ref(),
        &system_program,
        &token_program,
    )?;

    match outcome {
        BidOutcome::BuyNow { price } => {
            let treasury = payment_destination(
                pay_type,
                &ctx.accounts.treasury,
                optional_info(&ctx.accounts.treasury_payment_account),
            )?;
            let seller_dest = payment_destination(
                pay_type,
                &ctx.accounts.seller,
                optional_info(&ctx.accounts.seller_payment_account),
            )?;
            let payees = Payees {
                treasury: (&treasury, ctx.accounts.engine.treasury),
                seller: (&seller_dest, seller),
                fee_recipients: ctx.remaining_accounts,
            };
            distribute(
                &funding,
                &payees,
                price,
                ctx.accounts.engine.fee_bps,
                &ctx.accounts.auction.fee_shares,
                &payment_mint,
            )?;

            let bidder_nft = ctx
                .accounts
                .bidder_nft_account
                .as_ref()
                .ok_or(EngineError::TokenAccountMismatch)?;
            require_keys_eq!(bidder_nft.owner, bidder, EngineError::TokenAccountMismatch);
            require_keys_eq!(bidder_nft.mint, mint, EngineError::TokenAccountMismatch);

            let seller_info = ctx.accounts.seller.to_account_info();
            transfer_nft_signed(
                &token_program,
                &vault,
                &bidder_nft.to_account_info(),
                &auction_info,
                signer,
            )?;
            close_vault_signed(&token_program, &vault, &seller_info, &auction_info, signer)?;
            ctx.accounts.auction.close(seller_info)?;

            emit!(NftAuctionPaid {
                collection,
                mint,
                seller,
                buyer: bidder,
                amount: price,
            });
            msg!("Auction bought out: mint={}, buyer={}, price={}", mint, bidder, price);
        }
        BidOutcome::Escrow { amount } => {
            let holder = if pay_type.is_token() {
                let escrow = bid_escrow.ok_or(EngineError::MissingPaymentAccount)?;
                assert_payee(&escrow, auction_info.key, &payment_mint)?;
                escrow
            } else {
                auction_info.clone()
            };
            funding.pay(&holder, amount)?;

            let auction = &mut ctx.accounts.auction;
            auction.highest_bid = amount;
            auction.highest_bidder = bidder;
            auction.escrowed = true;

            emit!(NftAuctionBidMade {
                collection,
                mint,
                bidder,
                amount,
            });
            msg!("Bid made: mint={}, bidder={}, amount={}", mint, bidder, amount);
        }
    }

    Ok(())
}
