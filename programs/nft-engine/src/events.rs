use anchor_lang::prelude::*;

use crate::state::PaymentType;

#[event]
pub struct NftTokenSaleCreated {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub pay_type: PaymentType,
    pub price: u64,
}

#[event]
pub struct NftTokenSaleWithdrawn {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
}

#[event]
pub struct NftTokenSaleClosed {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub buyer: Pubkey,
    pub pay_type: PaymentType,
    pub price: u64,
}

#[event]
pub struct NftAuctionCreated {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub pay_type: PaymentType,
    pub min_price: u64,
    pub buy_now_price: u64,
    pub end_ts: i64,
}

#[event]
pub struct NftAuctionBidMade {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub bidder: Pubkey,
    pub amount: u64,
}

#[event]
pub struct NftAuctionBidWithdrawn {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub bidder: Pubkey,
    pub amount: u64,
}

/// Auction completed by a bid at or above the buy now price.
#[event]
pub struct NftAuctionPaid {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub buyer: Pubkey,
    pub amount: u64,
}

#[event]
pub struct NftAuctionSettled {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub winner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct NftAuctionWithdrawn {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
}

#[event]
pub struct NftAuctionHighestBidTaken {
    pub collection: Pubkey,
    pub mint: Pubkey,
    pub seller: Pubkey,
    pub winner: Pubkey,
    pub amount: u64,
}
