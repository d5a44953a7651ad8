use anchor_lang::prelude::*;

use crate::error::EngineError;

pub const ENGINE_SEED: &[u8] = b"engine";
pub const SALE_SEED: &[u8] = b"sale";
pub const AUCTION_SEED: &[u8] = b"auction";

/// Basis points denominator (100%).
pub const MAX_BPS: u16 = 10_000;
/// Engine fee ceiling (10%).
pub const MAX_ENGINE_FEE_BPS: u16 = 1_000;
pub const MAX_FEE_RECIPIENTS: usize = 5;

/// Used when an auction is created with a zero bid period.
pub const DEFAULT_BID_PERIOD: i64 = 86_400;
pub const MAX_BID_PERIOD: i64 = 30 * 86_400;
/// Time after `end_ts` before an unsettled bid can be pulled back.
pub const BID_WITHDRAW_GRACE_PERIOD: i64 = 86_400;

/// Offset of `collection` in both `Sale` and `Auction` account data.
pub const LISTING_COLLECTION_OFFSET: usize = 8 + 32 + 32;

pub const NFT_TYPE_COUNT: usize = 4;
pub const PAYMENT_CONTRACT_COUNT: usize = 2;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum NftType {
    Membership,
    Peas,
    Pnft,
    Custom,
}

impl NftType {
    pub const ALL: [NftType; NFT_TYPE_COUNT] =
        [NftType::Membership, NftType::Peas, NftType::Pnft, NftType::Custom];

    pub fn index(self) -> usize {
        match self {
            NftType::Membership => 0,
            NftType::Peas => 1,
            NftType::Pnft => 2,
            NftType::Custom => 3,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PaymentType {
    Native,                       // lamports
    Usdc,                         // registered SPL mint
    Pbrt,                         // registered SPL mint
    Fiat,                         // settled off-chain by the backend
}

impl PaymentType {
    /// Registry slot for SPL payment types.
    pub fn slot(self) -> Option<usize> {
        match self {
            PaymentType::Usdc => Some(0),
            PaymentType::Pbrt => Some(1),
            PaymentType::Native | PaymentType::Fiat => None,
        }
    }

    pub fn is_token(self) -> bool {
        self.slot().is_some()
    }
}

/// Engine configuration and contract registry.
/// Seeds: [b"engine"]
#[account]
pub struct Engine {
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub backend: Pubkey,
    pub fee_bps: u16,
    pub nft_collections: [Pubkey; NFT_TYPE_COUNT],
    pub payment_mints: [Pubkey; PAYMENT_CONTRACT_COUNT],
    pub bump: u8,
}

impl Engine {
    pub const LEN: usize = 8 +   // discriminator
        32 +                      // authority
        32 +                      // treasury
        32 +                      // backend
        2 +                       // fee_bps
        32 * NFT_TYPE_COUNT +     // nft_collections
        32 * PAYMENT_CONTRACT_COUNT + // payment_mints
        1;                        // bump

    pub fn collection_for(&self, nft_type: NftType) -> Result<Pubkey> {
        let collection = self.nft_collections[nft_type.index()];
        require!(
            collection != Pubkey::default(),
            EngineError::UnregisteredNftContract
        );
        Ok(collection)
    }

    /// Registered SPL mint for `pay_type`, or the default key for payment
    /// types that do not settle in SPL tokens.
    pub fn payment_mint_for(&self, pay_type: PaymentType) -> Result<Pubkey> {
        match pay_type.slot() {
            Some(slot) => {
                let mint = self.payment_mints[slot];
                require!(
                    mint != Pubkey::default(),
                    EngineError::UnregisteredPaymentContract
                );
                Ok(mint)
            }
            None => Ok(Pubkey::default()),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct FeeShare {
    pub recipient: Pubkey,
    pub bps: u16,
}

impl FeeShare {
    pub const LEN: usize = 32 + 2;

    /// Builds a fee table from the parallel recipient/percentage arrays.
    pub fn table(recipients: Vec<Pubkey>, percentages: Vec<u16>) -> Result<Vec<FeeShare>> {
        require!(
            recipients.len() == percentages.len(),
            EngineError::FeeTableSizeMismatch
        );
        require!(
            recipients.len() <= MAX_FEE_RECIPIENTS,
            EngineError::FeeTableTooLarge
        );

        let total = percentages
            .iter()
            .try_fold(0u16, |acc, bps| acc.checked_add(*bps))
            .ok_or(EngineError::FeeRateExceeded)?;
        require!(total <= MAX_BPS, EngineError::FeeRateExceeded);

        Ok(recipients
            .into_iter()
            .zip(percentages)
            .map(|(recipient, bps)| FeeShare { recipient, bps })
            .collect())
    }
}

/// Amounts owed to each party out of one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proceeds {
    pub engine_fee: u64,
    pub shares: Vec<u64>,
    pub seller: u64,
}

/// Engine fee comes off the gross amount, fee shares off what remains,
/// the seller keeps the rest.
pub fn split_proceeds(amount: u64, fee_bps: u16, shares: &[FeeShare]) -> Result<Proceeds> {
    let engine_fee = bps_of(amount, fee_bps)?;
    let rest = amount
        .checked_sub(engine_fee)
        .ok_or(EngineError::ArithmeticOverflow)?;

    let mut seller = rest;
    let mut share_amounts = Vec::with_capacity(shares.len());
    for share in shares {
        let cut = bps_of(rest, share.bps)?;
        seller = seller
            .checked_sub(cut)
            .ok_or(EngineError::ArithmeticOverflow)?;
        share_amounts.push(cut);
    }

    Ok(Proceeds {
        engine_fee,
        shares: share_amounts,
        seller,
    })
}

fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(EngineError::ArithmeticOverflow)?
        .checked_div(MAX_BPS as u128)
        .ok_or(EngineError::ArithmeticOverflow)?;
    u64::try_from(value).map_err(|_| error!(EngineError::ArithmeticOverflow))
}

/// Fixed price listing. The NFT sits in the sale PDA's token account.
/// Seeds: [b"sale", mint]
#[account]
pub struct Sale {
    pub seller: Pubkey,
    pub mint: Pubkey,
    pub collection: Pubkey,
    pub nft_type: NftType,
    pub pay_type: PaymentType,
    pub payment_mint: Pubkey,
    pub price: u64,
    pub fee_shares: Vec<FeeShare>,
    pub created_at: i64,
    pub bump: u8,
}

impl Sale {
    pub const LEN: usize = 8 +   // discriminator
        32 +                      // seller
        32 +                      // mint
        32 +                      // collection
        1 +                       // nft_type
        1 +                       // pay_type
        32 +                      // payment_mint
        8 +                       // price
        4 + FeeShare::LEN * MAX_FEE_RECIPIENTS + // fee_shares
        8 +                       // created_at
        1;                        // bump
}

/// Timed auction with an instant-buy price.
/// Seeds: [b"auction", mint]
#[account]
pub struct Auction {
    pub seller: Pubkey,
    pub mint: Pubkey,
    pub collection: Pubkey,
    pub nft_type: NftType,
    pub pay_type: PaymentType,
    pub payment_mint: Pubkey,
    pub min_price: u64,
    pub buy_now_price: u64,
    pub start_ts: i64,
    pub end_ts: i64,
    pub highest_bid: u64,
    pub highest_bidder: Pubkey,
    pub escrowed: bool,           // NFT moved into the auction vault
    pub fee_shares: Vec<FeeShare>,
    pub bump: u8,
}

impl Auction {
    pub const LEN: usize = 8 +   // discriminator
        32 +                      // seller
        32 +                      // mint
        32 +                      // collection
        1 +                       // nft_type
        1 +                       // pay_type
        32 +                      // payment_mint
        8 +                       // min_price
        8 +                       // buy_now_price
        8 +                       // start_ts
        8 +                       // end_ts
        8 +                       // highest_bid
        32 +                      // highest_bidder
        1 +                       // escrowed
        4 + FeeShare::LEN * MAX_FEE_RECIPIENTS + // fee_shares
        1;                        // bump

    pub fn has_bid(&self) -> bool {
        self.highest_bidder != Pubkey::default()
    }

    /// Decides what an incoming bid does to the auction.
    pub fn check_bid(&self, bidder: &Pubkey, amount: u64, now: i64) -> Result<BidOutcome> {
        require_keys_neq!(*bidder, self.seller, EngineError::SellerCannotBid);
        require!(now <= self.end_ts, EngineError::AuctionFinished);
        require!(
            amount >= self.min_price && amount > self.highest_bid,
            EngineError::InsufficientBid
        );

        if amount >= self.buy_now_price {
            Ok(BidOutcome::BuyNow {
                price: self.buy_now_price,
            })
        } else {
            Ok(BidOutcome::Escrow { amount })
        }
    }

    /// Anyone settles after the end; the seller may accept early.
    pub fn check_settle(&self, caller: &Pubkey, now: i64) -> Result<()> {
        require!(self.has_bid(), EngineError::NoBid);
        require!(
            now > self.end_ts || *caller == self.seller,
            EngineError::AuctionNotFinished
        );
        Ok(())
    }

    pub fn check_take_highest_bid(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.seller, EngineError::NotAuctionSeller);
        require!(self.has_bid(), EngineError::NoBid);
        Ok(())
    }

    pub fn check_withdraw_bid(&self, caller: &Pubkey, now: i64) -> Result<()> {
        require!(self.has_bid(), EngineError::NoBid);
        require_keys_eq!(*caller, self.highest_bidder, EngineError::NotHighestBidder);
        let unlock_ts = self
            .end_ts
            .checked_add(BID_WITHDRAW_GRACE_PERIOD)
            .ok_or(EngineError::ArithmeticOverflow)?;
        require!(now > unlock_ts, EngineError::BidWithdrawLocked);
        Ok(())
    }

    pub fn check_withdraw(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.seller, EngineError::NotAuctionSeller);
        require!(!self.has_bid(), EngineError::AuctionHasBid);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    /// Bid becomes the highest and is held by the auction.
    Escrow { amount: u64 },
    /// Bid reached the buy now price; the auction completes at `price`.
    BuyNow { price: u64 },
}

pub fn validate_auction_prices(min_price: u64, buy_now_price: u64) -> Result<()> {
    require!(
        min_price > 0 && min_price < buy_now_price,
        EngineError::InvalidMinPrice
    );
    Ok(())
}

pub fn resolve_bid_period(bid_period: i64) -> Result<i64> {
    match bid_period {
        0 => Ok(DEFAULT_BID_PERIOD),
        p if p > 0 && p <= MAX_BID_PERIOD => Ok(p),
        _ => err!(EngineError::InvalidBidPeriod),
    }
}
