use anchor_lang::prelude::*;

#[error_code]
pub enum EngineError {
    #[msg("Only the engine authority can perform this action")]
    Unauthorized,

    #[msg("Engine fee exceeds the allowed maximum")]
    InvalidEngineFee,

    #[msg("Contract address must not be empty")]
    InvalidContractAddress,

    #[msg("Payment type is not valid for this operation")]
    InvalidPaymentType,

    #[msg("Unregistered nft contract")]
    UnregisteredNftContract,

    #[msg("Unregistered payment contract")]
    UnregisteredPaymentContract,

    #[msg("NFT metadata does not belong to the registered collection")]
    CollectionMismatch,

    #[msg("Unsupported mint type (must be a standard SPL token NFT)")]
    UnsupportedMint,

    #[msg("Only the token owner can perform this action")]
    NotTokenOwner,

    #[msg("Token is not approved for the engine")]
    NotApprovedToken,

    #[msg("Token is already on sale or auction")]
    TokenAlreadyListed,

    #[msg("Price must be greater than zero")]
    InvalidPrice,

    #[msg("Minimum price must be positive and lower than the buy now price")]
    InvalidMinPrice,

    #[msg("Bid period exceeds the allowed maximum")]
    InvalidBidPeriod,

    #[msg("Fee recipients and percentages must have the same size")]
    FeeTableSizeMismatch,

    #[msg("Too many fee recipients")]
    FeeTableTooLarge,

    #[msg("Fee percentages exceed the maximum rate")]
    FeeRateExceeded,

    #[msg("Fee recipient account does not match the fee table")]
    FeeRecipientMismatch,

    #[msg("Fee recipient wallet must hold a rent-exempt balance")]
    FeeRecipientNotFunded,

    #[msg("Only the sale seller can perform this action")]
    NotSaleSeller,

    #[msg("Only the auction seller can perform this action")]
    NotAuctionSeller,

    #[msg("Seller cannot buy own token")]
    SellerCannotBuy,

    #[msg("Seller cannot bid on own auction")]
    SellerCannotBid,

    #[msg("Allowed only for backend")]
    FiatBackendOnly,

    #[msg("Auction is finished")]
    AuctionFinished,

    #[msg("Auction is not finished yet")]
    AuctionNotFinished,

    #[msg("Insufficient funds to bid")]
    InsufficientBid,

    #[msg("Auction has no bid")]
    NoBid,

    #[msg("Auction already has a bid")]
    AuctionHasBid,

    #[msg("Only the highest bidder can perform this action")]
    NotHighestBidder,

    #[msg("Bid cannot be withdrawn yet")]
    BidWithdrawLocked,

    #[msg("Required payment account is missing")]
    MissingPaymentAccount,

    #[msg("Payment account does not match the listing")]
    PaymentAccountMismatch,

    #[msg("Token account does not match the listing")]
    TokenAccountMismatch,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
