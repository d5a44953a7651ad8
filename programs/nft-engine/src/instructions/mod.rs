pub mod buy_nft;
pub mod create_auction;
pub mod create_sale;
pub mod initialize_engine;
pub mod make_bid;
pub mod set_nft_contract;
pub mod set_payment_contract;
pub mod settle_auction;
pub mod take_highest_bid;
pub mod update_engine;
pub mod withdraw_auction;
pub mod withdraw_bid;
pub mod withdraw_sale;

pub use buy_nft::*;
pub use create_auction::*;
pub use create_sale::*;
pub use initialize_engine::*;
pub use make_bid::*;
pub use set_nft_contract::*;
pub use set_payment_contract::*;
pub use settle_auction::*;
pub use update_engine::*;
pub use withdraw_auction::*;
pub use withdraw_bid::*;
pub use withdraw_sale::*;
