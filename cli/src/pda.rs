use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_spl::associated_token::get_associated_token_address;
use mpl_token_metadata::accounts::Metadata;
use nft_engine::state::{AUCTION_SEED, ENGINE_SEED, SALE_SEED};

pub fn find_engine_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ENGINE_SEED], program_id)
}

pub fn find_sale_address(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SALE_SEED, mint.as_ref()], program_id)
}

pub fn find_auction_address(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AUCTION_SEED, mint.as_ref()], program_id)
}

pub fn find_metadata_address(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

/// Token account of `mint` held by `owner` (wallet or listing PDA).
pub fn token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_addresses_are_per_mint() {
        let program_id = nft_engine::ID;
        let mint = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        let (sale, _) = find_sale_address(&program_id, &mint);
        let (auction, _) = find_auction_address(&program_id, &mint);
        assert_ne!(sale, auction);
        assert_ne!(sale, find_sale_address(&program_id, &other).0);
        assert_eq!(sale, find_sale_address(&program_id, &mint).0);
    }

    #[test]
    fn engine_address_matches_seeds() {
        let program_id = nft_engine::ID;
        let (engine, bump) = find_engine_address(&program_id);
        let derived =
            Pubkey::create_program_address(&[ENGINE_SEED, &[bump]], &program_id).unwrap();
        assert_eq!(engine, derived);
    }

    #[test]
    fn vault_is_the_listing_ata() {
        let program_id = nft_engine::ID;
        let mint = Pubkey::new_unique();
        let (sale, _) = find_sale_address(&program_id, &mint);
        assert_eq!(token_account(&sale, &mint), get_associated_token_address(&sale, &mint));
        assert_ne!(token_account(&sale, &mint), token_account(&Pubkey::new_unique(), &mint));
    }
}
