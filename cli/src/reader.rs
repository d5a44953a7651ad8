//! Read-only access to engine state. Works without a wallet.

use anchor_client::{
    solana_client::{
        rpc_client::RpcClient,
        rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
        rpc_filter::{Memcmp, RpcFilterType},
    },
    solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey},
};
use anchor_lang::{AccountDeserialize, Discriminator};
use nft_engine::state::{
    Auction, Engine, FeeShare, NftType, PaymentType, Sale, LISTING_COLLECTION_OFFSET,
};
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::{ClientError, ClientResult},
    instructions::PaymentRoute,
    pda::{find_auction_address, find_engine_address, find_sale_address},
};

/// Slice of a listing query, ordered by mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub begin: usize,
    pub size: usize,
}

/// A listing account together with its address.
#[derive(Clone)]
pub struct Listing<T> {
    pub address: Pubkey,
    pub account: T,
}

pub trait Listed {
    fn mint(&self) -> Pubkey;
}

impl Listed for Sale {
    fn mint(&self) -> Pubkey {
        self.mint
    }
}

impl Listed for Auction {
    fn mint(&self) -> Pubkey {
        self.mint
    }
}

pub struct EngineReader {
    rpc: RpcClient,
    program_id: Pubkey,
}

impl EngineReader {
    pub fn new(rpc_url: String, commitment: CommitmentConfig, program_id: Pubkey) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url, commitment),
            program_id,
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(
            config.rpc_url()?,
            config.commitment()?,
            config.program_id()?,
        ))
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    fn fetch<T: AccountDeserialize>(&self, address: &Pubkey) -> ClientResult<Option<T>> {
        let account = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())?
            .value;

        match account {
            Some(account) => decode(address, &account.data).map(Some),
            None => Ok(None),
        }
    }

    pub fn engine(&self) -> ClientResult<Engine> {
        let (address, _) = find_engine_address(&self.program_id);
        self.fetch(&address)?
            .ok_or(ClientError::AccountNotFound(address))
    }

    /// Registered collection for `nft_type`, `None` while unset.
    pub fn get_nft_contract(&self, nft_type: NftType) -> ClientResult<Option<Pubkey>> {
        let engine = self.engine()?;
        Ok(registered(engine.nft_collections[nft_type.index()]))
    }

    pub fn get_payment_contract(&self, pay_type: PaymentType) -> ClientResult<Option<Pubkey>> {
        let slot = pay_type
            .slot()
            .ok_or_else(|| ClientError::UnsupportedPaymentType(format!("{:?}", pay_type)))?;
        let engine = self.engine()?;
        Ok(registered(engine.payment_mints[slot]))
    }

    pub fn get_token_infos_on_sale(
        &self,
        nft_type: NftType,
        page: Option<Page>,
    ) -> ClientResult<Vec<Listing<Sale>>> {
        let collection = self.collection(nft_type)?;
        let sales = self.listings::<Sale>(Sale::LEN, &collection)?;
        Ok(paginate(sales, page))
    }

    pub fn get_token_infos_on_auction(
        &self,
        nft_type: NftType,
        page: Option<Page>,
    ) -> ClientResult<Vec<Listing<Auction>>> {
        let collection = self.collection(nft_type)?;
        let auctions = self.listings::<Auction>(Auction::LEN, &collection)?;
        Ok(paginate(auctions, page))
    }

    pub fn get_token_sale_info(&self, mint: &Pubkey) -> ClientResult<Option<Sale>> {
        let (address, _) = find_sale_address(&self.program_id, mint);
        self.fetch(&address)
    }

    pub fn get_token_auction_info(&self, mint: &Pubkey) -> ClientResult<Option<Auction>> {
        let (address, _) = find_auction_address(&self.program_id, mint);
        self.fetch(&address)
    }

    fn collection(&self, nft_type: NftType) -> ClientResult<Pubkey> {
        self.get_nft_contract(nft_type)?
            .ok_or_else(|| ClientError::UnregisteredNftContract(format!("{:?}", nft_type)))
    }

    fn listings<T>(&self, size: usize, collection: &Pubkey) -> ClientResult<Vec<Listing<T>>>
    where
        T: AccountDeserialize + Discriminator + Listed,
    {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(size as u64),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, &T::DISCRIMINATOR)),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                    LISTING_COLLECTION_OFFSET,
                    collection.as_ref(),
                )),
            ]),
            account_config: RpcAccountInfoConfig {
                commitment: Some(self.rpc.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .rpc
            .get_program_accounts_with_config(&self.program_id, config)?;
        debug!("Found {} listing accounts for {}", accounts.len(), collection);

        let mut listings = accounts
            .iter()
            .map(|(address, account)| {
                decode(address, &account.data).map(|account| Listing {
                    address: *address,
                    account,
                })
            })
            .collect::<ClientResult<Vec<Listing<T>>>>()?;
        sort_by_mint(&mut listings);
        Ok(listings)
    }
}

pub fn decode<T: AccountDeserialize>(address: &Pubkey, data: &[u8]) -> ClientResult<T> {
    let mut data = data;
    T::try_deserialize(&mut data)
        .map_err(|e| ClientError::InvalidAccount(*address, e.to_string()))
}

fn registered(key: Pubkey) -> Option<Pubkey> {
    (key != Pubkey::default()).then_some(key)
}

pub fn sort_by_mint<T: Listed>(listings: &mut [Listing<T>]) {
    listings.sort_by_key(|l| l.account.mint());
}

pub fn paginate<T>(items: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(Page { begin, size }) => items.into_iter().skip(begin).take(size).collect(),
        None => items,
    }
}

/// Payment destinations for a listing, as the engine expects them.
pub fn payment_route(
    engine: &Engine,
    seller: Pubkey,
    pay_type: PaymentType,
    payment_mint: Pubkey,
    fee_shares: &[FeeShare],
) -> PaymentRoute {
    PaymentRoute {
        pay_type,
        payment_mint,
        treasury: engine.treasury,
        seller,
        fee_recipients: fee_shares.iter().map(|s| s.recipient).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::AccountSerialize;

    fn sale(mint: Pubkey) -> Sale {
        Sale {
            seller: Pubkey::new_unique(),
            mint,
            collection: Pubkey::new_unique(),
            nft_type: NftType::Membership,
            pay_type: PaymentType::Native,
            payment_mint: Pubkey::default(),
            price: 5,
            fee_shares: vec![],
            created_at: 0,
            bump: 254,
        }
    }

    #[test]
    fn pages_slice_the_ordered_list() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(paginate(items.clone(), None), items);
        assert_eq!(
            paginate(items.clone(), Some(Page { begin: 2, size: 3 })),
            vec![2, 3, 4]
        );
        assert_eq!(
            paginate(items.clone(), Some(Page { begin: 8, size: 5 })),
            vec![8, 9]
        );
        assert!(paginate(items, Some(Page { begin: 12, size: 1 })).is_empty());
    }

    #[test]
    fn listings_are_ordered_by_mint() {
        let mut mints: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let mut listings: Vec<Listing<Sale>> = mints
            .iter()
            .rev()
            .map(|m| Listing {
                address: Pubkey::new_unique(),
                account: sale(*m),
            })
            .collect();

        sort_by_mint(&mut listings);
        mints.sort();
        let ordered: Vec<Pubkey> = listings.iter().map(|l| l.account.mint).collect();
        assert_eq!(ordered, mints);
    }

    #[test]
    fn decode_checks_discriminator() {
        let address = Pubkey::new_unique();
        let original = sale(Pubkey::new_unique());
        let mut data = Vec::new();
        original.try_serialize(&mut data).unwrap();

        let decoded: Sale = decode(&address, &data).unwrap();
        assert_eq!(decoded.mint, original.mint);
        assert_eq!(decoded.price, 5);

        let err = decode::<Auction>(&address, &data).err().unwrap();
        assert!(matches!(err, ClientError::InvalidAccount(a, _) if a == address));
    }

    #[test]
    fn route_follows_fee_table() {
        let engine = Engine {
            authority: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            backend: Pubkey::new_unique(),
            fee_bps: 100,
            nft_collections: [Pubkey::default(); 4],
            payment_mints: [Pubkey::default(); 2],
            bump: 255,
        };
        let shares = [
            FeeShare { recipient: Pubkey::new_unique(), bps: 10 },
            FeeShare { recipient: Pubkey::new_unique(), bps: 20 },
        ];
        let seller = Pubkey::new_unique();
        let route = payment_route(&engine, seller, PaymentType::Native, Pubkey::default(), &shares);

        assert_eq!(route.treasury, engine.treasury);
        assert_eq!(route.fee_recipients, vec![shares[0].recipient, shares[1].recipient]);
        assert_eq!(route.receivers().len(), 4);
        assert_eq!(route.token_account(&seller), None);
    }

    #[test]
    fn unset_registry_slots_read_as_none() {
        assert_eq!(registered(Pubkey::default()), None);
        let key = Pubkey::new_unique();
        assert_eq!(registered(key), Some(key));
    }
}
