#![allow(dead_code)]

use anchor_lang::{InstructionData, ToAccountMetas};
use anchor_spl::{
    associated_token::{self, get_associated_token_address, spl_associated_token_account},
    token::{self, spl_token},
};
use mpl_token_metadata::accounts::Metadata;
use nft_engine::state::{NftType, PaymentType, AUCTION_SEED, ENGINE_SEED, SALE_SEED};
use solana_program_test::*;
use solana_sdk::{
    account::Account,
    account_info::AccountInfo,
    clock::Clock,
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction, InstructionError},
    program_option::COption,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signer},
    system_program,
    transaction::{Transaction, TransactionError},
};

pub const ONE_SOL: u64 = 1_000_000_000;
pub const TEN_SOL: u64 = 10 * ONE_SOL;
pub const ENGINE_FEE_BPS: u16 = 500;
pub const SHARE_BPS: u16 = 1_000;
pub const USDC_BALANCE: u64 = 1_000_000_000;

const METADATA_LEN: usize = 679;

fn process_instruction(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    // The generated entrypoint ties the slice and account lifetimes together.
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    nft_engine::entry(program_id, accounts, data)
}

pub fn engine_program_test() -> ProgramTest {
    let mut program = ProgramTest::new(
        "nft_engine",
        nft_engine::ID,
        processor!(process_instruction),
    );
    program.prefer_bpf(false);
    program
}

/// Wallets, mints and the collection every scenario starts from.
pub struct Market {
    pub authority: Keypair,
    pub seller: Keypair,
    pub buyer: Keypair,
    pub rival: Keypair,
    pub backend: Keypair,
    pub treasury: Pubkey,
    pub fee_wallet: Pubkey,
    pub empty_wallet: Pubkey,
    pub collection: Pubkey,
    pub usdc: Pubkey,
    pub nft: Pubkey,
}

impl Market {
    pub fn route(&self, pay_type: PaymentType) -> Route {
        Route {
            pay_type,
            payment_mint: if pay_type.is_token() {
                self.usdc
            } else {
                Pubkey::default()
            },
            treasury: self.treasury,
            seller: self.seller.pubkey(),
        }
    }

    pub fn fee_table(&self) -> Vec<(Pubkey, u16)> {
        vec![(self.fee_wallet, SHARE_BPS)]
    }
}

/// Payment accounts of one listing.
#[derive(Clone, Copy, Debug)]
pub struct Route {
    pub pay_type: PaymentType,
    pub payment_mint: Pubkey,
    pub treasury: Pubkey,
    pub seller: Pubkey,
}

impl Route {
    pub fn token_account(&self, wallet: &Pubkey) -> Option<Pubkey> {
        self.pay_type
            .is_token()
            .then(|| get_associated_token_address(wallet, &self.payment_mint))
    }

    /// Where `wallet` gets paid in this route's currency.
    pub fn destination(&self, wallet: &Pubkey) -> Pubkey {
        self.token_account(wallet).unwrap_or(*wallet)
    }
}

fn add_wallet(program: &mut ProgramTest, wallet: &Pubkey, lamports: u64) {
    program.add_account(*wallet, Account::new(lamports, 0, &system_program::ID));
}

fn add_packed<T: Pack>(program: &mut ProgramTest, address: Pubkey, state: T) {
    let mut data = vec![0u8; T::LEN];
    T::pack(state, &mut data).unwrap();
    program.add_account(
        address,
        Account {
            lamports: Rent::default().minimum_balance(T::LEN),
            data,
            owner: token::ID,
            executable: false,
            rent_epoch: 0,
        },
    );
}

fn mint_state(authority: &Pubkey, supply: u64, decimals: u8) -> spl_token::state::Mint {
    spl_token::state::Mint {
        mint_authority: COption::Some(*authority),
        supply,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    }
}

fn token_state(mint: &Pubkey, owner: &Pubkey, amount: u64) -> spl_token::state::Account {
    spl_token::state::Account {
        mint: *mint,
        owner: *owner,
        amount,
        delegate: COption::None,
        state: spl_token::state::AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    }
}

/// Metadata account bytes in the token metadata layout, padded like the
/// accounts the metadata program allocates.
pub fn metadata_data(mint: &Pubkey, collection: &Pubkey, verified: bool) -> Vec<u8> {
    let mut data = vec![4u8]; // Key::MetadataV1
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(mint.as_ref());
    for field in ["Engine Pass", "PASS", "https://example.com/pass.json"] {
        data.extend_from_slice(&(field.len() as u32).to_le_bytes());
        data.extend_from_slice(field.as_bytes());
    }
    data.extend_from_slice(&500u16.to_le_bytes());
    data.push(0); // creators
    data.push(0); // primary_sale_happened
    data.push(1); // is_mutable
    data.extend_from_slice(&[1, 255]); // edition_nonce
    data.extend_from_slice(&[1, 0]); // token_standard: NonFungible
    data.extend_from_slice(&[1, verified as u8]);
    data.extend_from_slice(collection.as_ref());
    data.push(0); // uses
    data.push(0); // collection_details
    data.push(0); // programmable_config
    data.resize(METADATA_LEN, 0);
    data
}

pub async fn setup() -> (ProgramTestContext, Market) {
    let mut program = engine_program_test();

    let seller = Keypair::new();
    let buyer = Keypair::new();
    let rival = Keypair::new();
    let backend = Keypair::new();
    let treasury = Pubkey::new_unique();
    let fee_wallet = Pubkey::new_unique();
    let empty_wallet = Pubkey::new_unique();
    let collection = Pubkey::new_unique();
    let mint_authority = Pubkey::new_unique();
    let nft = Pubkey::new_unique();
    let usdc = Pubkey::new_unique();

    for wallet in [seller.pubkey(), buyer.pubkey(), rival.pubkey(), backend.pubkey()] {
        add_wallet(&mut program, &wallet, TEN_SOL);
    }
    for wallet in [treasury, fee_wallet] {
        add_wallet(&mut program, &wallet, ONE_SOL);
    }

    add_packed(&mut program, nft, mint_state(&mint_authority, 1, 0));
    add_packed(
        &mut program,
        get_associated_token_address(&seller.pubkey(), &nft),
        token_state(&nft, &seller.pubkey(), 1),
    );
    program.add_account(
        Metadata::find_pda(&nft).0,
        Account {
            lamports: Rent::default().minimum_balance(METADATA_LEN),
            data: metadata_data(&nft, &collection, true),
            owner: mpl_token_metadata::ID,
            executable: false,
            rent_epoch: 0,
        },
    );

    add_packed(&mut program, usdc, mint_state(&mint_authority, 2 * USDC_BALANCE, 6));
    for (wallet, amount) in [
        (seller.pubkey(), 0),
        (buyer.pubkey(), USDC_BALANCE),
        (rival.pubkey(), USDC_BALANCE),
        (treasury, 0),
        (fee_wallet, 0),
    ] {
        add_packed(
            &mut program,
            get_associated_token_address(&wallet, &usdc),
            token_state(&usdc, &wallet, amount),
        );
    }

    let mut context = program.start_with_context().await;
    let authority = context.payer.insecure_clone();

    let market = Market {
        authority,
        seller,
        buyer,
        rival,
        backend,
        treasury,
        fee_wallet,
        empty_wallet,
        collection,
        usdc,
        nft,
    };

    let authority = market.authority.pubkey();
    process(
        &mut context,
        &[
            initialize_engine(&authority, market.treasury, market.backend.pubkey(), ENGINE_FEE_BPS),
            set_nft_contract(&authority, NftType::Membership, market.collection),
            set_payment_contract(&authority, PaymentType::Usdc, market.usdc),
        ],
        &[&market.authority],
    )
    .await
    .unwrap();

    (context, market)
}

/// Signs with `signers`, the first one pays the fee.
pub async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    // A retried instruction must not reuse the signature of the failed one.
    let blockhash = context.get_new_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&signers[0].pubkey()),
        signers,
        blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

/// Like `process`, returning the program logs of a successful transaction.
pub async fn process_with_logs(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Vec<String> {
    let blockhash = context.get_new_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&signers[0].pubkey()),
        signers,
        blockhash,
    );
    let outcome = context
        .banks_client
        .process_transaction_with_metadata(tx)
        .await
        .unwrap();
    outcome.result.unwrap();
    outcome.metadata.map(|m| m.log_messages).unwrap_or_default()
}

pub fn assert_engine_error(result: Result<(), BanksClientError>, expected: nft_engine::error::EngineError) {
    let err = match result {
        Err(BanksClientError::TransactionError(err)) => err,
        Err(BanksClientError::SimulationError { err, .. }) => err,
        other => panic!("expected {:?}, got {:?}", expected, other),
    };
    assert_eq!(
        err,
        TransactionError::InstructionError(0, InstructionError::Custom(u32::from(expected))),
    );
}

/// Index of the engine instruction inside a transaction with setup steps.
pub fn assert_engine_error_at(
    result: Result<(), BanksClientError>,
    index: u8,
    expected: nft_engine::error::EngineError,
) {
    let err = match result {
        Err(BanksClientError::TransactionError(err)) => err,
        Err(BanksClientError::SimulationError { err, .. }) => err,
        other => panic!("expected {:?}, got {:?}", expected, other),
    };
    assert_eq!(
        err,
        TransactionError::InstructionError(index, InstructionError::Custom(u32::from(expected))),
    );
}

pub async fn lamports(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|a| a.lamports)
        .unwrap_or(0)
}

pub async fn token_account_state(
    context: &mut ProgramTestContext,
    address: &Pubkey,
) -> Option<spl_token::state::Account> {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|a| spl_token::state::Account::unpack(&a.data).unwrap())
}

pub async fn token_balance(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    token_account_state(context, address)
        .await
        .map(|a| a.amount)
        .unwrap_or(0)
}

pub async fn account_exists(context: &mut ProgramTestContext, address: &Pubkey) -> bool {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|a| a.lamports > 0)
        .unwrap_or(false)
}

pub async fn advance_clock(context: &mut ProgramTestContext, seconds: i64) {
    let mut clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp += seconds;
    context.set_sysvar(&clock);
}

pub fn engine_address() -> Pubkey {
    Pubkey::find_program_address(&[ENGINE_SEED], &nft_engine::ID).0
}

pub fn sale_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[SALE_SEED, mint.as_ref()], &nft_engine::ID).0
}

pub fn auction_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[AUCTION_SEED, mint.as_ref()], &nft_engine::ID).0
}

pub fn ata(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}

pub fn create_ata(payer: &Pubkey, wallet: &Pubkey, mint: &Pubkey) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        wallet,
        mint,
        &token::ID,
    )
}

fn instruction(accounts: Vec<AccountMeta>, data: Vec<u8>) -> Instruction {
    Instruction {
        program_id: nft_engine::ID,
        accounts,
        data,
    }
}

fn native_fee_wallets(pay_type: PaymentType, fees: &[(Pubkey, u16)]) -> Vec<AccountMeta> {
    if pay_type != PaymentType::Native {
        return vec![];
    }
    fees.iter()
        .map(|(wallet, _)| AccountMeta::new_readonly(*wallet, false))
        .collect()
}

fn writable(accounts: &[Pubkey]) -> Vec<AccountMeta> {
    accounts.iter().map(|a| AccountMeta::new(*a, false)).collect()
}

pub fn initialize_engine(authority: &Pubkey, treasury: Pubkey, backend: Pubkey, fee_bps: u16) -> Instruction {
    instruction(
        nft_engine::accounts::InitializeEngine {
            engine: engine_address(),
            authority: *authority,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        nft_engine::instruction::InitializeEngine {
            treasury,
            backend,
            fee_bps,
        }
        .data(),
    )
}

pub fn set_nft_contract(authority: &Pubkey, nft_type: NftType, collection: Pubkey) -> Instruction {
    instruction(
        nft_engine::accounts::SetNftContract {
            engine: engine_address(),
            authority: *authority,
        }
        .to_account_metas(None),
        nft_engine::instruction::SetNftContract {
            nft_type,
            collection,
        }
        .data(),
    )
}

pub fn set_payment_contract(authority: &Pubkey, pay_type: PaymentType, payment_mint: Pubkey) -> Instruction {
    instruction(
        nft_engine::accounts::SetPaymentContract {
            engine: engine_address(),
            authority: *authority,
            payment_mint,
        }
        .to_account_metas(None),
        nft_engine::instruction::SetPaymentContract { pay_type }.data(),
    )
}

pub fn create_sale(
    seller: &Pubkey,
    mint: &Pubkey,
    pay_type: PaymentType,
    price: u64,
    fees: &[(Pubkey, u16)],
) -> Instruction {
    let sale = sale_address(mint);
    let mut accounts = nft_engine::accounts::CreateSale {
        sale,
        auction: auction_address(mint),
        engine: engine_address(),
        seller: *seller,
        seller_token_account: ata(seller, mint),
        nft_vault: ata(&sale, mint),
        mint: *mint,
        metadata: Metadata::find_pda(mint).0,
        system_program: system_program::ID,
        token_program: token::ID,
        associated_token_program: associated_token::ID,
    }
    .to_account_metas(None);
    accounts.extend(native_fee_wallets(pay_type, fees));

    instruction(
        accounts,
        nft_engine::instruction::CreateSale {
            nft_type: NftType::Membership,
            pay_type,
            price,
            fee_recipients: fees.iter().map(|(w, _)| *w).collect(),
            fee_percentages: fees.iter().map(|(_, bps)| *bps).collect(),
        }
        .data(),
    )
}

pub fn withdraw_sale(seller: &Pubkey, mint: &Pubkey) -> Instruction {
    let sale = sale_address(mint);
    instruction(
        nft_engine::accounts::WithdrawSale {
            sale,
            nft_vault: ata(&sale, mint),
            seller: *seller,
            seller_token_account: ata(seller, mint),
            token_program: token::ID,
        }
        .to_account_metas(None),
        nft_engine::instruction::WithdrawSale {}.data(),
    )
}

pub fn buy_nft(
    buyer: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    route: &Route,
    fee_accounts: &[Pubkey],
) -> Instruction {
    let sale = sale_address(mint);
    let mut accounts = nft_engine::accounts::BuyNft {
        sale,
        engine: engine_address(),
        nft_vault: ata(&sale, mint),
        buyer: *buyer,
        buyer_nft_account: ata(recipient, mint),
        seller: route.seller,
        treasury: route.treasury,
        buyer_payment_account: route.token_account(buyer),
        seller_payment_account: route.token_account(&route.seller),
        treasury_payment_account: route.token_account(&route.treasury),
        system_program: system_program::ID,
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(writable(fee_accounts));

    instruction(accounts, nft_engine::instruction::BuyNft {}.data())
}

/// Delegation, SPL bid escrow and the auction itself, as one transaction.
pub fn create_auction(
    seller: &Pubkey,
    mint: &Pubkey,
    route: &Route,
    min_price: u64,
    buy_now_price: u64,
    fees: &[(Pubkey, u16)],
) -> Vec<Instruction> {
    let auction = auction_address(mint);
    let mut instructions = vec![spl_token::instruction::approve(
        &token::ID,
        &ata(seller, mint),
        &auction,
        seller,
        &[],
        1,
    )
    .unwrap()];
    if route.pay_type.is_token() {
        instructions.push(create_ata(seller, &auction, &route.payment_mint));
    }

    let mut accounts = nft_engine::accounts::CreateAuction {
        auction,
        sale: sale_address(mint),
        engine: engine_address(),
        seller: *seller,
        seller_token_account: ata(seller, mint),
        nft_vault: ata(&auction, mint),
        mint: *mint,
        metadata: Metadata::find_pda(mint).0,
        system_program: system_program::ID,
        token_program: token::ID,
        associated_token_program: associated_token::ID,
    }
    .to_account_metas(None);
    accounts.extend(native_fee_wallets(route.pay_type, fees));

    instructions.push(instruction(
        accounts,
        nft_engine::instruction::CreateAuction {
            nft_type: NftType::Membership,
            pay_type: route.pay_type,
            min_price,
            buy_now_price,
            bid_period: 0,
            fee_recipients: fees.iter().map(|(w, _)| *w).collect(),
            fee_percentages: fees.iter().map(|(_, bps)| *bps).collect(),
        }
        .data(),
    ));
    instructions
}

pub fn make_bid(
    bidder: &Pubkey,
    mint: &Pubkey,
    route: &Route,
    previous_bidder: Option<Pubkey>,
    escrowed: bool,
    amount: u64,
    fee_accounts: &[Pubkey],
) -> Instruction {
    let auction = auction_address(mint);
    let mut accounts = nft_engine::accounts::MakeBid {
        auction,
        engine: engine_address(),
        bidder: *bidder,
        seller_token_account: (!escrowed).then(|| ata(&route.seller, mint)),
        nft_vault: ata(&auction, mint),
        bidder_nft_account: Some(ata(bidder, mint)),
        bidder_payment_account: route.token_account(bidder),
        bid_escrow: route.token_account(&auction),
        previous_bidder,
        previous_bidder_payment_account: previous_bidder.and_then(|p| route.token_account(&p)),
        seller: route.seller,
        seller_payment_account: route.token_account(&route.seller),
        treasury: route.treasury,
        treasury_payment_account: route.token_account(&route.treasury),
        system_program: system_program::ID,
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(writable(fee_accounts));

    instruction(accounts, nft_engine::instruction::MakeBid { amount }.data())
}

pub fn withdraw_bid(bidder: &Pubkey, mint: &Pubkey, route: &Route) -> Instruction {
    let auction = auction_address(mint);
    instruction(
        nft_engine::accounts::WithdrawBid {
            auction,
            bidder: *bidder,
            bid_escrow: route.token_account(&auction),
            bidder_payment_account: route.token_account(bidder),
            token_program: token::ID,
        }
        .to_account_metas(None),
        nft_engine::instruction::WithdrawBid {}.data(),
    )
}

fn settlement_accounts(
    caller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &Route,
    fee_accounts: &[Pubkey],
) -> Vec<AccountMeta> {
    let auction = auction_address(mint);
    let mut accounts = nft_engine::accounts::SettleAuction {
        auction,
        engine: engine_address(),
        caller: *caller,
        nft_vault: ata(&auction, mint),
        winner_nft_account: ata(winner, mint),
        bid_escrow: route.token_account(&auction),
        seller: route.seller,
        seller_payment_account: route.token_account(&route.seller),
        treasury: route.treasury,
        treasury_payment_account: route.token_account(&route.treasury),
        token_program: token::ID,
    }
    .to_account_metas(None);
    accounts.extend(writable(fee_accounts));
    accounts
}

pub fn settle_auction(
    caller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &Route,
    fee_accounts: &[Pubkey],
) -> Instruction {
    instruction(
        settlement_accounts(caller, mint, winner, route, fee_accounts),
        nft_engine::instruction::SettleAuction {}.data(),
    )
}

pub fn take_highest_bid(
    seller: &Pubkey,
    mint: &Pubkey,
    winner: &Pubkey,
    route: &Route,
    fee_accounts: &[Pubkey],
) -> Instruction {
    instruction(
        settlement_accounts(seller, mint, winner, route, fee_accounts),
        nft_engine::instruction::TakeHighestBid {}.data(),
    )
}

pub fn withdraw_auction(seller: &Pubkey, mint: &Pubkey) -> Instruction {
    let auction = auction_address(mint);
    instruction(
        nft_engine::accounts::WithdrawAuction {
            auction,
            nft_vault: ata(&auction, mint),
            seller: *seller,
            seller_token_account: ata(seller, mint),
            token_program: token::ID,
        }
        .to_account_metas(None),
        nft_engine::instruction::WithdrawAuction {}.data(),
    )
}
