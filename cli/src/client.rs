//! Write access to the engine. Every call needs a connected wallet and sends
//! exactly one transaction.

use anchor_client::solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use nft_engine::state::{Auction, NftType, PaymentType, Sale};
use tracing::{debug, info};

use crate::{
    error::{ClientError, ClientResult},
    instructions::{self, AuctionArgs, PaymentRoute, SaleArgs},
    pda::{find_auction_address, find_sale_address},
    reader::{payment_route, EngineReader},
};

pub struct EngineClient {
    reader: EngineReader,
    signer: Option<Keypair>,
    compute_unit_limit: u32,
}

impl EngineClient {
    pub fn new(reader: EngineReader, signer: Option<Keypair>, compute_unit_limit: u32) -> Self {
        Self {
            reader,
            signer,
            compute_unit_limit,
        }
    }

    pub fn reader(&self) -> &EngineReader {
        &self.reader
    }

    fn signer(&self) -> ClientResult<&Keypair> {
        self.signer.as_ref().ok_or(ClientError::NotConnected)
    }

    fn program_id(&self) -> Pubkey {
        *self.reader.program_id()
    }

    fn send(&self, label: &str, instructions: Vec<Instruction>) -> ClientResult<Signature> {
        let signer = self.signer()?;
        let mut all = Vec::with_capacity(instructions.len() + 1);
        all.push(instructions::set_compute_unit_limit(self.compute_unit_limit));
        all.extend(instructions);

        let rpc = self.reader.rpc();
        let blockhash = rpc.get_latest_blockhash()?;
        let tx = Transaction::new_signed_with_payer(
            &all,
            Some(&signer.pubkey()),
            &[signer],
            blockhash,
        );

        debug!("Sending {} with {} instructions", label, all.len());
        let signature = rpc.send_and_confirm_transaction(&tx)?;
        info!("{} confirmed: {}", label, signature);
        Ok(signature)
    }

    /// Token accounts that must exist before an SPL payment lands.
    fn receiver_accounts(&self, payer: &Pubkey, route: &PaymentRoute) -> Vec<Instruction> {
        if !route.pay_type.is_token() {
            return vec![];
        }
        route
            .receivers()
            .iter()
            .map(|wallet| instructions::create_token_account(payer, wallet, &route.payment_mint))
            .collect()
    }

    fn collection(&self, nft_type: NftType) -> ClientResult<Pubkey> {
        self.reader
            .get_nft_contract(nft_type)?
            .ok_or_else(|| ClientError::UnregisteredNftContract(format!("{:?}", nft_type)))
    }

    fn payment_mint(&self, pay_type: PaymentType) -> ClientResult<Pubkey> {
        if !pay_type.is_token() {
            return Ok(Pubkey::default());
        }
        self.reader
            .get_payment_contract(pay_type)?
            .ok_or_else(|| ClientError::UnregisteredPaymentContract(format!("{:?}", pay_type)))
    }

    fn sale(&self, mint: &Pubkey) -> ClientResult<Sale> {
        self.reader
            .get_token_sale_info(mint)?
            .ok_or_else(|| ClientError::AccountNotFound(find_sale_address(&self.program_id(), mint).0))
    }

    fn auction(&self, mint: &Pubkey) -> ClientResult<Auction> {
        self.reader
            .get_token_auction_info(mint)?
            .ok_or_else(|| ClientError::AccountNotFound(find_auction_address(&self.program_id(), mint).0))
    }

    fn auction_route(&self, auction: &Auction) -> ClientResult<PaymentRoute> {
        let engine = self.reader.engine()?;
        Ok(payment_route(
            &engine,
            auction.seller,
            auction.pay_type,
            auction.payment_mint,
            &auction.fee_shares,
        ))
    }

    pub fn initialize_engine(
        &self,
        treasury: Pubkey,
        backend: Pubkey,
        fee_bps: u16,
    ) -> ClientResult<Signature> {
        let authority = self.signer()?.pubkey();
        let ix =
            instructions::initialize_engine(&self.program_id(), &authority, treasury, backend, fee_bps);
        self.send("initialize_engine", vec![ix])
    }

    pub fn update_engine(
        &self,
        treasury: Pubkey,
        backend: Pubkey,
        fee_bps: u16,
    ) -> ClientResult<Signature> {
        let authority = self.signer()?.pubkey();
        let ix = instructions::update_engine(&self.program_id(), &authority, treasury, backend, fee_bps);
        self.send("update_engine", vec![ix])
    }

    pub fn set_nft_contract(&self, nft_type: NftType, collection: Pubkey) -> ClientResult<Signature> {
        let authority = self.signer()?.pubkey();
        let ix = instructions::set_nft_contract(&self.program_id(), &authority, nft_type, collection);
        self.send("set_nft_contract", vec![ix])
    }

    pub fn set_payment_contract(
        &self,
        pay_type: PaymentType,
        payment_mint: Pubkey,
    ) -> ClientResult<Signature> {
        let authority = self.signer()?.pubkey();
        if !pay_type.is_token() {
            return Err(ClientError::UnsupportedPaymentType(format!("{:?}", pay_type)));
        }
        let ix =
            instructions::set_payment_contract(&self.program_id(), &authority, pay_type, payment_mint);
        self.send("set_payment_contract", vec![ix])
    }

    pub fn create_sale(&self, mint: &Pubkey, args: SaleArgs) -> ClientResult<Signature> {
        let seller = self.signer()?.pubkey();
        self.collection(args.nft_type)?;
        self.payment_mint(args.pay_type)?;

        let ix = instructions::create_sale(&self.program_id(), &seller, mint, args);
        self.send("create_sale", vec![ix])
    }

    pub fn withdraw_sale(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let seller = self.signer()?.pubkey();
        let ix = instructions::withdraw_sale(&self.program_id(), &seller, mint);
        self.send("withdraw_sale", vec![ix])
    }

    pub fn buy_nft(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let buyer = self.signer()?.pubkey();
        self.buy_nft_for(mint, &buyer)
    }

    /// Backend path for fiat sales: the signer completes the purchase and
    /// `recipient` receives the NFT.
    pub fn buy_nft_for(&self, mint: &Pubkey, recipient: &Pubkey) -> ClientResult<Signature> {
        let buyer = self.signer()?.pubkey();
        let sale = self.sale(mint)?;
        let engine = self.reader.engine()?;
        let route = payment_route(
            &engine,
            sale.seller,
            sale.pay_type,
            sale.payment_mint,
            &sale.fee_shares,
        );

        let mut ixs = vec![instructions::create_token_account(&buyer, recipient, mint)];
        ixs.extend(self.receiver_accounts(&buyer, &route));
        ixs.push(instructions::buy_nft(&self.program_id(), &buyer, recipient, mint, &route));
        self.send("buy_nft", ixs)
    }

    pub fn create_auction(&self, mint: &Pubkey, args: AuctionArgs) -> ClientResult<Signature> {
        let seller = self.signer()?.pubkey();
        if args.pay_type == PaymentType::Fiat {
            return Err(ClientError::UnsupportedPaymentType(format!("{:?}", args.pay_type)));
        }
        self.collection(args.nft_type)?;
        let payment_mint = self.payment_mint(args.pay_type)?;

        let program_id = self.program_id();
        let mut ixs = vec![instructions::approve_auction(&program_id, &seller, mint)?];
        if args.pay_type.is_token() {
            let (auction, _) = find_auction_address(&program_id, mint);
            ixs.push(instructions::create_token_account(&seller, &auction, &payment_mint));
        }
        ixs.push(instructions::create_auction(&program_id, &seller, mint, args));
        self.send("create_auction", ixs)
    }

    pub fn make_bid(&self, mint: &Pubkey, amount: u64) -> ClientResult<Signature> {
        let bidder = self.signer()?.pubkey();
        let auction = self.auction(mint)?;
        let route = self.auction_route(&auction)?;
        let previous =
            (auction.highest_bidder != Pubkey::default()).then_some(auction.highest_bidder);

        let mut ixs = vec![];
        if amount >= auction.buy_now_price {
            ixs.push(instructions::create_token_account(&bidder, &bidder, mint));
            ixs.extend(self.receiver_accounts(&bidder, &route));
        }
        ixs.push(instructions::make_bid(
            &self.program_id(),
            &bidder,
            mint,
            &route,
            previous,
            auction.escrowed,
            amount,
        ));
        self.send("make_bid", ixs)
    }

    pub fn withdraw_bid(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let bidder = self.signer()?.pubkey();
        let auction = self.auction(mint)?;
        let route = self.auction_route(&auction)?;
        let ix = instructions::withdraw_bid(&self.program_id(), &bidder, mint, &route);
        self.send("withdraw_bid", vec![ix])
    }

    /// Winner, payment route and the account setup a settlement needs.
    fn settlement(
        &self,
        caller: &Pubkey,
        mint: &Pubkey,
    ) -> ClientResult<(Pubkey, PaymentRoute, Vec<Instruction>)> {
        let auction = self.auction(mint)?;
        let route = self.auction_route(&auction)?;
        let winner = auction.highest_bidder;

        let mut ixs = vec![instructions::create_token_account(caller, &winner, mint)];
        ixs.extend(self.receiver_accounts(caller, &route));
        Ok((winner, route, ixs))
    }

    pub fn settle_auction(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let caller = self.signer()?.pubkey();
        let (winner, route, mut ixs) = self.settlement(&caller, mint)?;
        ixs.push(instructions::settle_auction(&self.program_id(), &caller, mint, &winner, &route));
        self.send("settle_auction", ixs)
    }

    pub fn take_highest_bid(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let seller = self.signer()?.pubkey();
        let (winner, route, mut ixs) = self.settlement(&seller, mint)?;
        ixs.push(instructions::take_highest_bid(&self.program_id(), &seller, mint, &winner, &route));
        self.send("take_highest_bid", ixs)
    }

    pub fn withdraw_auction(&self, mint: &Pubkey) -> ClientResult<Signature> {
        let seller = self.signer()?.pubkey();
        let ix = instructions::withdraw_auction(&self.program_id(), &seller, mint);
        self.send("withdraw_auction", vec![ix])
    }
}
