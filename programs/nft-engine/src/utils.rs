use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{self, CloseAccount, Mint, TokenAccount, Transfer};
use mpl_token_metadata::accounts::Metadata;

use crate::error::EngineError;
use crate::state::{split_proceeds, FeeShare, PaymentType, Proceeds};

/// Verify NFT standard (decimals = 0, supply = 1).
pub fn assert_nft_mint(mint: &Mint) -> Result<()> {
    require!(mint.decimals == 0, EngineError::UnsupportedMint);
    require!(mint.supply == 1, EngineError::UnsupportedMint);
    Ok(())
}

/// The mint's metadata must carry a verified collection equal to the one
/// registered in the engine.
pub fn assert_registered_collection(
    metadata: &AccountInfo,
    mint: &Pubkey,
    collection: &Pubkey,
) -> Result<()> {
    let (expected, _) = Metadata::find_pda(mint);
    require_keys_eq!(*metadata.key, expected, EngineError::CollectionMismatch);
    require_keys_eq!(
        *metadata.owner,
        mpl_token_metadata::ID,
        EngineError::CollectionMismatch
    );

    let data = metadata.try_borrow_data()?;
    let metadata = Metadata::safe_deserialize(&data)
        .map_err(|_| error!(EngineError::CollectionMismatch))?;

    match metadata.collection {
        Some(c) if c.verified && c.key == *collection => Ok(()),
        _ => err!(EngineError::CollectionMismatch),
    }
}

/// Listing PDAs must be empty for the "one listing per mint" rule.
pub fn assert_not_listed(listing: &AccountInfo) -> Result<()> {
    require!(listing.data_is_empty(), EngineError::TokenAlreadyListed);
    Ok(())
}

pub fn read_token_account(info: &AccountInfo) -> Result<TokenAccount> {
    require_keys_eq!(*info.owner, token::ID, EngineError::PaymentAccountMismatch);
    let data = info.try_borrow_data()?;
    TokenAccount::try_deserialize(&mut &data[..])
}

/// A payee is the wallet itself for lamports, or a token account of the
/// payment mint owned by the wallet.
pub fn assert_payee(info: &AccountInfo, wallet: &Pubkey, payment_mint: &Pubkey) -> Result<()> {
    if *payment_mint == Pubkey::default() {
        require_keys_eq!(*info.key, *wallet, EngineError::PaymentAccountMismatch);
        return Ok(());
    }

    let account = read_token_account(info)?;
    require_keys_eq!(account.owner, *wallet, EngineError::PaymentAccountMismatch);
    require_keys_eq!(account.mint, *payment_mint, EngineError::PaymentAccountMismatch);
    Ok(())
}

/// Lamport payouts below the rent-exempt minimum are refused by the runtime
/// when the receiving wallet is empty, so native fee share wallets must
/// already be funded when the listing is created.
pub fn assert_funded_recipients(
    pay_type: PaymentType,
    shares: &[FeeShare],
    wallets: &[AccountInfo],
    rent: &Rent,
) -> Result<()> {
    if pay_type != PaymentType::Native {
        return Ok(());
    }
    require!(
        wallets.len() >= shares.len(),
        EngineError::FeeRecipientMismatch
    );

    for (share, wallet) in shares.iter().zip(wallets) {
        require_keys_eq!(*wallet.key, share.recipient, EngineError::FeeRecipientMismatch);
        require!(
            rent.is_exempt(wallet.lamports(), 0),
            EngineError::FeeRecipientNotFunded
        );
    }
    Ok(())
}

pub fn optional_info<'info, T: ToAccountInfo<'info>>(account: &Option<T>) -> Option<AccountInfo<'info>> {
    account.as_ref().map(|a| a.to_account_info())
}

/// Picks the account that receives funds for `wallet` in the listing's
/// currency.
pub fn payment_destination<'info>(
    pay_type: PaymentType,
    wallet: &AccountInfo<'info>,
    token_account: Option<AccountInfo<'info>>,
) -> Result<AccountInfo<'info>> {
    if pay_type.is_token() {
        token_account.ok_or_else(|| error!(EngineError::MissingPaymentAccount))
    } else {
        Ok(wallet.clone())
    }
}

/// Where a payment is drawn from.
pub enum Funding<'a, 'info> {
    /// Signer paying lamports through the system program.
    Wallet {
        payer: &'a AccountInfo<'info>,
        system_program: &'a AccountInfo<'info>,
    },
    /// Lamports held on a program-owned account.
    Escrow { holder: &'a AccountInfo<'info> },
    /// SPL tokens moved by `authority`, signed with `signer_seeds` when the
    /// authority is a PDA.
    Token {
        from: &'a AccountInfo<'info>,
        authority: &'a AccountInfo<'info>,
        token_program: &'a AccountInfo<'info>,
        signer_seeds: &'a [&'a [&'a [u8]]],
    },
}

impl<'a, 'info> Funding<'a, 'info> {
    /// Payment straight from a signer: lamports, or its token account of
    /// `payment_mint`.
    pub fn from_signer(
        pay_type: PaymentType,
        payment_mint: &Pubkey,
        payer: &'a AccountInfo<'info>,
        payer_token_account: Option<&'a AccountInfo<'info>>,
        system_program: &'a AccountInfo<'info>,
        token_program: &'a AccountInfo<'info>,
    ) -> Result<Self> {
        if !pay_type.is_token() {
            return Ok(Funding::Wallet {
                payer,
                system_program,
            });
        }

        let from = payer_token_account.ok_or(EngineError::MissingPaymentAccount)?;
        assert_payee(from, payer.key, payment_mint)?;
        Ok(Funding::Token {
            from,
            authority: payer,
            token_program,
            signer_seeds: &[],
        })
    }

    /// Bids held by an auction PDA: lamports on the auction account itself,
    /// SPL bids in its token account.
    pub fn from_auction(
        pay_type: PaymentType,
        payment_mint: &Pubkey,
        auction: &'a AccountInfo<'info>,
        bid_escrow: Option<&'a AccountInfo<'info>>,
        token_program: &'a AccountInfo<'info>,
        signer_seeds: &'a [&'a [&'a [u8]]],
    ) -> Result<Self> {
        if !pay_type.is_token() {
            return Ok(Funding::Escrow { holder: auction });
        }

        let from = bid_escrow.ok_or(EngineError::MissingPaymentAccount)?;
        assert_payee(from, auction.key, payment_mint)?;
        Ok(Funding::Token {
            from,
            authority: auction,
            token_program,
            signer_seeds,
        })
    }

    pub fn pay(&self, to: &AccountInfo<'info>, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        match self {
            Funding::Wallet {
                payer,
                system_program,
            } => {
                let cpi_ctx = CpiContext::new(
                    (*system_program).clone(),
                    system_program::Transfer {
                        from: (*payer).clone(),
                        to: to.clone(),
                    },
                );
                system_program::transfer(cpi_ctx, amount)
            }
            Funding::Escrow { holder } => {
                let remaining = holder
                    .lamports()
                    .checked_sub(amount)
                    .ok_or(EngineError::ArithmeticOverflow)?;
                let credited = to
                    .lamports()
                    .checked_add(amount)
                    .ok_or(EngineError::ArithmeticOverflow)?;
                **holder.try_borrow_mut_lamports()? = remaining;
                **to.try_borrow_mut_lamports()? = credited;
                Ok(())
            }
            Funding::Token {
                from,
                authority,
                token_program,
                signer_seeds,
            } => {
                let cpi_accounts = Transfer {
                    from: (*from).clone(),
                    to: to.clone(),
                    authority: (*authority).clone(),
                };
                let cpi_ctx = CpiContext::new_with_signer(
                    (*token_program).clone(),
                    cpi_accounts,
                    signer_seeds,
                );
                token::transfer(cpi_ctx, amount)
            }
        }
    }
}

/// Receivers of one payment. Each destination is paired with the wallet it
/// must belong to.
pub struct Payees<'a, 'info> {
    pub treasury: (&'a AccountInfo<'info>, Pubkey),
    pub seller: (&'a AccountInfo<'info>, Pubkey),
    /// Fee share destinations, in fee table order.
    pub fee_recipients: &'a [AccountInfo<'info>],
}

/// Splits `amount` and pays everybody out of `funding`.
pub fn distribute<'a, 'info>(
    funding: &Funding<'a, 'info>,
    payees: &Payees<'a, 'info>,
    amount: u64,
    fee_bps: u16,
    shares: &[FeeShare],
    payment_mint: &Pubkey,
) -> Result<Proceeds> {
    require!(
        payees.fee_recipients.len() >= shares.len(),
        EngineError::FeeRecipientMismatch
    );

    let (treasury, treasury_wallet) = payees.treasury;
    let (seller, seller_wallet) = payees.seller;
    assert_payee(treasury, &treasury_wallet, payment_mint)?;
    assert_payee(seller, &seller_wallet, payment_mint)?;

    let proceeds = split_proceeds(amount, fee_bps, shares)?;

    funding.pay(treasury, proceeds.engine_fee)?;
    for ((share, cut), recipient) in shares
        .iter()
        .zip(proceeds.shares.iter())
        .zip(payees.fee_recipients.iter())
    {
        assert_payee(recipient, &share.recipient, payment_mint)
            .map_err(|_| error!(EngineError::FeeRecipientMismatch))?;
        funding.pay(recipient, *cut)?;
    }
    funding.pay(seller, proceeds.seller)?;

    msg!(
        "Payment breakdown: amount={}, fee={}, shares={:?}, seller={}",
        amount,
        proceeds.engine_fee,
        proceeds.shares,
        proceeds.seller
    );

    Ok(proceeds)
}

/// Moves the NFT out of a PDA-owned vault.
pub fn transfer_nft_signed<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let cpi_accounts = Transfer {
        from: from.clone(),
        to: to.clone(),
        authority: authority.clone(),
    };
    let cpi_ctx =
        CpiContext::new_with_signer(token_program.clone(), cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, 1)
}

pub fn close_vault_signed<'info>(
    token_program: &AccountInfo<'info>,
    vault: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let cpi_close = CloseAccount {
        account: vault.clone(),
        destination: destination.clone(),
        authority: authority.clone(),
    };
    let cpi_ctx = CpiContext::new_with_signer(token_program.clone(), cpi_close, signer_seeds);
    token::close_account(cpi_ctx)
}
