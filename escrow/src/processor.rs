use borsh::{BorshDeserialize, BorshSerialize};

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use spl_token::{
    instruction,
    state::{Account as TokenAccount, Mint},
    ID as TOKEN_PROGRAM_ID,
};

use crate::{
    error::EscrowError,
    instruction::EscrowInstruction,
    pda::{derive_offer_pda, derive_vault_address, OFFER_SEED},
    state::Offer,
};

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = EscrowInstruction::try_from_slice(instruction_data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    match instruction {
        EscrowInstruction::MakeOffer {
            id,
            token_a_offered_amount,
            token_b_wanted_amount,
        } => {
            msg!("Instruction: MakeOffer");
            make(
                program_id,
                accounts,
                id,
                token_a_offered_amount,
                token_b_wanted_amount,
            )
        }
        EscrowInstruction::TakeOffer { id } => {
            msg!("Instruction: TakeOffer");
            take(program_id, accounts, id)
        }
        EscrowInstruction::CancelOffer { id } => {
            msg!("Instruction: CancelOffer");
            cancel(program_id, accounts, id)
        }
    }
}

pub fn make(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    id: u64,
    token_a_offered_amount: u64,
    token_b_wanted_amount: u64,
) -> ProgramResult {
    if token_a_offered_amount == 0 || token_b_wanted_amount == 0 {
        return Err(EscrowError::InvalidAmount.into());
    }

    let accs = &mut accounts.iter();

    let maker = next_account_info(accs)?;
    let mint_a = next_account_info(accs)?;
    let mint_b = next_account_info(accs)?;
    let maker_token_a = next_account_info(accs)?;
    let offer = next_account_info(accs)?;
    let vault = next_account_info(accs)?;
    let system_program = next_account_info(accs)?;
    let token_program = next_account_info(accs)?;
    let associated_token_program = next_account_info(accs)?;

    if mint_a.key == mint_b.key {
        return Err(EscrowError::MintMismatch.into());
    }

    if !maker.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    check_program_ids(system_program, token_program, associated_token_program)?;

    let mint_a_info = load_mint(mint_a)?;
    load_mint(mint_b)?;

    let (offer_pda, offer_bump) = derive_offer_pda(program_id, maker.key, id);
    if offer_pda != *offer.key {
        return Err(ProgramError::InvalidSeeds);
    }

    if offer.owner == program_id && offer.lamports() > 0 {
        msg!("Offer {} of {} is still open", id, maker.key);
        return Err(EscrowError::DuplicateOffer.into());
    }

    if derive_vault_address(offer.key, mint_a.key) != *vault.key {
        return Err(ProgramError::InvalidSeeds);
    }

    let maker_balance = holding_balance(maker_token_a, maker.key, mint_a.key)?;
    if maker_balance < token_a_offered_amount {
        msg!(
            "Maker holds {} of mint A, offer locks {}",
            maker_balance,
            token_a_offered_amount
        );
        return Err(EscrowError::InsufficientFunds.into());
    }

    let id_bytes = id.to_le_bytes();
    let bump = [offer_bump];
    let offer_seeds: &[&[u8]] = &[OFFER_SEED, maker.key.as_ref(), &id_bytes, &bump];

    create_offer_account(program_id, maker, offer, system_program, offer_seeds)?;

    invoke(
        &create_associated_token_account_idempotent(
            maker.key,
            offer.key,
            mint_a.key,
            &TOKEN_PROGRAM_ID,
        ),
        &[
            maker.clone(),
            vault.clone(),
            offer.clone(),
            mint_a.clone(),
            system_program.clone(),
            token_program.clone(),
            associated_token_program.clone(),
        ],
    )?;

    invoke(
        &instruction::transfer_checked(
            token_program.key,
            maker_token_a.key,
            mint_a.key,
            vault.key,
            maker.key,
            &[],
            token_a_offered_amount,
            mint_a_info.decimals,
        )?,
        &[
            maker_token_a.clone(),
            mint_a.clone(),
            vault.clone(),
            maker.clone(),
            token_program.clone(),
        ],
    )?;

    let offer_state = Offer {
        id,
        maker: *maker.key,
        token_mint_a: *mint_a.key,
        token_mint_b: *mint_b.key,
        token_a_offered_amount,
        token_b_wanted_amount,
        bump: offer_bump,
    };

    offer_state.serialize(&mut &mut offer.data.borrow_mut()[..])?;

    msg!(
        "Offer {} opened: {} of {} for {} of {}",
        id,
        token_a_offered_amount,
        mint_a.key,
        token_b_wanted_amount,
        mint_b.key
    );
    Ok(())
}

pub fn take(program_id: &Pubkey, accounts: &[AccountInfo], id: u64) -> ProgramResult {
    let accs = &mut accounts.iter();

    let taker = next_account_info(accs)?;
    let maker = next_account_info(accs)?;
    let mint_a = next_account_info(accs)?;
    let mint_b = next_account_info(accs)?;
    let taker_token_a = next_account_info(accs)?;
    let taker_token_b = next_account_info(accs)?;
    let maker_token_b = next_account_info(accs)?;
    let offer = next_account_info(accs)?;
    let vault = next_account_info(accs)?;
    let system_program = next_account_info(accs)?;
    let token_program = next_account_info(accs)?;
    let associated_token_program = next_account_info(accs)?;

    if !taker.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    check_program_ids(system_program, token_program, associated_token_program)?;

    let offer_state = load_offer(program_id, offer)?;

    let (offer_pda, _) = derive_offer_pda(program_id, maker.key, id);
    if offer_pda != *offer.key {
        return Err(ProgramError::InvalidSeeds);
    }

    if offer_state.maker != *maker.key
        || offer_state.id != id
        || offer_state.token_mint_a != *mint_a.key
        || offer_state.token_mint_b != *mint_b.key
    {
        return Err(EscrowError::AccountMismatch.into());
    }

    if derive_vault_address(offer.key, mint_a.key) != *vault.key {
        return Err(ProgramError::InvalidSeeds);
    }
    let vault_amount = vault_balance(vault, offer.key)?;

    let taker_balance = holding_balance(taker_token_b, taker.key, mint_b.key)?;
    if taker_balance < offer_state.token_b_wanted_amount {
        msg!(
            "Taker holds {} of mint B, offer wants {}",
            taker_balance,
            offer_state.token_b_wanted_amount
        );
        return Err(EscrowError::InsufficientFunds.into());
    }

    let mint_a_info = load_mint(mint_a)?;
    let mint_b_info = load_mint(mint_b)?;

    if *taker_token_a.key != get_associated_token_address(taker.key, mint_a.key) {
        return Err(ProgramError::InvalidSeeds);
    }
    invoke(
        &create_associated_token_account_idempotent(
            taker.key,
            taker.key,
            mint_a.key,
            &TOKEN_PROGRAM_ID,
        ),
        &[
            taker.clone(),
            taker_token_a.clone(),
            mint_a.clone(),
            system_program.clone(),
            token_program.clone(),
            associated_token_program.clone(),
        ],
    )?;

    if *maker_token_b.key != get_associated_token_address(maker.key, mint_b.key) {
        return Err(ProgramError::InvalidSeeds);
    }
    invoke(
        &create_associated_token_account_idempotent(
            taker.key,
            maker.key,
            mint_b.key,
            &TOKEN_PROGRAM_ID,
        ),
        &[
            taker.clone(),
            maker_token_b.clone(),
            maker.clone(),
            mint_b.clone(),
            system_program.clone(),
            token_program.clone(),
            associated_token_program.clone(),
        ],
    )?;

    invoke(
        &instruction::transfer_checked(
            token_program.key,
            taker_token_b.key,
            mint_b.key,
            maker_token_b.key,
            taker.key,
            &[],
            offer_state.token_b_wanted_amount,
            mint_b_info.decimals,
        )?,
        &[
            taker_token_b.clone(),
            mint_b.clone(),
            maker_token_b.clone(),
            taker.clone(),
            token_program.clone(),
        ],
    )?;

    let id_bytes = offer_state.id.to_le_bytes();
    let bump = [offer_state.bump];
    let offer_seeds: &[&[u8]] = &[OFFER_SEED, offer_state.maker.as_ref(), &id_bytes, &bump];

    release_vault(
        offer,
        vault,
        mint_a,
        mint_a_info.decimals,
        vault_amount,
        taker_token_a,
        maker,
        token_program,
        offer_seeds,
    )?;

    msg!("Offer {} of {} taken by {}", id, maker.key, taker.key);
    Ok(())
}

pub fn cancel(program_id: &Pubkey, accounts: &[AccountInfo], id: u64) -> ProgramResult {
    let accs = &mut accounts.iter();

    let maker = next_account_info(accs)?;
    let mint_a = next_account_info(accs)?;
    let maker_token_a = next_account_info(accs)?;
    let offer = next_account_info(accs)?;
    let vault = next_account_info(accs)?;
    let system_program = next_account_info(accs)?;
    let token_program = next_account_info(accs)?;
    let associated_token_program = next_account_info(accs)?;

    if !maker.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    check_program_ids(system_program, token_program, associated_token_program)?;

    let offer_state = load_offer(program_id, offer)?;

    if offer_state.maker != *maker.key {
        msg!("{} is not the maker of this offer", maker.key);
        return Err(EscrowError::Unauthorized.into());
    }

    let (offer_pda, _) = derive_offer_pda(program_id, maker.key, id);
    if offer_pda != *offer.key {
        return Err(ProgramError::InvalidSeeds);
    }

    if offer_state.token_mint_a != *mint_a.key {
        return Err(EscrowError::AccountMismatch.into());
    }

    if derive_vault_address(offer.key, mint_a.key) != *vault.key {
        return Err(ProgramError::InvalidSeeds);
    }
    let vault_amount = vault_balance(vault, offer.key)?;
    let mint_a_info = load_mint(mint_a)?;

    if *maker_token_a.key != get_associated_token_address(maker.key, mint_a.key) {
        return Err(ProgramError::InvalidSeeds);
    }
    invoke(
        &create_associated_token_account_idempotent(
            maker.key,
            maker.key,
            mint_a.key,
            &TOKEN_PROGRAM_ID,
        ),
        &[
            maker.clone(),
            maker_token_a.clone(),
            mint_a.clone(),
            system_program.clone(),
            token_program.clone(),
            associated_token_program.clone(),
        ],
    )?;

    let id_bytes = offer_state.id.to_le_bytes();
    let bump = [offer_state.bump];
    let offer_seeds: &[&[u8]] = &[OFFER_SEED, offer_state.maker.as_ref(), &id_bytes, &bump];

    release_vault(
        offer,
        vault,
        mint_a,
        mint_a_info.decimals,
        vault_amount,
        maker_token_a,
        maker,
        token_program,
        offer_seeds,
    )?;

    msg!("Offer {} of {} cancelled", id, maker.key);
    Ok(())
}

/// Allocates the offer record at its PDA.
///
/// `create_account` refuses an address that already holds lamports, so a
/// prefunded address is topped up to rent exemption, then allocated and
/// assigned in place.
fn create_offer_account<'a>(
    program_id: &Pubkey,
    maker: &AccountInfo<'a>,
    offer: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    offer_seeds: &[&[u8]],
) -> ProgramResult {
    let required_lamports = Rent::get()?.minimum_balance(Offer::LEN);
    let current_lamports = offer.lamports();

    if current_lamports == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                maker.key,
                offer.key,
                required_lamports,
                Offer::LEN as u64,
                program_id,
            ),
            &[maker.clone(), offer.clone(), system_program.clone()],
            &[offer_seeds],
        );
    }

    if offer.owner != &system_program::id() {
        return Err(ProgramError::IllegalOwner);
    }

    let top_up = required_lamports.saturating_sub(current_lamports);
    if top_up > 0 {
        invoke(
            &system_instruction::transfer(maker.key, offer.key, top_up),
            &[maker.clone(), offer.clone(), system_program.clone()],
        )?;
    }

    invoke_signed(
        &system_instruction::allocate(offer.key, Offer::LEN as u64),
        &[offer.clone(), system_program.clone()],
        &[offer_seeds],
    )?;

    invoke_signed(
        &system_instruction::assign(offer.key, program_id),
        &[offer.clone(), system_program.clone()],
        &[offer_seeds],
    )
}

/// Empties the vault into `recipient`, then closes the vault and the offer
/// with their rent going to `maker`, who paid for both.
#[allow(clippy::too_many_arguments)]
fn release_vault<'a>(
    offer: &AccountInfo<'a>,
    vault: &AccountInfo<'a>,
    mint_a: &AccountInfo<'a>,
    decimals: u8,
    amount: u64,
    recipient: &AccountInfo<'a>,
    maker: &AccountInfo<'a>,
    token_program: &AccountInfo<'a>,
    offer_seeds: &[&[u8]],
) -> ProgramResult {
    invoke_signed(
        &instruction::transfer_checked(
            token_program.key,
            vault.key,
            mint_a.key,
            recipient.key,
            offer.key,
            &[],
            amount,
            decimals,
        )?,
        &[
            vault.clone(),
            mint_a.clone(),
            recipient.clone(),
            offer.clone(),
            token_program.clone(),
        ],
        &[offer_seeds],
    )?;

    invoke_signed(
        &instruction::close_account(token_program.key, vault.key, maker.key, offer.key, &[])?,
        &[
            vault.clone(),
            maker.clone(),
            offer.clone(),
            token_program.clone(),
        ],
        &[offer_seeds],
    )?;

    **maker.try_borrow_mut_lamports()? += offer.lamports();
    **offer.try_borrow_mut_lamports()? = 0;
    offer.data.borrow_mut().fill(0);

    Ok(())
}

fn check_program_ids(
    system_program: &AccountInfo,
    token_program: &AccountInfo,
    associated_token_program: &AccountInfo,
) -> ProgramResult {
    if system_program.key != &system_program::id()
        || token_program.key != &TOKEN_PROGRAM_ID
        || associated_token_program.key != &spl_associated_token_account::id()
    {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

fn load_offer(program_id: &Pubkey, offer: &AccountInfo) -> Result<Offer, ProgramError> {
    if offer.lamports() == 0 || offer.owner != program_id {
        msg!("Offer {} does not exist", offer.key);
        return Err(EscrowError::AccountNotFound.into());
    }
    Offer::try_from_slice(&offer.data.borrow()).map_err(|_| ProgramError::InvalidAccountData)
}

fn load_mint(mint: &AccountInfo) -> Result<Mint, ProgramError> {
    if mint.owner != &TOKEN_PROGRAM_ID {
        return Err(ProgramError::InvalidAccountOwner);
    }
    Mint::unpack(&mint.data.borrow())
}

/// Balance of `owner`'s token account for `mint`; an absent account holds nothing.
fn holding_balance(
    token_account: &AccountInfo,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<u64, ProgramError> {
    if token_account.lamports() == 0 {
        return Ok(0);
    }
    if token_account.owner != &TOKEN_PROGRAM_ID {
        return Err(ProgramError::InvalidAccountOwner);
    }
    let token = TokenAccount::unpack(&token_account.data.borrow())?;
    if token.owner != *owner {
        return Err(ProgramError::IllegalOwner);
    }
    if token.mint != *mint {
        return Err(EscrowError::AccountMismatch.into());
    }
    Ok(token.amount)
}

fn vault_balance(vault: &AccountInfo, offer: &Pubkey) -> Result<u64, ProgramError> {
    if vault.lamports() == 0 {
        msg!("Vault {} does not exist", vault.key);
        return Err(EscrowError::AccountNotFound.into());
    }
    if vault.owner != &TOKEN_PROGRAM_ID {
        return Err(ProgramError::InvalidAccountOwner);
    }
    let token = TokenAccount::unpack(&vault.data.borrow())?;
    if token.owner != *offer {
        return Err(ProgramError::IllegalOwner);
    }
    Ok(token.amount)
}
