use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::get_associated_token_address;

use crate::pda::{derive_offer_pda, derive_vault_address};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Locks mint A in a fresh vault and records the offer.
    ///
    /// 0. `[writable, signer]` maker
    /// 1. `[]` token mint A
    /// 2. `[]` token mint B
    /// 3. `[writable]` maker's token account for mint A
    /// 4. `[writable]` offer PDA
    /// 5. `[writable]` vault
    /// 6. `[]` system program
    /// 7. `[]` token program
    /// 8. `[]` associated token program
    MakeOffer {
        id: u64,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
    },
    /// Pays the maker in mint B and releases the vault to the taker.
    ///
    /// 0. `[writable, signer]` taker
    /// 1. `[writable]` maker
    /// 2. `[]` token mint A
    /// 3. `[]` token mint B
    /// 4. `[writable]` taker's associated token account for mint A
    /// 5. `[writable]` taker's token account for mint B
    /// 6. `[writable]` maker's associated token account for mint B
    /// 7. `[writable]` offer PDA
    /// 8. `[writable]` vault
    /// 9. `[]` system program
    /// 10. `[]` token program
    /// 11. `[]` associated token program
    TakeOffer { id: u64 },
    /// Returns the vault to the maker and closes the offer.
    ///
    /// 0. `[writable, signer]` maker
    /// 1. `[]` token mint A
    /// 2. `[writable]` maker's associated token account for mint A
    /// 3. `[writable]` offer PDA
    /// 4. `[writable]` vault
    /// 5. `[]` system program
    /// 6. `[]` token program
    /// 7. `[]` associated token program
    CancelOffer { id: u64 },
}

#[allow(clippy::too_many_arguments)]
pub fn make_offer(
    program_id: &Pubkey,
    maker: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    maker_token_account_a: &Pubkey,
    id: u64,
    token_a_offered_amount: u64,
    token_b_wanted_amount: u64,
) -> Result<Instruction, ProgramError> {
    let (offer, _) = derive_offer_pda(program_id, maker, id);
    let vault = derive_vault_address(&offer, token_mint_a);
    let data = borsh::to_vec(&EscrowInstruction::MakeOffer {
        id,
        token_a_offered_amount,
        token_b_wanted_amount,
    })?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new_readonly(*token_mint_a, false),
            AccountMeta::new_readonly(*token_mint_b, false),
            AccountMeta::new(*maker_token_account_a, false),
            AccountMeta::new(offer, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        ],
        data,
    })
}

pub fn take_offer(
    program_id: &Pubkey,
    taker: &Pubkey,
    maker: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    taker_token_account_b: &Pubkey,
    id: u64,
) -> Result<Instruction, ProgramError> {
    let (offer, _) = derive_offer_pda(program_id, maker, id);
    let vault = derive_vault_address(&offer, token_mint_a);
    let taker_token_account_a = get_associated_token_address(taker, token_mint_a);
    let maker_token_account_b = get_associated_token_address(maker, token_mint_b);
    let data = borsh::to_vec(&EscrowInstruction::TakeOffer { id })?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(*maker, false),
            AccountMeta::new_readonly(*token_mint_a, false),
            AccountMeta::new_readonly(*token_mint_b, false),
            AccountMeta::new(taker_token_account_a, false),
            AccountMeta::new(*taker_token_account_b, false),
            AccountMeta::new(maker_token_account_b, false),
            AccountMeta::new(offer, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        ],
        data,
    })
}

/// `maker` is the offer's maker; `signer` is whoever submits the cancel.
/// Only a cancel where the two are the same identity can succeed.
pub fn cancel_offer(
    program_id: &Pubkey,
    signer: &Pubkey,
    maker: &Pubkey,
    token_mint_a: &Pubkey,
    id: u64,
) -> Result<Instruction, ProgramError> {
    let (offer, _) = derive_offer_pda(program_id, maker, id);
    let vault = derive_vault_address(&offer, token_mint_a);
    let signer_token_account_a = get_associated_token_address(signer, token_mint_a);
    let data = borsh::to_vec(&EscrowInstruction::CancelOffer { id })?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*signer, true),
            AccountMeta::new_readonly(*token_mint_a, false),
            AccountMeta::new(signer_token_account_a, false),
            AccountMeta::new(offer, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        ],
        data,
    })
}
