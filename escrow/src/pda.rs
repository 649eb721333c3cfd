//! Deterministic addresses of offers and their vaults.
//!
//! Everything here is a pure function of its inputs, so makers, takers and
//! the program itself all locate the same accounts without any index.

use solana_program::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

pub const OFFER_SEED: &[u8] = b"offer";

/// Offer PDA for `(maker, id)` and its canonical bump.
pub fn derive_offer_pda(program_id: &Pubkey, maker: &Pubkey, id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[OFFER_SEED, maker.as_ref(), &id.to_le_bytes()], program_id)
}

/// Vault of an offer: the offer PDA's associated token account for mint A.
pub fn derive_vault_address(offer: &Pubkey, token_mint_a: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(offer, token_mint_a, &spl_token::id())
}
