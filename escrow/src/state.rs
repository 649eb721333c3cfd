use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

/// One maker's standing proposal to swap `token_a_offered_amount` of mint A,
/// held in the offer's vault, for `token_b_wanted_amount` of mint B.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: u64,
    pub maker: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_a_offered_amount: u64,
    pub token_b_wanted_amount: u64,
    pub bump: u8,
}

impl Offer {
    pub const LEN: usize = 8 + 32 + 32 + 32 + 8 + 8 + 1;
}
