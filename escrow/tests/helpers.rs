#![allow(dead_code)]

use escrow::error::EscrowError;
use solana_program::{
    hash::Hash,
    instruction::{Instruction, InstructionError},
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use spl_token::state::{Account as TokenAccount, Mint};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Escrow runs natively; spl-token and the associated token account program
/// are the real ones bundled with the test validator.
pub fn program_test() -> ProgramTest {
    ProgramTest::new(
        "escrow",
        escrow::id(),
        processor!(escrow::process_instruction),
    )
}

/// Signs with the context payer as fee payer plus `signers`.
pub fn build_transaction(
    context: &ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
    blockhash: Hash,
) -> Transaction {
    let mut keypairs = vec![&context.payer];
    keypairs.extend_from_slice(signers);
    Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &keypairs[..],
        blockhash,
    )
}

/// Sends under a fresh blockhash, so resending the same instructions is
/// never deduplicated.
pub async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = context.get_new_latest_blockhash().await.unwrap();
    let tx = build_transaction(context, instructions, signers, blockhash);
    context.banks_client.process_transaction(tx).await
}

pub async fn create_user(context: &mut ProgramTestContext) -> Keypair {
    let user = Keypair::new();
    let ix = system_instruction::transfer(
        &context.payer.pubkey(),
        &user.pubkey(),
        10 * LAMPORTS_PER_SOL,
    );
    send(context, &[ix], &[]).await.unwrap();
    user
}

pub async fn transfer_lamports(context: &mut ProgramTestContext, to: &Pubkey, lamports: u64) {
    let ix = system_instruction::transfer(&context.payer.pubkey(), to, lamports);
    send(context, &[ix], &[]).await.unwrap();
}

pub async fn minimum_balance(context: &mut ProgramTestContext, data_len: usize) -> u64 {
    let rent = context.banks_client.get_rent().await.unwrap();
    rent.minimum_balance(data_len)
}

pub async fn create_mint(
    context: &mut ProgramTestContext,
    authority: &Pubkey,
    decimals: u8,
) -> Pubkey {
    let mint = Keypair::new();
    let lamports = minimum_balance(context, Mint::LEN).await;
    let instructions = [
        system_instruction::create_account(
            &context.payer.pubkey(),
            &mint.pubkey(),
            lamports,
            Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint2(
            &spl_token::id(),
            &mint.pubkey(),
            authority,
            None,
            decimals,
        )
        .unwrap(),
    ];
    send(context, &instructions, &[&mint]).await.unwrap();
    mint.pubkey()
}

pub async fn create_token_account(
    context: &mut ProgramTestContext,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Pubkey {
    let ix = create_associated_token_account_idempotent(
        &context.payer.pubkey(),
        owner,
        mint,
        &spl_token::id(),
    );
    send(context, &[ix], &[]).await.unwrap();
    get_associated_token_address(owner, mint)
}

pub async fn mint_tokens(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    authority: &Keypair,
    destination: &Pubkey,
    amount: u64,
) {
    let ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &authority.pubkey(),
        &[],
        amount,
    )
    .unwrap();
    send(context, &[ix], &[authority]).await.unwrap();
}

/// The account at `address`, if it holds any lamports.
pub async fn get_account(context: &mut ProgramTestContext, address: &Pubkey) -> Option<Account> {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .filter(|account| account.lamports > 0)
}

pub async fn lamports(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    get_account(context, address)
        .await
        .map_or(0, |account| account.lamports)
}

/// Balance of a token account; a missing account holds nothing.
pub async fn token_balance(context: &mut ProgramTestContext, token_account: &Pubkey) -> u64 {
    get_account(context, token_account)
        .await
        .map(|account| TokenAccount::unpack(&account.data).unwrap().amount)
        .unwrap_or(0)
}

pub fn derive_offer_pda(maker: &Pubkey, id: u64) -> (Pubkey, u8) {
    escrow::pda::derive_offer_pda(&escrow::id(), maker, id)
}

pub fn derive_vault(offer: &Pubkey, mint_a: &Pubkey) -> Pubkey {
    escrow::pda::derive_vault_address(offer, mint_a)
}

pub fn assert_escrow_error(result: Result<(), BanksClientError>, expected: EscrowError) {
    let err = result.expect_err("transaction should have failed").unwrap();
    assert_eq!(
        err,
        TransactionError::InstructionError(0, InstructionError::Custom(expected as u32))
    );
}
