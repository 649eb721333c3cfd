use solana_program::program_error::ProgramError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Token amount must be greater than zero")]
    InvalidAmount = 0,
    #[error("Offered and wanted mints must differ")]
    MintMismatch = 1,
    #[error("An open offer with this id already exists")]
    DuplicateOffer = 2,
    #[error("Insufficient token balance")]
    InsufficientFunds = 3,
    #[error("Signer is not allowed to perform this operation")]
    Unauthorized = 4,
    #[error("Offer or vault account not found")]
    AccountNotFound = 5,
    #[error("Account does not match the offer")]
    AccountMismatch = 6,
}

impl From<EscrowError> for ProgramError {
    fn from(e: EscrowError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl TryFrom<u32> for EscrowError {
    type Error = ProgramError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EscrowError::InvalidAmount),
            1 => Ok(EscrowError::MintMismatch),
            2 => Ok(EscrowError::DuplicateOffer),
            3 => Ok(EscrowError::InsufficientFunds),
            4 => Ok(EscrowError::Unauthorized),
            5 => Ok(EscrowError::AccountNotFound),
            6 => Ok(EscrowError::AccountMismatch),
            _ => Err(ProgramError::InvalidArgument),
        }
    }
}
