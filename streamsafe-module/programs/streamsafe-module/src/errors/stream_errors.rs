use anchor_lang::prelude::*;

#[error_code]
pub enum StreamError {
    #[msg("Invalid fee percentage: must be <= 10000 basis points")]
    InvalidFeePercentage,
    #[msg("Invalid time frame: end time must be after start time")]
    InvalidTimeFrame,
    #[msg("Invalid amount")]
    InvalidAmount,
    #[msg("Stream is already paused")]
    AlreadyPaused,
    #[msg("Stream is not paused")]
    NotPaused,
    #[msg("Stream has already been canceled")]
    StreamAlreadyCanceled,
    #[msg("Requested amount exceeds the accrued balance")]
    InsufficientAccrued,
    #[msg("Requested amount exceeds the withdraw limit")]
    WithdrawLimitExceeded,
    #[msg("Withdraw limits are only supported on token streams")]
    WithdrawLimitUnsupported,
    #[msg("Insufficient vault balance")]
    InsufficientVaultBalance,
    #[msg("Release exceeds the committed balance")]
    OverRelease,
    #[msg("Token kind does not match the vault")]
    TokenKindMismatch,
    #[msg("Vault authority mismatch")]
    VaultAuthorityMismatch,
    #[msg("Stream does not belong to this vault")]
    VaultMismatch,
    #[msg("Signer is not the stream sender")]
    SenderMismatch,
    #[msg("Signer is not the stream receiver")]
    ReceiverMismatch,
    #[msg("Fee vault does not match the stream")]
    FeeVaultMismatch,
    #[msg("Signer is not the fee vault owner")]
    FeeOwnerMismatch,
    #[msg("No collected fees to withdraw")]
    NoCollectedFees,
    #[msg("Math overflow")]
    MathOverflow,
}
