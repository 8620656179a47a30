use anchor_lang::prelude::*;

#[error_code]
pub enum SafeError {
    #[msg("No owners provided")]
    NoOwners,
    #[msg("Too many owners: maximum 10 allowed")]
    TooManyOwners,
    #[msg("Duplicate owners not allowed")]
    DuplicateOwners,
    #[msg("Invalid owner: cannot be default pubkey")]
    InvalidOwner,
    #[msg("Invalid threshold: must be > 0 and <= number of owners")]
    InvalidThreshold,
    #[msg("Owner not found")]
    OwnerNotFound,
    #[msg("Not enough approvals")]
    NotEnoughApprovals,
    #[msg("Proposal already executed")]
    AlreadyExecuted,
    #[msg("Approval array length mismatch")]
    ApprovalArrayMismatch,
    #[msg("Proposal count overflow")]
    ProposalCountOverflow,
    #[msg("Invalid proposal ID")]
    InvalidProposalId,
    #[msg("Proposal does not belong to this safe")]
    InvalidProposal,
    #[msg("Proposal operation does not match this instruction")]
    OperationMismatch,
    #[msg("Stream account does not match the proposed operation")]
    StreamAccountMismatch,
    #[msg("Stream is not controlled by this safe")]
    StreamNotOwnedBySafe,
    #[msg("Vault is not controlled by this safe")]
    VaultNotOwnedBySafe,
    #[msg("Approval count changed since the snapshot was taken")]
    StaleApprovalSnapshot,
}
