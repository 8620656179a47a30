use anchor_lang::prelude::*;

use crate::StreamOperation;

#[event]
pub struct SafeCreated {
    pub safe: Pubkey,
    pub creator: Pubkey,
    pub owners: Vec<Pubkey>,
    pub threshold: u8,
    pub created_at: i64,
}

#[event]
pub struct OperationProposed {
    pub safe: Pubkey,
    pub proposal: Pubkey,
    pub proposer: Pubkey,
    pub proposal_id: u64,
    pub operation: StreamOperation,
    pub created_at: i64,
}

#[event]
pub struct OperationApproved {
    pub safe: Pubkey,
    pub proposal: Pubkey,
    pub approver: Pubkey,
    pub proposal_id: u64,
    pub approval_count: u8,
    pub required_approvals: u8,
}

#[event]
pub struct OperationExecuted {
    pub safe: Pubkey,
    pub proposal: Pubkey,
    pub executor: Pubkey,
    pub proposal_id: u64,
    pub approval_count: u8,
    pub executed_at: i64,
}
