use anchor_lang::prelude::*;

use crate::TokenKind;

#[event]
pub struct FeeVaultCreated {
    pub fee_vault: Pubkey,
    pub fee_owner: Pubkey,
    pub fee_bps: u64,
}

#[event]
pub struct FeePercentageUpdated {
    pub fee_vault: Pubkey,
    pub old_fee_bps: u64,
    pub new_fee_bps: u64,
}

#[event]
pub struct FeesWithdrawn {
    pub fee_vault: Pubkey,
    pub token_kind: TokenKind,
    pub amount: u64,
}

#[event]
pub struct VaultCreated {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub token_kind: TokenKind,
}

#[event]
pub struct VaultDeposited {
    pub vault: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub deposited: u64,
}

#[event]
pub struct VaultWithdrawn {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub deposited: u64,
}

#[event]
pub struct StreamInitialized {
    pub stream: Pubkey,
    pub vault: Pubkey,
    pub sender: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
    pub start_time: u64,
    pub end_time: u64,
}

#[event]
pub struct StreamWithdrawn {
    pub stream: Pubkey,
    pub receiver: Pubkey,
    pub gross: u64,
    pub fee: u64,
    pub net: u64,
    pub withdrawn: u64,
    pub closed: bool,
}

#[event]
pub struct StreamPaused {
    pub stream: Pubkey,
    pub paused_at: u64,
}

#[event]
pub struct StreamResumed {
    pub stream: Pubkey,
    pub paused_total: u64,
}

#[event]
pub struct StreamCanceled {
    pub stream: Pubkey,
    pub receiver_net: u64,
    pub fee: u64,
    pub sender_refund: u64,
    pub canceled_at: u64,
}

#[event]
pub struct InstantTransferred {
    pub vault: Pubkey,
    pub receiver: Pubkey,
    pub net: u64,
    pub fee: u64,
}
