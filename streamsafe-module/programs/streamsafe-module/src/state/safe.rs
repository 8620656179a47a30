use anchor_lang::prelude::*;

use crate::{EscrowVault, FeeAccrual, FeeVault, SafeError, Stream, StreamError, TokenKind};

pub const MAX_OWNERS: usize = 10;

/// One guarded operation against a safe-controlled treasury. Replaces an
/// opaque instruction blob with a closed union so every proposal is fully
/// typed at rest.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, InitSpace)]
pub enum StreamOperation {
    Init {
        receiver: Pubkey,
        amount: u64,
        start_time: u64,
        end_time: u64,
        token_kind: TokenKind,
        withdraw_limit: Option<u64>,
    },
    Pause { stream: Pubkey },
    Resume { stream: Pubkey },
    Cancel { stream: Pubkey },
    InstantTransfer { receiver: Pubkey, amount: u64 },
}

impl StreamOperation {
    pub fn validate(&self) -> Result<()> {
        match self {
            StreamOperation::Init {
                amount,
                start_time,
                end_time,
                token_kind,
                withdraw_limit,
                ..
            } => Stream::validate_terms(*start_time, *end_time, *amount, *withdraw_limit, token_kind),
            StreamOperation::Pause { .. }
            | StreamOperation::Resume { .. }
            | StreamOperation::Cancel { .. } => Ok(()),
            StreamOperation::InstantTransfer { amount, .. } => {
                require!(*amount > 0, StreamError::InvalidAmount);
                Ok(())
            }
        }
    }
}

#[account]
#[derive(InitSpace)]
pub struct Safe {
    #[max_len(10)]
    pub owners: Vec<Pubkey>,
    pub threshold: u8,
    pub proposal_count: u64,
    pub created_at: i64,
    pub bump: u8,
}

impl Safe {
    pub fn validate_new(owners: &[Pubkey], threshold: u8) -> Result<()> {
        require!(!owners.is_empty(), SafeError::NoOwners);
        require!(owners.len() <= MAX_OWNERS, SafeError::TooManyOwners);
        require!(threshold > 0, SafeError::InvalidThreshold);
        require!(threshold <= owners.len() as u8, SafeError::InvalidThreshold);

        for owner in owners {
            require!(*owner != Pubkey::default(), SafeError::InvalidOwner);
        }
        for i in 0..owners.len() {
            for j in i + 1..owners.len() {
                require!(owners[i] != owners[j], SafeError::DuplicateOwners);
            }
        }
        Ok(())
    }

    pub fn owner_index(&self, key: &Pubkey) -> Option<usize> {
        self.owners.iter().position(|owner| owner == key)
    }
}

#[account]
#[derive(InitSpace)]
pub struct StreamProposal {
    pub safe: Pubkey,
    pub proposer: Pubkey,
    pub proposal_id: u64,
    pub operation: StreamOperation,
    /// Index-aligned with `Safe::owners`.
    #[max_len(10)]
    pub approvals: Vec<bool>,
    pub executed: bool,
    pub created_at: i64,
    pub bump: u8,
}

impl StreamProposal {
    pub fn approval_count(&self) -> usize {
        self.approvals.iter().filter(|&&approved| approved).count()
    }

    pub fn is_ready_to_execute(&self, threshold: u8) -> bool {
        self.approval_count() >= threshold as usize && !self.executed
    }

    /// Records an approval. Re-approval by the same owner is a harmless
    /// no-op; returns whether the approval was new.
    pub fn approve(&mut self, owner_index: usize) -> Result<bool> {
        require!(
            owner_index < self.approvals.len(),
            SafeError::ApprovalArrayMismatch
        );
        let newly = !self.approvals[owner_index];
        self.approvals[owner_index] = true;
        Ok(newly)
    }

    /// Approval count as it will stand once `owner_index` has approved.
    /// A repeat approval adds nothing, so one owner can never stand in for
    /// two.
    pub fn projected_approval_count(&self, owner_index: usize) -> usize {
        let count = self.approval_count();
        match self.approvals.get(owner_index) {
            Some(false) => count + 1,
            _ => count,
        }
    }

    pub fn mark_executed(&mut self) -> Result<()> {
        require!(!self.executed, SafeError::AlreadyExecuted);
        self.executed = true;
        Ok(())
    }
}

#[derive(Accounts)]
#[instruction(owners: Vec<Pubkey>, threshold: u8)]
pub struct CreateSafe<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        init,
        payer = creator,
        space = 8 + Safe::INIT_SPACE,
        seeds = [b"safe", creator.key().as_ref()],
        bump,
    )]
    pub safe: Account<'info, Safe>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(operation: StreamOperation)]
pub struct ProposeStreamOperation<'info> {
    #[account(mut)]
    pub proposer: Signer<'info>,

    #[account(mut)]
    pub safe: Account<'info, Safe>,

    #[account(
        init,
        payer = proposer,
        space = 8 + StreamProposal::INIT_SPACE,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &safe.proposal_count.to_le_bytes()
        ],
        bump,
    )]
    pub proposal: Account<'info, StreamProposal>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ApproveInitStream<'info> {
    #[account(mut)]
    pub approver: Signer<'info>,

    pub safe: Account<'info, Safe>,

    #[account(
        mut,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &proposal_id.to_le_bytes()
        ],
        bump = proposal.bump,
        constraint = proposal.safe == safe.key() @ SafeError::InvalidProposal
    )]
    pub proposal: Account<'info, StreamProposal>,

    #[account(
        mut,
        constraint = vault.authority == safe.key() @ SafeError::VaultNotOwnedBySafe
    )]
    pub vault: Account<'info, EscrowVault>,

    pub fee_vault: Account<'info, FeeVault>,

    /// Materialized on the first approval; stays inert until the approval
    /// that crosses the threshold fills it.
    #[account(
        init_if_needed,
        payer = approver,
        space = 8 + Stream::INIT_SPACE,
        seeds = [b"stream", proposal.key().as_ref()],
        bump,
    )]
    pub stream: Account<'info, Stream>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ApprovePauseStream<'info> {
    pub approver: Signer<'info>,

    pub safe: Account<'info, Safe>,

    #[account(
        mut,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &proposal_id.to_le_bytes()
        ],
        bump = proposal.bump,
        constraint = proposal.safe == safe.key() @ SafeError::InvalidProposal
    )]
    pub proposal: Account<'info, StreamProposal>,

    #[account(
        mut,
        constraint = stream.sender == safe.key() @ SafeError::StreamNotOwnedBySafe
    )]
    pub stream: Account<'info, Stream>,
}

#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ApproveResumeStream<'info> {
    pub approver: Signer<'info>,

    pub safe: Account<'info, Safe>,

    #[account(
        mut,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &proposal_id.to_le_bytes()
        ],
        bump = proposal.bump,
        constraint = proposal.safe == safe.key() @ SafeError::InvalidProposal
    )]
    pub proposal: Account<'info, StreamProposal>,

    #[account(
        mut,
        constraint = stream.sender == safe.key() @ SafeError::StreamNotOwnedBySafe
    )]
    pub stream: Account<'info, Stream>,
}

#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ApproveCancelStream<'info> {
    #[account(mut)]
    pub approver: Signer<'info>,

    pub safe: Account<'info, Safe>,

    #[account(
        mut,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &proposal_id.to_le_bytes()
        ],
        bump = proposal.bump,
        constraint = proposal.safe == safe.key() @ SafeError::InvalidProposal
    )]
    pub proposal: Account<'info, StreamProposal>,

    #[account(
        mut,
        constraint = stream.sender == safe.key() @ SafeError::StreamNotOwnedBySafe,
        constraint = stream.escrow_vault == vault.key() @ StreamError::VaultMismatch
    )]
    pub stream: Account<'info, Stream>,

    #[account(
        mut,
        constraint = vault.authority == safe.key() @ SafeError::VaultNotOwnedBySafe
    )]
    pub vault: Account<'info, EscrowVault>,

    #[account(
        constraint = stream.fee_vault == fee_vault.key() @ StreamError::FeeVaultMismatch
    )]
    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init_if_needed,
        payer = approver,
        space = 8 + FeeAccrual::INIT_SPACE,
        seeds = [
            b"fee_accrual",
            fee_vault.key().as_ref(),
            stream.token_kind.seed().as_ref()
        ],
        bump,
    )]
    pub fee_accrual: Account<'info, FeeAccrual>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ApproveInstantTransfer<'info> {
    #[account(mut)]
    pub approver: Signer<'info>,

    pub safe: Account<'info, Safe>,

    #[account(
        mut,
        seeds = [
            b"proposal",
            safe.key().as_ref(),
            &proposal_id.to_le_bytes()
        ],
        bump = proposal.bump,
        constraint = proposal.safe == safe.key() @ SafeError::InvalidProposal
    )]
    pub proposal: Account<'info, StreamProposal>,

    #[account(
        mut,
        constraint = vault.authority == safe.key() @ SafeError::VaultNotOwnedBySafe
    )]
    pub vault: Account<'info, EscrowVault>,

    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init_if_needed,
        payer = approver,
        space = 8 + FeeAccrual::INIT_SPACE,
        seeds = [
            b"fee_accrual",
            fee_vault.key().as_ref(),
            vault.token_kind.seed().as_ref()
        ],
        bump,
    )]
    pub fee_accrual: Account<'info, FeeAccrual>,

    pub system_program: Program<'info, System>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe_with(owners: usize, threshold: u8) -> Safe {
        Safe {
            owners: (0..owners).map(|_| Pubkey::new_unique()).collect(),
            threshold,
            proposal_count: 0,
            created_at: 0,
            bump: 252,
        }
    }

    fn proposal_for(safe: &Safe, proposer_index: usize) -> StreamProposal {
        let mut approvals = vec![false; safe.owners.len()];
        approvals[proposer_index] = true;
        StreamProposal {
            safe: Pubkey::new_unique(),
            proposer: safe.owners[proposer_index],
            proposal_id: 0,
            operation: StreamOperation::Pause { stream: Pubkey::new_unique() },
            approvals,
            executed: false,
            created_at: 0,
            bump: 251,
        }
    }

    #[test]
    fn safe_validation_matches_creation_rules() {
        let owners: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        assert!(Safe::validate_new(&owners, 2).is_ok());
        assert_eq!(Safe::validate_new(&owners, 0), Err(SafeError::InvalidThreshold.into()));
        assert_eq!(Safe::validate_new(&owners, 4), Err(SafeError::InvalidThreshold.into()));
        assert_eq!(Safe::validate_new(&[], 1), Err(SafeError::NoOwners.into()));

        let mut duplicated = owners.clone();
        duplicated.push(owners[0]);
        assert_eq!(
            Safe::validate_new(&duplicated, 2),
            Err(SafeError::DuplicateOwners.into())
        );

        let with_default = vec![Pubkey::new_unique(), Pubkey::default()];
        assert_eq!(
            Safe::validate_new(&with_default, 1),
            Err(SafeError::InvalidOwner.into())
        );

        let crowd: Vec<Pubkey> = (0..11).map(|_| Pubkey::new_unique()).collect();
        assert_eq!(Safe::validate_new(&crowd, 2), Err(SafeError::TooManyOwners.into()));
    }

    #[test]
    fn two_of_three_lifecycle() {
        // Owner 0 proposes (auto-approving); owner 1's approval crosses
        // the threshold.
        let safe = safe_with(3, 2);
        let mut proposal = proposal_for(&safe, 0);

        assert_eq!(proposal.approval_count(), 1);
        assert!(!proposal.is_ready_to_execute(safe.threshold));
        assert_eq!(proposal.projected_approval_count(1), 2);

        assert!(proposal.approve(1).unwrap());
        assert!(proposal.is_ready_to_execute(safe.threshold));
        proposal.mark_executed().unwrap();
        assert!(proposal.executed);
    }

    #[test]
    fn reapproval_is_a_noop_and_never_double_counts() {
        let safe = safe_with(3, 2);
        let mut proposal = proposal_for(&safe, 0);

        // Owner 0 already approved by proposing; their repeat approval
        // projects no increment and must not satisfy the threshold alone.
        assert_eq!(proposal.projected_approval_count(0), 1);
        assert!(!proposal.approve(0).unwrap());
        assert_eq!(proposal.approval_count(), 1);
        assert!(!proposal.is_ready_to_execute(safe.threshold));
    }

    #[test]
    fn executed_flips_at_most_once() {
        let safe = safe_with(2, 1);
        let mut proposal = proposal_for(&safe, 0);
        proposal.mark_executed().unwrap();
        assert_eq!(proposal.mark_executed(), Err(SafeError::AlreadyExecuted.into()));
        assert!(!proposal.is_ready_to_execute(safe.threshold));
    }

    #[test]
    fn approve_rejects_out_of_range_indices() {
        let safe = safe_with(3, 2);
        let mut proposal = proposal_for(&safe, 0);
        assert_eq!(proposal.approve(3), Err(SafeError::ApprovalArrayMismatch.into()));
    }

    #[test]
    fn operation_validation() {
        let init = StreamOperation::Init {
            receiver: Pubkey::new_unique(),
            amount: 1000,
            start_time: 0,
            end_time: 100,
            token_kind: TokenKind::Native,
            withdraw_limit: None,
        };
        assert!(init.validate().is_ok());

        let empty_window = StreamOperation::Init {
            receiver: Pubkey::new_unique(),
            amount: 1000,
            start_time: 100,
            end_time: 100,
            token_kind: TokenKind::Native,
            withdraw_limit: None,
        };
        assert_eq!(empty_window.validate(), Err(StreamError::InvalidTimeFrame.into()));

        let zero_transfer = StreamOperation::InstantTransfer {
            receiver: Pubkey::new_unique(),
            amount: 0,
        };
        assert_eq!(zero_transfer.validate(), Err(StreamError::InvalidAmount.into()));

        assert!(StreamOperation::Cancel { stream: Pubkey::new_unique() }
            .validate()
            .is_ok());
    }
}
