use anchor_lang::prelude::*;

use crate::{
    split_fee, ApproveCancelStream, ApproveInitStream, ApproveInstantTransfer, ApprovePauseStream,
    ApproveResumeStream, CreateSafe, InstantTransferred, OperationApproved, OperationExecuted,
    OperationProposed, ProposeStreamOperation, Safe, SafeCreated, SafeError, StreamCanceled,
    StreamError, StreamInitialized, StreamOperation, StreamPaused, StreamProposal, StreamResumed,
};

pub fn create_safe(ctx: Context<CreateSafe>, owners: Vec<Pubkey>, threshold: u8) -> Result<()> {
    Safe::validate_new(&owners, threshold)?;

    let safe = &mut ctx.accounts.safe;
    let clock = Clock::get()?;
    safe.owners = owners.clone();
    safe.threshold = threshold;
    safe.proposal_count = 0;
    safe.created_at = clock.unix_timestamp;
    safe.bump = ctx.bumps.safe;

    emit!(SafeCreated {
        safe: safe.key(),
        creator: ctx.accounts.creator.key(),
        owners,
        threshold,
        created_at: safe.created_at,
    });

    msg!("Safe created with {} owners, threshold {}", safe.owners.len(), threshold);
    Ok(())
}

pub fn propose_stream_operation(
    ctx: Context<ProposeStreamOperation>,
    operation: StreamOperation,
) -> Result<()> {
    let safe = &mut ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let proposer = &ctx.accounts.proposer;

    let owner_index = safe
        .owner_index(proposer.key)
        .ok_or(SafeError::OwnerNotFound)?;
    operation.validate()?;

    let clock = Clock::get()?;
    let proposal_id = safe.proposal_count;

    proposal.safe = safe.key();
    proposal.proposer = proposer.key();
    proposal.proposal_id = proposal_id;
    proposal.operation = operation.clone();
    // Proposing counts as the proposer's approval.
    proposal.approvals = vec![false; safe.owners.len()];
    proposal.approvals[owner_index] = true;
    proposal.executed = false;
    proposal.created_at = clock.unix_timestamp;
    proposal.bump = ctx.bumps.proposal;

    safe.proposal_count = safe
        .proposal_count
        .checked_add(1)
        .ok_or(SafeError::ProposalCountOverflow)?;

    emit!(OperationProposed {
        safe: safe.key(),
        proposal: proposal.key(),
        proposer: proposer.key(),
        proposal_id,
        operation,
        created_at: proposal.created_at,
    });

    msg!("Proposal {} created by {}", proposal_id, proposer.key());
    Ok(())
}

/// Shared prologue of every guarded operation: validate the caller,
/// optionally check the caller's snapshot against the authoritative
/// approval count, record the approval, and decide the branch. Returns
/// whether this approval crosses the threshold.
fn register_approval(
    safe: &Safe,
    proposal: &mut StreamProposal,
    approver: &Pubkey,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<bool> {
    require!(!proposal.executed, SafeError::AlreadyExecuted);
    require!(proposal.proposal_id == proposal_id, SafeError::InvalidProposalId);
    require!(
        proposal.approvals.len() == safe.owners.len(),
        SafeError::ApprovalArrayMismatch
    );

    let owner_index = safe
        .owner_index(approver)
        .ok_or(SafeError::OwnerNotFound)?;

    if let Some(expected) = expected_approvals {
        require!(
            proposal.approval_count() == expected as usize,
            SafeError::StaleApprovalSnapshot
        );
    }

    let projected = proposal.projected_approval_count(owner_index);
    proposal.approve(owner_index)?;
    Ok(projected >= safe.threshold as usize)
}

fn note_approval<'info>(
    safe: &Account<'info, Safe>,
    proposal: &Account<'info, StreamProposal>,
    approver: Pubkey,
) {
    emit!(OperationApproved {
        safe: safe.key(),
        proposal: proposal.key(),
        approver,
        proposal_id: proposal.proposal_id,
        approval_count: proposal.approval_count() as u8,
        required_approvals: safe.threshold,
    });

    msg!(
        "Proposal {} approved by {}. Approvals: {}/{}",
        proposal.proposal_id,
        approver,
        proposal.approval_count(),
        safe.threshold
    );
}

fn note_execution<'info>(
    safe: &Account<'info, Safe>,
    proposal: &Account<'info, StreamProposal>,
    executor: Pubkey,
    executed_at: i64,
) {
    emit!(OperationExecuted {
        safe: safe.key(),
        proposal: proposal.key(),
        executor,
        proposal_id: proposal.proposal_id,
        approval_count: proposal.approval_count() as u8,
        executed_at,
    });

    msg!(
        "Proposal {} executed by {} with {}/{} approvals",
        proposal.proposal_id,
        executor,
        proposal.approval_count(),
        safe.threshold
    );
}

pub fn approve_init_stream(
    ctx: Context<ApproveInitStream>,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<()> {
    let (receiver, amount, start_time, end_time, token_kind, withdraw_limit) =
        match ctx.accounts.proposal.operation.clone() {
            StreamOperation::Init {
                receiver,
                amount,
                start_time,
                end_time,
                token_kind,
                withdraw_limit,
            } => (receiver, amount, start_time, end_time, token_kind, withdraw_limit),
            _ => return err!(SafeError::OperationMismatch),
        };

    let safe = &ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let approver = &ctx.accounts.approver;

    let execute_now = register_approval(safe, proposal, approver.key, proposal_id, expected_approvals)?;
    if !execute_now {
        note_approval(safe, proposal, approver.key());
        return Ok(());
    }

    require!(
        proposal.is_ready_to_execute(safe.threshold),
        SafeError::NotEnoughApprovals
    );
    proposal.mark_executed()?;

    let vault = &mut ctx.accounts.vault;
    require!(token_kind == vault.token_kind, StreamError::TokenKindMismatch);
    vault.reserve_for_stream(amount)?;

    let clock = Clock::get()?;
    let stream = &mut ctx.accounts.stream;
    stream.sender = safe.key();
    stream.receiver = receiver;
    stream.token_kind = token_kind;
    stream.start_time = start_time;
    stream.end_time = end_time;
    stream.amount = amount;
    stream.withdrawn = 0;
    stream.paused = false;
    stream.paused_at = 0;
    stream.paused_total = 0;
    stream.canceled = false;
    stream.canceled_at = 0;
    stream.withdraw_limit = withdraw_limit;
    stream.escrow_vault = vault.key();
    stream.fee_vault = ctx.accounts.fee_vault.key();
    stream.created_at = clock.unix_timestamp;
    stream.bump = ctx.bumps.stream;

    emit!(StreamInitialized {
        stream: stream.key(),
        vault: vault.key(),
        sender: stream.sender,
        receiver,
        amount,
        start_time,
        end_time,
    });
    note_execution(safe, proposal, approver.key(), clock.unix_timestamp);
    Ok(())
}

pub fn approve_pause_stream(
    ctx: Context<ApprovePauseStream>,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<()> {
    let target = match &ctx.accounts.proposal.operation {
        StreamOperation::Pause { stream } => *stream,
        _ => return err!(SafeError::OperationMismatch),
    };
    require!(
        ctx.accounts.stream.key() == target,
        SafeError::StreamAccountMismatch
    );

    let safe = &ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let approver = &ctx.accounts.approver;

    let execute_now = register_approval(safe, proposal, approver.key, proposal_id, expected_approvals)?;
    if !execute_now {
        note_approval(safe, proposal, approver.key());
        return Ok(());
    }

    require!(
        proposal.is_ready_to_execute(safe.threshold),
        SafeError::NotEnoughApprovals
    );
    proposal.mark_executed()?;

    let now_ts = Clock::get()?.unix_timestamp;
    let stream = &mut ctx.accounts.stream;
    stream.apply_pause(now_ts as u64)?;

    emit!(StreamPaused {
        stream: stream.key(),
        paused_at: stream.paused_at,
    });
    note_execution(safe, proposal, approver.key(), now_ts);
    Ok(())
}

pub fn approve_resume_stream(
    ctx: Context<ApproveResumeStream>,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<()> {
    let target = match &ctx.accounts.proposal.operation {
        StreamOperation::Resume { stream } => *stream,
        _ => return err!(SafeError::OperationMismatch),
    };
    require!(
        ctx.accounts.stream.key() == target,
        SafeError::StreamAccountMismatch
    );

    let safe = &ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let approver = &ctx.accounts.approver;

    let execute_now = register_approval(safe, proposal, approver.key, proposal_id, expected_approvals)?;
    if !execute_now {
        note_approval(safe, proposal, approver.key());
        return Ok(());
    }

    require!(
        proposal.is_ready_to_execute(safe.threshold),
        SafeError::NotEnoughApprovals
    );
    proposal.mark_executed()?;

    let now_ts = Clock::get()?.unix_timestamp;
    let stream = &mut ctx.accounts.stream;
    stream.apply_resume(now_ts as u64)?;

    emit!(StreamResumed {
        stream: stream.key(),
        paused_total: stream.paused_total,
    });
    note_execution(safe, proposal, approver.key(), now_ts);
    Ok(())
}

pub fn approve_cancel_stream(
    ctx: Context<ApproveCancelStream>,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<()> {
    let target = match &ctx.accounts.proposal.operation {
        StreamOperation::Cancel { stream } => *stream,
        _ => return err!(SafeError::OperationMismatch),
    };
    require!(
        ctx.accounts.stream.key() == target,
        SafeError::StreamAccountMismatch
    );

    let safe = &ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let approver = &ctx.accounts.approver;

    let execute_now = register_approval(safe, proposal, approver.key, proposal_id, expected_approvals)?;
    if !execute_now {
        note_approval(safe, proposal, approver.key());
        return Ok(());
    }

    require!(
        proposal.is_ready_to_execute(safe.threshold),
        SafeError::NotEnoughApprovals
    );
    proposal.mark_executed()?;

    let now_ts = Clock::get()?.unix_timestamp;
    let stream = &mut ctx.accounts.stream;
    let vault = &mut ctx.accounts.vault;
    let fee_vault = &ctx.accounts.fee_vault;

    let settlement = stream.apply_cancel(now_ts as u64)?;
    let (net, fee) = split_fee(settlement.receiver_due, fee_vault.fee_bps)?;

    vault.release_from_stream(settlement.receiver_due)?;
    vault.withdraw(settlement.receiver_due)?;
    vault.release_from_stream(settlement.sender_refund)?;

    let fee_accrual = &mut ctx.accounts.fee_accrual;
    fee_accrual.fee_vault = fee_vault.key();
    fee_accrual.token_kind = stream.token_kind.clone();
    fee_accrual.bump = ctx.bumps.fee_accrual;
    fee_accrual.credit(fee)?;

    emit!(StreamCanceled {
        stream: stream.key(),
        receiver_net: net,
        fee,
        sender_refund: settlement.sender_refund,
        canceled_at: stream.canceled_at,
    });
    note_execution(safe, proposal, approver.key(), now_ts);
    Ok(())
}

pub fn approve_instant_transfer(
    ctx: Context<ApproveInstantTransfer>,
    proposal_id: u64,
    expected_approvals: Option<u8>,
) -> Result<()> {
    let (receiver, amount) = match &ctx.accounts.proposal.operation {
        StreamOperation::InstantTransfer { receiver, amount } => (*receiver, *amount),
        _ => return err!(SafeError::OperationMismatch),
    };

    let safe = &ctx.accounts.safe;
    let proposal = &mut ctx.accounts.proposal;
    let approver = &ctx.accounts.approver;

    let execute_now = register_approval(safe, proposal, approver.key, proposal_id, expected_approvals)?;
    if !execute_now {
        note_approval(safe, proposal, approver.key());
        return Ok(());
    }

    require!(
        proposal.is_ready_to_execute(safe.threshold),
        SafeError::NotEnoughApprovals
    );
    proposal.mark_executed()?;

    let vault = &mut ctx.accounts.vault;
    let fee_vault = &ctx.accounts.fee_vault;

    vault.withdraw(amount)?;
    let (net, fee) = split_fee(amount, fee_vault.fee_bps)?;

    let fee_accrual = &mut ctx.accounts.fee_accrual;
    fee_accrual.fee_vault = fee_vault.key();
    fee_accrual.token_kind = vault.token_kind.clone();
    fee_accrual.bump = ctx.bumps.fee_accrual;
    fee_accrual.credit(fee)?;

    let now_ts = Clock::get()?.unix_timestamp;
    emit!(InstantTransferred {
        vault: vault.key(),
        receiver,
        net,
        fee,
    });
    note_execution(safe, proposal, approver.key(), now_ts);
    Ok(())
}
