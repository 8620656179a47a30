use anchor_lang::prelude::*;

use crate::{
    split_fee, CancelStream, InitStream, InstantTransfer, InstantTransferred, PauseStream,
    ResumeStream, Stream, StreamCanceled, StreamError, StreamInitialized, StreamPaused,
    StreamResumed, StreamWithdrawn, WithdrawStream,
};

pub fn init_stream(
    ctx: Context<InitStream>,
    receiver: Pubkey,
    start_time: u64,
    end_time: u64,
    amount: u64,
    withdraw_limit: Option<u64>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let stream = &mut ctx.accounts.stream;

    Stream::validate_terms(start_time, end_time, amount, withdraw_limit, &vault.token_kind)?;
    vault.reserve_for_stream(amount)?;
    vault.stream_count = vault
        .stream_count
        .checked_add(1)
        .ok_or(StreamError::MathOverflow)?;

    let clock = Clock::get()?;
    stream.sender = ctx.accounts.sender.key();
    stream.receiver = receiver;
    stream.token_kind = vault.token_kind.clone();
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

    msg!(
        "Stream of {} from {} to {} over {}..{}",
        amount,
        stream.sender,
        receiver,
        start_time,
        end_time
    );
    Ok(())
}

pub fn withdraw_stream(ctx: Context<WithdrawStream>, amount: Option<u64>) -> Result<()> {
    let stream = &mut ctx.accounts.stream;
    let vault = &mut ctx.accounts.vault;
    let fee_vault = &ctx.accounts.fee_vault;

    let now = Clock::get()?.unix_timestamp as u64;
    let gross = stream.apply_withdraw(now, amount)?;
    let (net, fee) = split_fee(gross, fee_vault.fee_bps)?;

    vault.release_from_stream(gross)?;
    vault.withdraw(gross)?;

    let fee_accrual = &mut ctx.accounts.fee_accrual;
    fee_accrual.fee_vault = fee_vault.key();
    fee_accrual.token_kind = stream.token_kind.clone();
    fee_accrual.bump = ctx.bumps.fee_accrual;
    fee_accrual.credit(fee)?;

    emit!(StreamWithdrawn {
        stream: stream.key(),
        receiver: ctx.accounts.receiver.key(),
        gross,
        fee,
        net,
        withdrawn: stream.withdrawn,
        closed: stream.is_closed(),
    });

    msg!(
        "Withdrew {} ({} fee) from stream. Total withdrawn: {}/{}",
        net,
        fee,
        stream.withdrawn,
        stream.amount
    );
    Ok(())
}

pub fn pause_stream(ctx: Context<PauseStream>) -> Result<()> {
    let stream = &mut ctx.accounts.stream;

    let now = Clock::get()?.unix_timestamp as u64;
    stream.apply_pause(now)?;

    emit!(StreamPaused {
        stream: stream.key(),
        paused_at: stream.paused_at,
    });

    msg!("Stream paused at {}", stream.paused_at);
    Ok(())
}

pub fn resume_stream(ctx: Context<ResumeStream>) -> Result<()> {
    let stream = &mut ctx.accounts.stream;

    let now = Clock::get()?.unix_timestamp as u64;
    stream.apply_resume(now)?;

    emit!(StreamResumed {
        stream: stream.key(),
        paused_total: stream.paused_total,
    });

    msg!("Stream resumed. Total paused: {}s", stream.paused_total);
    Ok(())
}

pub fn cancel_stream(ctx: Context<CancelStream>) -> Result<()> {
    let stream = &mut ctx.accounts.stream;
    let vault = &mut ctx.accounts.vault;
    let fee_vault = &ctx.accounts.fee_vault;

    let now = Clock::get()?.unix_timestamp as u64;
    let settlement = stream.apply_cancel(now)?;
    let (net, fee) = split_fee(settlement.receiver_due, fee_vault.fee_bps)?;

    // The receiver portion leaves the vault; the refund stays behind as
    // the sender's uncommitted balance.
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
        canceled_at: now,
    });

    msg!(
        "Stream canceled. Receiver paid {} ({} fee), sender refunded {}",
        net,
        fee,
        settlement.sender_refund
    );
    Ok(())
}

pub fn instant_transfer(ctx: Context<InstantTransfer>, receiver: Pubkey, amount: u64) -> Result<()> {
    require!(amount > 0, StreamError::InvalidAmount);

    let vault = &mut ctx.accounts.vault;
    let fee_vault = &ctx.accounts.fee_vault;

    vault.withdraw(amount)?;
    let (net, fee) = split_fee(amount, fee_vault.fee_bps)?;

    let fee_accrual = &mut ctx.accounts.fee_accrual;
    fee_accrual.fee_vault = fee_vault.key();
    fee_accrual.token_kind = vault.token_kind.clone();
    fee_accrual.bump = ctx.bumps.fee_accrual;
    fee_accrual.credit(fee)?;

    emit!(InstantTransferred {
        vault: vault.key(),
        receiver,
        net,
        fee,
    });

    msg!("Instant transfer of {} ({} fee) to {}", net, fee, receiver);
    Ok(())
}
