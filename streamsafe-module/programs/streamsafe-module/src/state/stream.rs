use anchor_lang::prelude::*;

use crate::{EscrowVault, FeeAccrual, FeeVault, StreamError};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, InitSpace)]
pub enum TokenKind {
    Native,
    Token { mint: Pubkey, decimals: u8 },
}

impl TokenKind {
    /// Seed bytes for vault and fee-accrual PDAs: the mint key for token
    /// vaults, all-zero bytes for the native kind.
    pub fn seed(&self) -> [u8; 32] {
        match self {
            TokenKind::Native => [0u8; 32],
            TokenKind::Token { mint, .. } => mint.to_bytes(),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TokenKind::Native)
    }
}

/// Payout split produced by cancelling a stream. The receiver portion is
/// gross of the protocol fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettlement {
    pub receiver_due: u64,
    pub sender_refund: u64,
}

#[account]
#[derive(InitSpace)]
pub struct Stream {
    pub sender: Pubkey,
    pub receiver: Pubkey,
    pub token_kind: TokenKind,
    pub start_time: u64,
    pub end_time: u64,
    /// Total committed amount, reserved on the escrow vault at creation.
    pub amount: u64,
    pub withdrawn: u64,
    pub paused: bool,
    /// Instant the current pause began, clamped to `start_time`.
    pub paused_at: u64,
    /// Accumulated seconds of completed pauses.
    pub paused_total: u64,
    pub canceled: bool,
    pub canceled_at: u64,
    /// Per-withdrawal cap, token streams only.
    pub withdraw_limit: Option<u64>,
    pub escrow_vault: Pubkey,
    pub fee_vault: Pubkey,
    pub created_at: i64,
    pub bump: u8,
}

impl Stream {
    pub fn validate_terms(
        start_time: u64,
        end_time: u64,
        amount: u64,
        withdraw_limit: Option<u64>,
        token_kind: &TokenKind,
    ) -> Result<()> {
        require!(end_time > start_time, StreamError::InvalidTimeFrame);
        require!(amount > 0, StreamError::InvalidAmount);
        if let Some(limit) = withdraw_limit {
            require!(!token_kind.is_native(), StreamError::WithdrawLimitUnsupported);
            require!(limit > 0, StreamError::InvalidAmount);
        }
        Ok(())
    }

    /// Amount vested at `now`: zero before start, linear in elapsed time
    /// net of pauses, frozen at `canceled_at` once canceled, and equal to
    /// `amount` once the effective elapsed time covers the full duration.
    pub fn accrued(&self, now: u64) -> Result<u64> {
        let horizon = if self.canceled { now.min(self.canceled_at) } else { now };
        if horizon <= self.start_time {
            return Ok(0);
        }

        let mut pause_correction = self.paused_total;
        if self.paused {
            pause_correction = pause_correction
                .checked_add(horizon.saturating_sub(self.paused_at))
                .ok_or(StreamError::MathOverflow)?;
        }

        let elapsed = (horizon - self.start_time).saturating_sub(pause_correction);
        let duration = self.end_time - self.start_time;
        if elapsed >= duration {
            return Ok(self.amount);
        }

        let accrued = (self.amount as u128)
            .checked_mul(elapsed as u128)
            .ok_or(StreamError::MathOverflow)?
            .checked_div(duration as u128)
            .ok_or(StreamError::MathOverflow)?;
        u64::try_from(accrued).map_err(|_| error!(StreamError::MathOverflow))
    }

    pub fn withdrawable(&self, now: u64) -> Result<u64> {
        Ok(self.accrued(now)?.saturating_sub(self.withdrawn))
    }

    /// Pays out of the accrued balance. `None` is the withdraw-all
    /// sentinel; explicit requests above the accrued balance fail, and the
    /// per-withdrawal limit caps both forms. Returns the gross amount paid.
    pub fn apply_withdraw(&mut self, now: u64, requested: Option<u64>) -> Result<u64> {
        require!(!self.canceled, StreamError::StreamAlreadyCanceled);

        let available = self.withdrawable(now)?;
        let paid = match requested {
            Some(amount) => {
                require!(amount <= available, StreamError::InsufficientAccrued);
                if let Some(limit) = self.withdraw_limit {
                    require!(amount <= limit, StreamError::WithdrawLimitExceeded);
                }
                amount
            }
            None => match self.withdraw_limit {
                Some(limit) => available.min(limit),
                None => available,
            },
        };
        require!(paid > 0, StreamError::InsufficientAccrued);

        self.withdrawn = self
            .withdrawn
            .checked_add(paid)
            .ok_or(StreamError::MathOverflow)?;
        Ok(paid)
    }

    pub fn apply_pause(&mut self, now: u64) -> Result<()> {
        require!(!self.canceled, StreamError::StreamAlreadyCanceled);
        require!(!self.paused, StreamError::AlreadyPaused);
        self.paused = true;
        self.paused_at = now.max(self.start_time);
        Ok(())
    }

    pub fn apply_resume(&mut self, now: u64) -> Result<()> {
        require!(!self.canceled, StreamError::StreamAlreadyCanceled);
        require!(self.paused, StreamError::NotPaused);
        let span = now.saturating_sub(self.paused_at);
        self.paused_total = self
            .paused_total
            .checked_add(span)
            .ok_or(StreamError::MathOverflow)?;
        self.paused = false;
        self.paused_at = 0;
        Ok(())
    }

    /// Freezes accrual and splits the remaining committed amount between
    /// the receiver (accrued but unwithdrawn, gross of fee) and the sender
    /// (everything that never vested).
    pub fn apply_cancel(&mut self, now: u64) -> Result<StreamSettlement> {
        require!(!self.canceled, StreamError::StreamAlreadyCanceled);
        let accrued = self.accrued(now)?;
        self.canceled = true;
        self.canceled_at = now;

        let receiver_due = accrued
            .checked_sub(self.withdrawn)
            .ok_or(StreamError::MathOverflow)?;
        let sender_refund = self
            .amount
            .checked_sub(accrued)
            .ok_or(StreamError::MathOverflow)?;
        Ok(StreamSettlement { receiver_due, sender_refund })
    }

    pub fn is_closed(&self) -> bool {
        self.canceled || self.withdrawn == self.amount
    }
}

#[derive(Accounts)]
#[instruction(receiver: Pubkey, start_time: u64, end_time: u64, amount: u64)]
pub struct InitStream<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    #[account(
        mut,
        constraint = vault.authority == sender.key() @ StreamError::VaultAuthorityMismatch
    )]
    pub vault: Account<'info, EscrowVault>,

    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init,
        payer = sender,
        space = 8 + Stream::INIT_SPACE,
        seeds = [
            b"stream",
            vault.key().as_ref(),
            &vault.stream_count.to_le_bytes()
        ],
        bump,
    )]
    pub stream: Account<'info, Stream>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawStream<'info> {
    #[account(mut)]
    pub receiver: Signer<'info>,

    #[account(
        mut,
        constraint = stream.receiver == receiver.key() @ StreamError::ReceiverMismatch
    )]
    pub stream: Account<'info, Stream>,

    #[account(
        mut,
        constraint = stream.escrow_vault == vault.key() @ StreamError::VaultMismatch
    )]
    pub vault: Account<'info, EscrowVault>,

    #[account(
        constraint = stream.fee_vault == fee_vault.key() @ StreamError::FeeVaultMismatch
    )]
    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init_if_needed,
        payer = receiver,
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
pub struct PauseStream<'info> {
    pub sender: Signer<'info>,

    #[account(
        mut,
        constraint = stream.sender == sender.key() @ StreamError::SenderMismatch
    )]
    pub stream: Account<'info, Stream>,
}

#[derive(Accounts)]
pub struct ResumeStream<'info> {
    pub sender: Signer<'info>,

    #[account(
        mut,
        constraint = stream.sender == sender.key() @ StreamError::SenderMismatch
    )]
    pub stream: Account<'info, Stream>,
}

#[derive(Accounts)]
pub struct CancelStream<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    #[account(
        mut,
        constraint = stream.sender == sender.key() @ StreamError::SenderMismatch
    )]
    pub stream: Account<'info, Stream>,

    #[account(
        mut,
        constraint = stream.escrow_vault == vault.key() @ StreamError::VaultMismatch
    )]
    pub vault: Account<'info, EscrowVault>,

    #[account(
        constraint = stream.fee_vault == fee_vault.key() @ StreamError::FeeVaultMismatch
    )]
    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init_if_needed,
        payer = sender,
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
#[instruction(receiver: Pubkey, amount: u64)]
pub struct InstantTransfer<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    #[account(
        mut,
        constraint = vault.authority == sender.key() @ StreamError::VaultAuthorityMismatch
    )]
    pub vault: Account<'info, EscrowVault>,

    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        init_if_needed,
        payer = sender,
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

    fn stream(start: u64, end: u64, amount: u64) -> Stream {
        Stream {
            sender: Pubkey::new_unique(),
            receiver: Pubkey::new_unique(),
            token_kind: TokenKind::Native,
            start_time: start,
            end_time: end,
            amount,
            withdrawn: 0,
            paused: false,
            paused_at: 0,
            paused_total: 0,
            canceled: false,
            canceled_at: 0,
            withdraw_limit: None,
            escrow_vault: Pubkey::new_unique(),
            fee_vault: Pubkey::new_unique(),
            created_at: 0,
            bump: 255,
        }
    }

    #[test]
    fn accrues_linearly() {
        let s = stream(0, 100, 1000);
        assert_eq!(s.accrued(0).unwrap(), 0);
        assert_eq!(s.accrued(25).unwrap(), 250);
        assert_eq!(s.accrued(50).unwrap(), 500);
        assert_eq!(s.accrued(100).unwrap(), 1000);
        assert_eq!(s.accrued(10_000).unwrap(), 1000);
    }

    #[test]
    fn nothing_accrues_before_start() {
        let s = stream(500, 600, 1000);
        assert_eq!(s.accrued(0).unwrap(), 0);
        assert_eq!(s.accrued(500).unwrap(), 0);
        assert_eq!(s.withdrawable(499).unwrap(), 0);
    }

    #[test]
    fn accrual_is_monotonic_across_pause_history() {
        let mut s = stream(0, 100, 1000);
        s.apply_pause(20).unwrap();
        s.apply_resume(40).unwrap();
        s.apply_pause(70).unwrap();

        let mut last = 0;
        for now in 0..200 {
            let accrued = s.accrued(now).unwrap();
            assert!(accrued >= last, "accrual decreased at t={}", now);
            last = accrued;
        }
    }

    #[test]
    fn pause_freezes_and_resume_extends() {
        // Paused 20..40, so at t=80 only 60 effective seconds of a
        // 100-second stream have elapsed.
        let mut s = stream(0, 100, 1000);
        s.apply_pause(20).unwrap();
        assert_eq!(s.accrued(20).unwrap(), 200);
        assert_eq!(s.accrued(39).unwrap(), 200);
        s.apply_resume(40).unwrap();
        assert_eq!(s.paused_total, 20);
        assert_eq!(s.accrued(80).unwrap(), 600);
        assert_eq!(s.accrued(120).unwrap(), 1000);
    }

    #[test]
    fn pause_before_start_does_not_deflate_accrual() {
        let mut s = stream(100, 200, 1000);
        s.apply_pause(10).unwrap();
        assert_eq!(s.paused_at, 100);
        s.apply_resume(50).unwrap();
        assert_eq!(s.paused_total, 0);
        assert_eq!(s.accrued(150).unwrap(), 500);
    }

    #[test]
    fn pause_state_errors() {
        let mut s = stream(0, 100, 1000);
        assert_eq!(s.apply_resume(10), Err(StreamError::NotPaused.into()));
        s.apply_pause(10).unwrap();
        assert_eq!(s.apply_pause(20), Err(StreamError::AlreadyPaused.into()));
        s.apply_resume(30).unwrap();
        s.apply_cancel(40).unwrap();
        assert_eq!(s.apply_pause(50), Err(StreamError::StreamAlreadyCanceled.into()));
        assert_eq!(s.apply_resume(50), Err(StreamError::StreamAlreadyCanceled.into()));
    }

    #[test]
    fn withdraw_tracks_accrual() {
        // At t=50 exactly half the 1000 has vested.
        let mut s = stream(0, 100, 1000);
        assert_eq!(s.apply_withdraw(50, Some(500)).unwrap(), 500);
        assert_eq!(s.withdrawn, 500);
        assert_eq!(
            s.apply_withdraw(50, Some(1)),
            Err(StreamError::InsufficientAccrued.into())
        );
        assert!(s.withdrawn <= s.accrued(50).unwrap());
    }

    #[test]
    fn withdraw_all_sentinel_pays_everything_available() {
        let mut s = stream(0, 100, 1000);
        s.withdrawn = 100;
        assert_eq!(s.apply_withdraw(60, None).unwrap(), 500);
        assert_eq!(s.withdrawn, 600);
        assert!(!s.is_closed());
        assert_eq!(s.apply_withdraw(200, None).unwrap(), 400);
        assert!(s.is_closed());
    }

    #[test]
    fn withdraw_limit_caps_payouts() {
        let mut s = stream(0, 100, 1000);
        s.token_kind = TokenKind::Token { mint: Pubkey::new_unique(), decimals: 6 };
        s.withdraw_limit = Some(150);
        assert_eq!(
            s.apply_withdraw(50, Some(200)),
            Err(StreamError::WithdrawLimitExceeded.into())
        );
        assert_eq!(s.apply_withdraw(50, None).unwrap(), 150);
        assert_eq!(s.apply_withdraw(50, Some(150)).unwrap(), 150);
        assert_eq!(s.withdrawn, 300);
    }

    #[test]
    fn zero_withdraw_is_rejected() {
        let mut s = stream(100, 200, 1000);
        assert_eq!(
            s.apply_withdraw(50, None),
            Err(StreamError::InsufficientAccrued.into())
        );
    }

    #[test]
    fn cancel_conserves_the_committed_amount() {
        let mut s = stream(0, 100, 1000);
        s.apply_withdraw(30, Some(250)).unwrap();
        let settlement = s.apply_cancel(60).unwrap();
        assert_eq!(settlement.receiver_due, 350);
        assert_eq!(settlement.sender_refund, 400);
        assert_eq!(
            s.withdrawn + settlement.receiver_due + settlement.sender_refund,
            s.amount
        );
        assert!(s.is_closed());
    }

    #[test]
    fn cancel_freezes_accrual() {
        let mut s = stream(0, 100, 1000);
        s.apply_cancel(40).unwrap();
        assert_eq!(s.accrued(40).unwrap(), 400);
        assert_eq!(s.accrued(90).unwrap(), 400);
        assert_eq!(
            s.apply_cancel(90),
            Err(StreamError::StreamAlreadyCanceled.into())
        );
        assert_eq!(
            s.apply_withdraw(90, Some(1)),
            Err(StreamError::StreamAlreadyCanceled.into())
        );
    }

    #[test]
    fn cancel_after_end_refunds_nothing() {
        let mut s = stream(0, 100, 1000);
        let settlement = s.apply_cancel(150).unwrap();
        assert_eq!(settlement.receiver_due, 1000);
        assert_eq!(settlement.sender_refund, 0);
    }

    #[test]
    fn terms_validation() {
        let native = TokenKind::Native;
        let token = TokenKind::Token { mint: Pubkey::new_unique(), decimals: 9 };
        assert!(Stream::validate_terms(0, 100, 1000, None, &native).is_ok());
        assert_eq!(
            Stream::validate_terms(100, 100, 1000, None, &native),
            Err(StreamError::InvalidTimeFrame.into())
        );
        assert_eq!(
            Stream::validate_terms(0, 100, 0, None, &native),
            Err(StreamError::InvalidAmount.into())
        );
        assert_eq!(
            Stream::validate_terms(0, 100, 1000, Some(10), &native),
            Err(StreamError::WithdrawLimitUnsupported.into())
        );
        assert!(Stream::validate_terms(0, 100, 1000, Some(10), &token).is_ok());
    }

    #[test]
    fn token_kind_seed_is_stable() {
        let mint = Pubkey::new_unique();
        let kind = TokenKind::Token { mint, decimals: 6 };
        assert_eq!(kind.seed(), mint.to_bytes());
        assert_eq!(TokenKind::Native.seed(), [0u8; 32]);
        assert!(TokenKind::Native.is_native());
        assert!(!kind.is_native());
    }
}
