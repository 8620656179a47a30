use anchor_lang::prelude::*;

use crate::{StreamError, TokenKind};

pub const FEE_DENOMINATOR: u64 = 10_000;

/// Internal balance ledger backing the streams of one authority and token
/// kind. `committed` is the portion reserved by active streams; only the
/// uncommitted remainder may leave through direct withdrawals or instant
/// transfers.
#[account]
#[derive(InitSpace)]
pub struct EscrowVault {
    /// Signing owner for direct vaults, the Safe PDA for treasury vaults.
    pub authority: Pubkey,
    pub token_kind: TokenKind,
    pub deposited: u64,
    pub committed: u64,
    pub stream_count: u64,
    pub bump: u8,
}

impl EscrowVault {
    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        self.deposited = self
            .deposited
            .checked_add(amount)
            .ok_or(StreamError::MathOverflow)?;
        Ok(())
    }

    pub fn reserve_for_stream(&mut self, amount: u64) -> Result<()> {
        let committed = self
            .committed
            .checked_add(amount)
            .ok_or(StreamError::MathOverflow)?;
        require!(committed <= self.deposited, StreamError::InsufficientVaultBalance);
        self.committed = committed;
        Ok(())
    }

    pub fn release_from_stream(&mut self, amount: u64) -> Result<()> {
        require!(amount <= self.committed, StreamError::OverRelease);
        self.committed -= amount;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: u64) -> Result<()> {
        require!(amount <= self.uncommitted(), StreamError::InsufficientVaultBalance);
        self.deposited -= amount;
        Ok(())
    }

    pub fn uncommitted(&self) -> u64 {
        self.deposited.saturating_sub(self.committed)
    }
}

/// Protocol fee configuration for one fee receiver. The percentage is
/// stored in basis points, i.e. scaled by 100 and truncated to two decimal
/// places before it reaches the program.
#[account]
#[derive(InitSpace)]
pub struct FeeVault {
    pub fee_owner: Pubkey,
    pub fee_bps: u64,
    pub bump: u8,
}

impl FeeVault {
    pub fn validate_fee_bps(fee_bps: u64) -> Result<()> {
        require!(fee_bps <= FEE_DENOMINATOR, StreamError::InvalidFeePercentage);
        Ok(())
    }
}

/// Collected fees for one (fee vault, token kind) pair, materialized on
/// the first skim.
#[account]
#[derive(InitSpace)]
pub struct FeeAccrual {
    pub fee_vault: Pubkey,
    pub token_kind: TokenKind,
    pub collected: u64,
    pub bump: u8,
}

impl FeeAccrual {
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.collected = self
            .collected
            .checked_add(amount)
            .ok_or(StreamError::MathOverflow)?;
        Ok(())
    }
}

#[derive(Accounts)]
#[instruction(fee_percentage: u64)]
pub struct CreateFeeVault<'info> {
    #[account(mut)]
    pub fee_owner: Signer<'info>,

    #[account(
        init,
        payer = fee_owner,
        space = 8 + FeeVault::INIT_SPACE,
        seeds = [b"fee_vault", fee_owner.key().as_ref()],
        bump,
    )]
    pub fee_vault: Account<'info, FeeVault>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateFeePercentage<'info> {
    pub fee_owner: Signer<'info>,

    #[account(
        mut,
        seeds = [b"fee_vault", fee_owner.key().as_ref()],
        bump = fee_vault.bump,
        constraint = fee_vault.fee_owner == fee_owner.key() @ StreamError::FeeOwnerMismatch
    )]
    pub fee_vault: Account<'info, FeeVault>,
}

#[derive(Accounts)]
pub struct WithdrawFees<'info> {
    pub fee_owner: Signer<'info>,

    #[account(
        constraint = fee_vault.fee_owner == fee_owner.key() @ StreamError::FeeOwnerMismatch
    )]
    pub fee_vault: Account<'info, FeeVault>,

    #[account(
        mut,
        constraint = fee_accrual.fee_vault == fee_vault.key() @ StreamError::FeeVaultMismatch
    )]
    pub fee_accrual: Account<'info, FeeAccrual>,
}

#[derive(Accounts)]
#[instruction(token_kind: TokenKind, authority: Pubkey)]
pub struct CreateVault<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + EscrowVault::INIT_SPACE,
        seeds = [
            b"vault",
            authority.as_ref(),
            token_kind.seed().as_ref()
        ],
        bump,
    )]
    pub vault: Account<'info, EscrowVault>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    pub funder: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, EscrowVault>,
}

#[derive(Accounts)]
pub struct WithdrawVault<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        constraint = vault.authority == authority.key() @ StreamError::VaultAuthorityMismatch
    )]
    pub vault: Account<'info, EscrowVault>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(deposited: u64, committed: u64) -> EscrowVault {
        EscrowVault {
            authority: Pubkey::new_unique(),
            token_kind: TokenKind::Native,
            deposited,
            committed,
            stream_count: 0,
            bump: 254,
        }
    }

    #[test]
    fn reserve_is_bounded_by_deposits() {
        let mut v = vault(500, 0);
        v.reserve_for_stream(300).unwrap();
        v.reserve_for_stream(200).unwrap();
        assert_eq!(v.committed, 500);
        // A fully reserved vault rejects even one more unit.
        assert_eq!(
            v.reserve_for_stream(1),
            Err(StreamError::InsufficientVaultBalance.into())
        );
        assert!(v.committed <= v.deposited);
    }

    #[test]
    fn withdraw_only_touches_the_uncommitted_portion() {
        let mut v = vault(500, 300);
        assert_eq!(v.uncommitted(), 200);
        assert_eq!(
            v.withdraw(201),
            Err(StreamError::InsufficientVaultBalance.into())
        );
        v.withdraw(200).unwrap();
        assert_eq!(v.deposited, 300);
        assert_eq!(v.committed, 300);
        assert!(v.committed <= v.deposited);
    }

    #[test]
    fn release_never_underflows_committed() {
        let mut v = vault(500, 100);
        assert_eq!(v.release_from_stream(101), Err(StreamError::OverRelease.into()));
        v.release_from_stream(100).unwrap();
        assert_eq!(v.committed, 0);
    }

    #[test]
    fn stream_payout_as_release_then_withdraw_preserves_the_invariant() {
        let mut v = vault(1000, 600);
        // A 250-unit stream payout leaving the vault.
        v.release_from_stream(250).unwrap();
        assert!(v.committed <= v.deposited);
        v.withdraw(250).unwrap();
        assert_eq!(v.deposited, 750);
        assert_eq!(v.committed, 350);
        assert!(v.committed <= v.deposited);
    }

    #[test]
    fn deposits_accumulate() {
        let mut v = vault(0, 0);
        v.deposit(400).unwrap();
        v.deposit(100).unwrap();
        assert_eq!(v.deposited, 500);
        assert_eq!(
            v.deposit(u64::MAX),
            Err(StreamError::MathOverflow.into())
        );
    }

    #[test]
    fn fee_bps_validation() {
        assert!(FeeVault::validate_fee_bps(0).is_ok());
        assert!(FeeVault::validate_fee_bps(FEE_DENOMINATOR).is_ok());
        assert_eq!(
            FeeVault::validate_fee_bps(FEE_DENOMINATOR + 1),
            Err(StreamError::InvalidFeePercentage.into())
        );
    }

    #[test]
    fn fee_accruals_accumulate() {
        let mut accrual = FeeAccrual {
            fee_vault: Pubkey::new_unique(),
            token_kind: TokenKind::Native,
            collected: 0,
            bump: 253,
        };
        accrual.credit(25).unwrap();
        accrual.credit(10).unwrap();
        assert_eq!(accrual.collected, 35);
    }
}
