use anchor_lang::prelude::*;

use crate::{
    CreateFeeVault, CreateVault, Deposit, FeePercentageUpdated, FeeVault, FeeVaultCreated,
    FeesWithdrawn, StreamError, TokenKind, UpdateFeePercentage, VaultCreated, VaultDeposited,
    VaultWithdrawn, WithdrawFees, WithdrawVault,
};

pub fn create_fee_vault(ctx: Context<CreateFeeVault>, fee_percentage: u64) -> Result<()> {
    FeeVault::validate_fee_bps(fee_percentage)?;

    let fee_vault = &mut ctx.accounts.fee_vault;
    fee_vault.fee_owner = ctx.accounts.fee_owner.key();
    fee_vault.fee_bps = fee_percentage;
    fee_vault.bump = ctx.bumps.fee_vault;

    emit!(FeeVaultCreated {
        fee_vault: fee_vault.key(),
        fee_owner: fee_vault.fee_owner,
        fee_bps: fee_percentage,
    });

    msg!("Fee vault created for {} at {} bps", fee_vault.fee_owner, fee_percentage);
    Ok(())
}

pub fn update_fee_percentage(ctx: Context<UpdateFeePercentage>, fee_percentage: u64) -> Result<()> {
    FeeVault::validate_fee_bps(fee_percentage)?;

    let fee_vault = &mut ctx.accounts.fee_vault;
    let old_fee_bps = fee_vault.fee_bps;
    fee_vault.fee_bps = fee_percentage;

    emit!(FeePercentageUpdated {
        fee_vault: fee_vault.key(),
        old_fee_bps,
        new_fee_bps: fee_percentage,
    });

    msg!("Fee percentage changed from {} to {} bps", old_fee_bps, fee_percentage);
    Ok(())
}

pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
    let fee_accrual = &mut ctx.accounts.fee_accrual;

    let amount = fee_accrual.collected;
    require!(amount > 0, StreamError::NoCollectedFees);
    fee_accrual.collected = 0;

    emit!(FeesWithdrawn {
        fee_vault: ctx.accounts.fee_vault.key(),
        token_kind: fee_accrual.token_kind.clone(),
        amount,
    });

    msg!("Withdrew {} collected fees", amount);
    Ok(())
}

pub fn create_vault(ctx: Context<CreateVault>, token_kind: TokenKind, authority: Pubkey) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    vault.authority = authority;
    vault.token_kind = token_kind;
    vault.deposited = 0;
    vault.committed = 0;
    vault.stream_count = 0;
    vault.bump = ctx.bumps.vault;

    emit!(VaultCreated {
        vault: vault.key(),
        authority,
        token_kind: vault.token_kind.clone(),
    });

    msg!("Vault created for authority {}", authority);
    Ok(())
}

pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    require!(amount > 0, StreamError::InvalidAmount);

    let vault = &mut ctx.accounts.vault;
    vault.deposit(amount)?;

    emit!(VaultDeposited {
        vault: vault.key(),
        funder: ctx.accounts.funder.key(),
        amount,
        deposited: vault.deposited,
    });

    msg!("Deposited {}. Vault balance: {}", amount, vault.deposited);
    Ok(())
}

pub fn withdraw_vault(ctx: Context<WithdrawVault>, amount: u64) -> Result<()> {
    require!(amount > 0, StreamError::InvalidAmount);

    let vault = &mut ctx.accounts.vault;
    vault.withdraw(amount)?;

    emit!(VaultWithdrawn {
        vault: vault.key(),
        authority: ctx.accounts.authority.key(),
        amount,
        deposited: vault.deposited,
    });

    msg!("Withdrew {} uncommitted. Vault balance: {}", amount, vault.deposited);
    Ok(())
}
