use anchor_lang::prelude::*;

use crate::{StreamError, FEE_DENOMINATOR};

/// Protocol fee on a payout: `amount * fee_bps / 10000`, floor division.
pub fn calculate_fee_amount(amount: u64, fee_bps: u64) -> Result<u64> {
    let fee = (amount as u128)
        .checked_mul(fee_bps as u128)
        .ok_or(StreamError::MathOverflow)?
        .checked_div(FEE_DENOMINATOR as u128)
        .ok_or(StreamError::MathOverflow)?;
    u64::try_from(fee).map_err(|_| error!(StreamError::MathOverflow))
}

/// Splits a gross payout into (net, fee).
pub fn split_fee(amount: u64, fee_bps: u64) -> Result<(u64, u64)> {
    let fee = calculate_fee_amount(amount, fee_bps)?;
    let net = amount.checked_sub(fee).ok_or(StreamError::MathOverflow)?;
    Ok((net, fee))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_skim_matches_basis_points() {
        // 250 bps on a 1000-unit payout.
        assert_eq!(calculate_fee_amount(1000, 250).unwrap(), 25);
        assert_eq!(split_fee(1000, 250).unwrap(), (975, 25));
    }

    #[test]
    fn fee_rounds_down() {
        assert_eq!(calculate_fee_amount(999, 250).unwrap(), 24);
        assert_eq!(calculate_fee_amount(1, 9999).unwrap(), 0);
    }

    #[test]
    fn zero_fee_takes_nothing() {
        assert_eq!(split_fee(1000, 0).unwrap(), (1000, 0));
    }

    #[test]
    fn full_fee_takes_everything() {
        assert_eq!(split_fee(1000, FEE_DENOMINATOR).unwrap(), (0, 1000));
    }

    #[test]
    fn large_amounts_do_not_overflow() {
        let (net, fee) = split_fee(u64::MAX, 250).unwrap();
        assert_eq!(net + fee, u64::MAX);
    }
}
