//! Claim fee math.
//!
//! ```text
//! fee    = floor(amount_received * fee_bps / 10000)
//! payout = amount_received - fee
//! ```
//!
//! The multiplication is checked; an overflow is an error, never a wrap.

use lockbox_types::constants::{BPS_DENOMINATOR, MAX_FEE_BPS};
use lockbox_types::{LockboxError, Result};

/// How a claimed amount is split between recipient and fee beneficiary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub payout: u128,
    pub fee: u128,
}

/// Split `amount` at `fee_bps`. `payout + fee == amount` always holds.
///
/// # Errors
/// - `FeeOutOfRange` if `fee_bps > 10000`
/// - `FeeOverflow` if `amount * fee_bps` overflows `u128`
pub fn split(amount: u128, fee_bps: u16) -> Result<FeeSplit> {
    ensure_fee_in_range(fee_bps)?;
    let fee = amount
        .checked_mul(u128::from(fee_bps))
        .ok_or(LockboxError::FeeOverflow { amount, fee_bps })?
        / BPS_DENOMINATOR;
    Ok(FeeSplit {
        payout: amount - fee,
        fee,
    })
}

pub fn ensure_fee_in_range(fee_bps: u16) -> Result<()> {
    if fee_bps > MAX_FEE_BPS {
        return Err(LockboxError::FeeOutOfRange {
            fee_bps,
            max_bps: MAX_FEE_BPS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_and_a_half_percent_of_1000() {
        assert_eq!(split(1000, 250).unwrap(), FeeSplit { payout: 975, fee: 25 });
    }

    #[test]
    fn fee_rounds_down() {
        // 990 * 250 / 10000 = 24.75
        assert_eq!(split(990, 250).unwrap(), FeeSplit { payout: 966, fee: 24 });
        assert_eq!(split(3, 3333).unwrap(), FeeSplit { payout: 3, fee: 0 });
    }

    #[test]
    fn zero_and_full_rates() {
        assert_eq!(split(500, 0).unwrap(), FeeSplit { payout: 500, fee: 0 });
        assert_eq!(split(500, 10_000).unwrap(), FeeSplit { payout: 0, fee: 500 });
    }

    #[test]
    fn conservation_over_a_range() {
        for amount in [1u128, 7, 99, 1000, 123_456_789, u128::MAX / 10_000] {
            for bps in [0u16, 1, 30, 250, 9_999, 10_000] {
                let s = split(amount, bps).unwrap();
                assert_eq!(s.payout + s.fee, amount, "amount={amount} bps={bps}");
                assert_eq!(s.fee, amount * u128::from(bps) / 10_000);
            }
        }
    }

    #[test]
    fn overflow_is_an_error() {
        let err = split(u128::MAX, 250).unwrap_err();
        assert_eq!(
            err,
            LockboxError::FeeOverflow {
                amount: u128::MAX,
                fee_bps: 250
            }
        );
        // A zero rate can never overflow.
        assert!(split(u128::MAX, 0).is_ok());
    }

    #[test]
    fn out_of_range_rate_rejected() {
        assert!(matches!(
            split(100, 10_001),
            Err(LockboxError::FeeOutOfRange { .. })
        ));
    }
}
