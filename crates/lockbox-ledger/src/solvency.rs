//! Custody solvency invariant.
//!
//! ```text
//! ∀ token: custody_balance(token) ≥ Σ(active amount_received) + retained_fees(token)
//! ```
//!
//! Custody may hold more than it owes (donations, tokens that faulted after
//! moving value) but never less.

use lockbox_types::{LockboxError, Result, TokenId};

use crate::ledger::EscrowLedger;
use crate::safe_transfer;

impl EscrowLedger {
    /// Sum of `amount_received` over active records of `token`.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the sum does not fit `u128`.
    pub fn active_liability(&self, token: &TokenId) -> Result<u128> {
        let state = self.lock_state();
        state
            .records
            .iter()
            .filter(|rec| rec.token == *token && rec.is_active())
            .try_fold(0u128, |acc, rec| {
                acc.checked_add(rec.amount_received)
                    .ok_or(LockboxError::AmountOverflow)
            })
    }

    /// Check that custody covers every active record plus retained fees.
    ///
    /// # Errors
    /// - `UnknownToken`, `TransferFailed` (balance query)
    /// - `AmountOverflow`
    /// - `SolvencyViolation` if custody holds less than it owes
    pub fn verify_solvency(&self, token_id: &TokenId) -> Result<()> {
        let token = self.token(token_id)?;
        let owed = self
            .active_liability(token_id)?
            .checked_add(self.retained_fees(token_id))
            .ok_or(LockboxError::AmountOverflow)?;
        let held = safe_transfer::balance_of(token.as_ref(), &self.custody_account)?;
        if held < owed {
            tracing::error!(token = %token_id, held, owed, "Custody solvency violated");
            return Err(LockboxError::SolvencyViolation {
                reason: format!("token {token_id}: custody holds {held}, owes {owed}"),
            });
        }
        Ok(())
    }
}
