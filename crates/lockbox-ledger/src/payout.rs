//! Fee legs and fee collection.
//!
//! The recipient's payout leg always runs first. Once it has gone out the
//! claim is final: a failure on the fee leg must not reopen the record, so
//! the fee stays in custody as a retained fee instead. The same happens when
//! no administrator exists to receive it.

use lockbox_types::{AccountId, CustodyRecord, LedgerEvent, Result, Token, TokenId};

use crate::ledger::EscrowLedger;
use crate::safe_transfer;

impl EscrowLedger {
    /// Send `fee` to `beneficiary`. Returns `true` if the fee was retained.
    pub(crate) fn pay_fee(
        &self,
        record: &CustodyRecord,
        fee: u128,
        beneficiary: Option<AccountId>,
        token: &dyn Token,
    ) -> bool {
        if fee == 0 {
            return false;
        }
        if let Some(admin) = beneficiary {
            match safe_transfer::safe_transfer_out(token, &self.custody_account, &admin, fee) {
                Ok(()) => return false,
                Err(err) => {
                    tracing::warn!(id = %record.id, fee, %err, "Fee transfer failed; fee retained");
                }
            }
        } else {
            tracing::warn!(id = %record.id, fee, "No administrator; fee retained");
        }

        let mut state = self.lock_state();
        let slot = state.retained_fees.entry(record.token).or_insert(0);
        // Retained fees are a subset of custody, which is itself a u128.
        *slot = slot.saturating_add(fee);
        state.emit(LedgerEvent::FeeRetained {
            id: record.id,
            token: record.token,
            amount: fee,
        });
        true
    }

    /// Sweep retained fees of `token` to the administrator.
    ///
    /// Returns the amount swept (zero if nothing was retained).
    ///
    /// # Errors
    /// - `Reentrant`, `Unauthorized`, `UnknownToken`
    /// - `TransferFailed` (retained balance restored)
    pub fn collect_fees(&self, caller: AccountId, token_id: TokenId) -> Result<u128> {
        let _op = self.enter()?;
        let (amount, token) = {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            state.admin.ensure_admin(&caller)?;
            let token = state.tokens.get(&token_id)?;
            let amount = state.retained_fees.remove(&token_id).unwrap_or(0);
            (amount, token)
        };
        if amount == 0 {
            return Ok(0);
        }

        if let Err(err) =
            safe_transfer::safe_transfer_out(token.as_ref(), &self.custody_account, &caller, amount)
        {
            tracing::warn!(token = %token_id, amount, %err, "Fee collection failed");
            self.lock_state().retained_fees.insert(token_id, amount);
            return Err(err);
        }

        self.lock_state().emit(LedgerEvent::FeesCollected {
            token: token_id,
            to: caller,
            amount,
        });
        tracing::info!(token = %token_id, to = %caller, amount, "Retained fees collected");
        Ok(amount)
    }
}
