//! Release authorization: the claim / refund state machine.
//!
//! The deadline is the single pivot:
//!
//! ```text
//!            now ≤ deadline              now > deadline
//!   ───────────────────────────────┬──────────────────────────▶
//!     claim (recipient + secret)   │   refund (sender)
//! ```
//!
//! Both paths flip the record to its terminal state before any token call.
//! If the token then fails, the record is restored and the error returned,
//! so a rejected call leaves no trace.

use lockbox_types::{AccountId, EscrowId, LedgerEvent, LockboxError, Result};

use crate::fee;
use crate::ledger::EscrowLedger;
use crate::safe_transfer;

/// Outcome of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub id: EscrowId,
    /// Amount sent to the recipient.
    pub payout: u128,
    /// Fee charged; `payout + fee == amount_received`.
    pub fee: u128,
    /// The fee stayed in custody instead of reaching the administrator.
    pub fee_retained: bool,
}

/// Outcome of a successful refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundReceipt {
    pub id: EscrowId,
    pub amount: u128,
}

impl EscrowLedger {
    /// Release record `id` to its recipient on presentation of `secret`.
    ///
    /// The fee rate in force at claim time applies.
    ///
    /// # Errors
    /// - `Reentrant` while another operation runs
    /// - `RecordNotFound`, `AlreadyTerminal`
    /// - `DeadlinePassed` if `now > deadline`
    /// - `NotRecipient` if `caller` is not the recipient
    /// - `InvalidSecret` if the secret does not open the commitment
    /// - `FeeOverflow` if the fee cannot be computed
    /// - `TransferFailed` if the payout transfer fails (record restored)
    pub fn claim(&self, caller: AccountId, id: EscrowId, secret: &[u8]) -> Result<ClaimReceipt> {
        let _op = self.enter()?;
        let now = self.clock.now();

        let (previous, split, beneficiary, token) = {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            let fee_bps = state.fee_bps;
            let beneficiary = state.admin.current();
            let record = state.records.get_mut(id)?;
            record.ensure_active()?;
            if !record.claim_window_open(now) {
                return Err(LockboxError::DeadlinePassed {
                    deadline: record.deadline,
                    now,
                });
            }
            if caller != record.recipient {
                tracing::debug!(%id, caller = %caller, "Claim by non-recipient rejected");
                return Err(LockboxError::NotRecipient(id));
            }
            if !self
                .commitment
                .verify(&record.secret_hash, secret, &record.recipient, id)
            {
                tracing::debug!(%id, "Claim with invalid secret rejected");
                return Err(LockboxError::InvalidSecret(id));
            }
            let split = fee::split(record.amount_received, fee_bps)?;
            let token = state.tokens.get(&record.token)?;
            let previous = record.clone();
            record.mark_claimed()?;
            (previous, split, beneficiary, token)
        };

        if split.payout > 0 {
            if let Err(err) = safe_transfer::safe_transfer_out(
                token.as_ref(),
                &self.custody_account,
                &previous.recipient,
                split.payout,
            ) {
                tracing::warn!(%id, %err, "Claim payout failed; record restored");
                self.lock_state().records.restore(previous)?;
                return Err(err);
            }
        }

        let fee_retained = self.pay_fee(&previous, split.fee, beneficiary, token.as_ref());

        self.lock_state().emit(LedgerEvent::Claimed {
            id,
            recipient: previous.recipient,
            payout: split.payout,
            fee: split.fee,
        });
        tracing::info!(
            %id,
            recipient = %previous.recipient,
            payout = split.payout,
            fee = split.fee,
            fee_retained,
            "Custody claimed"
        );

        Ok(ClaimReceipt {
            id,
            payout: split.payout,
            fee: split.fee,
            fee_retained,
        })
    }

    /// Return record `id` in full to its sender after the deadline.
    ///
    /// # Errors
    /// - `Reentrant` while another operation runs
    /// - `RecordNotFound`, `AlreadyTerminal`
    /// - `NotExpired` if `now ≤ deadline`
    /// - `NotSender` if `caller` is not the sender
    /// - `TransferFailed` if the refund transfer fails (record restored)
    pub fn refund(&self, caller: AccountId, id: EscrowId) -> Result<RefundReceipt> {
        let _op = self.enter()?;
        let now = self.clock.now();

        let (previous, token) = {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            let record = state.records.get_mut(id)?;
            record.ensure_active()?;
            if record.claim_window_open(now) {
                return Err(LockboxError::NotExpired {
                    deadline: record.deadline,
                    now,
                });
            }
            if caller != record.sender {
                tracing::debug!(%id, caller = %caller, "Refund by non-sender rejected");
                return Err(LockboxError::NotSender(id));
            }
            let token = state.tokens.get(&record.token)?;
            let previous = record.clone();
            record.mark_refunded()?;
            (previous, token)
        };

        if let Err(err) = safe_transfer::safe_transfer_out(
            token.as_ref(),
            &self.custody_account,
            &previous.sender,
            previous.amount_received,
        ) {
            tracing::warn!(%id, %err, "Refund transfer failed; record restored");
            self.lock_state().records.restore(previous)?;
            return Err(err);
        }

        self.lock_state().emit(LedgerEvent::Refunded {
            id,
            sender: previous.sender,
            amount: previous.amount_received,
        });
        tracing::info!(
            %id,
            sender = %previous.sender,
            amount = previous.amount_received,
            "Custody refunded"
        );

        Ok(RefundReceipt {
            id,
            amount: previous.amount_received,
        })
    }
}
