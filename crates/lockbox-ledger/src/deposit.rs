//! Deposit accounting.
//!
//! The ledger credits what custody actually received, measured as the
//! change in its own token balance across the transfer-in. Fee-on-transfer
//! tokens therefore produce records worth less than the nominal amount, and
//! payouts can never exceed what custody holds.

use chrono::{DateTime, Utc};
use lockbox_types::{
    AccountId, CustodyRecord, EscrowId, LedgerEvent, LockboxError, Result, SecretHash, TokenId,
};

use crate::ledger::EscrowLedger;
use crate::safe_transfer;

/// Parameters of a new custody record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    pub token: TokenId,
    pub amount_expected: u128,
    pub recipient: AccountId,
    pub deadline: DateTime<Utc>,
    pub secret_hash: SecretHash,
}

/// Amount credited to custody between two balance samples.
///
/// # Errors
/// - `BalanceInvariantViolation` if the balance went down
/// - `ZeroReceipt` if it did not move
pub fn received_delta(before: u128, after: u128) -> Result<u128> {
    if after < before {
        return Err(LockboxError::BalanceInvariantViolation { before, after });
    }
    match after - before {
        0 => Err(LockboxError::ZeroReceipt),
        delta => Ok(delta),
    }
}

impl EscrowLedger {
    /// Take custody of `amount_expected` of `token` from `caller` and
    /// record it for `recipient`.
    ///
    /// # Errors
    /// - `Reentrant` while another operation runs
    /// - `NullIdentity`, `ZeroAmount`, `ZeroSecretHash`, `DeadlineTooSoon`,
    ///   `UnknownToken` for invalid input (nothing is transferred)
    /// - `Configuration` if `now + min_lock` is past the end of time
    /// - `TransferFailed` if the token rejects the pull
    /// - `BalanceInvariantViolation` if custody shrank across the pull
    /// - `ZeroReceipt` if custody did not grow
    pub fn deposit(&self, caller: AccountId, request: DepositRequest) -> Result<EscrowId> {
        let _op = self.enter()?;
        let now = self.clock.now();
        self.validate_deposit(&caller, &request, now)
            .inspect_err(|err| tracing::debug!(sender = %caller, %err, "Deposit rejected"))?;
        let token = self.token(&request.token)?;

        let before = safe_transfer::balance_of(token.as_ref(), &self.custody_account)?;
        safe_transfer::safe_transfer_in(
            token.as_ref(),
            &caller,
            &self.custody_account,
            request.amount_expected,
        )?;
        let after = safe_transfer::balance_of(token.as_ref(), &self.custody_account)?;
        let amount_received = received_delta(before, after).inspect_err(|err| {
            tracing::warn!(token = %request.token, before, after, %err, "Transfer-in misreported");
        })?;

        let mut state = self.lock_state();
        let id = state.records.insert_with(|id| CustodyRecord {
            id,
            sender: caller,
            token: request.token,
            amount_expected: request.amount_expected,
            amount_received,
            recipient: request.recipient,
            created_at: now,
            deadline: request.deadline,
            secret_hash: request.secret_hash,
            claimed: false,
            refunded: false,
        });
        state.emit(LedgerEvent::Deposited {
            id,
            sender: caller,
            token: request.token,
            amount_expected: request.amount_expected,
            amount_received,
            recipient: request.recipient,
            deadline: request.deadline,
            secret_hash: request.secret_hash,
        });

        tracing::info!(
            %id,
            sender = %caller,
            recipient = %request.recipient,
            token = %request.token,
            amount_expected = request.amount_expected,
            amount_received,
            deadline = %request.deadline,
            "Deposit recorded"
        );
        Ok(id)
    }

    fn validate_deposit(
        &self,
        caller: &AccountId,
        request: &DepositRequest,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if caller.is_zero() {
            return Err(LockboxError::NullIdentity { field: "sender" });
        }
        if request.token.is_zero() {
            return Err(LockboxError::NullIdentity { field: "token" });
        }
        if request.amount_expected == 0 {
            return Err(LockboxError::ZeroAmount);
        }
        if request.recipient.is_zero() {
            return Err(LockboxError::NullIdentity { field: "recipient" });
        }
        if request.secret_hash.is_zero() {
            return Err(LockboxError::ZeroSecretHash);
        }
        let earliest = now.checked_add_signed(self.min_lock).ok_or_else(|| {
            LockboxError::Configuration(format!(
                "minimum lock window overflows the clock at {now}"
            ))
        })?;
        if request.deadline < earliest {
            return Err(LockboxError::DeadlineTooSoon {
                deadline: request.deadline,
                earliest,
            });
        }
        Ok(())
    }
}
