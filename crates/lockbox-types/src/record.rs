//! # CustodyRecord: the per-deposit ledger entry
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  claim (secret, ≤ deadline)  ┌─────────┐
//!   │ ACTIVE ├─────────────────────────────▶│ CLAIMED │
//!   └───┬────┘                              └─────────┘
//!       │ refund (> deadline)
//!       ▼
//!   ┌──────────┐
//!   │ REFUNDED │
//!   └──────────┘
//! ```
//!
//! The state is derived from the two terminal flags. They are mutually
//! exclusive and monotonic: once either is set the record never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, EscrowId, LockboxError, Result, SecretHash, TokenId};

/// Lifecycle state of a custody record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyState {
    /// Value is held; claim or refund may still happen.
    Active,
    /// Recipient revealed the secret in time. **Terminal.**
    Claimed,
    /// Sender recovered the value after expiry. **Terminal.**
    Refunded,
}

impl CustodyState {
    /// Can a record in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Claimed | Self::Refunded))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for CustodyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// A custody entry. Created once on deposit, mutated once on claim or
/// refund, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    /// Record identifier.
    pub id: EscrowId,
    /// Depositing party; sole refund beneficiary.
    pub sender: AccountId,
    /// Asset held.
    pub token: TokenId,
    /// Nominal amount the sender intended to transfer in.
    pub amount_expected: u128,
    /// Amount actually credited to custody (balance delta).
    pub amount_received: u128,
    /// Sole claim beneficiary.
    pub recipient: AccountId,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Last instant a claim is valid. Refunds are valid strictly after it.
    pub deadline: DateTime<Utc>,
    /// Commitment to the secret, bound to the recipient.
    pub secret_hash: SecretHash,
    /// Claim path taken.
    pub claimed: bool,
    /// Refund path taken.
    pub refunded: bool,
}

impl CustodyRecord {
    /// Current lifecycle state derived from the terminal flags.
    #[must_use]
    pub fn state(&self) -> CustodyState {
        match (self.claimed, self.refunded) {
            (false, false) => CustodyState::Active,
            (true, _) => CustodyState::Claimed,
            (false, true) => CustodyState::Refunded,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == CustodyState::Active
    }

    /// A record with nothing received is treated as absent.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.amount_received > 0
    }

    /// Fail with `AlreadyTerminal` unless the record is still active.
    pub fn ensure_active(&self) -> Result<()> {
        let state = self.state();
        if state.is_terminal() {
            return Err(LockboxError::AlreadyTerminal { id: self.id, state });
        }
        Ok(())
    }

    /// Is a claim still inside the window at `now`?
    #[must_use]
    pub fn claim_window_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline
    }

    /// Transition to CLAIMED.
    pub fn mark_claimed(&mut self) -> Result<()> {
        self.transition_to(CustodyState::Claimed)
    }

    /// Transition to REFUNDED.
    pub fn mark_refunded(&mut self) -> Result<()> {
        self.transition_to(CustodyState::Refunded)
    }

    fn transition_to(&mut self, target: CustodyState) -> Result<()> {
        let state = self.state();
        if !state.can_transition_to(target) {
            return Err(LockboxError::AlreadyTerminal { id: self.id, state });
        }
        match target {
            CustodyState::Claimed => self.claimed = true,
            CustodyState::Refunded => self.refunded = true,
            CustodyState::Active => {}
        }
        Ok(())
    }
}

/// Dummy record for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl CustodyRecord {
    pub fn dummy(id: EscrowId, amount: u128) -> Self {
        let now = Utc::now();
        Self {
            id,
            sender: AccountId::random(),
            token: TokenId::from_symbol("USDT"),
            amount_expected: amount,
            amount_received: amount,
            recipient: AccountId::random(),
            created_at: now,
            deadline: now + chrono::Duration::hours(1),
            secret_hash: SecretHash([0x11; 32]),
            claimed: false,
            refunded: false,
        }
    }
}
