//! Notifications emitted by the ledger.
//!
//! Events form an append-only log observers can replay. Each committed
//! state change produces exactly one event; rejected calls produce none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, EscrowId, SecretHash, TokenId};

/// Ledger notification.
///
/// Externally tagged (`{"refunded":{...}}`): internally tagged enums are
/// buffered by serde, which cannot carry `u128` amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A custody record was created.
    Deposited {
        id: EscrowId,
        sender: AccountId,
        token: TokenId,
        amount_expected: u128,
        amount_received: u128,
        recipient: AccountId,
        deadline: DateTime<Utc>,
        secret_hash: SecretHash,
    },
    /// The recipient claimed a record.
    Claimed {
        id: EscrowId,
        recipient: AccountId,
        payout: u128,
        fee: u128,
    },
    /// The sender recovered an expired record.
    Refunded {
        id: EscrowId,
        sender: AccountId,
        amount: u128,
    },
    /// The fee rate changed.
    FeeChanged { old: u16, new: u16 },
    /// A claim fee stayed in custody instead of reaching the administrator.
    FeeRetained {
        id: EscrowId,
        token: TokenId,
        amount: u128,
    },
    /// Retained fees were swept to the administrator.
    FeesCollected {
        token: TokenId,
        to: AccountId,
        amount: u128,
    },
    /// The administrator role moved. `new` is `None` after renouncement.
    AdministrationTransferred {
        previous: Option<AccountId>,
        new: Option<AccountId>,
    },
    /// A token collaborator was registered.
    TokenRegistered { token: TokenId },
}

impl LedgerEvent {
    /// Stable event name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "DEPOSITED",
            Self::Claimed { .. } => "CLAIMED",
            Self::Refunded { .. } => "REFUNDED",
            Self::FeeChanged { .. } => "FEE_CHANGED",
            Self::FeeRetained { .. } => "FEE_RETAINED",
            Self::FeesCollected { .. } => "FEES_COLLECTED",
            Self::AdministrationTransferred { .. } => "ADMINISTRATION_TRANSFERRED",
            Self::TokenRegistered { .. } => "TOKEN_REGISTERED",
        }
    }

    /// The record this event concerns, if any.
    #[must_use]
    pub fn escrow_id(&self) -> Option<EscrowId> {
        match self {
            Self::Deposited { id, .. }
            | Self::Claimed { id, .. }
            | Self::Refunded { id, .. }
            | Self::FeeRetained { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        let ev = LedgerEvent::FeeChanged { old: 0, new: 250 };
        assert_eq!(ev.kind(), "FEE_CHANGED");
        assert_eq!(ev.escrow_id(), None);

        let ev = LedgerEvent::Claimed {
            id: EscrowId(3),
            recipient: AccountId::ZERO,
            payout: 975,
            fee: 25,
        };
        assert_eq!(ev.kind(), "CLAIMED");
        assert_eq!(ev.escrow_id(), Some(EscrowId(3)));
    }

    #[test]
    fn serde_tagged() {
        let ev = LedgerEvent::Refunded {
            id: EscrowId(2),
            sender: AccountId::from_bytes([5; 32]),
            amount: 500,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.starts_with("{\"refunded\":{"));
        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn amounts_beyond_u64_replay() {
        let big = u128::from(u64::MAX) + 1;
        let events = vec![
            LedgerEvent::Refunded {
                id: EscrowId(1),
                sender: AccountId::from_bytes([5; 32]),
                amount: big,
            },
            LedgerEvent::Claimed {
                id: EscrowId(2),
                recipient: AccountId::from_bytes([6; 32]),
                payout: u128::MAX - 1,
                fee: 1,
            },
            LedgerEvent::FeesCollected {
                token: TokenId::from_bytes([7; 32]),
                to: AccountId::from_bytes([8; 32]),
                amount: u128::MAX,
            },
        ];
        let json = serde_json::to_string(&events).unwrap();
        assert!(json.contains("18446744073709551616"));
        let back: Vec<LedgerEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
