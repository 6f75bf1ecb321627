//! Durable ledger state.
//!
//! A snapshot carries everything that must survive a restart: the record
//! table, the id counter, the fee rate, the administrator and retained
//! fees. Token handles, the clock and the notification log are runtime
//! wiring and are not persisted.

use std::collections::BTreeMap;

use lockbox_types::{AccountId, EscrowId, CustodyRecord, LockboxError, Result, TokenId};
use serde::{Deserialize, Serialize};

use crate::admin::Administration;
use crate::fee;
use crate::ledger::LedgerState;
use crate::registry::TokenRegistry;
use crate::table::RecordTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub records: Vec<CustodyRecord>,
    pub next_id: EscrowId,
    pub fee_bps: u16,
    pub admin: Option<AccountId>,
    pub retained_fees: Vec<(TokenId, u128)>,
}

impl LedgerSnapshot {
    pub(crate) fn capture(state: &LedgerState) -> Self {
        Self {
            records: state.records.iter().cloned().collect(),
            next_id: state.records.next_id(),
            fee_bps: state.fee_bps,
            admin: state.admin.current(),
            retained_fees: state
                .retained_fees
                .iter()
                .filter(|(_, amount)| **amount > 0)
                .map(|(token, amount)| (*token, *amount))
                .collect(),
        }
    }

    pub(crate) fn into_state(self, tokens: TokenRegistry) -> Result<LedgerState> {
        let records = RecordTable::from_records(self.records)?;
        if records.next_id() != self.next_id {
            return Err(LockboxError::Serialization(format!(
                "next id {} does not follow {} records",
                self.next_id,
                records.len()
            )));
        }
        fee::ensure_fee_in_range(self.fee_bps)?;
        if self.admin.is_some_and(|admin| admin.is_zero()) {
            return Err(LockboxError::NullIdentity { field: "admin" });
        }

        let mut retained_fees = BTreeMap::new();
        for (token, amount) in self.retained_fees {
            if retained_fees.insert(token, amount).is_some() {
                return Err(LockboxError::Serialization(format!(
                    "duplicate retained fee entry for {token}"
                )));
            }
        }

        Ok(LedgerState {
            records,
            fee_bps: self.fee_bps,
            admin: Administration::from_parts(self.admin),
            retained_fees,
            tokens,
            events: Vec::new(),
        })
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    /// Returns `Serialization` on encoder failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON. Consistency is checked when the ledger is rebuilt.
    ///
    /// # Errors
    /// Returns `Serialization` on malformed input.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use lockbox_types::{Clock, LedgerConfig, ManualClock, MemoryToken, ReturnStyle};

    use super::*;
    use crate::deposit::DepositRequest;
    use crate::ledger::EscrowLedger;

    const SECRET: &[u8] = b"persisted";

    #[test]
    fn restart_preserves_records_and_fees() {
        let usdt = TokenId::from_symbol("USDT");
        let token = Arc::new(MemoryToken::new(ReturnStyle::Bool));
        let clock = Arc::new(ManualClock::starting_now());
        let admin = AccountId::random();
        let config = LedgerConfig::new(admin, AccountId::random()).with_fee_bps(250);
        let registry = TokenRegistry::new().with(usdt, token.clone()).unwrap();
        let ledger = EscrowLedger::new(config.clone(), clock.clone(), registry.clone()).unwrap();

        let (sender, recipient) = (AccountId::random(), AccountId::random());
        token.mint(&sender, 2000);
        for id in [EscrowId(1), EscrowId(2)] {
            ledger
                .deposit(
                    sender,
                    DepositRequest {
                        token: usdt,
                        amount_expected: 1000,
                        recipient,
                        deadline: clock.now() + Duration::minutes(10),
                        secret_hash: ledger.commitment_for(SECRET, &recipient, id),
                    },
                )
                .unwrap();
        }
        ledger.renounce_administration(admin).unwrap();
        ledger.claim(recipient, EscrowId(1), SECRET).unwrap();

        let json = ledger.snapshot().unwrap().to_json().unwrap();
        let snap = LedgerSnapshot::from_json_str(&json).unwrap();
        assert_eq!(snap, ledger.snapshot().unwrap());

        let restored = EscrowLedger::from_snapshot(config, clock, registry, snap).unwrap();
        assert_eq!(restored.next_id(), EscrowId(3));
        assert_eq!(restored.current_admin(), None);
        assert_eq!(restored.fee_bps(), 250);
        assert_eq!(restored.retained_fees(&usdt), 25);
        assert!(restored.events().is_empty());
        assert!(matches!(
            restored.claim(recipient, EscrowId(1), SECRET),
            Err(LockboxError::AlreadyTerminal { .. })
        ));
        let receipt = restored.claim(recipient, EscrowId(2), SECRET).unwrap();
        assert_eq!(receipt.payout, 975);
    }

    #[test]
    fn snapshot_refused_while_operation_runs() {
        let ledger = EscrowLedger::new(
            LedgerConfig::new(AccountId::random(), AccountId::random()),
            Arc::new(ManualClock::starting_now()),
            TokenRegistry::new(),
        )
        .unwrap();
        let _op = ledger.enter().unwrap();
        assert_eq!(ledger.snapshot().unwrap_err(), LockboxError::Reentrant);
    }

    #[test]
    fn amounts_beyond_u64_survive_json() {
        let mut record = CustodyRecord::dummy(EscrowId(1), u128::MAX);
        record.amount_expected = u128::MAX;
        let snap = LedgerSnapshot {
            records: vec![record],
            next_id: EscrowId(2),
            fee_bps: 0,
            admin: None,
            retained_fees: vec![(TokenId::from_symbol("USDT"), u128::from(u64::MAX) + 1)],
        };
        let back = LedgerSnapshot::from_json_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn inconsistent_snapshot_rejected() {
        let base = LedgerSnapshot {
            records: vec![CustodyRecord::dummy(EscrowId(1), 10)],
            next_id: EscrowId(2),
            fee_bps: 0,
            admin: None,
            retained_fees: Vec::new(),
        };
        assert!(base.clone().into_state(TokenRegistry::new()).is_ok());

        let mut bad = base.clone();
        bad.next_id = EscrowId(5);
        assert!(matches!(
            bad.into_state(TokenRegistry::new()),
            Err(LockboxError::Serialization(_))
        ));

        let mut bad = base.clone();
        bad.fee_bps = 10_001;
        assert!(matches!(
            bad.into_state(TokenRegistry::new()),
            Err(LockboxError::FeeOutOfRange { .. })
        ));

        let mut bad = base;
        let usdt = TokenId::from_symbol("USDT");
        bad.retained_fees = vec![(usdt, 1), (usdt, 2)];
        assert!(matches!(
            bad.into_state(TokenRegistry::new()),
            Err(LockboxError::Serialization(_))
        ));
    }
}
