//! The Escrow Ledger: record table, configuration and query surface.
//!
//! State-changing operations live next to their concerns:
//! - [`deposit`](crate::deposit): deposit accounting
//! - [`release`](crate::release): claim / refund state machine
//! - [`payout`](crate::payout): fee legs and fee collection
//!
//! ## Execution discipline
//!
//! 1. Take the [`ReentrancyGuard`] (nested calls fail with `Reentrant`).
//! 2. Validate and commit state under the state lock.
//! 3. Release the state lock, then call the token.
//! 4. On a token failure, restore the pre-call state before returning.
//!
//! The state lock is never held across a token call, so a token calling
//! back into read-only queries sees the committed state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;
use lockbox_types::{
    AccountId, Clock, CommitmentScheme, CustodyRecord, CustodyState, EscrowId, LedgerConfig,
    LedgerEvent, Result, SecretHash, SystemClock, Token, TokenId,
};

use crate::admin::Administration;
use crate::guard::{OperationGuard, ReentrancyGuard};
use crate::registry::TokenRegistry;
use crate::snapshot::LedgerSnapshot;
use crate::table::RecordTable;

/// Mutable ledger state. Only reachable through [`EscrowLedger`].
#[derive(Debug)]
pub(crate) struct LedgerState {
    pub(crate) records: RecordTable,
    pub(crate) fee_bps: u16,
    pub(crate) admin: Administration,
    pub(crate) retained_fees: std::collections::BTreeMap<TokenId, u128>,
    pub(crate) tokens: TokenRegistry,
    pub(crate) events: Vec<LedgerEvent>,
}

impl LedgerState {
    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub(crate) fn retained(&self, token: &TokenId) -> u128 {
        self.retained_fees.get(token).copied().unwrap_or(0)
    }
}

/// Conditional custody ledger.
///
/// Holds value for a recipient who must reveal a committed secret before a
/// deadline; after the deadline the sender may recover it instead.
pub struct EscrowLedger {
    pub(crate) custody_account: AccountId,
    pub(crate) min_lock: Duration,
    pub(crate) commitment: CommitmentScheme,
    pub(crate) clock: Arc<dyn Clock>,
    guard: ReentrancyGuard,
    state: Mutex<LedgerState>,
}

impl EscrowLedger {
    /// Create an empty ledger.
    ///
    /// # Errors
    /// Returns the first [`LedgerConfig::validate`] failure.
    pub fn new(config: LedgerConfig, clock: Arc<dyn Clock>, tokens: TokenRegistry) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            admin = %config.admin,
            custody = %config.custody_account,
            fee_bps = config.fee_bps,
            min_lock_secs = config.min_lock_secs,
            commitment = ?config.commitment,
            tokens = tokens.len(),
            "Escrow ledger initialised"
        );
        Self::assemble(
            &config,
            clock,
            LedgerState {
                records: RecordTable::new(),
                fee_bps: config.fee_bps,
                admin: Administration::new(config.admin),
                retained_fees: std::collections::BTreeMap::new(),
                tokens,
                events: Vec::new(),
            },
        )
    }

    /// Ledger driven by wall-clock time.
    ///
    /// # Errors
    /// See [`EscrowLedger::new`].
    pub fn with_system_clock(config: LedgerConfig, tokens: TokenRegistry) -> Result<Self> {
        Self::new(config, Arc::new(SystemClock), tokens)
    }

    /// Rebuild a ledger from persisted durable state.
    ///
    /// `config.admin` and `config.fee_bps` are ignored in favour of the
    /// snapshot's values; the event log starts empty.
    ///
    /// # Errors
    /// - any [`LedgerConfig::validate`] failure
    /// - `Serialization` if the snapshot is internally inconsistent
    pub fn from_snapshot(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        tokens: TokenRegistry,
        snapshot: LedgerSnapshot,
    ) -> Result<Self> {
        config.validate()?;
        let state = snapshot.into_state(tokens)?;
        tracing::info!(
            records = state.records.len(),
            fee_bps = state.fee_bps,
            admin = ?state.admin.current(),
            "Escrow ledger restored from snapshot"
        );
        Self::assemble(&config, clock, state)
    }

    fn assemble(config: &LedgerConfig, clock: Arc<dyn Clock>, state: LedgerState) -> Result<Self> {
        Ok(Self {
            custody_account: config.custody_account,
            min_lock: config.min_lock()?,
            commitment: config.commitment,
            clock,
            guard: ReentrancyGuard::new(),
            state: Mutex::new(state),
        })
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    pub(crate) fn enter(&self) -> Result<OperationGuard<'_>> {
        self.guard.enter().inspect_err(|_| {
            tracing::warn!("Re-entrant call into escrow ledger rejected");
        })
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        // No code path panics while holding the lock, so a poisoned lock
        // still guards consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn token(&self, id: &TokenId) -> Result<Arc<dyn Token>> {
        self.lock_state().tokens.get(id)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Full copy of a record, terminal flags included.
    ///
    /// # Errors
    /// Returns `RecordNotFound` for ids never allocated.
    pub fn get_record(&self, id: EscrowId) -> Result<CustodyRecord> {
        self.lock_state().records.get(id).cloned()
    }

    /// Lifecycle state of a record.
    ///
    /// # Errors
    /// Returns `RecordNotFound` for ids never allocated.
    pub fn state(&self, id: EscrowId) -> Result<CustodyState> {
        self.lock_state().records.get(id).map(CustodyRecord::state)
    }

    /// The id the next successful deposit will receive.
    #[must_use]
    pub fn next_id(&self) -> EscrowId {
        self.lock_state().records.next_id()
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.lock_state().records.len()
    }

    #[must_use]
    pub fn fee_bps(&self) -> u16 {
        self.lock_state().fee_bps
    }

    #[must_use]
    pub fn current_admin(&self) -> Option<AccountId> {
        self.lock_state().admin.current()
    }

    #[must_use]
    pub fn custody_account(&self) -> AccountId {
        self.custody_account
    }

    #[must_use]
    pub fn commitment_scheme(&self) -> CommitmentScheme {
        self.commitment
    }

    #[must_use]
    pub fn min_lock(&self) -> Duration {
        self.min_lock
    }

    /// Fees held in custody awaiting collection by the administrator.
    #[must_use]
    pub fn retained_fees(&self, token: &TokenId) -> u128 {
        self.lock_state().retained(token)
    }

    /// The commitment a depositor must publish so that `secret` opens
    /// record `id` for `recipient` on this ledger.
    #[must_use]
    pub fn commitment_for(&self, secret: &[u8], recipient: &AccountId, id: EscrowId) -> SecretHash {
        self.commitment.commit(secret, recipient, id)
    }

    /// Copy of the notification log.
    #[must_use]
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.lock_state().events.clone()
    }

    /// Take and clear the notification log.
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.lock_state().events)
    }

    /// Whether a state-changing operation is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.guard.is_entered()
    }

    /// Durable state for persistence.
    ///
    /// Holds the operation guard while capturing, so a snapshot never
    /// records a transition whose token call is still in flight.
    ///
    /// # Errors
    /// Returns `Reentrant` while another operation runs.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let _op = self.enter()?;
        Ok(LedgerSnapshot::capture(&self.lock_state()))
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Replace the fee rate applied to every future claim, including claims
    /// on records that are still active.
    ///
    /// # Errors
    /// - `Reentrant` while another operation runs
    /// - `Unauthorized` if `caller` is not the administrator
    /// - `FeeOutOfRange` if `new_fee_bps > 10000`
    pub fn set_fee_bps(&self, caller: AccountId, new_fee_bps: u16) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.lock_state();
        state.admin.ensure_admin(&caller)?;
        crate::fee::ensure_fee_in_range(new_fee_bps)?;
        let old = state.fee_bps;
        state.fee_bps = new_fee_bps;
        state.emit(LedgerEvent::FeeChanged {
            old,
            new: new_fee_bps,
        });
        tracing::info!(old, new = new_fee_bps, "Fee rate changed");
        Ok(())
    }

    /// Hand the administrator role to `new_admin`.
    ///
    /// # Errors
    /// - `Reentrant`, `Unauthorized`
    /// - `NullIdentity` if `new_admin` is the null identity
    pub fn transfer_administration(&self, caller: AccountId, new_admin: AccountId) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.lock_state();
        let previous = state.admin.transfer(&caller, new_admin)?;
        state.emit(LedgerEvent::AdministrationTransferred {
            previous: Some(previous),
            new: Some(new_admin),
        });
        tracing::info!(previous = %previous, new = %new_admin, "Administration transferred");
        Ok(())
    }

    /// Give up the administrator role. Fees from later claims stay in
    /// custody as retained fees that nobody can collect.
    ///
    /// # Errors
    /// `Reentrant`, `Unauthorized`.
    pub fn renounce_administration(&self, caller: AccountId) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.lock_state();
        let previous = state.admin.renounce(&caller)?;
        state.emit(LedgerEvent::AdministrationTransferred {
            previous: Some(previous),
            new: None,
        });
        tracing::info!(previous = %previous, "Administration renounced");
        Ok(())
    }

    /// Register a token collaborator after construction.
    ///
    /// # Errors
    /// `Reentrant`, `Unauthorized`, `NullIdentity`, `TokenAlreadyRegistered`.
    pub fn register_token(&self, caller: AccountId, id: TokenId, token: Arc<dyn Token>) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.lock_state();
        state.admin.ensure_admin(&caller)?;
        state.tokens.register(id, token)?;
        state.emit(LedgerEvent::TokenRegistered { token: id });
        tracing::info!(token = %id, "Token registered");
        Ok(())
    }
}

impl std::fmt::Debug for EscrowLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowLedger")
            .field("custody_account", &self.custody_account)
            .field("commitment", &self.commitment)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_types::{LockboxError, ManualClock, MemoryToken, ReturnStyle};

    fn setup() -> (EscrowLedger, AccountId) {
        let admin = AccountId::random();
        let cfg = LedgerConfig::new(admin, AccountId::random());
        let ledger =
            EscrowLedger::new(cfg, Arc::new(ManualClock::starting_now()), TokenRegistry::new())
                .unwrap();
        (ledger, admin)
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = LedgerConfig::new(AccountId::random(), AccountId::random()).with_fee_bps(20_000);
        let err = EscrowLedger::with_system_clock(cfg, TokenRegistry::new()).unwrap_err();
        assert!(matches!(err, LockboxError::FeeOutOfRange { .. }));
    }

    #[test]
    fn unrepresentable_lock_window_rejected() {
        for secs in [i64::MAX, 10_000_000_000_000] {
            let cfg =
                LedgerConfig::new(AccountId::random(), AccountId::random()).with_min_lock_secs(secs);
            let err = EscrowLedger::with_system_clock(cfg, TokenRegistry::new()).unwrap_err();
            assert!(matches!(err, LockboxError::Configuration(_)));
        }
    }

    #[test]
    fn empty_ledger_queries() {
        let (ledger, admin) = setup();
        assert_eq!(ledger.next_id(), EscrowId(1));
        assert_eq!(ledger.record_count(), 0);
        assert_eq!(ledger.fee_bps(), 0);
        assert_eq!(ledger.current_admin(), Some(admin));
        assert_eq!(
            ledger.get_record(EscrowId(1)).unwrap_err(),
            LockboxError::RecordNotFound(EscrowId(1))
        );
        assert!(!ledger.is_busy());
    }

    #[test]
    fn set_fee_admin_only_and_bounded() {
        let (ledger, admin) = setup();
        assert_eq!(
            ledger.set_fee_bps(AccountId::random(), 100).unwrap_err(),
            LockboxError::Unauthorized
        );
        assert!(matches!(
            ledger.set_fee_bps(admin, 10_001),
            Err(LockboxError::FeeOutOfRange { .. })
        ));
        ledger.set_fee_bps(admin, 250).unwrap();
        assert_eq!(ledger.fee_bps(), 250);
        assert_eq!(
            ledger.events(),
            vec![LedgerEvent::FeeChanged { old: 0, new: 250 }]
        );
        assert!(!ledger.is_busy(), "guard released after every call");
    }

    #[test]
    fn administration_transfer_and_renounce() {
        let (ledger, admin) = setup();
        let next = AccountId::random();
        ledger.transfer_administration(admin, next).unwrap();
        assert_eq!(ledger.current_admin(), Some(next));
        assert_eq!(
            ledger.set_fee_bps(admin, 1).unwrap_err(),
            LockboxError::Unauthorized
        );

        ledger.renounce_administration(next).unwrap();
        assert_eq!(ledger.current_admin(), None);
        assert!(ledger.set_fee_bps(next, 1).is_err());
        assert_eq!(ledger.drain_events().len(), 2);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn register_token_admin_only() {
        let (ledger, admin) = setup();
        let usdt = TokenId::from_symbol("USDT");
        let token = Arc::new(MemoryToken::new(ReturnStyle::Bool));
        assert_eq!(
            ledger
                .register_token(AccountId::random(), usdt, token.clone())
                .unwrap_err(),
            LockboxError::Unauthorized
        );
        ledger.register_token(admin, usdt, token).unwrap();
        assert!(ledger.token(&usdt).is_ok());
    }

    #[test]
    fn commitment_for_uses_configured_scheme() {
        let (ledger, _) = setup();
        let r = AccountId::random();
        assert_eq!(
            ledger.commitment_for(b"s", &r, EscrowId(1)),
            CommitmentScheme::RecipientAndIdBound.commit(b"s", &r, EscrowId(1))
        );
    }
}
