//! Value-transfer collaborator seam.
//!
//! The ledger never moves value itself. It asks a [`Token`] to do so and
//! reads the token's answer. Real tokens disagree on how they answer:
//!
//! - some return nothing and signal failure only by faulting,
//! - some return a boolean that must be checked,
//! - some hand back raw return data that must be decoded strictly.
//!
//! [`CallReturn`] captures all three so the ledger can normalise them at
//! one boundary. A token may also deduct a fee on transfer; the ledger
//! never trusts the nominal amount and measures custody balances instead.

use std::fmt;

use crate::AccountId;

/// Raw answer from a token call that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallReturn {
    /// No success indicator at all.
    Empty,
    /// Decoded boolean indicator.
    Bool(bool),
    /// Undecoded return data.
    Raw(Vec<u8>),
}

/// The token call itself failed (reverted, paused, rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFault(pub String);

impl fmt::Display for TokenFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TokenFault {}

/// A fungible asset ledger the custody ledger holds value on.
///
/// Implementations may call back into the custody ledger before returning.
pub trait Token: Send + Sync {
    /// Balance held by `holder`.
    fn balance_of(&self, holder: &AccountId) -> Result<u128, TokenFault>;

    /// Pull `amount` from `from` into `to` (the custody account).
    fn transfer_in(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<CallReturn, TokenFault>;

    /// Push `amount` from `from` (the custody account) to `to`.
    fn transfer_out(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<CallReturn, TokenFault>;
}

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::{MemoryToken, ReturnStyle};

#[cfg(any(test, feature = "test-helpers"))]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{CallReturn, Token, TokenFault};
    use crate::constants::BPS_DENOMINATOR;
    use crate::AccountId;

    /// How [`MemoryToken`] reports the outcome of a transfer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ReturnStyle {
        /// `Bool(true)` / `Bool(false)`.
        Bool,
        /// `Empty` on success, fault on failure.
        Void,
        /// 32-byte ABI word.
        RawWord,
        /// Success reported with a 3-byte blob no decoder accepts.
        Malformed,
    }

    #[derive(Debug)]
    struct Inner {
        balances: HashMap<AccountId, u128>,
        style: ReturnStyle,
        transfer_in_fee_bps: u128,
        fail_transfers_to: Option<AccountId>,
        fail_transfer_in: bool,
        silent_noop: bool,
        skim_on_transfer_in: u128,
        transfer_out_calls: usize,
    }

    /// In-memory token ledger for tests. **Never use in production.**
    #[derive(Debug)]
    pub struct MemoryToken {
        inner: Mutex<Inner>,
    }

    impl MemoryToken {
        pub fn new(style: ReturnStyle) -> Self {
            Self {
                inner: Mutex::new(Inner {
                    balances: HashMap::new(),
                    style,
                    transfer_in_fee_bps: 0,
                    fail_transfers_to: None,
                    fail_transfer_in: false,
                    silent_noop: false,
                    skim_on_transfer_in: 0,
                    transfer_out_calls: 0,
                }),
            }
        }

        /// Deduct `bps` of every transfer-in (fee-on-transfer asset).
        pub fn with_transfer_fee_bps(self, bps: u16) -> Self {
            self.inner.lock().unwrap().transfer_in_fee_bps = u128::from(bps);
            self
        }

        pub fn mint(&self, to: &AccountId, amount: u128) {
            *self.inner.lock().unwrap().balances.entry(*to).or_default() += amount;
        }

        pub fn balance(&self, holder: &AccountId) -> u128 {
            self.inner
                .lock()
                .unwrap()
                .balances
                .get(holder)
                .copied()
                .unwrap_or(0)
        }

        /// Every transfer-out to `to` fails until cleared with `None`.
        pub fn fail_transfers_to(&self, to: Option<AccountId>) {
            self.inner.lock().unwrap().fail_transfers_to = to;
        }

        pub fn fail_transfer_in(&self, fail: bool) {
            self.inner.lock().unwrap().fail_transfer_in = fail;
        }

        /// Report success without moving anything.
        pub fn silent_noop(&self, on: bool) {
            self.inner.lock().unwrap().silent_noop = on;
        }

        /// Remove `amount` from the recipient of each transfer-in after
        /// crediting it (a hostile token shrinking custody).
        pub fn skim_on_transfer_in(&self, amount: u128) {
            self.inner.lock().unwrap().skim_on_transfer_in = amount;
        }

        pub fn transfer_out_calls(&self) -> usize {
            self.inner.lock().unwrap().transfer_out_calls
        }

        fn success(style: ReturnStyle) -> CallReturn {
            match style {
                ReturnStyle::Bool => CallReturn::Bool(true),
                ReturnStyle::Void => CallReturn::Empty,
                ReturnStyle::RawWord => {
                    let mut word = vec![0u8; 32];
                    word[31] = 1;
                    CallReturn::Raw(word)
                }
                ReturnStyle::Malformed => CallReturn::Raw(vec![1, 2, 3]),
            }
        }

        fn failure(style: ReturnStyle, reason: &str) -> Result<CallReturn, TokenFault> {
            match style {
                ReturnStyle::Bool => Ok(CallReturn::Bool(false)),
                ReturnStyle::RawWord => Ok(CallReturn::Raw(vec![0u8; 32])),
                ReturnStyle::Void | ReturnStyle::Malformed => Err(TokenFault(reason.to_string())),
            }
        }

        fn debit(inner: &mut Inner, from: &AccountId, amount: u128) -> bool {
            let bal = inner.balances.entry(*from).or_default();
            if *bal < amount {
                return false;
            }
            *bal -= amount;
            true
        }
    }

    impl Token for MemoryToken {
        fn balance_of(&self, holder: &AccountId) -> Result<u128, TokenFault> {
            Ok(self.balance(holder))
        }

        fn transfer_in(
            &self,
            from: &AccountId,
            to: &AccountId,
            amount: u128,
        ) -> Result<CallReturn, TokenFault> {
            let mut inner = self.inner.lock().unwrap();
            let style = inner.style;
            if inner.fail_transfer_in {
                return Self::failure(style, "transfer-in rejected");
            }
            if inner.silent_noop {
                return Ok(Self::success(style));
            }
            if !Self::debit(&mut inner, from, amount) {
                return Self::failure(style, "insufficient balance");
            }
            let fee = amount * inner.transfer_in_fee_bps / BPS_DENOMINATOR;
            let skim = inner.skim_on_transfer_in;
            let credited = amount - fee;
            let bal = inner.balances.entry(*to).or_default();
            *bal = (*bal + credited).saturating_sub(skim);
            Ok(Self::success(style))
        }

        fn transfer_out(
            &self,
            from: &AccountId,
            to: &AccountId,
            amount: u128,
        ) -> Result<CallReturn, TokenFault> {
            let mut inner = self.inner.lock().unwrap();
            inner.transfer_out_calls += 1;
            let style = inner.style;
            if inner.fail_transfers_to == Some(*to) {
                return Self::failure(style, "recipient blocked");
            }
            if !Self::debit(&mut inner, from, amount) {
                return Self::failure(style, "insufficient balance");
            }
            *inner.balances.entry(*to).or_default() += amount;
            Ok(Self::success(style))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_token_fee_on_transfer() {
        let token = MemoryToken::new(ReturnStyle::Bool).with_transfer_fee_bps(100);
        let (a, b) = (AccountId::random(), AccountId::random());
        token.mint(&a, 1000);
        assert_eq!(token.transfer_in(&a, &b, 1000).unwrap(), CallReturn::Bool(true));
        assert_eq!(token.balance(&a), 0);
        assert_eq!(token.balance(&b), 990);
    }

    #[test]
    fn memory_token_failure_styles() {
        let (a, b) = (AccountId::random(), AccountId::random());
        let bool_token = MemoryToken::new(ReturnStyle::Bool);
        assert_eq!(bool_token.transfer_out(&a, &b, 1).unwrap(), CallReturn::Bool(false));

        let void_token = MemoryToken::new(ReturnStyle::Void);
        assert!(void_token.transfer_out(&a, &b, 1).is_err());
    }

    #[test]
    fn memory_token_counts_transfer_out() {
        let token = MemoryToken::new(ReturnStyle::Void);
        let (a, b) = (AccountId::random(), AccountId::random());
        token.mint(&a, 10);
        token.transfer_out(&a, &b, 4).unwrap();
        assert_eq!(token.transfer_out_calls(), 1);
        assert_eq!(token.balance(&b), 4);
    }
}
