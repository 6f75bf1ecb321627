//! # lockbox-ledger
//!
//! **Escrow Ledger**: conditional custody of fungible tokens released by a
//! commit-reveal secret or recovered after a deadline.
//!
//! ## Record Lifecycle
//!
//! ```text
//!                 claim (recipient, secret, now <= deadline)
//!            ┌──────────────────────────────────────────▶ CLAIMED
//! deposit ──▶ ACTIVE
//!            └──────────────────────────────────────────▶ REFUNDED
//!                 refund (sender, now > deadline)
//! ```
//!
//! Both terminal states are final. Every state-changing entry point runs
//! under one [`ReentrancyGuard`], commits its state change before calling
//! the token, and restores it if the token call fails.
//!
//! ## Accounting
//!
//! - Deposits credit the measured change in the custody balance, not the
//!   requested amount.
//! - Claims split the credited amount into a payout and a floor-rounded fee
//!   at the rate in force at claim time.
//! - Fees that cannot be delivered stay in custody until collected.

pub mod admin;
pub mod deposit;
pub mod fee;
pub mod guard;
pub mod ledger;
pub mod payout;
pub mod registry;
pub mod release;
pub mod safe_transfer;
pub mod snapshot;
pub mod solvency;
pub mod table;

pub use admin::Administration;
pub use deposit::DepositRequest;
pub use fee::FeeSplit;
pub use guard::{OperationGuard, ReentrancyGuard};
pub use ledger::EscrowLedger;
pub use registry::TokenRegistry;
pub use release::{ClaimReceipt, RefundReceipt};
pub use snapshot::LedgerSnapshot;
pub use table::RecordTable;
