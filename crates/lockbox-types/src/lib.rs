//! # lockbox-types
//!
//! Shared types, errors, and configuration for the **Lockbox** conditional
//! custody ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`EscrowId`], [`AccountId`], [`TokenId`]
//! - **Custody model**: [`CustodyRecord`], [`CustodyState`]
//! - **Commit-reveal**: [`SecretHash`], [`CommitmentScheme`]
//! - **Notifications**: [`LedgerEvent`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Collaborator seams**: [`Token`], [`CallReturn`], [`TokenFault`], [`Clock`]
//! - **Errors**: [`LockboxError`] with `LB_ERR_` prefix codes
//! - **Constants**: fee and lock-window limits

pub mod clock;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod record;
pub mod token;

pub use clock::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use record::*;
pub use token::*;

// Constants are accessed via `lockbox_types::constants::FOO`.
