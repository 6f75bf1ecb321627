//! Single-writer administration role.
//!
//! Exactly one identity (or none, after renouncement) may change ledger
//! configuration. The administrator is also the fee beneficiary.

use lockbox_types::{AccountId, LockboxError, Result};
use serde::{Deserialize, Serialize};

/// The administrator role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administration {
    admin: Option<AccountId>,
}

impl Administration {
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self { admin: Some(admin) }
    }

    pub(crate) fn from_parts(admin: Option<AccountId>) -> Self {
        Self { admin }
    }

    /// Current holder, `None` once renounced.
    #[must_use]
    pub fn current(&self) -> Option<AccountId> {
        self.admin
    }

    #[must_use]
    pub fn is_admin(&self, caller: &AccountId) -> bool {
        self.admin.as_ref() == Some(caller)
    }

    /// Fail with `Unauthorized` unless `caller` holds the role.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<()> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LockboxError::Unauthorized)
        }
    }

    /// Hand the role to `new_admin`. Returns the previous holder.
    pub fn transfer(&mut self, caller: &AccountId, new_admin: AccountId) -> Result<AccountId> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(LockboxError::NullIdentity { field: "new_admin" });
        }
        self.admin = Some(new_admin);
        Ok(*caller)
    }

    /// Give up the role permanently.
    pub fn renounce(&mut self, caller: &AccountId) -> Result<AccountId> {
        self.ensure_admin(caller)?;
        self.admin = None;
        Ok(*caller)
    }
}
