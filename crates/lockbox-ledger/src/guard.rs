//! Operation-in-progress guard.
//!
//! Every state-changing entry point holds an [`OperationGuard`] for its
//! whole duration. A token calling back into the ledger while a transfer is
//! in flight finds the guard taken and is rejected with
//! [`LockboxError::Reentrant`]. The guard is released on drop, so every exit
//! path (including `?` early returns) frees it.

use std::sync::atomic::{AtomicBool, Ordering};

use lockbox_types::{LockboxError, Result};

/// Single global "operation in progress" flag.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entered: AtomicBool::new(false),
        }
    }

    /// Take the guard for the duration of the returned token.
    ///
    /// # Errors
    /// Returns [`LockboxError::Reentrant`] if another operation holds it.
    pub fn enter(&self) -> Result<OperationGuard<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LockboxError::Reentrant)?;
        Ok(OperationGuard { guard: self })
    }

    /// Whether an operation currently holds the guard.
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Scoped hold on a [`ReentrancyGuard`]. Releases on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as this value is dropped"]
pub struct OperationGuard<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
