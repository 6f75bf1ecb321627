//! Append-only record table.
//!
//! Records live in an arena indexed by `id - 1`. Identifiers are handed out
//! in order starting at 1 and the table is never compacted, so every id ever
//! returned stays resolvable. Lookups of absent ids are a checked
//! `RecordNotFound`, as are records whose received amount is zero.

use lockbox_types::{CustodyRecord, EscrowId, LockboxError, Result};

#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<CustodyRecord>,
}

impl RecordTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from records in id order.
    ///
    /// # Errors
    /// Returns `Serialization` if ids are not exactly `1..=n` in order, or
    /// if any record is empty or has both terminal flags set.
    pub fn from_records(records: Vec<CustodyRecord>) -> Result<Self> {
        for (idx, rec) in records.iter().enumerate() {
            let expected = EscrowId(idx as u64 + 1);
            if rec.id != expected {
                return Err(LockboxError::Serialization(format!(
                    "record table out of order: found {} at position of {expected}",
                    rec.id
                )));
            }
            if !rec.exists() {
                return Err(LockboxError::Serialization(format!(
                    "{} has zero received amount",
                    rec.id
                )));
            }
            if rec.claimed && rec.refunded {
                return Err(LockboxError::Serialization(format!(
                    "{} is both claimed and refunded",
                    rec.id
                )));
            }
        }
        Ok(Self { records })
    }

    /// The identifier the next `insert` will allocate.
    #[must_use]
    pub fn next_id(&self) -> EscrowId {
        EscrowId(self.records.len() as u64 + 1)
    }

    /// Allocate the next id and store the record built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(EscrowId) -> CustodyRecord) -> EscrowId {
        let id = self.next_id();
        self.records.push(build(id));
        id
    }

    pub fn get(&self, id: EscrowId) -> Result<&CustodyRecord> {
        Self::index(id)
            .and_then(|i| self.records.get(i))
            .filter(|rec| rec.exists())
            .ok_or(LockboxError::RecordNotFound(id))
    }

    pub fn get_mut(&mut self, id: EscrowId) -> Result<&mut CustodyRecord> {
        Self::index(id)
            .and_then(|i| self.records.get_mut(i))
            .filter(|rec| rec.exists())
            .ok_or(LockboxError::RecordNotFound(id))
    }

    /// Overwrite a stored record with an earlier copy of itself.
    pub fn restore(&mut self, previous: CustodyRecord) -> Result<()> {
        let slot = self.get_mut(previous.id)?;
        *slot = previous;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustodyRecord> {
        self.records.iter()
    }

    fn index(id: EscrowId) -> Option<usize> {
        id.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}
