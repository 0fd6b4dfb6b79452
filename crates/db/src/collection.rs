//! A single named collection of records with store-assigned identities.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A document that can live in a [`Collection`].
pub trait Record: Clone {
    /// Collection name, used in errors and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Fields covered by a unique index, as `(field, value)` pairs.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Insertion-ordered records plus the next identity to hand out.
///
/// Identities start at 1, grow monotonically, and are never reused, even
/// after the record holding the highest id is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    next_id: u64,
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, assigning it the next identity.
    pub fn insert(&mut self, mut record: T) -> StoreResult<T> {
        self.check_unique(&record, None)?;
        record.set_id(self.next_id);
        self.next_id += 1;
        self.records.push(record.clone());
        Ok(record)
    }

    /// Look up a record by identity.
    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// First record matching `predicate`, in insertion order.
    pub fn find_one<P>(&self, predicate: P) -> Option<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.records.iter().find(|record| predicate(record))
    }

    /// All records matching `predicate`, in insertion order.
    pub fn find<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// Replace the stored record with the same identity.
    pub fn update(&mut self, record: T) -> StoreResult<T> {
        let id = record.id();
        self.check_unique(&record, Some(id))?;
        let slot = self
            .records
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION, id))?;
        *slot = record.clone();
        Ok(record)
    }

    /// Remove and return the record with the given identity.
    pub fn remove(&mut self, id: u64) -> StoreResult<T> {
        let index = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION, id))?;
        Ok(self.records.remove(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Make sure the counter is past every stored identity (hand-edited snapshots).
    pub(crate) fn repair_next_id(&mut self) {
        let floor = self.records.iter().map(Record::id).max().unwrap_or(0) + 1;
        self.next_id = self.next_id.max(floor);
    }

    fn check_unique(&self, record: &T, skip_id: Option<u64>) -> StoreResult<()> {
        for (field, value) in record.unique_keys() {
            let taken = self
                .records
                .iter()
                .filter(|existing| Some(existing.id()) != skip_id)
                .any(|existing| {
                    existing
                        .unique_keys()
                        .iter()
                        .any(|(f, v)| *f == field && *v == value)
                });
            if taken {
                return Err(StoreError::UniqueViolation {
                    collection: T::COLLECTION,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
