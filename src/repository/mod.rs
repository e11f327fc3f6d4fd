//! In-memory record collections: catalog, loan ledger and borrower registry.
//!
//! Each collection is a [`RecordSet`] keyed by identifier and kept in
//! ascending identifier order, so re-inserting a record (for instance when a
//! delete is undone) restores the exact original ordering.

pub mod borrowers;
pub mod catalog;
pub mod generator;
pub mod loans;

use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::{AppError, AppResult},
    models::SequentialId,
};

pub use borrowers::BorrowerRecords;
pub use catalog::Catalog;
pub use loans::LoanRecords;

/// An entity stored in a [`RecordSet`]
pub trait Record: Clone {
    type Id: SequentialId + Display + Hash + std::fmt::Debug;

    /// Noun used in error messages
    const NAME: &'static str;

    fn id(&self) -> &Self::Id;

    /// Value-level duplicate check, independent of the identifier
    fn is_duplicate_of(&self, other: &Self) -> bool;
}

/// Ordered set of records, unique by id and by value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet<R: Record> {
    records: IndexMap<R::Id, R>,
}

impl<R: Record> Default for RecordSet<R> {
    fn default() -> Self {
        Self { records: IndexMap::new() }
    }
}

impl<R: Record> RecordSet<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from records, rejecting duplicates
    pub fn from_records(records: impl IntoIterator<Item = R>) -> AppResult<Self> {
        let mut set = Self::new();
        for record in records {
            set.add(record)?;
        }
        Ok(set)
    }

    pub fn contains_id(&self, id: &R::Id) -> bool {
        self.records.contains_key(id)
    }

    /// True if an equivalent record (by value) is present
    pub fn contains(&self, record: &R) -> bool {
        self.records.values().any(|r| r.is_duplicate_of(record))
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.records.get(id)
    }

    /// Look up a record, failing with `NotFound`
    pub fn require(&self, id: &R::Id) -> AppResult<&R> {
        self.records
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("No {} with id {}", R::NAME, id)))
    }

    pub fn add(&mut self, record: R) -> AppResult<()> {
        let id = record.id().clone();
        if self.contains_id(&id) {
            return Err(AppError::Duplicate(format!("A {} with id {} already exists", R::NAME, id)));
        }
        if self.contains(&record) {
            return Err(AppError::Duplicate(format!("This {} already exists", R::NAME)));
        }
        let position = self.records.keys().position(|existing| existing > &id).unwrap_or(self.records.len());
        self.records.shift_insert(position, id, record);
        Ok(())
    }

    pub fn remove(&mut self, id: &R::Id) -> AppResult<R> {
        self.records
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("No {} with id {}", R::NAME, id)))
    }

    /// Replace the record stored under `id`; returns the previous value
    pub fn replace(&mut self, id: &R::Id, record: R) -> AppResult<R> {
        if record.id() != id {
            return Err(AppError::Validation(format!(
                "Cannot replace {} {} with a record for {}",
                R::NAME,
                id,
                record.id()
            )));
        }
        let slot = self
            .records
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("No {} with id {}", R::NAME, id)))?;
        Ok(std::mem::replace(slot, record))
    }

    /// Replace the whole content with `other`
    pub fn reset(&mut self, other: &RecordSet<R>) {
        self.records = other.records.clone();
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &R::Id> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest identifier not yet used in this set
    pub fn next_id(&self) -> AppResult<R::Id> {
        generator::next_id(self.ids())
    }
}

impl<R: Record + Serialize> Serialize for RecordSet<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.values())
    }
}

impl<'de, R: Record + Deserialize<'de>> Deserialize<'de> for RecordSet<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<R>::deserialize(deserializer)?;
        Self::from_records(records).map_err(D::Error::custom)
    }
}
