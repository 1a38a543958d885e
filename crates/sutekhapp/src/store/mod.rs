//! # Storage Layer
//!
//! The [`DataStore`] trait gives commands a working copy of the [`Database`]
//! and a way to commit it. [`CardStore`] implements it on top of a
//! [`StorageBackend`](backend::StorageBackend):
//!
//! - [`fs_backend::FsBackend`]: one JSON document on disk, written atomically.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Transactions
//!
//! Every command that changes data runs inside [`transaction`]:
//!
//! 1. Snapshot the working copy.
//! 2. Apply the change.
//! 3. Validate: referential integrity and the card set forest invariant.
//! 4. Commit to the backend.
//!
//! If any step fails the snapshot is restored, so a failed bulk operation
//! leaves neither partial rows in memory nor on disk.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── sutekh.json         # Catalog, card sets and memberships
//! └── sutekh.toml         # Configuration
//! ```

use crate::error::Result;
use crate::graph;
use crate::schema::Database;

pub mod backend;
pub mod card_store;
pub mod fs_backend;
pub mod mem_backend;

pub use card_store::CardStore;

pub type InMemoryStore = CardStore<mem_backend::MemBackend>;
pub type FileStore = CardStore<fs_backend::FsBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        CardStore::with_backend(mem_backend::MemBackend::new())
    }

    /// A store whose working copy starts as `db`.
    pub fn from_database(db: Database) -> Self {
        let mut store = Self::new();
        *store.db_mut() = db;
        store
    }
}

/// Abstract interface for card storage.
pub trait DataStore {
    fn db(&self) -> &Database;

    fn db_mut(&mut self) -> &mut Database;

    /// Persist the working copy.
    fn commit(&mut self) -> Result<()>;

    fn location(&self) -> String;
}

/// Checks run before every commit.
pub fn validate(db: &Database) -> Result<()> {
    db.check_integrity()?;
    graph::check_forest(db)
}

/// Runs `apply` against the working copy as one atomic unit.
pub fn transaction<S, T, F>(store: &mut S, apply: F) -> Result<T>
where
    S: DataStore + ?Sized,
    F: FnOnce(&mut Database) -> Result<T>,
{
    let snapshot = store.db().clone();
    let outcome = apply(store.db_mut()).and_then(|value| {
        validate(store.db())?;
        store.commit()?;
        Ok(value)
    });
    if let Err(err) = &outcome {
        tracing::debug!(error = %err, "transaction rolled back");
        *store.db_mut() = snapshot;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SutekhError;
    use crate::model::{CardSetId, NewCardSet};

    #[test]
    fn transaction_commits_on_success() {
        let mut store = InMemoryStore::new();
        transaction(&mut store, |db| db.insert_card_set(NewCardSet::new("Deck"))).unwrap();

        assert_eq!(store.backend().save_count(), 1);
        let reloaded = CardStore::open(store.backend).unwrap();
        assert!(reloaded.db().find_card_set("Deck").is_some());
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let mut store = InMemoryStore::new();
        let result: Result<()> = transaction(&mut store, |db| {
            db.insert_card_set(NewCardSet::new("Partial"))?;
            Err(SutekhError::Store("boom".to_string()))
        });

        assert!(result.is_err());
        assert!(store.db().card_sets().is_empty());
        assert_eq!(store.backend().save_count(), 0);
    }

    #[test]
    fn transaction_rolls_back_when_commit_fails() {
        let mut store = InMemoryStore::new();
        store.backend().set_simulate_write_error(true);

        let result = transaction(&mut store, |db| db.insert_card_set(NewCardSet::new("Deck")));

        assert!(matches!(result, Err(SutekhError::Store(_))));
        assert!(store.db().card_sets().is_empty());
    }

    #[test]
    fn transaction_rejects_loops() {
        let mut store = InMemoryStore::new();
        let (a, b) = transaction(&mut store, |db| {
            let a = db.insert_card_set(NewCardSet::new("A"))?;
            let b = db.insert_card_set(NewCardSet::new("B").with_parent(Some(a)))?;
            Ok((a, b))
        })
        .unwrap();

        let result = transaction(&mut store, |db| {
            if let Some(cs) = db.card_set_mut(a) {
                cs.parent = Some(b);
            }
            Ok(())
        });

        assert!(matches!(result, Err(SutekhError::LoopDetected(_))));
        assert_eq!(store.db().card_set(a).unwrap().parent, None::<CardSetId>);
    }
}
