use super::backend::StorageBackend;
use crate::error::{Result, SutekhError};
use crate::schema::Database;
use std::cell::RefCell;

/// In-memory storage backend for testing.
///
/// Stores the serialized document so loads go through the same serde path as
/// the filesystem backend. Uses `RefCell` for interior mutability since
/// sutekh is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    document: RefCell<Option<String>>,
    simulate_write_error: RefCell<bool>,
    saves: RefCell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StorageBackend for MemBackend {
    fn load(&self) -> Result<Option<Database>> {
        let document = self.document.borrow();
        match document.as_deref() {
            Some(json) => {
                let mut db: Database = serde_json::from_str(json)?;
                db.rebuild_indexes();
                Ok(Some(db))
            }
            None => Ok(None),
        }
    }

    fn save(&self, db: &Database) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(SutekhError::Store("Simulated write error".to_string()));
        }
        *self.document.borrow_mut() = Some(serde_json::to_string(db)?);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory://sutekh".to_string()
    }
}
