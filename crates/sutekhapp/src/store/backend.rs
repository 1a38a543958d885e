use crate::error::Result;
use crate::schema::Database;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`CardStore`](super::card_store::CardStore) handles the "what"
/// (snapshots, commits, validation).
pub trait StorageBackend {
    /// Load the stored database with its indexes rebuilt.
    /// Returns Ok(None) when nothing has been stored yet.
    fn load(&self) -> Result<Option<Database>>;

    /// Persist the database.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, db: &Database) -> Result<()>;

    /// Human readable location, for messages.
    fn location(&self) -> String;
}
