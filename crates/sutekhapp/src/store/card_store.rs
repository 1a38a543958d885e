use super::backend::StorageBackend;
use super::DataStore;
use crate::error::Result;
use crate::graph;
use crate::schema::Database;

/// The working copy of the database plus the backend it is committed to.
pub struct CardStore<B: StorageBackend> {
    pub(crate) backend: B,
    db: Database,
}

impl<B: StorageBackend> CardStore<B> {
    /// Opens a store, starting from an empty database when nothing is stored yet.
    ///
    /// A stored hierarchy that already contains loops is loaded as-is and
    /// reported; it has to be repaired (see `commands::repair`) before the
    /// next transaction can commit.
    pub fn open(backend: B) -> Result<Self> {
        let db = match backend.load()? {
            Some(db) => db,
            None => Database::new(),
        };
        if let Err(err) = graph::check_forest(&db) {
            tracing::warn!(location = %backend.location(), error = %err, "stored card sets need repair");
        }
        Ok(Self { backend, db })
    }

    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            db: Database::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> DataStore for CardStore<B> {
    fn db(&self) -> &Database {
        &self.db
    }

    fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    fn commit(&mut self) -> Result<()> {
        self.backend.save(&self.db)
    }

    fn location(&self) -> String {
        self.backend.location()
    }
}
