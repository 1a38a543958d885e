//! Memoised name resolution for imports.
//!
//! The cache remembers both hits and misses, keyed by the canonical form of
//! the name, so a deck list naming the same misspelled card twenty times asks
//! the [`CardLookup`] (and possibly the user) once. Entries are tied to the
//! catalog generation they were resolved against and dropped as soon as the
//! catalog is reloaded.

use crate::lookup::CardLookup;
use crate::model::{canonical_name, CardId, LookupId};
use crate::schema::Database;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    generation: Option<u64>,
    cards: HashMap<String, Option<CardId>>,
    expansions: HashMap<String, Option<LookupId>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len() + self.expansions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invalidate(&mut self) {
        if !self.is_empty() {
            tracing::debug!(entries = self.len(), "lookup cache invalidated");
        }
        self.cards.clear();
        self.expansions.clear();
        self.generation = None;
    }

    /// Drops every entry recorded against an older catalog.
    pub fn sync(&mut self, db: &Database) {
        let current = db.catalog_generation();
        if self.generation != Some(current) {
            self.invalidate();
            self.generation = Some(current);
        }
    }

    /// A previously recorded answer for `name`: `Some(None)` is a cached miss.
    pub fn card(&self, name: &str) -> Option<Option<CardId>> {
        self.cards.get(&canonical_name(name)).copied()
    }

    pub fn insert_card(&mut self, name: &str, card: Option<CardId>) {
        self.cards.insert(canonical_name(name), card);
    }

    pub fn expansion(&self, name: &str) -> Option<Option<LookupId>> {
        self.expansions.get(&canonical_name(name)).copied()
    }

    pub fn insert_expansion(&mut self, name: &str, expansion: Option<LookupId>) {
        self.expansions.insert(canonical_name(name), expansion);
    }

    pub fn resolve_card<L: CardLookup + ?Sized>(
        &mut self,
        db: &Database,
        lookup: &mut L,
        name: &str,
    ) -> Option<CardId> {
        self.sync(db);
        if let Some(known) = self.card(name) {
            return known;
        }
        let found = lookup.lookup_card(db, name);
        self.insert_card(name, found);
        found
    }

    pub fn resolve_expansion<L: CardLookup + ?Sized>(
        &mut self,
        db: &Database,
        lookup: &mut L,
        name: &str,
    ) -> Option<LookupId> {
        self.sync(db);
        if let Some(known) = self.expansion(name) {
            return known;
        }
        let found = lookup.lookup_expansion(db, name);
        self.insert_expansion(name, found);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{CardRecord, CatalogFile};

    struct Counting(usize);

    impl CardLookup for Counting {
        fn lookup_card(&mut self, db: &Database, name: &str) -> Option<CardId> {
            self.0 += 1;
            db.find_card(name)
        }
    }

    #[test]
    fn hits_and_misses_are_remembered() {
        let mut db = Database::new();
        let abbot = db.add_card(&CardRecord::new("Abbot")).unwrap();
        let mut cache = LookupCache::new();
        let mut lookup = Counting(0);

        assert_eq!(cache.resolve_card(&db, &mut lookup, "Abbot"), Some(abbot));
        assert_eq!(cache.resolve_card(&db, &mut lookup, "ABBOT"), Some(abbot));
        assert_eq!(cache.resolve_card(&db, &mut lookup, "Nobody"), None);
        assert_eq!(cache.resolve_card(&db, &mut lookup, "nobody"), None);
        assert_eq!(lookup.0, 2);
        assert_eq!(cache.card("Nobody"), Some(None));
    }

    #[test]
    fn catalog_reload_invalidates() {
        let mut db = Database::new();
        db.add_card(&CardRecord::new("Abbot")).unwrap();
        let mut cache = LookupCache::new();
        let mut lookup = Counting(0);
        cache.resolve_card(&db, &mut lookup, "Abbot");
        assert!(!cache.is_empty());

        db.reset_catalog();
        let catalog = CatalogFile {
            cards: vec![CardRecord::new("Abbot")],
            ..Default::default()
        };
        db.load_catalog(&catalog).unwrap();

        cache.resolve_card(&db, &mut lookup, "Abbot");
        assert_eq!(lookup.0, 2);
        assert_eq!(cache.len(), 1);
    }
}
