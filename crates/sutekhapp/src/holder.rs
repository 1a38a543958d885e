//! # Card Set Holder
//!
//! A staging area for card set contents. Import sources (deck lists, card
//! set files, filters) feed it `(count, card name, expansion name)` triples
//! and metadata; [`CardSetHolder::create_pcs`] resolves the names and writes
//! the card set in a single transaction.
//!
//! Problems with individual entries never abort the commit. Unknown card
//! names are skipped, unknown expansions fall back to "no expansion" and a
//! missing parent leaves the new set at the top level; each of these becomes
//! a warning on the holder. Only a missing name, a name clash or a storage
//! failure make the commit fail, and then nothing is written.

use crate::cache::LookupCache;
use crate::error::{Result, SutekhError};
use crate::lookup::CardLookup;
use crate::model::{CardId, CardSetId, LookupId, NewCardSet};
use crate::schema::Database;
use crate::store::{transaction, DataStore};
use std::collections::BTreeMap;

type EntryKey = (String, Option<String>);

#[derive(Debug, Clone, Default)]
pub struct CardSetHolder {
    pub name: Option<String>,
    /// Name of the parent card set, resolved at commit time.
    pub parent: Option<String>,
    pub author: String,
    pub comment: String,
    pub annotations: String,
    pub in_use: bool,
    entries: BTreeMap<EntryKey, u32>,
    warnings: Vec<String>,
}

impl CardSetHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    /// Stages `count` more copies. Adding zero copies is a no-op; a total
    /// past `u32::MAX` for one entry is refused and leaves the holder
    /// unchanged.
    pub fn add(&mut self, count: u32, name: &str, expansion: Option<&str>) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let key = (name.to_string(), expansion.map(str::to_string));
        let entry = self.entries.entry(key).or_insert(0);
        *entry = entry.checked_add(count).ok_or_else(|| {
            SutekhError::InvalidRequest(format!("too many copies of '{}'", name))
        })?;
        Ok(())
    }

    /// Removes copies added earlier. Removing more than was added, or zero
    /// copies, is an error and leaves the holder unchanged.
    pub fn remove(&mut self, count: u32, name: &str, expansion: Option<&str>) -> Result<()> {
        if count == 0 {
            return Err(SutekhError::InvalidRequest(format!(
                "cannot remove zero copies of '{}'",
                name
            )));
        }
        let key = (name.to_string(), expansion.map(str::to_string));
        let available = self.entries.get(&key).copied().unwrap_or(0);
        if count > available {
            return Err(SutekhError::InvalidRemoval {
                name: name.to_string(),
                expansion: expansion.map(str::to_string),
                requested: count,
                available,
            });
        }
        if count == available {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, available - count);
        }
        Ok(())
    }

    /// Total number of cards staged.
    pub fn num_entries(&self) -> u64 {
        self.entries.values().map(|count| u64::from(*count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, expansion, count)` in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>, u32)> + '_ {
        self.entries
            .iter()
            .map(|((name, exp), count)| (name.as_str(), exp.as_deref(), *count))
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    fn warn(&mut self, message: String) {
        tracing::debug!("{}", message);
        self.warnings.push(message);
    }

    /// The parent card set, if one is named and exists. A named parent that
    /// does not exist is recorded as a warning.
    pub fn get_parent(&mut self, db: &Database) -> Option<CardSetId> {
        let name = self.parent.clone()?;
        let found = db.find_card_set(&name);
        if found.is_none() {
            self.warn(format!(
                "Parent card set '{}' not found. Card set will be created without a parent",
                name
            ));
        }
        found
    }

    /// Resolves every staged name, returning `(card, expansion, count)` rows.
    fn resolve<L: CardLookup + ?Sized>(
        &mut self,
        db: &Database,
        lookup: &mut L,
        cache: &mut LookupCache,
    ) -> Vec<(CardId, Option<LookupId>, u32)> {
        let staged: Vec<(EntryKey, u32)> = self
            .entries
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        let mut rows = Vec::with_capacity(staged.len());
        for ((name, expansion), count) in staged {
            let Some(card) = cache.resolve_card(db, lookup, &name) else {
                self.warn(format!(
                    "Unable to find a card matching '{}' ({} {} skipped)",
                    name,
                    count,
                    if count == 1 { "copy" } else { "copies" }
                ));
                continue;
            };
            let expansion = match expansion {
                None => None,
                Some(exp) => {
                    let found = cache.resolve_expansion(db, lookup, &exp);
                    if found.is_none() {
                        self.warn(format!(
                            "Unknown expansion '{}' for '{}'. Adding the card without an expansion",
                            exp,
                            db.card_name(card)
                        ));
                    }
                    found
                }
            };
            rows.push((card, expansion, count));
        }
        rows
    }

    /// Resolves names and parent against `db` without writing anything.
    ///
    /// Fails only when the holder has no name; every other problem is
    /// recorded as a warning.
    pub fn prepare<L: CardLookup + ?Sized>(
        &mut self,
        db: &Database,
        lookup: &mut L,
        cache: &mut LookupCache,
    ) -> Result<PreparedCardSet> {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(SutekhError::MissingName),
        };
        let parent = self.get_parent(db);
        let rows = self.resolve(db, lookup, cache);
        let requested = self.num_entries();
        let resolved: u64 = rows.iter().map(|(_, _, count)| u64::from(*count)).sum();
        if resolved != requested {
            self.warn(format!(
                "Card set '{}' has {} of the {} requested cards",
                name, resolved, requested
            ));
        }
        Ok(PreparedCardSet {
            card_set: NewCardSet {
                name,
                author: self.author.clone(),
                comment: self.comment.clone(),
                annotations: self.annotations.clone(),
                in_use: self.in_use,
                parent,
            },
            rows,
        })
    }

    /// Writes the holder out as a new card set.
    pub fn create_pcs<S, L>(
        &mut self,
        store: &mut S,
        lookup: &mut L,
        cache: &mut LookupCache,
    ) -> Result<CardSetId>
    where
        S: DataStore + ?Sized,
        L: CardLookup + ?Sized,
    {
        if let Some(name) = self.name.as_deref().map(str::trim) {
            if store.db().find_card_set(name).is_some() {
                return Err(SutekhError::CardSetExists(name.to_string()));
            }
        }
        let prepared = self.prepare(store.db(), lookup, cache)?;
        transaction(store, |db| prepared.insert(db))
    }
}

/// A holder whose names have been resolved, ready to be inserted.
#[derive(Debug, Clone)]
pub struct PreparedCardSet {
    pub card_set: NewCardSet,
    rows: Vec<(CardId, Option<LookupId>, u32)>,
}

impl PreparedCardSet {
    pub fn name(&self) -> &str {
        &self.card_set.name
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().map(|(_, _, count)| u64::from(*count)).sum()
    }

    /// Inserts the card set and its memberships. Callers run this inside a
    /// transaction.
    pub fn insert(self, db: &mut Database) -> Result<CardSetId> {
        let total = self.total();
        let name = self.card_set.name.clone();
        let id = db.insert_card_set(self.card_set)?;
        for (card, expansion, count) in self.rows {
            let physical = db.physical_card_for(card, expansion);
            for _ in 0..count {
                db.add_membership(id, physical);
            }
        }
        tracing::info!(card_set = %name, cards = total, "card set created");
        Ok(id)
    }
}
