//! Replacing the card catalog.
//!
//! A new card list replaces every catalog table in one transaction. Card set
//! rows are untouched; their contents are re-attached by card name and
//! expansion name, since catalog ids change. Cards that no longer exist are
//! dropped from their card sets with a warning.

use crate::cache::LookupCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{CardSetId, LookupKind};
use crate::schema::catalog::CatalogFile;
use crate::schema::Database;
use crate::store::{transaction, DataStore};
use std::collections::BTreeMap;

/// Card set id to name, for callers remapping their own state after a reload.
pub fn card_set_names(db: &Database) -> BTreeMap<CardSetId, String> {
    db.card_sets()
        .iter()
        .map(|cs| (cs.id, cs.name.clone()))
        .collect()
}

struct SavedCopy {
    card_set: CardSetId,
    card: String,
    display_name: String,
    expansion: Option<String>,
}

fn save_contents(db: &Database) -> Vec<SavedCopy> {
    db.memberships()
        .iter()
        .filter_map(|m| {
            let physical = db.physical_card(m.physical_card)?;
            let card = db.card(physical.card)?;
            Some(SavedCopy {
                card_set: m.card_set,
                card: card.canonical_name.clone(),
                display_name: card.name.clone(),
                expansion: db.expansion_name(physical.expansion).map(str::to_string),
            })
        })
        .collect()
}

pub fn refresh<S: DataStore>(
    store: &mut S,
    catalog: &CatalogFile,
    cache: &mut LookupCache,
) -> Result<CmdResult> {
    let (cards, restored, warnings) = transaction(store, |db| {
        let saved = save_contents(db);
        db.reset_catalog();
        let cards = db.load_catalog(catalog)?;

        // Warn once per card set and card, not once per copy
        let mut dropped: BTreeMap<(CardSetId, String), u32> = BTreeMap::new();
        let mut unknown_expansion: BTreeMap<(CardSetId, String, String), u32> = BTreeMap::new();
        let mut restored = 0;
        for copy in saved {
            let Some(card) = db.find_card(&copy.card) else {
                *dropped.entry((copy.card_set, copy.display_name)).or_insert(0) += 1;
                continue;
            };
            let expansion = match &copy.expansion {
                None => None,
                Some(name) => {
                    let found = db.find_lookup(LookupKind::Expansion, name);
                    if found.is_none() {
                        *unknown_expansion
                            .entry((copy.card_set, copy.display_name.clone(), name.clone()))
                            .or_insert(0) += 1;
                    }
                    found
                }
            };
            let physical = db.physical_card_for(card, expansion);
            db.add_membership(copy.card_set, physical);
            restored += 1;
        }

        let mut warnings = Vec::new();
        for ((set, card), count) in dropped {
            warnings.push(format!(
                "{} x {} removed from {}: card no longer in the catalog",
                count,
                card,
                db.card_set_name(set)
            ));
        }
        for ((set, card, expansion), count) in unknown_expansion {
            warnings.push(format!(
                "{} x {} in {}: expansion '{}' no longer exists, kept without expansion",
                count,
                card,
                db.card_set_name(set),
                expansion
            ));
        }
        Ok((cards, restored, warnings))
    })?;
    cache.invalidate();
    tracing::info!(cards, restored, dropped = warnings.len(), "catalog refreshed");

    let mut result = CmdResult::default();
    for warning in warnings {
        tracing::debug!("{}", warning);
        result.add_message(CmdMessage::warning(warning));
    }
    result.add_message(CmdMessage::success(format!(
        "Catalog loaded: {} cards, {} card set entries restored",
        cards, restored
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCardSet;
    use crate::schema::catalog::CardRecord;
    use crate::store::InMemoryStore;

    fn first_catalog() -> CatalogFile {
        CatalogFile {
            lookups: vec![],
            cards: vec![
                CardRecord::new("Blood Doll").rarity("Jyhad", "Common"),
                CardRecord::new("Pentex Subversion").rarity("Jyhad", "Rare"),
                CardRecord::new("Zip Line"),
            ],
        }
    }

    fn second_catalog() -> CatalogFile {
        CatalogFile {
            lookups: vec![],
            cards: vec![
                CardRecord::new("Zip Line").rarity("Anarchs", "Common"),
                CardRecord::new("Blood Doll").rarity("Camarilla Edition", "Common"),
            ],
        }
    }

    fn store_with_deck() -> (InMemoryStore, CardSetId) {
        let mut db = Database::from_catalog(&first_catalog()).unwrap();
        let deck = db.insert_card_set(NewCardSet::new("Deck")).unwrap();
        let jyhad = db.find_lookup(LookupKind::Expansion, "Jyhad");
        for (name, exp, count) in [
            ("Blood Doll", None, 2),
            ("Blood Doll", jyhad, 1),
            ("Pentex Subversion", None, 1),
            ("Zip Line", None, 3),
        ] {
            let card = db.find_card(name).unwrap();
            let pc = db.physical_card_for(card, exp);
            for _ in 0..count {
                db.add_membership(deck, pc);
            }
        }
        (InMemoryStore::from_database(db), deck)
    }

    #[test]
    fn refresh_reattaches_memberships() {
        let (mut store, deck) = store_with_deck();
        let mut cache = LookupCache::new();
        let result = refresh(&mut store, &second_catalog(), &mut cache).unwrap();

        let db = store.db();
        assert_eq!(db.cards().len(), 2);
        // Pentex Subversion dropped, everything else restored
        assert_eq!(db.card_count(deck), 6);
        let doll = db.find_card("Blood Doll").unwrap();
        assert_eq!(
            db.physical_counts(deck)[&db.find_physical_card(doll, None).unwrap()],
            3
        );
        let warnings: Vec<&str> = result.warnings().collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Pentex Subversion"));
        assert!(warnings[1].contains("Jyhad"));
    }

    #[test]
    fn refresh_keeps_card_set_rows_and_invalidates_cache() {
        let (mut store, deck) = store_with_deck();
        let names_before = card_set_names(store.db());
        let mut cache = LookupCache::new();
        cache.sync(store.db());
        cache.insert_card("Zip Line", store.db().find_card("Zip Line"));

        refresh(&mut store, &second_catalog(), &mut cache).unwrap();
        assert!(cache.is_empty());
        assert_eq!(card_set_names(store.db()), names_before);
        assert_eq!(names_before[&deck], "Deck");
    }

    #[test]
    fn failed_refresh_changes_nothing() {
        let (mut store, deck) = store_with_deck();
        let broken = CatalogFile {
            lookups: vec![],
            cards: vec![CardRecord::new("Twin"), CardRecord::new("twin")],
        };
        let mut cache = LookupCache::new();
        assert!(refresh(&mut store, &broken, &mut cache).is_err());
        assert_eq!(store.db().cards().len(), 3);
        assert_eq!(store.db().card_count(deck), 7);
    }
}
