use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SutekhError};
use crate::filters::Filter;
use crate::model::NewCardSet;
use crate::schema::query::EntityType;
use crate::store::{transaction, DataStore};

/// Creates a card set holding one copy of everything `filter` selects.
///
/// Card-level filters give one copy per abstract card with no expansion.
/// Filters that only work on physical cards (expansion, in-use) give one copy
/// per matching printing.
pub fn run<S: DataStore>(store: &mut S, filter: &Filter, new: NewCardSet) -> Result<CmdResult> {
    let types = filter.types();
    let name = new.name.clone();
    let id = transaction(store, |db| {
        let printings = if types.contains(EntityType::AbstractCard) {
            filter
                .select_cards(db)?
                .into_iter()
                .map(|card| db.physical_card_for(card, None))
                .collect::<Vec<_>>()
        } else if types.contains(EntityType::PhysicalCard) {
            filter.select_physical_cards(db)?
        } else {
            return Err(SutekhError::UnsupportedEntity {
                filter: filter.name(),
                entity: EntityType::PhysicalCard,
            });
        };
        let id = db.insert_card_set(new)?;
        for physical in printings {
            db.add_membership(id, physical);
        }
        Ok(id)
    })?;

    let card_set = store.db().get_card_set(id)?.clone();
    let count = store.db().card_count(id);
    let mut result = CmdResult::default();
    if count == 0 {
        result.add_message(CmdMessage::warning(format!(
            "No cards matched; {} is empty",
            name
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Card set {} created with {} card(s)",
        name, count
    )));
    result.affected_card_sets.push(card_set);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LookupKind;
    use crate::schema::catalog::CardRecord;
    use crate::schema::Database;
    use crate::store::InMemoryStore;

    fn store() -> InMemoryStore {
        let mut db = Database::new();
        db.add_card(&CardRecord::new("Aire of Elation").clans(&["Toreador"]))
            .unwrap();
        db.add_card(&CardRecord::new("Art Scam").clans(&["Toreador"]))
            .unwrap();
        db.add_card(&CardRecord::new("Govern the Unaligned").clans(&["Ventrue"]))
            .unwrap();
        InMemoryStore::from_database(db)
    }

    #[test]
    fn card_filter_adds_one_copy_each() {
        let mut store = store();
        let filter = Filter::clan(store.db(), "Toreador").unwrap();
        let result = run(&mut store, &filter, NewCardSet::new("Toreador cards")).unwrap();

        let id = result.affected_card_sets[0].id;
        assert_eq!(store.db().card_count(id), 2);
        assert!(!result.has_warnings());
    }

    #[test]
    fn physical_filter_uses_printings() {
        let mut store = store();
        let card = store.db().find_card("Art Scam").unwrap();
        let jyhad = store.db_mut().add_lookup(LookupKind::Expansion, "Jyhad", None);
        store.db_mut().physical_card_for(card, Some(jyhad));

        let filter = Filter::physical_expansion(store.db(), Some("Jyhad")).unwrap();
        let result = run(&mut store, &filter, NewCardSet::new("Jyhad")).unwrap();
        let id = result.affected_card_sets[0].id;
        assert_eq!(store.db().card_count(id), 1);
    }

    #[test]
    fn card_set_filters_are_rejected() {
        let mut store = store();
        let result = run(&mut store, &Filter::card_set_in_use(), NewCardSet::new("X"));
        assert!(matches!(result, Err(SutekhError::UnsupportedEntity { .. })));
        assert!(store.db().card_sets().is_empty());
    }

    #[test]
    fn empty_selection_warns() {
        let mut store = store();
        let filter = Filter::card_name("Nothing like this");
        let result = run(&mut store, &filter, NewCardSet::new("Empty")).unwrap();
        assert!(result.has_warnings());
    }
}
