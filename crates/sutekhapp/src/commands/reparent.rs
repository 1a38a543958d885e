//! Moving card sets in the hierarchy.
//!
//! The new parent is applied to the working copy first and the loop check
//! runs on the result. A change that would close a loop is declined with
//! [`SutekhError::LoopIntroduced`]; the transaction restores the previous
//! parent, so the speculative state is never committed or observable.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SutekhError};
use crate::graph;
use crate::model::CardSetId;
use crate::schema::Database;
use crate::store::{transaction, DataStore};

fn set_parent(db: &mut Database, card_set: CardSetId, parent: Option<CardSetId>) -> Result<()> {
    if let Some(parent) = parent {
        db.get_card_set(parent)?;
    }
    db.card_set_mut(card_set)
        .ok_or_else(|| SutekhError::CardSetNotFound(format!("#{}", card_set)))?
        .parent = parent;
    if graph::detect_loop(db, card_set) {
        return Err(SutekhError::LoopIntroduced {
            card_set: db.card_set_name(card_set),
            parent: parent.map(|p| db.card_set_name(p)).unwrap_or_default(),
            chain: graph::get_loop_names(db, card_set),
        });
    }
    Ok(())
}

fn describe(db: &Database, parent: Option<CardSetId>) -> String {
    match parent {
        Some(id) => format!("under {}", db.card_set_name(id)),
        None => "to the top level".to_string(),
    }
}

/// Sets the parent of `card_set`; `None` makes it a top-level set.
pub fn run<S: DataStore>(
    store: &mut S,
    card_set: CardSetId,
    parent: Option<CardSetId>,
) -> Result<CmdResult> {
    let updated = transaction(store, |db| {
        set_parent(db, card_set, parent)?;
        Ok(db.get_card_set(card_set)?.clone())
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Moved {} {}",
        updated.name,
        describe(store.db(), parent)
    )));
    result.affected_card_sets.push(updated);
    Ok(result)
}

/// Moves every child of `from` to `to`, all or nothing.
pub fn reparent_all_children<S: DataStore>(
    store: &mut S,
    from: CardSetId,
    to: Option<CardSetId>,
) -> Result<CmdResult> {
    let moved = transaction(store, |db| {
        db.get_card_set(from)?;
        let children = graph::find_children(db, from);
        for child in &children {
            set_parent(db, *child, to)?;
        }
        children
            .iter()
            .map(|id| db.get_card_set(*id).cloned())
            .collect::<Result<Vec<_>>>()
    })?;

    let mut result = CmdResult::default();
    let target = describe(store.db(), to);
    for cs in &moved {
        result.add_message(CmdMessage::success(format!("Moved {} {}", cs.name, target)));
    }
    if moved.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "{} has no children",
            store.db().card_set_name(from)
        )));
    }
    Ok(result.with_affected_card_sets(moved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCardSet;
    use crate::store::InMemoryStore;

    fn tree() -> (InMemoryStore, CardSetId, CardSetId) {
        let mut db = Database::new();
        let p = db.insert_card_set(NewCardSet::new("P")).unwrap();
        let q = db
            .insert_card_set(NewCardSet::new("Q").with_parent(Some(p)))
            .unwrap();
        (InMemoryStore::from_database(db), p, q)
    }

    #[test]
    fn parent_under_own_child_is_declined() {
        let (mut store, p, q) = tree();
        assert!(!graph::detect_loop(store.db(), q));

        let err = run(&mut store, p, Some(q)).unwrap_err();
        match err {
            SutekhError::LoopIntroduced { card_set, chain, .. } => {
                assert_eq!(card_set, "P");
                assert_eq!(chain, vec!["P", "Q"]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(store.db().card_set(p).unwrap().parent, None);
        assert!(!graph::detect_loop(store.db(), q));
        assert_eq!(store.backend().save_count(), 0);
    }

    #[test]
    fn valid_move_commits() {
        let (mut store, p, q) = tree();
        let r = store
            .db_mut()
            .insert_card_set(NewCardSet::new("R"))
            .unwrap();

        run(&mut store, q, Some(r)).unwrap();
        assert_eq!(store.db().card_set(q).unwrap().parent, Some(r));
        run(&mut store, p, Some(q)).unwrap();
        assert_eq!(store.db().card_set(p).unwrap().parent, Some(q));

        run(&mut store, p, None).unwrap();
        assert_eq!(store.db().card_set(p).unwrap().parent, None);
    }

    #[test]
    fn self_parent_is_declined() {
        let (mut store, p, _) = tree();
        assert!(matches!(
            run(&mut store, p, Some(p)),
            Err(SutekhError::LoopIntroduced { .. })
        ));
    }

    #[test]
    fn children_move_together() {
        let (mut store, p, q) = tree();
        let q2 = store
            .db_mut()
            .insert_card_set(NewCardSet::new("Q2").with_parent(Some(p)))
            .unwrap();
        let r = store
            .db_mut()
            .insert_card_set(NewCardSet::new("R"))
            .unwrap();

        let result = reparent_all_children(&mut store, p, Some(r)).unwrap();
        assert_eq!(result.affected_card_sets.len(), 2);
        assert_eq!(graph::find_children(store.db(), r), vec![q, q2]);
        assert!(graph::find_children(store.db(), p).is_empty());
    }

    #[test]
    fn moving_children_under_a_child_rolls_back() {
        let (mut store, p, q) = tree();
        let q2 = store
            .db_mut()
            .insert_card_set(NewCardSet::new("Q2").with_parent(Some(p)))
            .unwrap();

        // Q2 under Q2 is a loop, so Q must not move either
        assert!(reparent_all_children(&mut store, p, Some(q2)).is_err());
        assert_eq!(store.db().card_set(q).unwrap().parent, Some(p));
        assert_eq!(store.db().card_set(q2).unwrap().parent, Some(p));
    }
}
