use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::graph;
use crate::schema::Database;
use crate::store::{transaction, DataStore};
use serde::Serialize;

/// One loop found and broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopRepair {
    /// Card set names around the loop, as first detected.
    pub chain: Vec<String>,
    /// The card set whose parent was cleared.
    pub broken_at: String,
}

/// Breaks every loop in the hierarchy. Running it again finds nothing.
pub fn break_existing_loops(db: &mut Database) -> Vec<LoopRepair> {
    let mut repairs = Vec::new();
    let ids: Vec<_> = db.card_sets().iter().map(|cs| cs.id).collect();
    for id in ids {
        if !graph::detect_loop(db, id) {
            continue;
        }
        let chain = graph::get_loop_names(db, id);
        if let Some(broken_at) = graph::break_loop(db, id) {
            repairs.push(LoopRepair { chain, broken_at });
        }
    }
    repairs
}

pub fn run<S: DataStore>(store: &mut S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if graph::find_loops(store.db()).is_empty() {
        result.add_message(CmdMessage::success("No loops found."));
        return Ok(result);
    }

    let repairs = transaction(store, |db| Ok(break_existing_loops(db)))?;
    result.add_message(CmdMessage::warning(format!(
        "Found {} loop(s) in the card set hierarchy:",
        repairs.len()
    )));
    for repair in &repairs {
        result.add_message(CmdMessage::info(format!(
            "  - {}: removed the parent of {}",
            repair.chain.join(" -> "),
            repair.broken_at
        )));
        if let Some(cs) = store
            .db()
            .find_card_set(&repair.broken_at)
            .and_then(|id| store.db().card_set(id))
        {
            result.affected_card_sets.push(cs.clone());
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardSetId, NewCardSet};
    use crate::store::InMemoryStore;

    fn looped() -> InMemoryStore {
        let mut db = Database::new();
        let a = db.insert_card_set(NewCardSet::new("A")).unwrap();
        let b = db
            .insert_card_set(NewCardSet::new("B").with_parent(Some(a)))
            .unwrap();
        let c = db
            .insert_card_set(NewCardSet::new("C").with_parent(Some(b)))
            .unwrap();
        db.card_set_mut(a).unwrap().parent = Some(c);
        let x = db.insert_card_set(NewCardSet::new("X")).unwrap();
        db.card_set_mut(x).unwrap().parent = Some(x);
        InMemoryStore::from_database(db)
    }

    #[test]
    fn repairs_every_loop() {
        let mut store = looped();
        let result = run(&mut store).unwrap();

        assert!(graph::check_forest(store.db()).is_ok());
        assert_eq!(result.affected_card_sets.len(), 2);
        assert!(result.messages[1].content.contains("A -> C -> B"));
        assert_eq!(store.backend().save_count(), 1);
    }

    #[test]
    fn repair_is_idempotent() {
        let mut store = looped();
        run(&mut store).unwrap();
        let parents: Vec<Option<CardSetId>> =
            store.db().card_sets().iter().map(|cs| cs.parent).collect();

        let again = run(&mut store).unwrap();
        assert!(again.messages[0].content.contains("No loops"));
        let after: Vec<Option<CardSetId>> =
            store.db().card_sets().iter().map(|cs| cs.parent).collect();
        assert_eq!(parents, after);
    }

    #[test]
    fn break_reports_break_point() {
        let mut store = looped();
        let repairs = break_existing_loops(store.db_mut());
        assert_eq!(
            repairs[0],
            LoopRepair {
                chain: vec!["A".into(), "C".into(), "B".into()],
                broken_at: "B".into(),
            }
        );
        assert_eq!(repairs[1].broken_at, "X");
    }
}
