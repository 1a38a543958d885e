use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SutekhError};
use crate::graph;
use crate::model::CardSetId;
use crate::schema::Database;
use crate::store::{transaction, DataStore};
use serde::Serialize;

/// What deleting a card set would throw away, for the caller to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteCheck {
    pub name: String,
    pub card_count: usize,
    pub children: Vec<String>,
}

impl DeleteCheck {
    /// Nothing would be lost and no child would be detached.
    pub fn is_clean(&self) -> bool {
        self.card_count == 0 && self.children.is_empty()
    }
}

/// Advisory check run before [`run`]. Never changes anything.
pub fn check_ok_to_delete(db: &Database, card_set: CardSetId) -> Result<DeleteCheck> {
    let cs = db.get_card_set(card_set)?;
    Ok(DeleteCheck {
        name: cs.name.clone(),
        card_count: db.card_count(card_set),
        children: graph::find_children(db, card_set)
            .into_iter()
            .map(|id| db.card_set_name(id))
            .collect(),
    })
}

/// Deletes a card set and its contents.
///
/// Children are not deleted. Any child still attached becomes a top-level
/// card set, and a warning names it.
pub fn run<S: DataStore>(store: &mut S, card_set: CardSetId) -> Result<CmdResult> {
    let (removed, detached) = transaction(store, |db| {
        db.get_card_set(card_set)?;
        let mut detached = Vec::new();
        for child in graph::find_children(db, card_set) {
            if let Some(cs) = db.card_set_mut(child) {
                cs.parent = None;
                detached.push(cs.clone());
            }
        }
        let removed = db
            .remove_card_set_row(card_set)
            .ok_or_else(|| SutekhError::CardSetNotFound(format!("#{}", card_set)))?;
        Ok((removed, detached))
    })?;
    tracing::info!(card_set = %removed.name, detached = detached.len(), "card set deleted");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Card set deleted: {}",
        removed.name
    )));
    for child in &detached {
        result.add_message(CmdMessage::warning(format!(
            "{} is now a top-level card set",
            child.name
        )));
    }
    Ok(result.with_affected_card_sets(detached))
}
