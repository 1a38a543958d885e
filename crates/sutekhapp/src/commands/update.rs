use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SutekhError};
use crate::model::{CardId, CardSetId, LookupId};
use crate::store::{transaction, DataStore};

/// Metadata changes; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSetUpdate {
    pub name: Option<String>,
    pub author: Option<String>,
    pub comment: Option<String>,
    pub annotations: Option<String>,
    pub in_use: Option<bool>,
}

impl CardSetUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn run<S: DataStore>(
    store: &mut S,
    card_set: CardSetId,
    update: CardSetUpdate,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if update.is_empty() {
        result.add_message(CmdMessage::info("Nothing to update"));
        return Ok(result);
    }

    let updated = transaction(store, |db| {
        if let Some(name) = &update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(SutekhError::MissingName);
            }
            if db.find_card_set(name).is_some_and(|other| other != card_set) {
                return Err(SutekhError::CardSetExists(name.to_string()));
            }
        }
        let cs = db
            .card_set_mut(card_set)
            .ok_or_else(|| SutekhError::CardSetNotFound(format!("#{}", card_set)))?;
        if let Some(name) = update.name {
            cs.name = name.trim().to_string();
        }
        if let Some(author) = update.author {
            cs.author = author;
        }
        if let Some(comment) = update.comment {
            cs.comment = comment;
        }
        if let Some(annotations) = update.annotations {
            cs.annotations = annotations;
        }
        if let Some(in_use) = update.in_use {
            cs.in_use = in_use;
        }
        Ok(cs.clone())
    })?;

    result.add_message(CmdMessage::success(format!(
        "Card set updated: {}",
        updated.name
    )));
    result.affected_card_sets.push(updated);
    Ok(result)
}

/// Adds `count` copies of a printing to a card set.
pub fn add_cards<S: DataStore>(
    store: &mut S,
    card_set: CardSetId,
    card: CardId,
    expansion: Option<LookupId>,
    count: u32,
) -> Result<CmdResult> {
    let name = store.db().card_name(card);
    let updated = transaction(store, |db| {
        db.card(card)
            .ok_or_else(|| SutekhError::not_found("Card", format!("#{}", card)))?;
        db.get_card_set(card_set)?;
        let physical = db.physical_card_for(card, expansion);
        for _ in 0..count {
            db.add_membership(card_set, physical);
        }
        Ok(db.get_card_set(card_set)?.clone())
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added {} x {} to {}",
        count, name, updated.name
    )));
    result.affected_card_sets.push(updated);
    Ok(result)
}

/// Removes `count` copies of a printing. Fails, removing nothing, if fewer
/// copies are present or `count` is zero.
pub fn remove_cards<S: DataStore>(
    store: &mut S,
    card_set: CardSetId,
    card: CardId,
    expansion: Option<LookupId>,
    count: u32,
) -> Result<CmdResult> {
    if count == 0 {
        return Err(SutekhError::InvalidRequest(
            "nothing to remove, count must be at least 1".to_string(),
        ));
    }
    let name = store.db().card_name(card);
    let updated = transaction(store, |db| {
        let cs = db.get_card_set(card_set)?.clone();
        let available = db
            .find_physical_card(card, expansion)
            .and_then(|pc| db.physical_counts(card_set).get(&pc).copied())
            .unwrap_or(0);
        if count > available {
            return Err(SutekhError::InvalidRemoval {
                name: db.card_name(card),
                expansion: db.expansion_name(expansion).map(str::to_string),
                requested: count,
                available,
            });
        }
        if let Some(physical) = db.find_physical_card(card, expansion) {
            db.remove_memberships(card_set, physical, count);
        }
        Ok(cs)
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Removed {} x {} from {}",
        count, name, updated.name
    )));
    result.affected_card_sets.push(updated);
    Ok(result)
}
