//! Committing a [`CardSetHolder`] and reading plain text deck lists.
//!
//! The deck list format is one card per line:
//!
//! ```text
//! Deck Name: Stealth bleed
//! Author: Anneke
//! Description: Baby Malks
//! Parent: Tournament decks
//!
//! 3x Dementation
//! 2 Forced Awakening [Jyhad]
//! Rötschreck
//! # comments and blank lines are skipped
//! ```
//!
//! A missing count means one copy. The optional `[...]` suffix names the
//! expansion.
//!
//! A leading number is always read as the count, so a card whose name starts
//! with digits needs an explicit count: `1x 419 Operation` is one copy of
//! "419 Operation", while `419 Operation` is 419 copies of "Operation". A
//! count too large for `u32`, on one line or summed across lines for the
//! same printing, fails the whole list.

use crate::cache::LookupCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SutekhError};
use crate::graph;
use crate::holder::CardSetHolder;
use crate::lookup::CardLookup;
use crate::schema::Database;
use crate::store::{transaction, DataStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What to do when a card set with the holder's name already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    #[default]
    Fail,
    /// Delete the existing card set; its children move to the new one. A
    /// parent that is one of those children is declined as a loop.
    Replace,
    /// Import under the first free "<name> (n)".
    Rename,
}

pub fn unique_name(db: &Database, name: &str) -> String {
    if db.find_card_set(name).is_none() {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{} ({})", name, n))
        .find(|candidate| db.find_card_set(candidate).is_none())
        .unwrap_or_else(|| name.to_string())
}

pub fn run<S, L>(
    store: &mut S,
    holder: &mut CardSetHolder,
    lookup: &mut L,
    cache: &mut LookupCache,
    policy: ImportPolicy,
) -> Result<CmdResult>
where
    S: DataStore + ?Sized,
    L: CardLookup + ?Sized,
{
    let name = holder
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(SutekhError::MissingName)?
        .to_string();
    if holder.is_empty() {
        return Err(SutekhError::EmptyHolder(name));
    }

    let mut result = CmdResult::default();
    let existing = store.db().find_card_set(&name);
    let replacing = match (existing, policy) {
        (None, _) => None,
        (Some(_), ImportPolicy::Fail) => return Err(SutekhError::CardSetExists(name)),
        (Some(id), ImportPolicy::Replace) => Some(id),
        (Some(_), ImportPolicy::Rename) => {
            let renamed = unique_name(store.db(), &name);
            result.add_message(CmdMessage::info(format!(
                "Card set '{}' exists, importing as '{}'",
                name, renamed
            )));
            holder.set_name(renamed);
            None
        }
    };

    holder.clear_warnings();
    let mut prepared = holder.prepare(store.db(), lookup, cache)?;
    let id = transaction(store, |db| {
        let Some(old) = replacing else {
            return prepared.insert(db);
        };
        let old_row = db.get_card_set(old)?.clone();
        // The new set takes the old one's place in the hierarchy
        if prepared.card_set.parent == Some(old) {
            prepared.card_set.parent = old_row.parent;
        }
        let children = graph::find_children(db, old);
        db.remove_card_set_row(old);
        let id = prepared.insert(db)?;
        for child in children {
            if let Some(cs) = db.card_set_mut(child) {
                cs.parent = Some(id);
            }
        }
        // A parent below the replaced set now hangs under the new one
        if graph::detect_loop(db, id) {
            let parent = db.get_card_set(id)?.parent;
            return Err(SutekhError::LoopIntroduced {
                card_set: db.card_set_name(id),
                parent: parent.map(|p| db.card_set_name(p)).unwrap_or_default(),
                chain: graph::get_loop_names(db, id),
            });
        }
        tracing::info!(card_set = %old_row.name, "replaced existing card set");
        Ok(id)
    })?;

    let card_set = store.db().get_card_set(id)?.clone();
    for warning in holder.warnings() {
        result.add_message(CmdMessage::warning(warning.clone()));
    }
    result.add_message(CmdMessage::success(format!(
        "Imported {} card(s) into {}",
        store.db().card_count(id),
        card_set.name
    )));
    result.affected_card_sets.push(card_set);
    Ok(result)
}

static COUNTED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*[xX]?\s+)?(.+?)(?:\s*\[([^\]]+)\])?$").expect("static regex")
});

/// Reads a deck list into a holder. Anything that is not metadata or a
/// comment is a card name; only an oversized count is an error.
pub fn parse_deck_list(text: &str) -> Result<CardSetHolder> {
    let mut holder = CardSetHolder::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            match key.trim().to_lowercase().as_str() {
                "deck name" | "name" => {
                    holder.set_name(value);
                    continue;
                }
                "author" | "created by" => {
                    holder.author = value;
                    continue;
                }
                "description" => {
                    holder.comment = value;
                    continue;
                }
                "parent" => {
                    holder.set_parent(Some(value));
                    continue;
                }
                // Card names may contain colons
                _ => {}
            }
        }
        if let Some(caps) = COUNTED_LINE.captures(line) {
            let count = match caps.get(1) {
                Some(m) => m.as_str().parse().map_err(|_| {
                    SutekhError::InvalidRequest(format!("invalid card count in line '{}'", line))
                })?,
                None => 1,
            };
            let expansion = caps.get(3).map(|m| m.as_str().trim());
            holder.add(count, caps[2].trim(), expansion)?;
        }
    }
    Ok(holder)
}
