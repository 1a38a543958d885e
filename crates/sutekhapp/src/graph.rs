//! # Card Set Graph
//!
//! Card sets form a forest through their `parent` links. Nothing at the row
//! level prevents a cycle, so every walk up the parent chain here is bounded
//! by the number of card sets and terminates on corrupt data.
//!
//! These are read-mostly primitives; the operations that change the graph
//! (reparenting, deletion, repair) live in [`crate::commands`] and run inside
//! a transaction.

use crate::error::{Result, SutekhError};
use crate::model::CardSetId;
use crate::schema::Database;
use std::collections::{BTreeSet, VecDeque};

/// Direct children of `card_set`, in id order.
pub fn find_children(db: &Database, card_set: CardSetId) -> Vec<CardSetId> {
    db.card_sets()
        .iter()
        .filter(|cs| cs.parent == Some(card_set))
        .map(|cs| cs.id)
        .collect()
}

/// Every card set below `card_set`, breadth first. The starting set is never
/// included, even when it sits on a loop.
pub fn descendants(db: &Database, card_set: CardSetId) -> Vec<CardSetId> {
    let mut seen = BTreeSet::from([card_set]);
    let mut queue = VecDeque::from([card_set]);
    let mut found = Vec::new();
    while let Some(current) = queue.pop_front() {
        for child in find_children(db, current) {
            if seen.insert(child) {
                found.push(child);
                queue.push_back(child);
            }
        }
    }
    found
}

/// The parent chain starting at `card_set`: the set itself, then each ancestor,
/// stopping before the first repeated set.
fn ancestry(db: &Database, card_set: CardSetId) -> Vec<CardSetId> {
    let mut chain = vec![card_set];
    let mut seen = BTreeSet::from([card_set]);
    let mut current = card_set;
    // Bounded: each step visits a new set
    for _ in 0..db.card_sets().len() {
        match db.card_set(current).and_then(|cs| cs.parent) {
            Some(parent) if seen.insert(parent) => {
                chain.push(parent);
                current = parent;
            }
            _ => break,
        }
    }
    chain
}

/// Where the walk from `card_set` re-enters itself, if it does.
fn revisit(db: &Database, card_set: CardSetId) -> Option<(Vec<CardSetId>, CardSetId)> {
    let chain = ancestry(db, card_set);
    let last = *chain.last()?;
    let parent = db.card_set(last).and_then(|cs| cs.parent)?;
    // The chain stopped on a repeated set rather than on a root
    Some((chain, parent))
}

/// True when following parents from `card_set` comes back to `card_set`.
///
/// A set that merely hangs below a loop is not itself on a loop.
pub fn detect_loop(db: &Database, card_set: CardSetId) -> bool {
    matches!(revisit(db, card_set), Some((_, repeated)) if repeated == card_set)
}

/// Names of the sets on the loop through `card_set`, starting with it.
/// Empty when `card_set` is not on a loop.
pub fn get_loop_names(db: &Database, card_set: CardSetId) -> Vec<String> {
    match revisit(db, card_set) {
        Some((chain, repeated)) if repeated == card_set => {
            chain.into_iter().map(|id| db.card_set_name(id)).collect()
        }
        _ => Vec::new(),
    }
}

/// Breaks the loop reached from `card_set` by clearing the parent of the set
/// whose parent link would revisit an already-seen set. Returns that set's
/// name, or `None` when no loop is reachable.
pub fn break_loop(db: &mut Database, card_set: CardSetId) -> Option<String> {
    let (chain, _) = revisit(db, card_set)?;
    let breaker = *chain.last()?;
    let cs = db.card_set_mut(breaker)?;
    cs.parent = None;
    tracing::info!(card_set = %cs.name, "broke card set loop");
    Some(cs.name.clone())
}

/// Every loop currently present, each as a list of names.
pub fn find_loops(db: &Database) -> Vec<Vec<String>> {
    let mut reported = BTreeSet::new();
    let mut loops = Vec::new();
    for cs in db.card_sets() {
        if reported.contains(&cs.id) || !detect_loop(db, cs.id) {
            continue;
        }
        let members = ancestry(db, cs.id);
        reported.extend(members.iter().copied());
        loops.push(members.into_iter().map(|id| db.card_set_name(id)).collect());
    }
    loops
}

/// Fails with [`SutekhError::LoopDetected`] if any parent chain cycles.
pub fn check_forest(db: &Database) -> Result<()> {
    match find_loops(db).into_iter().next() {
        Some(chain) => Err(SutekhError::LoopDetected(chain)),
        None => Ok(()),
    }
}
