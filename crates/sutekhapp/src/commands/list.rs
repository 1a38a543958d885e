use crate::graph;
use crate::model::{CardSet, CardSetId};
use crate::schema::Database;
use serde::Serialize;
use std::collections::BTreeMap;

/// A card set with its depth in the hierarchy and its card count.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub depth: usize,
    pub card_set: CardSet,
    pub card_count: usize,
}

/// Every card set in depth-first order, roots and siblings sorted by name.
///
/// Sets caught in a parent loop are unreachable from any root; they are
/// listed last at depth 0 so nothing is hidden.
pub fn card_set_tree(db: &Database) -> Vec<TreeEntry> {
    let mut entries = Vec::with_capacity(db.card_sets().len());
    let mut roots: Vec<&CardSet> = db
        .card_sets()
        .iter()
        .filter(|cs| cs.parent.is_none())
        .collect();
    roots.sort_by(|a, b| a.name.cmp(&b.name));

    let mut stack: Vec<(usize, &CardSet)> = roots.into_iter().rev().map(|cs| (0, cs)).collect();
    while let Some((depth, cs)) = stack.pop() {
        entries.push(TreeEntry {
            depth,
            card_set: cs.clone(),
            card_count: db.card_count(cs.id),
        });
        let mut children: Vec<&CardSet> = graph::find_children(db, cs.id)
            .into_iter()
            .filter_map(|id| db.card_set(id))
            .collect();
        children.sort_by(|a, b| b.name.cmp(&a.name));
        stack.extend(children.into_iter().map(|child| (depth + 1, child)));
    }

    for cs in db.card_sets() {
        if !entries.iter().any(|e| e.card_set.id == cs.id) {
            entries.push(TreeEntry {
                depth: 0,
                card_set: cs.clone(),
                card_count: db.card_count(cs.id),
            });
        }
    }
    entries
}

/// One printing in a card set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLine {
    pub name: String,
    pub expansion: Option<String>,
    pub count: u32,
}

/// Contents of a card set, by card name then expansion.
pub fn card_set_contents(db: &Database, card_set: CardSetId) -> Vec<CardLine> {
    let mut lines: BTreeMap<(String, Option<String>), u32> = BTreeMap::new();
    for (pc, count) in db.physical_counts(card_set) {
        let Some(physical) = db.physical_card(pc) else {
            continue;
        };
        let key = (
            db.card_name(physical.card),
            db.expansion_name(physical.expansion).map(str::to_string),
        );
        *lines.entry(key).or_insert(0) += count;
    }
    lines
        .into_iter()
        .map(|((name, expansion), count)| CardLine {
            name,
            expansion,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCardSet;
    use crate::schema::catalog::CardRecord;

    #[test]
    fn tree_is_depth_first_and_sorted() {
        let mut db = Database::new();
        let zoo = db.insert_card_set(NewCardSet::new("Zoo")).unwrap();
        let all = db.insert_card_set(NewCardSet::new("All cards")).unwrap();
        db.insert_card_set(NewCardSet::new("Decks").with_parent(Some(all)))
            .unwrap();
        db.insert_card_set(NewCardSet::new("Binder").with_parent(Some(all)))
            .unwrap();
        db.insert_card_set(NewCardSet::new("Animals").with_parent(Some(zoo)))
            .unwrap();

        let order: Vec<(usize, String)> = card_set_tree(&db)
            .into_iter()
            .map(|e| (e.depth, e.card_set.name))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "All cards".to_string()),
                (1, "Binder".to_string()),
                (1, "Decks".to_string()),
                (0, "Zoo".to_string()),
                (1, "Animals".to_string()),
            ]
        );
    }

    #[test]
    fn looped_sets_are_still_listed() {
        let mut db = Database::new();
        let a = db.insert_card_set(NewCardSet::new("A")).unwrap();
        db.card_set_mut(a).unwrap().parent = Some(a);
        assert_eq!(card_set_tree(&db).len(), 1);
    }

    #[test]
    fn contents_group_by_printing() {
        let mut db = Database::new();
        let card = db
            .add_card(&CardRecord::new("Ashur Tablets").rarity("Ancient Hearts", "Rare"))
            .unwrap();
        let deck = db.insert_card_set(NewCardSet::new("Deck")).unwrap();
        let exp = db.find_lookup(crate::model::LookupKind::Expansion, "Ancient Hearts");
        for expansion in [None, exp, exp] {
            let pc = db.physical_card_for(card, expansion);
            db.add_membership(deck, pc);
        }

        assert_eq!(
            card_set_contents(&db, deck),
            vec![
                CardLine {
                    name: "Ashur Tablets".into(),
                    expansion: None,
                    count: 1,
                },
                CardLine {
                    name: "Ashur Tablets".into(),
                    expansion: Some("Ancient Hearts".into()),
                    count: 2,
                },
            ]
        );
    }
}
