//! Whether a parent card set holds enough copies to build all of the chosen
//! child card sets at the same time.
//!
//! Children that ask for a specific printing need that printing in the
//! parent. Children that do not care about the expansion can use any
//! printing the parent has, so those are compared on card totals.

use crate::error::{Result, SutekhError};
use crate::model::{CardId, CardSetId, PhysicalCardId};
use crate::schema::Database;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub card: String,
    /// `None` when the count covers every printing.
    pub expansion: Option<String>,
    pub needed: u32,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndependenceReport {
    pub parent: String,
    pub children: Vec<String>,
    pub shortfalls: Vec<Shortfall>,
}

impl IndependenceReport {
    pub fn is_independent(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

fn card_totals(db: &Database, counts: &BTreeMap<PhysicalCardId, u32>) -> BTreeMap<CardId, u32> {
    let mut totals = BTreeMap::new();
    for (pc, count) in counts {
        if let Some(physical) = db.physical_card(*pc) {
            *totals.entry(physical.card).or_insert(0) += count;
        }
    }
    totals
}

pub fn check(
    db: &Database,
    parent: CardSetId,
    children: &[CardSetId],
) -> Result<IndependenceReport> {
    if children.len() < 2 {
        return Err(SutekhError::InvalidRequest(
            "an independence check needs at least two child card sets".to_string(),
        ));
    }
    let parent_row = db.get_card_set(parent)?;
    let mut wanted: BTreeMap<PhysicalCardId, u32> = BTreeMap::new();
    let mut names = Vec::with_capacity(children.len());
    for child in children {
        let row = db.get_card_set(*child)?;
        if row.parent != Some(parent) {
            return Err(SutekhError::InvalidRequest(format!(
                "'{}' is not a child of '{}'",
                row.name, parent_row.name
            )));
        }
        names.push(row.name.clone());
        for (pc, count) in db.physical_counts(*child) {
            *wanted.entry(pc).or_insert(0) += count;
        }
    }
    let available = db.physical_counts(parent);

    let mut shortfalls = Vec::new();
    for (pc, needed) in &wanted {
        let Some(physical) = db.physical_card(*pc) else {
            continue;
        };
        if physical.expansion.is_none() {
            continue;
        }
        let have = available.get(pc).copied().unwrap_or(0);
        if *needed > have {
            shortfalls.push(Shortfall {
                card: db.card_name(physical.card),
                expansion: db.expansion_name(physical.expansion).map(str::to_string),
                needed: *needed,
                available: have,
            });
        }
    }
    let parent_totals = card_totals(db, &available);
    for (card, needed) in card_totals(db, &wanted) {
        let have = parent_totals.get(&card).copied().unwrap_or(0);
        if needed > have {
            shortfalls.push(Shortfall {
                card: db.card_name(card),
                expansion: None,
                needed,
                available: have,
            });
        }
    }
    shortfalls.sort_by(|a, b| (&a.card, &a.expansion).cmp(&(&b.card, &b.expansion)));

    Ok(IndependenceReport {
        parent: parent_row.name.clone(),
        children: names,
        shortfalls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LookupKind, NewCardSet};
    use crate::schema::catalog::CardRecord;

    struct Fixture {
        db: Database,
        parent: CardSetId,
        first: CardSetId,
        second: CardSetId,
        card: CardId,
    }

    fn fixture() -> Fixture {
        let mut db = Database::new();
        let card = db.add_card(&CardRecord::new("Conditioning")).unwrap();
        let parent = db.insert_card_set(NewCardSet::new("Collection")).unwrap();
        let first = db
            .insert_card_set(NewCardSet::new("Deck A").with_parent(Some(parent)))
            .unwrap();
        let second = db
            .insert_card_set(NewCardSet::new("Deck B").with_parent(Some(parent)))
            .unwrap();
        Fixture {
            db,
            parent,
            first,
            second,
            card,
        }
    }

    fn add(db: &mut Database, set: CardSetId, card: CardId, exp: Option<&str>, count: u32) {
        let exp = exp.map(|name| db.add_lookup(LookupKind::Expansion, name, None));
        let pc = db.physical_card_for(card, exp);
        for _ in 0..count {
            db.add_membership(set, pc);
        }
    }

    #[test]
    fn enough_copies_is_independent() {
        let mut f = fixture();
        add(&mut f.db, f.parent, f.card, Some("Jyhad"), 4);
        add(&mut f.db, f.first, f.card, None, 2);
        add(&mut f.db, f.second, f.card, Some("Jyhad"), 2);

        let report = check(&f.db, f.parent, &[f.first, f.second]).unwrap();
        assert!(report.is_independent());
    }

    #[test]
    fn shortfalls_are_reported() {
        let mut f = fixture();
        add(&mut f.db, f.parent, f.card, None, 3);
        add(&mut f.db, f.first, f.card, None, 2);
        add(&mut f.db, f.second, f.card, Some("Jyhad"), 2);

        let report = check(&f.db, f.parent, &[f.first, f.second]).unwrap();
        assert_eq!(
            report.shortfalls,
            vec![
                Shortfall {
                    card: "Conditioning".into(),
                    expansion: None,
                    needed: 4,
                    available: 3,
                },
                Shortfall {
                    card: "Conditioning".into(),
                    expansion: Some("Jyhad".into()),
                    needed: 2,
                    available: 0,
                },
            ]
        );
    }

    #[test]
    fn needs_two_children_of_the_parent() {
        let mut f = fixture();
        assert!(matches!(
            check(&f.db, f.parent, &[f.first]),
            Err(SutekhError::InvalidRequest(_))
        ));
        let stranger = f.db.insert_card_set(NewCardSet::new("Stranger")).unwrap();
        assert!(check(&f.db, f.parent, &[f.first, stranger]).is_err());
    }
}
