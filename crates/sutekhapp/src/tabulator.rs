//! Numeric feature tables over card lists.
//!
//! A [`Tabulator`] turns a list of cards into rows of integers, one column per
//! named property, for analysis and export. Every property function is total:
//! a card without the property gives 0, and a variable (X) cost gives -1.

use crate::error::{Result, SutekhError};
use crate::model::{CardId, CostType, LookupKind, PairId};
use crate::schema::{Database, Relation};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Computes one column value for a card.
pub type PropFn = Rc<dyn Fn(&Database, CardId) -> i32>;

pub struct Tabulator {
    columns: Vec<String>,
    funcs: Vec<PropFn>,
}

impl Tabulator {
    /// Picks `columns`, in order, from `props`. Unknown column names fail here
    /// rather than while tabulating.
    pub fn new<S: AsRef<str>>(columns: &[S], props: &BTreeMap<String, PropFn>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut funcs = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            let func = props
                .get(column)
                .ok_or_else(|| SutekhError::UnknownColumn(column.to_string()))?;
            names.push(column.to_string());
            funcs.push(Rc::clone(func));
        }
        Ok(Self {
            columns: names,
            funcs,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// One row per card, in the order given.
    pub fn tabulate(&self, db: &Database, cards: &[CardId]) -> Vec<Vec<i32>> {
        cards
            .iter()
            .map(|card| self.funcs.iter().map(|f| f(db, *card)).collect())
            .collect()
    }
}

fn flag(value: bool) -> i32 {
    i32::from(value)
}

fn cost_of(cost_type: CostType) -> PropFn {
    Rc::new(move |db, card| {
        db.card(card)
            .filter(|c| c.cost_type == Some(cost_type))
            .and_then(|c| c.cost)
            .unwrap_or(0)
    })
}

fn linked(relation: Relation, target: u32) -> PropFn {
    Rc::new(move |db, card| flag(db.has_relation(card, relation, target)))
}

/// The standard property set, computed against the current catalog.
///
/// Column names: `group`, `capacity`, `pool cost`, `blood cost`,
/// `conviction cost`, `advanced`, `physical card count`, and one 0/1 column
/// per `discipline: <name>`, `rarity: <name>`, `expansion: <name>`,
/// `clan: <name>` and `card type: <name>`.
pub fn default_prop_funcs(db: &Database) -> BTreeMap<String, PropFn> {
    let mut props: BTreeMap<String, PropFn> = BTreeMap::new();
    props.insert(
        "group".into(),
        Rc::new(|db, card| db.card(card).and_then(|c| c.group).unwrap_or(0)),
    );
    props.insert(
        "capacity".into(),
        Rc::new(|db, card| db.card(card).and_then(|c| c.capacity).unwrap_or(0)),
    );
    props.insert("pool cost".into(), cost_of(CostType::Pool));
    props.insert("blood cost".into(), cost_of(CostType::Blood));
    props.insert("conviction cost".into(), cost_of(CostType::Conviction));
    props.insert(
        "advanced".into(),
        Rc::new(|db, card| flag(db.card(card).is_some_and(|c| c.advanced))),
    );
    props.insert(
        "physical card count".into(),
        Rc::new(|db, card| {
            db.physical_cards()
                .iter()
                .filter(|pc| pc.card == card)
                .count() as i32
        }),
    );

    for entry in db.lookup_entries(LookupKind::Discipline) {
        let pairs: Vec<u32> = db
            .discipline_pairs()
            .iter()
            .filter(|p| p.discipline == entry.id)
            .map(|p| p.id.0)
            .collect();
        props.insert(
            format!("discipline: {}", entry.name),
            Rc::new(move |db, card| {
                flag(pairs.iter().any(|p| db.has_relation(card, Relation::Discipline, *p)))
            }),
        );
    }
    for entry in db.lookup_entries(LookupKind::Rarity) {
        let rarity = entry.id;
        props.insert(
            format!("rarity: {}", entry.name),
            Rc::new(move |db, card| {
                flag(db.related(card, Relation::Rarity).into_iter().any(|p| {
                    db.rarity_pair(PairId(p))
                        .is_some_and(|pair| pair.rarity == rarity)
                }))
            }),
        );
    }
    for entry in db.lookup_entries(LookupKind::Expansion) {
        let expansion = entry.id;
        props.insert(
            format!("expansion: {}", entry.name),
            Rc::new(move |db, card| {
                flag(db.related(card, Relation::Rarity).into_iter().any(|p| {
                    db.rarity_pair(PairId(p))
                        .is_some_and(|pair| pair.expansion == expansion)
                }))
            }),
        );
    }
    for entry in db.lookup_entries(LookupKind::Clan) {
        props.insert(format!("clan: {}", entry.name), linked(Relation::Clan, entry.id.0));
    }
    for entry in db.lookup_entries(LookupKind::CardType) {
        props.insert(
            format!("card type: {}", entry.name),
            linked(Relation::CardType, entry.id.0),
        );
    }
    props
}
