use proptest::prelude::*;
use std::collections::BTreeMap;
use sutekhapp::cache::LookupCache;
use sutekhapp::commands::{delete, repair, reparent};
use sutekhapp::graph;
use sutekhapp::holder::CardSetHolder;
use sutekhapp::lookup::SimpleLookup;
use sutekhapp::model::{CardSetId, LookupKind, NewCardSet};
use sutekhapp::schema::catalog::CardRecord;
use sutekhapp::schema::Database;
use sutekhapp::store::{DataStore, InMemoryStore};

const SETS: usize = 8;
const CARDS: [&str; 4] = ["Anson", "Blood Doll", "Conditioning", "Deflection"];
const EXPANSIONS: [&str; 2] = ["Jyhad", "Sabbat"];

#[derive(Debug, Clone)]
enum Op {
    Reparent(usize, Option<usize>),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..SETS, prop::option::of(0..SETS)).prop_map(|(set, parent)| Op::Reparent(set, parent)),
        1 => (0..SETS).prop_map(Op::Delete),
    ]
}

fn store_with_sets() -> (InMemoryStore, Vec<CardSetId>) {
    let mut store = InMemoryStore::new();
    let ids = (0..SETS)
        .map(|i| {
            store
                .db_mut()
                .insert_card_set(NewCardSet::new(format!("Set {}", i)))
                .unwrap()
        })
        .collect();
    (store, ids)
}

fn parents(db: &Database) -> Vec<(CardSetId, Option<CardSetId>)> {
    db.card_sets().iter().map(|cs| (cs.id, cs.parent)).collect()
}

fn catalog() -> Database {
    let mut db = Database::new();
    for name in CARDS {
        let mut record = CardRecord::new(name);
        for exp in EXPANSIONS {
            record = record.rarity(exp, "Common");
        }
        db.add_card(&record).unwrap();
    }
    db
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn hierarchy_stays_a_forest(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (mut store, ids) = store_with_sets();
        for op in ops {
            let before = parents(store.db());
            let outcome = match op {
                Op::Reparent(set, parent) => {
                    reparent::run(&mut store, ids[set], parent.map(|p| ids[p]))
                }
                Op::Delete(set) => delete::run(&mut store, ids[set]),
            };
            if outcome.is_err() {
                prop_assert_eq!(parents(store.db()), before);
            }
            prop_assert!(graph::check_forest(store.db()).is_ok());
            for cs in store.db().card_sets() {
                if let Some(parent) = cs.parent {
                    prop_assert!(store.db().card_set(parent).is_some());
                }
            }
        }
    }

    #[test]
    fn loop_repair_is_idempotent(links in prop::collection::vec(prop::option::of(0..SETS), SETS)) {
        let (mut store, ids) = store_with_sets();
        for (i, link) in links.iter().enumerate() {
            store.db_mut().card_set_mut(ids[i]).unwrap().parent = link.map(|p| ids[p]);
        }
        let loops = graph::find_loops(store.db()).len();

        let repairs = repair::break_existing_loops(store.db_mut());
        prop_assert_eq!(repairs.len(), loops);
        prop_assert!(graph::check_forest(store.db()).is_ok());
        prop_assert!(repair::break_existing_loops(store.db_mut()).is_empty());
    }

    #[test]
    fn holder_round_trip_keeps_counts(
        entries in prop::collection::vec((1u32..5, 0..CARDS.len(), prop::option::of(0..EXPANSIONS.len())), 1..20)
    ) {
        let mut store = InMemoryStore::from_database(catalog());
        let mut holder = CardSetHolder::named("Round trip");
        let mut expected: BTreeMap<(String, Option<String>), u32> = BTreeMap::new();
        for (count, card, exp) in &entries {
            let exp = exp.map(|e| EXPANSIONS[e]);
            holder.add(*count, CARDS[*card], exp).unwrap();
            *expected
                .entry((CARDS[*card].to_string(), exp.map(str::to_string)))
                .or_insert(0) += count;
        }

        let id = holder
            .create_pcs(&mut store, &mut SimpleLookup, &mut LookupCache::new())
            .unwrap();
        prop_assert!(holder.warnings().is_empty());

        let db = store.db();
        let total: u32 = expected.values().sum();
        prop_assert_eq!(db.card_count(id), total as usize);
        let counts = db.physical_counts(id);
        for ((name, exp), count) in expected {
            let card = db.find_card(&name).unwrap();
            let exp = exp.and_then(|e| db.find_lookup(LookupKind::Expansion, &e));
            let pc = db.find_physical_card(card, exp).unwrap();
            prop_assert_eq!(counts[&pc], count);
        }
    }
}
