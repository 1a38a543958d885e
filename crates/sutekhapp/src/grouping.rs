//! Grouping card lists for display.
//!
//! A card can fall under several keys (a multi-clan card, a card printed in
//! several expansions) and is listed once under each. Cards with no key at
//! all end up in the `None` group, which sorts first.

use crate::model::{AbstractCard, CardId, LookupId, LookupKind, PairId, CRYPT_TYPES, GROUP_ANY};
use crate::schema::{Database, Relation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grouping {
    CardType,
    MultiType,
    /// Clan, or creed for imbued.
    Clan,
    /// Discipline, or virtue for imbued.
    Discipline,
    DisciplineLevel,
    Expansion,
    Rarity,
    CryptLibrary,
    Sect,
    Title,
    Cost,
    Group,
    GroupPair,
    Artist,
    Keyword,
    /// Everything in one "All" group.
    Null,
}

impl Grouping {
    pub const ALL: [Grouping; 16] = [
        Grouping::CardType,
        Grouping::MultiType,
        Grouping::Clan,
        Grouping::Discipline,
        Grouping::DisciplineLevel,
        Grouping::Expansion,
        Grouping::Rarity,
        Grouping::CryptLibrary,
        Grouping::Sect,
        Grouping::Title,
        Grouping::Cost,
        Grouping::Group,
        Grouping::GroupPair,
        Grouping::Artist,
        Grouping::Keyword,
        Grouping::Null,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grouping::CardType => "card-type",
            Grouping::MultiType => "multi-type",
            Grouping::Clan => "clan",
            Grouping::Discipline => "discipline",
            Grouping::DisciplineLevel => "discipline-level",
            Grouping::Expansion => "expansion",
            Grouping::Rarity => "rarity",
            Grouping::CryptLibrary => "crypt-library",
            Grouping::Sect => "sect",
            Grouping::Title => "title",
            Grouping::Cost => "cost",
            Grouping::Group => "group",
            Grouping::GroupPair => "group-pair",
            Grouping::Artist => "artist",
            Grouping::Keyword => "keyword",
            Grouping::Null => "none",
        }
    }

    /// Every key `card` is listed under. Empty means the `None` group.
    pub fn keys(&self, db: &Database, card: &AbstractCard) -> Vec<String> {
        let id = card.id;
        match self {
            Grouping::CardType => db.related_names(id, Relation::CardType),
            Grouping::MultiType => {
                let mut types = db.related_names(id, Relation::CardType);
                if types.is_empty() {
                    return types;
                }
                types.sort();
                vec![types.join(" / ")]
            }
            Grouping::Clan => {
                let creeds = db.related_names(id, Relation::Creed);
                if creeds.is_empty() {
                    db.related_names(id, Relation::Clan)
                } else {
                    creeds
                }
            }
            Grouping::Discipline => {
                let virtues = db.related_names(id, Relation::Virtue);
                if virtues.is_empty() {
                    discipline_keys(db, id, false)
                } else {
                    virtues
                }
            }
            Grouping::DisciplineLevel => discipline_keys(db, id, true),
            Grouping::Expansion => rarity_keys(db, id, LookupKind::Expansion),
            Grouping::Rarity => rarity_keys(db, id, LookupKind::Rarity),
            Grouping::CryptLibrary => {
                let crypt = db
                    .related_names(id, Relation::CardType)
                    .iter()
                    .any(|t| CRYPT_TYPES.contains(&t.as_str()));
                vec![if crypt { "Crypt" } else { "Library" }.to_string()]
            }
            Grouping::Sect => db.related_names(id, Relation::Sect),
            Grouping::Title => db.related_names(id, Relation::Title),
            Grouping::Cost => match (card.cost, card.cost_type) {
                (None, _) => Vec::new(),
                (Some(_), None) if card.is_variable_cost() => vec!["X".to_string()],
                (Some(cost), None) => vec![cost.to_string()],
                (Some(_), Some(kind)) if card.is_variable_cost() => vec![format!("X {}", kind)],
                (Some(cost), Some(kind)) => vec![format!("{} {}", cost, kind)],
            },
            Grouping::Group => match card.group {
                None => Vec::new(),
                Some(GROUP_ANY) => vec!["Any group".to_string()],
                Some(group) => vec![format!("Group {}", group)],
            },
            Grouping::GroupPair => group_pair_keys(db, card.group),
            Grouping::Artist => db.related_names(id, Relation::Artist),
            Grouping::Keyword => db.related_names(id, Relation::Keyword),
            Grouping::Null => vec!["All".to_string()],
        }
    }
}

fn discipline_keys(db: &Database, card: CardId, with_level: bool) -> Vec<String> {
    db.related(card, Relation::Discipline)
        .into_iter()
        .filter_map(|p| db.discipline_pair(PairId(p)))
        .filter_map(|pair| {
            let name = db.lookup_name(LookupKind::Discipline, pair.discipline)?;
            Some(if with_level {
                format!("{} ({})", name, pair.level)
            } else {
                name.to_string()
            })
        })
        .collect()
}

fn rarity_keys(db: &Database, card: CardId, kind: LookupKind) -> Vec<String> {
    db.related(card, Relation::Rarity)
        .into_iter()
        .filter_map(|p| db.rarity_pair(PairId(p)))
        .filter_map(|pair| {
            let id: LookupId = match kind {
                LookupKind::Expansion => pair.expansion,
                _ => pair.rarity,
            };
            db.lookup_name(kind, id).map(str::to_string)
        })
        .collect()
}

/// Crypt cards can be played alongside the neighbouring group, so each group
/// is listed in the two pairs it belongs to. "Any group" cards go in every pair.
fn group_pair_keys(db: &Database, group: Option<i32>) -> Vec<String> {
    let max_group = db
        .cards()
        .iter()
        .filter_map(|c| c.group)
        .max()
        .unwrap_or(1)
        .max(2);
    let pair = |low: i32| format!("Groups {}, {}", low, low + 1);
    match group {
        None => Vec::new(),
        Some(GROUP_ANY) => (1..max_group).map(pair).collect(),
        Some(group) => {
            let mut keys = Vec::with_capacity(2);
            if group > 1 {
                keys.push(pair(group - 1));
            }
            if group < max_group {
                keys.push(pair(group));
            }
            keys
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', ' '], "-");
        Grouping::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| format!("unknown grouping '{}'", s))
    }
}

/// Cards grouped under `grouping`, keys sorted and the `None` group first.
/// Within a group, cards keep the order they were passed in.
pub fn group_cards(
    db: &Database,
    cards: &[CardId],
    grouping: Grouping,
) -> Vec<(Option<String>, Vec<CardId>)> {
    let mut groups: BTreeMap<Option<String>, Vec<CardId>> = BTreeMap::new();
    for id in cards {
        let Some(card) = db.card(*id) else {
            continue;
        };
        let keys: BTreeSet<String> = grouping.keys(db, card).into_iter().collect();
        if keys.is_empty() {
            groups.entry(None).or_default().push(*id);
        }
        for key in keys {
            groups.entry(Some(key)).or_default().push(*id);
        }
    }
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostType, DisciplineLevel, COST_X};
    use crate::schema::catalog::CardRecord;

    fn catalog() -> (Database, Vec<CardId>) {
        let mut db = Database::new();
        let ids = [
            CardRecord::new("Anson")
                .types(&["Vampire"])
                .clans(&["Toreador"])
                .group(1)
                .discipline("aus", DisciplineLevel::Inferior)
                .discipline("dom", DisciplineLevel::Superior)
                .rarity("Jyhad", "Rare"),
            CardRecord::new("Carlton Van Wyk")
                .types(&["Vampire"])
                .clans(&["Toreador"])
                .group(3),
            CardRecord::new("Earl \"Shaka74\" Deams")
                .types(&["Imbued"])
                .creeds(&["Visionary"])
                .virtues(&["Vision"])
                .group(GROUP_ANY),
            CardRecord::new("Dragonbound")
                .types(&["Action", "Combat"])
                .cost(COST_X, CostType::Pool),
            CardRecord::new("Blood Doll")
                .types(&["Master"])
                .cost(0, CostType::Pool)
                .rarity("Jyhad", "Common")
                .rarity("Anarchs", "Common"),
        ]
        .iter()
        .map(|record| db.add_card(record).unwrap())
        .collect();
        (db, ids)
    }

    type NamedGroups = Vec<(Option<String>, Vec<String>)>;

    fn names(db: &Database, groups: Vec<(Option<String>, Vec<CardId>)>) -> NamedGroups {
        groups
            .into_iter()
            .map(|(key, cards)| (key, cards.into_iter().map(|c| db.card_name(c)).collect()))
            .collect()
    }

    #[test]
    fn clan_uses_creed_for_imbued() {
        let (db, cards) = catalog();
        let groups = names(&db, group_cards(&db, &cards, Grouping::Clan));
        assert_eq!(groups[0].0, None);
        assert_eq!(groups[0].1, vec!["Dragonbound", "Blood Doll"]);
        assert_eq!(groups[1].0.as_deref(), Some("Toreador"));
        assert_eq!(groups[2].0.as_deref(), Some("Visionary"));
    }

    #[test]
    fn multi_type_joins_sorted_types() {
        let (db, cards) = catalog();
        let keys = Grouping::MultiType.keys(&db, db.card(cards[3]).unwrap());
        assert_eq!(keys, vec!["Action / Combat"]);
        let groups = group_cards(&db, &cards, Grouping::CardType);
        let combat = groups
            .iter()
            .find(|(key, _)| key.as_deref() == Some("Combat"))
            .unwrap();
        assert_eq!(combat.1, vec![cards[3]]);
    }

    #[test]
    fn cards_appear_under_each_key() {
        let (db, cards) = catalog();
        let groups = names(&db, group_cards(&db, &cards, Grouping::Expansion));
        let keys: Vec<Option<&str>> = groups.iter().map(|(k, _)| k.as_deref()).collect();
        assert_eq!(keys, vec![None, Some("Anarchs"), Some("Jyhad")]);
        assert_eq!(groups[2].1, vec!["Anson", "Blood Doll"]);
    }

    #[test]
    fn discipline_with_level() {
        let (db, cards) = catalog();
        let keys = Grouping::DisciplineLevel.keys(&db, db.card(cards[0]).unwrap());
        assert_eq!(keys, vec!["aus (inferior)", "dom (superior)"]);
        let imbued = Grouping::Discipline.keys(&db, db.card(cards[2]).unwrap());
        assert_eq!(imbued, vec!["Vision"]);
    }

    #[test]
    fn cost_keys_keep_zero_and_x() {
        let (db, cards) = catalog();
        assert_eq!(
            Grouping::Cost.keys(&db, db.card(cards[3]).unwrap()),
            vec!["X pool"]
        );
        assert_eq!(
            Grouping::Cost.keys(&db, db.card(cards[4]).unwrap()),
            vec!["0 pool"]
        );
        assert!(Grouping::Cost.keys(&db, db.card(cards[0]).unwrap()).is_empty());
    }

    #[test]
    fn group_pairs() {
        let (db, cards) = catalog();
        let pairs = |i: usize| Grouping::GroupPair.keys(&db, db.card(cards[i]).unwrap());
        assert_eq!(pairs(0), vec!["Groups 1, 2"]);
        assert_eq!(pairs(1), vec!["Groups 2, 3"]);
        assert_eq!(pairs(2), vec!["Groups 1, 2", "Groups 2, 3"]);
        assert_eq!(
            Grouping::Group.keys(&db, db.card(cards[2]).unwrap()),
            vec!["Any group"]
        );
    }

    #[test]
    fn crypt_library_and_all() {
        let (db, cards) = catalog();
        let groups = names(&db, group_cards(&db, &cards, Grouping::CryptLibrary));
        assert_eq!(groups[0].0.as_deref(), Some("Crypt"));
        assert_eq!(groups[0].1.len(), 3);
        let all = group_cards(&db, &cards, Grouping::Null);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.len(), cards.len());
    }

    #[test]
    fn parses_names() {
        assert_eq!("group_pair".parse::<Grouping>().unwrap(), Grouping::GroupPair);
        assert_eq!("Card Type".parse::<Grouping>().unwrap(), Grouping::CardType);
        assert!("colour".parse::<Grouping>().is_err());
    }
}
