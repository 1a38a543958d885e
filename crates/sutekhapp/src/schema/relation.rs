use crate::model::{CardId, LookupKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The card-to-attribute mapping tables.
///
/// Most relations point into a lookup table. `Discipline` and `Rarity` point
/// at pair rows instead ([`DisciplinePair`](crate::model::DisciplinePair) and
/// [`RarityPair`](crate::model::RarityPair)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Clan,
    Creed,
    Virtue,
    Sect,
    Title,
    CardType,
    Discipline,
    Rarity,
    Artist,
    Keyword,
    Ruling,
}

impl Relation {
    pub const ALL: [Relation; 11] = [
        Relation::Clan,
        Relation::Creed,
        Relation::Virtue,
        Relation::Sect,
        Relation::Title,
        Relation::CardType,
        Relation::Discipline,
        Relation::Rarity,
        Relation::Artist,
        Relation::Keyword,
        Relation::Ruling,
    ];

    /// The lookup table the relation's ids live in, for the non-pair relations.
    pub fn lookup_kind(&self) -> Option<LookupKind> {
        match self {
            Relation::Clan => Some(LookupKind::Clan),
            Relation::Creed => Some(LookupKind::Creed),
            Relation::Virtue => Some(LookupKind::Virtue),
            Relation::Sect => Some(LookupKind::Sect),
            Relation::Title => Some(LookupKind::Title),
            Relation::CardType => Some(LookupKind::CardType),
            Relation::Artist => Some(LookupKind::Artist),
            Relation::Keyword => Some(LookupKind::Keyword),
            Relation::Ruling => Some(LookupKind::Ruling),
            Relation::Discipline | Relation::Rarity => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lookup_kind() {
            Some(kind) => write!(f, "{}", kind),
            None if *self == Relation::Discipline => f.write_str("Discipline pair"),
            None => f.write_str("Rarity pair"),
        }
    }
}

/// A many-to-many mapping table between cards and one attribute.
///
/// Links are kept sorted by card (forward) and by attribute (reverse), so both
/// "what clans does this card have" and "which cards are Ventrue" are range
/// scans. Only the forward set is persisted; the reverse index is rebuilt
/// after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapTable {
    links: BTreeSet<(CardId, u32)>,
    #[serde(skip)]
    reverse: BTreeSet<(u32, CardId)>,
}

impl MapTable {
    pub fn insert(&mut self, card: CardId, target: u32) -> bool {
        self.reverse.insert((target, card));
        self.links.insert((card, target))
    }

    pub fn contains(&self, card: CardId, target: u32) -> bool {
        self.links.contains(&(card, target))
    }

    /// Attribute ids linked to `card`, ascending.
    pub fn forward(&self, card: CardId) -> impl Iterator<Item = u32> + '_ {
        self.links
            .range((card, 0)..=(card, u32::MAX))
            .map(|(_, target)| *target)
    }

    /// Cards linked to `target`, ascending by id.
    pub fn reverse(&self, target: u32) -> impl Iterator<Item = CardId> + '_ {
        self.reverse
            .range((target, CardId(0))..=(target, CardId(u32::MAX)))
            .map(|(_, card)| *card)
    }

    pub fn has_links(&self, card: CardId) -> bool {
        self.forward(card).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn reindex(&mut self) {
        self.reverse = self.links.iter().map(|(c, t)| (*t, *c)).collect();
    }
}
