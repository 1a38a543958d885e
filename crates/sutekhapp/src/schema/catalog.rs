//! Catalog construction.
//!
//! Card list parsers are external to this crate; they hand over a
//! [`CatalogFile`], a plain serde description of lookup aliases and cards.
//! Lookup entries referenced by cards are created on first use, so a catalog
//! only needs to list aliases explicitly.

use super::{Database, Relation};
use crate::error::Result;
use crate::model::{
    canonical_name, search_text, AbstractCard, CardId, CostType, DisciplineLevel, LookupKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub lookups: Vec<LookupRecord>,
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

/// Declares a lookup entry and its alternative name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    pub kind: LookupKind,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRecord {
    pub name: String,
    pub level: DisciplineLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityRecord {
    pub expansion: String,
    pub rarity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    pub name: String,
    pub text: String,
    pub group: Option<i32>,
    pub capacity: Option<i32>,
    pub cost: Option<i32>,
    pub cost_type: Option<CostType>,
    pub advanced: bool,
    pub life: Option<i32>,
    pub card_types: Vec<String>,
    pub clans: Vec<String>,
    pub creeds: Vec<String>,
    pub virtues: Vec<String>,
    pub sects: Vec<String>,
    pub titles: Vec<String>,
    pub disciplines: Vec<DisciplineRecord>,
    pub rarities: Vec<RarityRecord>,
    pub artists: Vec<String>,
    pub keywords: Vec<String>,
    pub rulings: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl CardRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn types(mut self, types: &[&str]) -> Self {
        self.card_types = owned(types);
        self
    }

    pub fn clans(mut self, clans: &[&str]) -> Self {
        self.clans = owned(clans);
        self
    }

    pub fn creeds(mut self, creeds: &[&str]) -> Self {
        self.creeds = owned(creeds);
        self
    }

    pub fn virtues(mut self, virtues: &[&str]) -> Self {
        self.virtues = owned(virtues);
        self
    }

    pub fn sects(mut self, sects: &[&str]) -> Self {
        self.sects = owned(sects);
        self
    }

    pub fn titles(mut self, titles: &[&str]) -> Self {
        self.titles = owned(titles);
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = owned(keywords);
        self
    }

    pub fn artists(mut self, artists: &[&str]) -> Self {
        self.artists = owned(artists);
        self
    }

    pub fn cost(mut self, cost: i32, cost_type: CostType) -> Self {
        self.cost = Some(cost);
        self.cost_type = Some(cost_type);
        self
    }

    pub fn group(mut self, group: i32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn capacity(mut self, capacity: i32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn life(mut self, life: i32) -> Self {
        self.life = Some(life);
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn discipline(mut self, name: &str, level: DisciplineLevel) -> Self {
        self.disciplines.push(DisciplineRecord {
            name: name.to_string(),
            level,
        });
        self
    }

    pub fn rarity(mut self, expansion: &str, rarity: &str) -> Self {
        self.rarities.push(RarityRecord {
            expansion: expansion.to_string(),
            rarity: rarity.to_string(),
        });
        self
    }
}

impl Database {
    /// Builds a fresh database from a catalog.
    pub fn from_catalog(catalog: &CatalogFile) -> Result<Self> {
        let mut db = Database::new();
        db.load_catalog(catalog)?;
        Ok(db)
    }

    /// Adds every lookup and card of `catalog`. Returns the number of cards added.
    pub fn load_catalog(&mut self, catalog: &CatalogFile) -> Result<usize> {
        for record in &catalog.lookups {
            self.add_lookup(record.kind, &record.name, record.alias.as_deref());
        }
        for record in &catalog.cards {
            self.add_card(record)?;
        }
        tracing::debug!(cards = catalog.cards.len(), "catalog loaded");
        Ok(catalog.cards.len())
    }

    /// Adds one card and links it to its attributes, creating lookup entries as needed.
    pub fn add_card(&mut self, record: &CardRecord) -> Result<CardId> {
        let id = self.push_card(AbstractCard {
            id: CardId(0),
            canonical_name: canonical_name(&record.name),
            name: record.name.trim().to_string(),
            text: record.text.clone(),
            search_text: search_text(&record.text),
            group: record.group,
            capacity: record.capacity,
            cost: record.cost,
            cost_type: record.cost_type,
            advanced: record.advanced,
            life: record.life,
        })?;

        let simple = [
            (Relation::CardType, &record.card_types),
            (Relation::Clan, &record.clans),
            (Relation::Creed, &record.creeds),
            (Relation::Virtue, &record.virtues),
            (Relation::Sect, &record.sects),
            (Relation::Title, &record.titles),
            (Relation::Artist, &record.artists),
            (Relation::Keyword, &record.keywords),
            (Relation::Ruling, &record.rulings),
        ];
        for (relation, names) in simple {
            let Some(kind) = relation.lookup_kind() else {
                continue;
            };
            for name in names {
                let target = self.add_lookup(kind, name, None);
                self.link(id, relation, target.0);
            }
        }
        for discipline in &record.disciplines {
            let disc = self.add_lookup(LookupKind::Discipline, &discipline.name, None);
            let pair = self.add_discipline_pair(disc, discipline.level);
            self.link(id, Relation::Discipline, pair.0);
        }
        for rarity in &record.rarities {
            let expansion = self.add_lookup(LookupKind::Expansion, &rarity.expansion, None);
            let value = self.add_lookup(LookupKind::Rarity, &rarity.rarity, None);
            let pair = self.add_rarity_pair(expansion, value);
            self.link(id, Relation::Rarity, pair.0);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SutekhError;

    #[test]
    fn add_card_links_attributes() {
        let mut db = Database::new();
        let id = db
            .add_card(
                &CardRecord::new("Aaron Bathurst")
                    .types(&["Vampire"])
                    .clans(&["Nosferatu"])
                    .discipline("obf", DisciplineLevel::Inferior)
                    .rarity("Sabbat War", "Vampire"),
            )
            .unwrap();

        assert_eq!(db.related_names(id, Relation::Clan), vec!["Nosferatu"]);
        assert_eq!(db.related(id, Relation::Discipline).len(), 1);
        assert_eq!(db.rarity_pairs().len(), 1);
        assert_eq!(db.find_card("aaron bathurst"), Some(id));
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let mut db = Database::new();
        db.add_card(&CardRecord::new("Abbot")).unwrap();
        assert!(matches!(
            db.add_card(&CardRecord::new("ABBOT")),
            Err(SutekhError::DuplicateCard(_))
        ));
    }

    #[test]
    fn catalog_file_deserializes_with_defaults() {
        let json = r#"{
            "lookups": [{"kind": "expansion", "name": "Lords of the Night", "alias": "LotN"}],
            "cards": [{"name": "Abbot", "cost": 1, "cost_type": "pool", "card_types": ["Action"]}]
        }"#;
        let catalog: CatalogFile = serde_json::from_str(json).unwrap();
        let db = Database::from_catalog(&catalog).unwrap();

        assert!(db.find_lookup(LookupKind::Expansion, "lotn").is_some());
        let abbot = db.card(db.resolve_card("abbot").unwrap()).unwrap();
        assert_eq!(abbot.cost_type, Some(CostType::Pool));
        assert_eq!(abbot.text, "");
    }
}
