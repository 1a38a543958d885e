//! # Entity Schema
//!
//! The [`Database`] holds every table of the catalog and of the user's card
//! sets in one serializable value:
//!
//! ```text
//! lookups         kind -> LookupTable (clan, sect, expansion, ...)
//! discipline_pairs (discipline, level), unique
//! rarity_pairs     (expansion, rarity), unique
//! cards            AbstractCard rows
//! relations        Relation -> MapTable (card <-> attribute links)
//! physical_cards   (card, expansion?), unique, created on demand
//! card_sets        CardSet rows (forest via `parent`)
//! memberships      one row per copy of a physical card in a card set
//! ```
//!
//! Name lookups go through unique, case-insensitive indexes. A miss is a
//! [`SutekhError::NotFound`], never a silent `None` at the API boundary, so
//! callers can tell "no such clan" apart from "no card matches".
//!
//! The indexes are derived data: they are skipped by serde and rebuilt by
//! [`Database::rebuild_indexes`] after loading.
//!
//! Selection over rows lives in [`query`]; catalog construction from an
//! external card list lives in [`catalog`].

use crate::error::{Result, SutekhError};
use crate::model::{
    canonical_name, move_articles_to_back, move_articles_to_front, AbstractCard, CardId, CardSet,
    CardSetId, DisciplineLevel, DisciplinePair, LookupEntry, LookupId, LookupKind, Membership,
    MembershipId, NewCardSet, PairId, PhysicalCard, PhysicalCardId, RarityPair,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub mod catalog;
pub mod query;
mod relation;

pub use relation::{MapTable, Relation};

/// One named lookup table with its unique name/alias index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupTable {
    entries: Vec<LookupEntry>,
    #[serde(skip)]
    index: HashMap<String, LookupId>,
}

impl LookupTable {
    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Returns the id registered for `name`, creating the entry if needed.
    /// A new alias is only registered when it does not already name another entry.
    pub fn get_or_create(&mut self, name: &str, alias: Option<&str>) -> LookupId {
        let id = match self.find(name) {
            Some(id) => id,
            None => {
                let id = LookupId(self.entries.len() as u32);
                self.entries.push(LookupEntry {
                    id,
                    name: name.trim().to_string(),
                    alias: None,
                });
                self.index.insert(Self::key(name), id);
                id
            }
        };
        if let Some(alias) = alias.map(str::trim).filter(|a| !a.is_empty()) {
            let key = Self::key(alias);
            match self.index.get(&key) {
                Some(existing) if *existing != id => {
                    tracing::warn!(alias, name, "alias already names another entry, ignoring");
                }
                Some(_) => {}
                None => {
                    self.index.insert(key, id);
                    let entry = &mut self.entries[id.0 as usize];
                    if entry.alias.is_none() {
                        entry.alias = Some(alias.to_string());
                    }
                }
            }
        }
        id
    }

    pub fn find(&self, name: &str) -> Option<LookupId> {
        self.index.get(&Self::key(name)).copied()
    }

    pub fn get(&self, id: LookupId) -> Option<&LookupEntry> {
        self.entries.get(id.0 as usize)
    }

    pub fn entries(&self) -> &[LookupEntry] {
        &self.entries
    }

    fn reindex(&mut self) {
        self.index.clear();
        for entry in &self.entries {
            self.index.insert(Self::key(&entry.name), entry.id);
            if let Some(alias) = &entry.alias {
                self.index.entry(Self::key(alias)).or_insert(entry.id);
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    lookups: BTreeMap<LookupKind, LookupTable>,
    discipline_pairs: Vec<DisciplinePair>,
    rarity_pairs: Vec<RarityPair>,
    cards: Vec<AbstractCard>,
    relations: BTreeMap<Relation, MapTable>,
    physical_cards: Vec<PhysicalCard>,
    card_sets: Vec<CardSet>,
    memberships: Vec<Membership>,
    next_card_set_id: u32,
    next_membership_id: u32,
    /// Bumped whenever the catalog tables are replaced.
    catalog_generation: u64,
    #[serde(skip)]
    card_index: HashMap<String, CardId>,
    #[serde(skip)]
    physical_index: HashMap<(CardId, Option<LookupId>), PhysicalCardId>,
}

impl Database {
    pub fn new() -> Self {
        let mut db = Self::default();
        db.rebuild_indexes();
        db
    }

    /// Rebuilds every derived index. Must be called after deserializing.
    pub fn rebuild_indexes(&mut self) {
        for kind in LookupKind::ALL {
            self.lookups.entry(kind).or_default().reindex();
        }
        for relation in Relation::ALL {
            self.relations.entry(relation).or_default().reindex();
        }
        self.card_index = self
            .cards
            .iter()
            .map(|card| (card.canonical_name.clone(), card.id))
            .collect();
        self.physical_index = self
            .physical_cards
            .iter()
            .map(|pc| ((pc.card, pc.expansion), pc.id))
            .collect();
    }

    pub fn catalog_generation(&self) -> u64 {
        self.catalog_generation
    }

    // --- Lookup tables ---

    pub fn lookup_table(&self, kind: LookupKind) -> Option<&LookupTable> {
        self.lookups.get(&kind)
    }

    pub fn lookup_entries(&self, kind: LookupKind) -> &[LookupEntry] {
        self.lookups
            .get(&kind)
            .map(LookupTable::entries)
            .unwrap_or(&[])
    }

    pub fn add_lookup(&mut self, kind: LookupKind, name: &str, alias: Option<&str>) -> LookupId {
        self.lookups
            .entry(kind)
            .or_default()
            .get_or_create(name, alias)
    }

    pub fn find_lookup(&self, kind: LookupKind, name: &str) -> Option<LookupId> {
        self.lookups.get(&kind).and_then(|table| table.find(name))
    }

    /// Resolves a name (or alias) in a lookup table.
    pub fn resolve(&self, kind: LookupKind, name: &str) -> Result<LookupId> {
        self.find_lookup(kind, name)
            .ok_or_else(|| SutekhError::not_found(kind.label(), name))
    }

    pub fn lookup_name(&self, kind: LookupKind, id: LookupId) -> Option<&str> {
        self.lookups
            .get(&kind)
            .and_then(|table| table.get(id))
            .map(|entry| entry.name.as_str())
    }

    // --- Pair tables ---

    pub fn discipline_pairs(&self) -> &[DisciplinePair] {
        &self.discipline_pairs
    }

    pub fn discipline_pair(&self, id: PairId) -> Option<&DisciplinePair> {
        self.discipline_pairs.get(id.0 as usize)
    }

    pub fn find_discipline_pair(
        &self,
        discipline: LookupId,
        level: DisciplineLevel,
    ) -> Option<PairId> {
        self.discipline_pairs
            .iter()
            .find(|p| p.discipline == discipline && p.level == level)
            .map(|p| p.id)
    }

    pub fn add_discipline_pair(&mut self, discipline: LookupId, level: DisciplineLevel) -> PairId {
        if let Some(id) = self.find_discipline_pair(discipline, level) {
            return id;
        }
        let id = PairId(self.discipline_pairs.len() as u32);
        self.discipline_pairs.push(DisciplinePair {
            id,
            discipline,
            level,
        });
        id
    }

    pub fn rarity_pairs(&self) -> &[RarityPair] {
        &self.rarity_pairs
    }

    pub fn rarity_pair(&self, id: PairId) -> Option<&RarityPair> {
        self.rarity_pairs.get(id.0 as usize)
    }

    pub fn find_rarity_pair(&self, expansion: LookupId, rarity: LookupId) -> Option<PairId> {
        self.rarity_pairs
            .iter()
            .find(|p| p.expansion == expansion && p.rarity == rarity)
            .map(|p| p.id)
    }

    pub fn add_rarity_pair(&mut self, expansion: LookupId, rarity: LookupId) -> PairId {
        if let Some(id) = self.find_rarity_pair(expansion, rarity) {
            return id;
        }
        let id = PairId(self.rarity_pairs.len() as u32);
        self.rarity_pairs.push(RarityPair {
            id,
            expansion,
            rarity,
        });
        id
    }

    // --- Cards ---

    pub fn cards(&self) -> &[AbstractCard] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&AbstractCard> {
        self.cards.get(id.0 as usize)
    }

    pub fn card_name(&self, id: CardId) -> String {
        self.card(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("<card {}>", id))
    }

    /// Exact lookup by name: the canonical key first, then with any leading or
    /// trailing article moved to the other end ("Abbot, The" / "The Abbot").
    pub fn find_card(&self, name: &str) -> Option<CardId> {
        let key = canonical_name(name);
        self.card_index
            .get(&key)
            .or_else(|| self.card_index.get(&move_articles_to_front(&key)))
            .or_else(|| self.card_index.get(&move_articles_to_back(&key)))
            .copied()
    }

    pub fn resolve_card(&self, name: &str) -> Result<CardId> {
        self.find_card(name)
            .ok_or_else(|| SutekhError::not_found("Card", name))
    }

    pub(crate) fn push_card(&mut self, mut card: AbstractCard) -> Result<CardId> {
        if self.card_index.contains_key(&card.canonical_name) {
            return Err(SutekhError::DuplicateCard(card.name));
        }
        let id = CardId(self.cards.len() as u32);
        card.id = id;
        self.card_index.insert(card.canonical_name.clone(), id);
        self.cards.push(card);
        Ok(id)
    }

    // --- Relations ---

    pub fn relation(&self, relation: Relation) -> Option<&MapTable> {
        self.relations.get(&relation)
    }

    pub fn link(&mut self, card: CardId, relation: Relation, target: u32) {
        self.relations
            .entry(relation)
            .or_default()
            .insert(card, target);
    }

    /// Attribute ids linked to `card` through `relation`.
    pub fn related(&self, card: CardId, relation: Relation) -> Vec<u32> {
        self.relations
            .get(&relation)
            .map(|table| table.forward(card).collect())
            .unwrap_or_default()
    }

    /// Names of the lookup entries linked to `card`, for non-pair relations.
    pub fn related_names(&self, card: CardId, relation: Relation) -> Vec<String> {
        let Some(kind) = relation.lookup_kind() else {
            return Vec::new();
        };
        self.related(card, relation)
            .into_iter()
            .filter_map(|id| self.lookup_name(kind, LookupId(id)))
            .map(str::to_string)
            .collect()
    }

    pub fn has_relation(&self, card: CardId, relation: Relation, target: u32) -> bool {
        self.relations
            .get(&relation)
            .is_some_and(|table| table.contains(card, target))
    }

    // --- Physical cards ---

    pub fn physical_cards(&self) -> &[PhysicalCard] {
        &self.physical_cards
    }

    pub fn physical_card(&self, id: PhysicalCardId) -> Option<&PhysicalCard> {
        self.physical_cards.get(id.0 as usize)
    }

    pub fn find_physical_card(
        &self,
        card: CardId,
        expansion: Option<LookupId>,
    ) -> Option<PhysicalCardId> {
        self.physical_index.get(&(card, expansion)).copied()
    }

    /// Get-or-create the physical card for a printing.
    pub fn physical_card_for(
        &mut self,
        card: CardId,
        expansion: Option<LookupId>,
    ) -> PhysicalCardId {
        if let Some(id) = self.find_physical_card(card, expansion) {
            return id;
        }
        let id = PhysicalCardId(self.physical_cards.len() as u32);
        self.physical_cards.push(PhysicalCard {
            id,
            card,
            expansion,
        });
        self.physical_index.insert((card, expansion), id);
        id
    }

    pub fn expansion_name(&self, expansion: Option<LookupId>) -> Option<&str> {
        expansion.and_then(|id| self.lookup_name(LookupKind::Expansion, id))
    }

    // --- Card sets ---

    pub fn card_sets(&self) -> &[CardSet] {
        &self.card_sets
    }

    pub fn card_set(&self, id: CardSetId) -> Option<&CardSet> {
        self.card_sets
            .binary_search_by_key(&id, |cs| cs.id)
            .ok()
            .map(|idx| &self.card_sets[idx])
    }

    pub fn card_set_mut(&mut self, id: CardSetId) -> Option<&mut CardSet> {
        self.card_sets
            .binary_search_by_key(&id, |cs| cs.id)
            .ok()
            .map(move |idx| &mut self.card_sets[idx])
    }

    pub fn get_card_set(&self, id: CardSetId) -> Result<&CardSet> {
        self.card_set(id)
            .ok_or_else(|| SutekhError::CardSetNotFound(format!("#{}", id)))
    }

    pub fn find_card_set(&self, name: &str) -> Option<CardSetId> {
        self.card_sets
            .iter()
            .find(|cs| cs.name == name)
            .map(|cs| cs.id)
    }

    pub fn resolve_card_set(&self, name: &str) -> Result<CardSetId> {
        self.find_card_set(name)
            .ok_or_else(|| SutekhError::CardSetNotFound(name.to_string()))
    }

    pub fn card_set_name(&self, id: CardSetId) -> String {
        self.card_set(id)
            .map(|cs| cs.name.clone())
            .unwrap_or_else(|| format!("<card set {}>", id))
    }

    /// Inserts a card set row. The name must be unused and the parent must exist.
    pub fn insert_card_set(&mut self, new: NewCardSet) -> Result<CardSetId> {
        if self.find_card_set(&new.name).is_some() {
            return Err(SutekhError::CardSetExists(new.name));
        }
        if let Some(parent) = new.parent {
            self.get_card_set(parent)?;
        }
        let id = CardSetId(self.next_card_set_id);
        self.next_card_set_id += 1;
        self.card_sets.push(CardSet {
            id,
            name: new.name,
            author: new.author,
            comment: new.comment,
            annotations: new.annotations,
            in_use: new.in_use,
            parent: new.parent,
        });
        Ok(id)
    }

    /// Removes a card set row and its memberships. Children are left untouched.
    pub(crate) fn remove_card_set_row(&mut self, id: CardSetId) -> Option<CardSet> {
        let idx = self.card_sets.binary_search_by_key(&id, |cs| cs.id).ok()?;
        self.memberships.retain(|m| m.card_set != id);
        Some(self.card_sets.remove(idx))
    }

    // --- Memberships ---

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    pub fn membership(&self, id: MembershipId) -> Option<&Membership> {
        self.memberships
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.memberships[idx])
    }

    pub fn memberships_of(&self, card_set: CardSetId) -> impl Iterator<Item = &Membership> + '_ {
        self.memberships
            .iter()
            .filter(move |m| m.card_set == card_set)
    }

    pub fn add_membership(
        &mut self,
        card_set: CardSetId,
        physical_card: PhysicalCardId,
    ) -> MembershipId {
        let id = MembershipId(self.next_membership_id);
        self.next_membership_id += 1;
        self.memberships.push(Membership {
            id,
            card_set,
            physical_card,
        });
        id
    }

    /// Removes up to `count` copies of a physical card; returns how many were removed.
    pub fn remove_memberships(
        &mut self,
        card_set: CardSetId,
        physical_card: PhysicalCardId,
        count: u32,
    ) -> u32 {
        let mut removed = 0;
        self.memberships.retain(|m| {
            if removed < count && m.card_set == card_set && m.physical_card == physical_card {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn card_count(&self, card_set: CardSetId) -> usize {
        self.memberships_of(card_set).count()
    }

    /// Copies per physical card in a card set.
    pub fn physical_counts(&self, card_set: CardSetId) -> BTreeMap<PhysicalCardId, u32> {
        let mut counts = BTreeMap::new();
        for m in self.memberships_of(card_set) {
            *counts.entry(m.physical_card).or_insert(0) += 1;
        }
        counts
    }

    /// Copies of a physical card across every card set.
    pub fn physical_card_total(&self, physical_card: PhysicalCardId) -> usize {
        self.memberships
            .iter()
            .filter(|m| m.physical_card == physical_card)
            .count()
    }

    /// Referential checks: parents and membership targets must exist.
    pub fn check_integrity(&self) -> Result<()> {
        for cs in &self.card_sets {
            if let Some(parent) = cs.parent {
                if self.card_set(parent).is_none() {
                    return Err(SutekhError::Store(format!(
                        "Card set '{}' has a missing parent (#{})",
                        cs.name, parent
                    )));
                }
            }
        }
        for m in &self.memberships {
            if self.card_set(m.card_set).is_none() || self.physical_card(m.physical_card).is_none()
            {
                return Err(SutekhError::Store(format!(
                    "Membership #{} references a missing row",
                    m.id
                )));
            }
        }
        Ok(())
    }

    /// Drops every catalog table and card set content reference, keeping card set rows.
    /// Used by catalog refresh, which re-attaches memberships afterwards.
    pub(crate) fn reset_catalog(&mut self) {
        for table in self.lookups.values_mut() {
            *table = LookupTable::default();
        }
        self.discipline_pairs.clear();
        self.rarity_pairs.clear();
        self.cards.clear();
        for table in self.relations.values_mut() {
            *table = MapTable::default();
        }
        self.physical_cards.clear();
        self.memberships.clear();
        self.card_index.clear();
        self.physical_index.clear();
        self.catalog_generation += 1;
    }
}
