//! # Filter Algebra
//!
//! A [`Filter`] is a value describing a selection of rows. Filters are built
//! once (resolving every name to an id, which is where lookups can fail) and
//! can then be run repeatedly with [`Filter::select`] against the current
//! state of the [`Database`].
//!
//! ## Building filters
//!
//! Named constructors mirror the user-facing filter vocabulary:
//!
//! ```ignore
//! let vampires = Filter::card_type(db, "Vampire")?;
//! let ventrue_or_toreador = Filter::multi_clan(db, &["Ventrue", "Toreador"]);
//! let cheap = Filter::multi_cost(&[CostValue::Fixed(1), CostValue::X], false);
//! let query = Filter::and(vec![vampires, ventrue_or_toreador, cheap.negate()]);
//! ```
//!
//! Single-value constructors fail with [`SutekhError::NotFound`] when the name
//! is unknown. Multi-value constructors resolve each value on its own; see
//! [`Resolution`].
//!
//! ## Composition
//!
//! - `And([])` selects everything and `Or([])` selects nothing.
//! - `Not(Not(f))` selects exactly what `f` selects.
//! - A box supports the entity types all of its children support.
//!
//! ## Entity types
//!
//! Each filter declares the [`EntityType`]s it can select. Selecting an
//! unsupported type is an error ([`SutekhError::UnsupportedEntity`]), not an
//! empty result.
//!
//! ## Vocabulary
//!
//! The user-facing keywords, descriptions and legal values live in [`spec`].

use crate::error::{Result, SutekhError};
use crate::model::{
    CardId, CardSetId, CostType, DisciplineLevel, LookupId, LookupKind, MembershipId,
    PhysicalCardId, COST_X, CRYPT_TYPES,
};
use crate::schema::query::{Condition, EntityType, IntColumn, LikePattern, Row, TextColumn};
use crate::schema::{Database, Relation};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub mod function;
pub mod guess;
pub mod spec;

pub use function::CardFunction;
pub use guess::{best_guess_filter, make_illegal_filter};

/// A set of [`EntityType`]s, buildable in const context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntitySet(u8);

impl EntitySet {
    pub const NONE: EntitySet = EntitySet(0);
    pub const ALL: EntitySet = EntitySet(0b1111);
    /// Rows that reach an abstract card.
    pub const CARDS: EntitySet = EntitySet::NONE
        .with(EntityType::AbstractCard)
        .with(EntityType::PhysicalCard)
        .with(EntityType::Membership);
    /// Rows that reach a physical card.
    pub const PHYSICAL: EntitySet = EntitySet::NONE
        .with(EntityType::PhysicalCard)
        .with(EntityType::Membership);
    pub const MEMBERSHIP: EntitySet = EntitySet::NONE.with(EntityType::Membership);
    pub const CARD_SETS: EntitySet = EntitySet::NONE.with(EntityType::CardSet);

    const fn bit(entity: EntityType) -> u8 {
        match entity {
            EntityType::AbstractCard => 1,
            EntityType::PhysicalCard => 2,
            EntityType::CardSet => 4,
            EntityType::Membership => 8,
        }
    }

    pub const fn with(self, entity: EntityType) -> Self {
        EntitySet(self.0 | Self::bit(entity))
    }

    pub const fn contains(&self, entity: EntityType) -> bool {
        self.0 & Self::bit(entity) != 0
    }

    pub const fn intersect(self, other: EntitySet) -> Self {
        EntitySet(self.0 & other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityType> + '_ {
        EntityType::ALL.into_iter().filter(|e| self.contains(*e))
    }
}

/// How multi-value constructors treat names that do not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Fail on the first unknown name.
    Strict,
    /// Skip unknown names (logged at debug level).
    #[default]
    Lenient,
}

/// A cost entered by a user: a number or the variable cost "X".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CostValue {
    Fixed(i32),
    X,
}

impl CostValue {
    fn stored(&self) -> i32 {
        match self {
            CostValue::Fixed(value) => *value,
            CostValue::X => COST_X,
        }
    }
}

/// A card count bucket for card-set count filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CardCount {
    Exact(u32),
    MoreThan(u32),
}

impl CardCount {
    pub fn matches(&self, count: u32) -> bool {
        match self {
            CardCount::Exact(n) => count == *n,
            CardCount::MoreThan(n) => count > *n,
        }
    }
}

impl fmt::Display for CardCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardCount::Exact(n) => write!(f, "{}", n),
            CardCount::MoreThan(n) => write!(f, ">{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Selects every row of any type.
    Null,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    /// Cards linked to any of `ids` through a mapping table.
    Related {
        relation: Relation,
        ids: BTreeSet<u32>,
    },
    /// Cards whose numeric column is one of `values`.
    Column {
        column: IntColumn,
        values: BTreeSet<i32>,
        include_null: bool,
    },
    CostType {
        cost_types: BTreeSet<CostType>,
        include_null: bool,
    },
    /// Lower-cased substring (with `%`/`_` wildcards) of the card text.
    CardText(String),
    /// LIKE pattern over the card name.
    CardName(String),
    Cards(BTreeSet<CardId>),
    PhysicalExpansion(BTreeSet<Option<LookupId>>),
    /// Membership rows belonging to any of the card sets.
    CardSets(BTreeSet<CardSetId>),
    /// Cards whose total count across `card_sets` falls in one of `counts`.
    CardSetCardCount {
        card_sets: BTreeSet<CardSetId>,
        counts: BTreeSet<CardCount>,
    },
    /// Physical cards present in a card set marked in use.
    CardsInUse,
    CardSetText {
        column: TextColumn,
        needle: String,
    },
    CardSetInUse,
    ParentCardSet(BTreeSet<CardSetId>),
    /// A vocabulary entry expanded into card type and card text filters.
    CardFunction {
        functions: BTreeSet<CardFunction>,
        composed: Box<Filter>,
    },
}

/// Swallows lookup misses under [`Resolution::Lenient`].
fn skip_or_fail(err: SutekhError, resolution: Resolution) -> Result<()> {
    if resolution == Resolution::Lenient && err.is_not_found() {
        tracing::debug!(error = %err, "skipping unknown filter value");
        Ok(())
    } else {
        Err(err)
    }
}

fn resolve_each<T, S: AsRef<str>>(
    names: &[S],
    resolution: Resolution,
    mut resolve: impl FnMut(&str) -> Result<T>,
) -> Result<Vec<T>> {
    let mut found = Vec::with_capacity(names.len());
    for name in names {
        match resolve(name.as_ref()) {
            Ok(value) => found.push(value),
            Err(err) => skip_or_fail(err, resolution)?,
        }
    }
    Ok(found)
}

impl Filter {
    // --- Composition ---

    pub fn and(filters: Vec<Filter>) -> Filter {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Filter {
        Filter::Or(filters)
    }

    pub fn negate(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    // --- Lookup-table filters ---

    /// Cards linked to the named entries of a lookup table.
    pub fn lookup<S: AsRef<str>>(
        db: &Database,
        relation: Relation,
        names: &[S],
        resolution: Resolution,
    ) -> Result<Filter> {
        let ids = match relation {
            Relation::Discipline => resolve_each(names, resolution, |name| {
                let disc = db.resolve(LookupKind::Discipline, name)?;
                Ok(db
                    .discipline_pairs()
                    .iter()
                    .filter(|p| p.discipline == disc)
                    .map(|p| p.id.0)
                    .collect::<Vec<_>>())
            })?
            .into_iter()
            .flatten()
            .collect(),
            Relation::Rarity => resolve_each(names, resolution, |name| {
                let expansion = db.resolve(LookupKind::Expansion, name)?;
                Ok(db
                    .rarity_pairs()
                    .iter()
                    .filter(|p| p.expansion == expansion)
                    .map(|p| p.id.0)
                    .collect::<Vec<_>>())
            })?
            .into_iter()
            .flatten()
            .collect(),
            other => {
                let kind = other.lookup_kind().ok_or_else(|| {
                    SutekhError::Store(format!("{} has no lookup table", other))
                })?;
                resolve_each(names, resolution, |name| {
                    db.resolve(kind, name).map(|id| id.0)
                })?
                .into_iter()
                .collect()
            }
        };
        Ok(Filter::Related { relation, ids })
    }

    pub fn clan(db: &Database, clan: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Clan, &[clan], Resolution::Strict)
    }

    pub fn multi_clan<S: AsRef<str>>(db: &Database, clans: &[S]) -> Filter {
        Self::lenient(db, Relation::Clan, clans)
    }

    pub fn sect(db: &Database, sect: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Sect, &[sect], Resolution::Strict)
    }

    pub fn multi_sect<S: AsRef<str>>(db: &Database, sects: &[S]) -> Filter {
        Self::lenient(db, Relation::Sect, sects)
    }

    pub fn title(db: &Database, title: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Title, &[title], Resolution::Strict)
    }

    pub fn multi_title<S: AsRef<str>>(db: &Database, titles: &[S]) -> Filter {
        Self::lenient(db, Relation::Title, titles)
    }

    pub fn creed(db: &Database, creed: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Creed, &[creed], Resolution::Strict)
    }

    pub fn multi_creed<S: AsRef<str>>(db: &Database, creeds: &[S]) -> Filter {
        Self::lenient(db, Relation::Creed, creeds)
    }

    pub fn virtue(db: &Database, virtue: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Virtue, &[virtue], Resolution::Strict)
    }

    pub fn multi_virtue<S: AsRef<str>>(db: &Database, virtues: &[S]) -> Filter {
        Self::lenient(db, Relation::Virtue, virtues)
    }

    pub fn card_type(db: &Database, card_type: &str) -> Result<Filter> {
        Self::lookup(db, Relation::CardType, &[card_type], Resolution::Strict)
    }

    pub fn multi_card_type<S: AsRef<str>>(db: &Database, card_types: &[S]) -> Filter {
        Self::lenient(db, Relation::CardType, card_types)
    }

    pub fn artist(db: &Database, artist: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Artist, &[artist], Resolution::Strict)
    }

    pub fn multi_artist<S: AsRef<str>>(db: &Database, artists: &[S]) -> Filter {
        Self::lenient(db, Relation::Artist, artists)
    }

    pub fn keyword(db: &Database, keyword: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Keyword, &[keyword], Resolution::Strict)
    }

    pub fn multi_keyword<S: AsRef<str>>(db: &Database, keywords: &[S]) -> Filter {
        Self::lenient(db, Relation::Keyword, keywords)
    }

    /// Cards requiring the discipline at either level.
    pub fn discipline(db: &Database, discipline: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Discipline, &[discipline], Resolution::Strict)
    }

    pub fn multi_discipline<S: AsRef<str>>(db: &Database, disciplines: &[S]) -> Filter {
        Self::lenient(db, Relation::Discipline, disciplines)
    }

    /// Cards with the discipline at exactly `level`.
    pub fn discipline_level(
        db: &Database,
        discipline: &str,
        level: DisciplineLevel,
    ) -> Result<Filter> {
        Self::multi_discipline_level(db, &[(discipline, level)], Resolution::Strict)
    }

    pub fn multi_discipline_level<S: AsRef<str>>(
        db: &Database,
        pairs: &[(S, DisciplineLevel)],
        resolution: Resolution,
    ) -> Result<Filter> {
        let mut ids = BTreeSet::new();
        for (name, level) in pairs {
            match db.resolve(LookupKind::Discipline, name.as_ref()) {
                Ok(disc) => {
                    // A discipline never printed at this level selects nothing
                    if let Some(pair) = db.find_discipline_pair(disc, *level) {
                        ids.insert(pair.0);
                    }
                }
                Err(err) => skip_or_fail(err, resolution)?,
            }
        }
        Ok(Filter::Related {
            relation: Relation::Discipline,
            ids,
        })
    }

    /// Cards printed in the expansion, at any rarity.
    pub fn expansion(db: &Database, expansion: &str) -> Result<Filter> {
        Self::lookup(db, Relation::Rarity, &[expansion], Resolution::Strict)
    }

    pub fn multi_expansion<S: AsRef<str>>(db: &Database, expansions: &[S]) -> Filter {
        Self::lenient(db, Relation::Rarity, expansions)
    }

    pub fn expansion_rarity(db: &Database, expansion: &str, rarity: &str) -> Result<Filter> {
        Self::multi_expansion_rarity(db, &[(expansion, rarity)], Resolution::Strict)
    }

    pub fn multi_expansion_rarity<S: AsRef<str>>(
        db: &Database,
        pairs: &[(S, S)],
        resolution: Resolution,
    ) -> Result<Filter> {
        let mut ids = BTreeSet::new();
        for (expansion, rarity) in pairs {
            let found = db
                .resolve(LookupKind::Expansion, expansion.as_ref())
                .and_then(|exp| Ok((exp, db.resolve(LookupKind::Rarity, rarity.as_ref())?)));
            match found {
                Ok((exp, rar)) => {
                    if let Some(pair) = db.find_rarity_pair(exp, rar) {
                        ids.insert(pair.0);
                    }
                }
                Err(err) => skip_or_fail(err, resolution)?,
            }
        }
        Ok(Filter::Related {
            relation: Relation::Rarity,
            ids,
        })
    }

    /// Vampires and imbued.
    pub fn crypt_card(db: &Database) -> Filter {
        Self::multi_card_type(db, &CRYPT_TYPES)
    }

    fn lenient<S: AsRef<str>>(db: &Database, relation: Relation, names: &[S]) -> Filter {
        // Lenient resolution only fails on non-lookup errors, which these relations cannot produce
        Self::lookup(db, relation, names, Resolution::Lenient).unwrap_or(Filter::Related {
            relation,
            ids: BTreeSet::new(),
        })
    }

    // --- Column filters ---

    fn column(column: IntColumn, values: impl IntoIterator<Item = i32>) -> Filter {
        Filter::Column {
            column,
            values: values.into_iter().collect(),
            include_null: false,
        }
    }

    pub fn group(group: i32) -> Filter {
        Self::column(IntColumn::Group, [group])
    }

    /// Groups, with [`GROUP_ANY`](crate::model::GROUP_ANY) for cards playable with any group.
    pub fn multi_group(groups: &[i32]) -> Filter {
        Self::column(IntColumn::Group, groups.iter().copied())
    }

    pub fn capacity(capacity: i32) -> Filter {
        Self::column(IntColumn::Capacity, [capacity])
    }

    pub fn multi_capacity(capacities: &[i32]) -> Filter {
        Self::column(IntColumn::Capacity, capacities.iter().copied())
    }

    pub fn life(life: i32) -> Filter {
        Self::column(IntColumn::Life, [life])
    }

    pub fn multi_life(lives: &[i32]) -> Filter {
        Self::column(IntColumn::Life, lives.iter().copied())
    }

    /// Cards costing exactly `cost`. Cards without a cost never match.
    pub fn cost(cost: CostValue) -> Filter {
        Self::multi_cost(&[cost], false)
    }

    /// Cards with any of the costs; `include_null` adds cards with no cost at all.
    pub fn multi_cost(costs: &[CostValue], include_null: bool) -> Filter {
        Filter::Column {
            column: IntColumn::Cost,
            values: costs.iter().map(CostValue::stored).collect(),
            include_null,
        }
    }

    pub fn cost_type(cost_type: CostType) -> Filter {
        Self::multi_cost_type(&[cost_type], false)
    }

    pub fn multi_cost_type(cost_types: &[CostType], include_null: bool) -> Filter {
        Filter::CostType {
            cost_types: cost_types.iter().copied().collect(),
            include_null,
        }
    }

    // --- Text filters ---

    /// Card text containing `pattern` (case-insensitive, `%` and `_` wildcards).
    /// Patterns mentioning `{` or `}` search the raw text, others the text with
    /// markup removed.
    pub fn card_text(pattern: &str) -> Filter {
        Filter::CardText(pattern.to_lowercase())
    }

    /// Card names containing `pattern`.
    pub fn card_name(pattern: &str) -> Filter {
        Filter::CardName(format!("%{}%", pattern.to_lowercase()))
    }

    /// Card names matching `pattern` exactly as a LIKE pattern.
    pub fn card_name_like(pattern: &str) -> Filter {
        Filter::CardName(pattern.to_string())
    }

    // --- Specific cards ---

    pub fn specific_card(db: &Database, name: &str) -> Result<Filter> {
        Ok(Filter::Cards(BTreeSet::from([db.resolve_card(name)?])))
    }

    pub fn multi_specific_card<S: AsRef<str>>(
        db: &Database,
        names: &[S],
        resolution: Resolution,
    ) -> Result<Filter> {
        let ids = resolve_each(names, resolution, |name| db.resolve_card(name))?;
        Ok(Filter::Cards(ids.into_iter().collect()))
    }

    pub fn specific_card_ids(ids: &[CardId]) -> Filter {
        Filter::Cards(ids.iter().copied().collect())
    }

    // --- Physical card filters ---

    /// Physical cards of the expansion; `None` selects cards with no known expansion.
    pub fn physical_expansion(db: &Database, expansion: Option<&str>) -> Result<Filter> {
        Self::multi_physical_expansion(db, &[expansion], Resolution::Strict)
    }

    pub fn multi_physical_expansion(
        db: &Database,
        expansions: &[Option<&str>],
        resolution: Resolution,
    ) -> Result<Filter> {
        let mut ids = BTreeSet::new();
        for expansion in expansions {
            match expansion {
                None => {
                    ids.insert(None);
                }
                Some(name) => match db.resolve(LookupKind::Expansion, name) {
                    Ok(id) => {
                        ids.insert(Some(id));
                    }
                    Err(err) => skip_or_fail(err, resolution)?,
                },
            }
        }
        Ok(Filter::PhysicalExpansion(ids))
    }

    // --- Card set filters ---

    fn card_set_ids<S: AsRef<str>>(
        db: &Database,
        names: &[S],
        resolution: Resolution,
    ) -> Result<BTreeSet<CardSetId>> {
        Ok(resolve_each(names, resolution, |name| db.resolve_card_set(name))?
            .into_iter()
            .collect())
    }

    /// Membership rows of the named card set.
    pub fn card_set(db: &Database, name: &str) -> Result<Filter> {
        Ok(Filter::CardSets(Self::card_set_ids(
            db,
            &[name],
            Resolution::Strict,
        )?))
    }

    pub fn multi_card_set<S: AsRef<str>>(
        db: &Database,
        names: &[S],
        resolution: Resolution,
    ) -> Result<Filter> {
        Ok(Filter::CardSets(Self::card_set_ids(db, names, resolution)?))
    }

    pub fn card_set_card_count<S: AsRef<str>>(
        db: &Database,
        counts: &[CardCount],
        card_sets: &[S],
        resolution: Resolution,
    ) -> Result<Filter> {
        Ok(Filter::CardSetCardCount {
            card_sets: Self::card_set_ids(db, card_sets, resolution)?,
            counts: counts.iter().copied().collect(),
        })
    }

    pub fn cards_in_use() -> Filter {
        Filter::CardsInUse
    }

    pub fn card_set_name(pattern: &str) -> Filter {
        Self::card_set_text(TextColumn::CardSetName, pattern)
    }

    pub fn card_set_author(pattern: &str) -> Filter {
        Self::card_set_text(TextColumn::CardSetAuthor, pattern)
    }

    pub fn card_set_description(pattern: &str) -> Filter {
        Self::card_set_text(TextColumn::CardSetComment, pattern)
    }

    pub fn card_set_annotations(pattern: &str) -> Filter {
        Self::card_set_text(TextColumn::CardSetAnnotations, pattern)
    }

    fn card_set_text(column: TextColumn, pattern: &str) -> Filter {
        Filter::CardSetText {
            column,
            needle: pattern.to_lowercase(),
        }
    }

    pub fn card_set_in_use() -> Filter {
        Filter::CardSetInUse
    }

    /// Card sets whose parent is one of the named card sets.
    pub fn parent_card_set<S: AsRef<str>>(
        db: &Database,
        parents: &[S],
        resolution: Resolution,
    ) -> Result<Filter> {
        Ok(Filter::ParentCardSet(Self::card_set_ids(
            db, parents, resolution,
        )?))
    }

    // --- Introspection ---

    /// Short name used in error messages.
    pub fn name(&self) -> String {
        match self {
            Filter::Null => "Null".to_string(),
            Filter::And(_) => "And".to_string(),
            Filter::Or(_) => "Or".to_string(),
            Filter::Not(inner) => format!("Not {}", inner.name()),
            Filter::Related { relation, .. } => relation.to_string(),
            Filter::Column { column, .. } => format!("{:?}", column),
            Filter::CostType { .. } => "CostType".to_string(),
            Filter::CardText(_) => "CardText".to_string(),
            Filter::CardName(_) => "CardName".to_string(),
            Filter::Cards(_) => "SpecificCard".to_string(),
            Filter::PhysicalExpansion(_) => "PhysicalExpansion".to_string(),
            Filter::CardSets(_) => "PhysicalCardSet".to_string(),
            Filter::CardSetCardCount { .. } => "CardSetCardCount".to_string(),
            Filter::CardsInUse => "PhysicalCardSetInUse".to_string(),
            Filter::CardSetText { column, .. } => format!("{:?}", column),
            Filter::CardSetInUse => "CardSetInUse".to_string(),
            Filter::ParentCardSet(_) => "ParentCardSet".to_string(),
            Filter::CardFunction { .. } => "CardFunction".to_string(),
        }
    }

    /// Entity types this filter can select.
    pub fn types(&self) -> EntitySet {
        match self {
            Filter::Null => EntitySet::ALL,
            Filter::And(parts) | Filter::Or(parts) => parts
                .iter()
                .fold(EntitySet::ALL, |acc, f| acc.intersect(f.types())),
            Filter::Not(inner) => inner.types(),
            Filter::Related { .. }
            | Filter::Column { .. }
            | Filter::CostType { .. }
            | Filter::CardText(_)
            | Filter::CardName(_)
            | Filter::Cards(_)
            | Filter::CardSetCardCount { .. }
            | Filter::CardFunction { .. } => EntitySet::CARDS,
            Filter::PhysicalExpansion(_) | Filter::CardsInUse => EntitySet::PHYSICAL,
            Filter::CardSets(_) => EntitySet::MEMBERSHIP,
            Filter::CardSetText { .. } | Filter::CardSetInUse | Filter::ParentCardSet(_) => {
                EntitySet::CARD_SETS
            }
        }
    }

    // --- Execution ---

    /// Lowers the filter to a selection condition against the current data.
    pub fn compile(&self, db: &Database) -> Result<Condition> {
        Ok(match self {
            Filter::Null => Condition::True,
            Filter::And(parts) if parts.is_empty() => Condition::True,
            Filter::Or(parts) if parts.is_empty() => Condition::False,
            Filter::And(parts) => Condition::And(Self::compile_all(parts, db)?),
            Filter::Or(parts) => Condition::Or(Self::compile_all(parts, db)?),
            Filter::Not(inner) => Condition::Not(Box::new(inner.compile(db)?)),
            Filter::Related { relation, ids } => Condition::Join {
                relation: *relation,
                ids: ids.clone(),
            },
            Filter::Column {
                column,
                values,
                include_null,
            } => Condition::IntIn {
                column: *column,
                values: values.clone(),
                or_null: *include_null,
            },
            Filter::CostType {
                cost_types,
                include_null,
            } => Condition::CostTypeIn {
                values: cost_types.clone(),
                or_null: *include_null,
            },
            Filter::CardText(needle) => {
                let column = if needle.contains('{') || needle.contains('}') {
                    TextColumn::CardText
                } else {
                    TextColumn::SearchText
                };
                Condition::Like {
                    column,
                    pattern: LikePattern::contains(needle)?,
                }
            }
            Filter::CardName(pattern) => Condition::Like {
                column: TextColumn::CardName,
                pattern: LikePattern::new(pattern)?,
            },
            Filter::Cards(ids) => Condition::CardIn(ids.clone()),
            Filter::PhysicalExpansion(ids) => Condition::ExpansionIn(ids.clone()),
            Filter::CardSets(ids) => Condition::CardSetIn(ids.clone()),
            Filter::CardSetCardCount { card_sets, counts } => {
                Condition::CardIn(cards_with_count(db, card_sets, counts))
            }
            Filter::CardsInUse => Condition::PhysicalIn(physical_cards_in_use(db)),
            Filter::CardSetText { column, needle } => Condition::Like {
                column: *column,
                pattern: LikePattern::contains(needle)?,
            },
            Filter::CardSetInUse => Condition::CardSetIn(
                db.card_sets()
                    .iter()
                    .filter(|cs| cs.in_use)
                    .map(|cs| cs.id)
                    .collect(),
            ),
            Filter::ParentCardSet(ids) => Condition::ParentIn(ids.clone()),
            Filter::CardFunction { composed, .. } => composed.compile(db)?,
        })
    }

    fn compile_all(parts: &[Filter], db: &Database) -> Result<Vec<Condition>> {
        parts.iter().map(|f| f.compile(db)).collect()
    }

    /// Runs the filter over every row of `entity`.
    pub fn select(&self, db: &Database, entity: EntityType) -> Result<Vec<Row>> {
        if !self.types().contains(entity) {
            return Err(SutekhError::UnsupportedEntity {
                filter: self.name(),
                entity,
            });
        }
        Ok(db.select(entity, &self.compile(db)?))
    }

    pub fn select_cards(&self, db: &Database) -> Result<Vec<CardId>> {
        Ok(self
            .select(db, EntityType::AbstractCard)?
            .into_iter()
            .filter_map(|row| match row {
                Row::Card(id) => Some(id),
                _ => None,
            })
            .collect())
    }

    pub fn select_physical_cards(&self, db: &Database) -> Result<Vec<PhysicalCardId>> {
        Ok(self
            .select(db, EntityType::PhysicalCard)?
            .into_iter()
            .filter_map(|row| match row {
                Row::Physical(id) => Some(id),
                _ => None,
            })
            .collect())
    }

    pub fn select_card_sets(&self, db: &Database) -> Result<Vec<CardSetId>> {
        Ok(self
            .select(db, EntityType::CardSet)?
            .into_iter()
            .filter_map(|row| match row {
                Row::CardSet(id) => Some(id),
                _ => None,
            })
            .collect())
    }

    pub fn select_memberships(&self, db: &Database) -> Result<Vec<MembershipId>> {
        Ok(self
            .select(db, EntityType::Membership)?
            .into_iter()
            .filter_map(|row| match row {
                Row::Membership(id) => Some(id),
                _ => None,
            })
            .collect())
    }
}

fn cards_with_count(
    db: &Database,
    card_sets: &BTreeSet<CardSetId>,
    counts: &BTreeSet<CardCount>,
) -> BTreeSet<CardId> {
    let mut per_card: BTreeMap<CardId, u32> = BTreeMap::new();
    for m in db.memberships() {
        if !card_sets.contains(&m.card_set) {
            continue;
        }
        if let Some(pc) = db.physical_card(m.physical_card) {
            *per_card.entry(pc.card).or_insert(0) += 1;
        }
    }
    db.cards()
        .iter()
        .filter(|card| {
            let count = per_card.get(&card.id).copied().unwrap_or(0);
            counts.iter().any(|c| c.matches(count))
        })
        .map(|card| card.id)
        .collect()
}

fn physical_cards_in_use(db: &Database) -> BTreeSet<PhysicalCardId> {
    let in_use: BTreeSet<CardSetId> = db
        .card_sets()
        .iter()
        .filter(|cs| cs.in_use)
        .map(|cs| cs.id)
        .collect();
    db.memberships()
        .iter()
        .filter(|m| in_use.contains(&m.card_set))
        .map(|m| m.physical_card)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostType, NewCardSet};
    use crate::schema::catalog::CardRecord;

    /// A: Ventrue, no cost. B: Toreador, cost X. C: Ventrue, cost 0.
    fn abc() -> (Database, CardId, CardId, CardId) {
        let mut db = Database::new();
        let a = db
            .add_card(&CardRecord::new("A").types(&["Vampire"]).clans(&["Ventrue"]))
            .unwrap();
        let b = db
            .add_card(
                &CardRecord::new("B")
                    .types(&["Action"])
                    .clans(&["Toreador"])
                    .cost(COST_X, CostType::Blood),
            )
            .unwrap();
        let mut c_record = CardRecord::new("C").types(&["Action"]).clans(&["Ventrue"]);
        c_record.cost = Some(0);
        let c = db.add_card(&c_record).unwrap();
        (db, a, b, c)
    }

    #[test]
    fn clan_filter_selects_linked_cards() {
        let (db, a, _, c) = abc();
        let f = Filter::multi_clan(&db, &["Ventrue"]);
        assert_eq!(f.select_cards(&db).unwrap(), vec![a, c]);
    }

    #[test]
    fn variable_cost_matches_x_only() {
        let (db, _, b, _) = abc();
        let f = Filter::multi_cost(&[CostValue::X], false);
        assert_eq!(f.select_cards(&db).unwrap(), vec![b]);
    }

    #[test]
    fn clan_and_not_x_cost() {
        let (db, a, _, c) = abc();
        let f = Filter::and(vec![
            Filter::multi_clan(&db, &["Ventrue", "Toreador"]),
            Filter::multi_cost(&[CostValue::X], false).negate(),
        ]);
        assert_eq!(f.select_cards(&db).unwrap(), vec![a, c]);
    }

    #[test]
    fn zero_cost_is_not_null_cost() {
        let (db, a, b, c) = abc();
        assert_eq!(
            Filter::cost(CostValue::Fixed(0)).select_cards(&db).unwrap(),
            vec![c]
        );
        assert_eq!(
            Filter::multi_cost(&[CostValue::Fixed(0)], true)
                .select_cards(&db)
                .unwrap(),
            vec![a, c]
        );
        assert!(!Filter::cost(CostValue::Fixed(0))
            .select_cards(&db)
            .unwrap()
            .contains(&b));
    }

    #[test]
    fn cost_type_without_cost_value() {
        let (mut db, a, b, c) = abc();
        let mut d_record = CardRecord::new("D").types(&["Master"]);
        d_record.cost_type = Some(CostType::Pool);
        let d = db.add_card(&d_record).unwrap();

        // D has a cost type but no cost, so only the null option picks it up
        assert_eq!(Filter::cost(CostValue::Fixed(0)).select_cards(&db).unwrap(), vec![c]);
        assert_eq!(Filter::cost(CostValue::X).select_cards(&db).unwrap(), vec![b]);
        assert_eq!(Filter::multi_cost(&[], true).select_cards(&db).unwrap(), vec![a, d]);

        assert_eq!(Filter::cost_type(CostType::Pool).select_cards(&db).unwrap(), vec![d]);
        // C has a cost of 0 but no cost type
        assert_eq!(Filter::multi_cost_type(&[], true).select_cards(&db).unwrap(), vec![a, c]);
        assert_eq!(
            Filter::multi_cost_type(&[CostType::Blood, CostType::Pool], false)
                .select_cards(&db)
                .unwrap(),
            vec![b, d]
        );
    }

    #[test]
    fn empty_boxes() {
        let (db, a, b, c) = abc();
        assert_eq!(Filter::and(vec![]).select_cards(&db).unwrap(), vec![a, b, c]);
        assert!(Filter::or(vec![]).select_cards(&db).unwrap().is_empty());
    }

    #[test]
    fn double_negation_is_identity() {
        let (db, _, _, _) = abc();
        let f = Filter::multi_clan(&db, &["Toreador"]);
        let nn = f.clone().negate().negate();
        assert_eq!(nn.select_cards(&db).unwrap(), f.select_cards(&db).unwrap());
    }

    #[test]
    fn single_constructor_fails_on_unknown_name() {
        let (db, _, _, _) = abc();
        let err = Filter::clan(&db, "Nonexistent").unwrap_err();
        assert!(matches!(err, SutekhError::NotFound { kind: "Clan", .. }));
    }

    #[test]
    fn lenient_multi_skips_unknown_names() {
        let (db, a, _, c) = abc();
        let f = Filter::multi_clan(&db, &["Ventrue", "Nonexistent"]);
        assert_eq!(f.select_cards(&db).unwrap(), vec![a, c]);

        let strict = Filter::lookup(
            &db,
            Relation::Clan,
            &["Ventrue", "Nonexistent"],
            Resolution::Strict,
        );
        assert!(strict.unwrap_err().is_not_found());
    }

    #[test]
    fn unknown_values_give_empty_not_error() {
        let (db, _, _, _) = abc();
        let f = Filter::multi_clan(&db, &["Nonexistent"]);
        assert!(f.select_cards(&db).unwrap().is_empty());
    }

    #[test]
    fn card_filters_reject_card_set_rows() {
        let (db, _, _, _) = abc();
        let f = Filter::multi_clan(&db, &["Ventrue"]);
        let err = f.select(&db, EntityType::CardSet).unwrap_err();
        assert!(matches!(
            err,
            SutekhError::UnsupportedEntity {
                entity: EntityType::CardSet,
                ..
            }
        ));
    }

    #[test]
    fn box_types_are_the_intersection() {
        let (db, _, _, _) = abc();
        let mixed = Filter::and(vec![Filter::multi_clan(&db, &["Ventrue"]), Filter::card_set_in_use()]);
        assert_eq!(mixed.types(), EntitySet::NONE);
        assert_eq!(Filter::and(vec![]).types(), EntitySet::ALL);
        let physical = Filter::or(vec![Filter::cards_in_use(), Filter::group(1)]);
        assert!(physical.types().contains(EntityType::PhysicalCard));
        assert!(!physical.types().contains(EntityType::AbstractCard));
    }

    #[test]
    fn physical_card_rows_reach_their_card() {
        let (mut db, a, _, c) = abc();
        let pa = db.physical_card_for(a, None);
        let _pc = db.physical_card_for(c, None);
        let f = Filter::multi_clan(&db, &["Ventrue"]);
        assert_eq!(f.select_physical_cards(&db).unwrap().len(), 2);
        assert!(f.select_physical_cards(&db).unwrap().contains(&pa));
    }

    #[test]
    fn card_set_filters() {
        let (mut db, a, b, _) = abc();
        let parent = db.insert_card_set(NewCardSet::new("My Collection")).unwrap();
        let mut deck = NewCardSet::new("Ventrue deck")
            .with_parent(Some(parent))
            .with_author("Alice");
        deck.in_use = true;
        let deck = db.insert_card_set(deck).unwrap();
        let pa = db.physical_card_for(a, None);
        let pb = db.physical_card_for(b, None);
        db.add_membership(deck, pa);
        db.add_membership(deck, pa);
        db.add_membership(parent, pb);

        assert_eq!(
            Filter::card_set_in_use().select_card_sets(&db).unwrap(),
            vec![deck]
        );
        assert_eq!(
            Filter::card_set_author("ali").select_card_sets(&db).unwrap(),
            vec![deck]
        );
        assert_eq!(
            Filter::parent_card_set(&db, &["My Collection"], Resolution::Strict)
                .unwrap()
                .select_card_sets(&db)
                .unwrap(),
            vec![deck]
        );
        assert_eq!(
            Filter::card_set(&db, "Ventrue deck")
                .unwrap()
                .select_memberships(&db)
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            Filter::cards_in_use().select_physical_cards(&db).unwrap(),
            vec![pa]
        );
        let twice = Filter::card_set_card_count(
            &db,
            &[CardCount::Exact(2)],
            &["Ventrue deck"],
            Resolution::Strict,
        )
        .unwrap();
        assert_eq!(twice.select_cards(&db).unwrap(), vec![a]);
    }

    #[test]
    fn zero_count_selects_cards_outside_the_set() {
        let (mut db, a, b, c) = abc();
        let deck = db.insert_card_set(NewCardSet::new("Deck")).unwrap();
        let pa = db.physical_card_for(a, None);
        db.add_membership(deck, pa);

        let f = Filter::card_set_card_count(&db, &[CardCount::Exact(0)], &["Deck"], Resolution::Strict)
            .unwrap();
        assert_eq!(f.select_cards(&db).unwrap(), vec![b, c]);
    }

    #[test]
    fn card_text_uses_search_text_without_braces() {
        let mut db = Database::new();
        let card = db
            .add_card(&CardRecord::new("Conditioning").text("+1 bleed. {Only usable by Ventrue.}"))
            .unwrap();
        assert_eq!(
            Filter::card_text("by ventrue").select_cards(&db).unwrap(),
            vec![card]
        );
        assert_eq!(
            Filter::card_text("{only usable").select_cards(&db).unwrap(),
            vec![card]
        );
        assert_eq!(
            Filter::card_text("bleed. only").select_cards(&db).unwrap(),
            vec![card]
        );
    }

    #[test]
    fn discipline_levels() {
        let mut db = Database::new();
        let sup = db
            .add_card(&CardRecord::new("Sup").discipline("dom", DisciplineLevel::Superior))
            .unwrap();
        let inf = db
            .add_card(&CardRecord::new("Inf").discipline("dom", DisciplineLevel::Inferior))
            .unwrap();

        assert_eq!(
            Filter::discipline(&db, "dom").unwrap().select_cards(&db).unwrap(),
            vec![sup, inf]
        );
        assert_eq!(
            Filter::discipline_level(&db, "dom", DisciplineLevel::Superior)
                .unwrap()
                .select_cards(&db)
                .unwrap(),
            vec![sup]
        );
        let mixed = Filter::multi_discipline_level(
            &db,
            &[("nope", DisciplineLevel::Superior), ("dom", DisciplineLevel::Inferior)],
            Resolution::Lenient,
        )
        .unwrap();
        assert_eq!(mixed.select_cards(&db).unwrap(), vec![inf]);
    }

    #[test]
    fn expansion_filters() {
        let mut db = Database::new();
        let card = db
            .add_card(&CardRecord::new("Abebe").rarity("Legacy of Blood", "Rare"))
            .unwrap();
        let lob = db.find_lookup(LookupKind::Expansion, "Legacy of Blood");
        let p_lob = db.physical_card_for(card, lob);
        let p_none = db.physical_card_for(card, None);

        assert_eq!(
            Filter::expansion(&db, "Legacy of Blood")
                .unwrap()
                .select_cards(&db)
                .unwrap(),
            vec![card]
        );
        assert_eq!(
            Filter::expansion_rarity(&db, "Legacy of Blood", "Rare")
                .unwrap()
                .select_cards(&db)
                .unwrap(),
            vec![card]
        );
        assert!(Filter::expansion_rarity(&db, "Legacy of Blood", "Common")
            .unwrap_err()
            .is_not_found());
        assert_eq!(
            Filter::physical_expansion(&db, None)
                .unwrap()
                .select_physical_cards(&db)
                .unwrap(),
            vec![p_none]
        );
        assert_eq!(
            Filter::physical_expansion(&db, Some("Legacy of Blood"))
                .unwrap()
                .select_physical_cards(&db)
                .unwrap(),
            vec![p_lob]
        );
    }
}
