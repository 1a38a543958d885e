//! # Domain Model
//!
//! Row types stored in the [`Database`](crate::schema::Database).
//!
//! ## Cards
//!
//! An [`AbstractCard`] is a card *design*: one row per distinct card name in the
//! catalog. Its `canonical_name` (the lower-cased name) is the stable lookup key
//! that survives catalog reloads; ids do not.
//!
//! A [`PhysicalCard`] is an abstract card printed in a particular expansion (or in
//! no known expansion). Physical cards are created on demand and shared: two card
//! sets holding the same printing point at the same physical card row.
//!
//! ## Card Sets
//!
//! A [`CardSet`] is a named collection with an optional parent, forming a forest.
//! Contents are [`Membership`] rows, one row per copy, so three copies of a card
//! are three rows referencing the same physical card.
//!
//! ## Sentinels
//!
//! Numeric card attributes keep the catalog's conventions:
//! - `cost == Some(-1)` is a variable ("X") cost, distinct from a real zero cost.
//! - `group == Some(-1)` is the "any group" marker.
//! - `None` means the attribute does not apply to the card.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cost value used for variable ("X") costs.
pub const COST_X: i32 = -1;

/// Group value used for cards playable with any group.
pub const GROUP_ANY: i32 = -1;

/// Card type names that make a card a crypt card.
pub const CRYPT_TYPES: [&str; 2] = ["Vampire", "Imbued"];

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Row id of an [`AbstractCard`].
    CardId
);
id_type!(
    /// Row id of a [`PhysicalCard`].
    PhysicalCardId
);
id_type!(
    /// Row id of a [`CardSet`].
    CardSetId
);
id_type!(
    /// Row id inside one lookup table. Only meaningful together with its [`LookupKind`].
    LookupId
);
id_type!(
    /// Row id of a discipline or rarity pair.
    PairId
);
id_type!(MembershipId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostType {
    Pool,
    Blood,
    Conviction,
}

impl CostType {
    pub const ALL: [CostType; 3] = [CostType::Pool, CostType::Blood, CostType::Conviction];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostType::Pool => "pool",
            CostType::Blood => "blood",
            CostType::Conviction => "conviction",
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pool" => Ok(CostType::Pool),
            "blood" => Ok(CostType::Blood),
            "conviction" => Ok(CostType::Conviction),
            other => Err(format!("unknown cost type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisciplineLevel {
    Inferior,
    Superior,
}

impl DisciplineLevel {
    pub const ALL: [DisciplineLevel; 2] = [DisciplineLevel::Inferior, DisciplineLevel::Superior];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisciplineLevel::Inferior => "inferior",
            DisciplineLevel::Superior => "superior",
        }
    }
}

impl fmt::Display for DisciplineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisciplineLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inferior" => Ok(DisciplineLevel::Inferior),
            "superior" => Ok(DisciplineLevel::Superior),
            other => Err(format!("unknown discipline level '{}'", other)),
        }
    }
}

/// The named lookup tables of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Clan,
    Creed,
    Virtue,
    Sect,
    Title,
    CardType,
    Discipline,
    Expansion,
    Rarity,
    Artist,
    Keyword,
    Ruling,
}

impl LookupKind {
    pub const ALL: [LookupKind; 12] = [
        LookupKind::Clan,
        LookupKind::Creed,
        LookupKind::Virtue,
        LookupKind::Sect,
        LookupKind::Title,
        LookupKind::CardType,
        LookupKind::Discipline,
        LookupKind::Expansion,
        LookupKind::Rarity,
        LookupKind::Artist,
        LookupKind::Keyword,
        LookupKind::Ruling,
    ];

    /// Human readable name, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            LookupKind::Clan => "Clan",
            LookupKind::Creed => "Creed",
            LookupKind::Virtue => "Virtue",
            LookupKind::Sect => "Sect",
            LookupKind::Title => "Title",
            LookupKind::CardType => "Card type",
            LookupKind::Discipline => "Discipline",
            LookupKind::Expansion => "Expansion",
            LookupKind::Rarity => "Rarity",
            LookupKind::Artist => "Artist",
            LookupKind::Keyword => "Keyword",
            LookupKind::Ruling => "Ruling",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A lookup table row: a clan, a sect, an expansion and so on.
///
/// `alias` holds the short or long form of the name (e.g. "LotN" for
/// "Lords of the Night", or "Dominate" for "dom") and resolves to the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: LookupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractCard {
    pub id: CardId,
    pub canonical_name: String,
    pub name: String,
    pub text: String,
    /// `text` without the `{}` markup used for discipline-specific clauses.
    pub search_text: String,
    pub group: Option<i32>,
    pub capacity: Option<i32>,
    pub cost: Option<i32>,
    pub cost_type: Option<CostType>,
    #[serde(default)]
    pub advanced: bool,
    pub life: Option<i32>,
}

impl AbstractCard {
    pub fn is_variable_cost(&self) -> bool {
        self.cost == Some(COST_X)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisciplinePair {
    pub id: PairId,
    pub discipline: LookupId,
    pub level: DisciplineLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RarityPair {
    pub id: PairId,
    pub expansion: LookupId,
    pub rarity: LookupId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalCard {
    pub id: PhysicalCardId,
    pub card: CardId,
    pub expansion: Option<LookupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub id: CardSetId,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub annotations: String,
    #[serde(default)]
    pub in_use: bool,
    pub parent: Option<CardSetId>,
}

/// Metadata for a card set that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCardSet {
    pub name: String,
    pub author: String,
    pub comment: String,
    pub annotations: String,
    pub in_use: bool,
    pub parent: Option<CardSetId>,
}

impl NewCardSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: Option<CardSetId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// One copy of a physical card inside a card set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub card_set: CardSetId,
    pub physical_card: PhysicalCardId,
}

static BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("static regex"));
static TRAILING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*), (the|an|a)$").expect("static regex"));
static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(the|an|a) (.*)$").expect("static regex"));

/// The lookup key for a card name.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Text searched by card text filters that do not mention `{}` markup.
pub fn search_text(text: &str) -> String {
    BRACES.replace_all(text, "").into_owned()
}

/// "Abbot, The" becomes "The Abbot". Names without a trailing article are unchanged.
pub fn move_articles_to_front(name: &str) -> String {
    match TRAILING_ARTICLE.captures(name) {
        Some(caps) => format!("{} {}", &caps[2], &caps[1]),
        None => name.to_string(),
    }
}

/// "The Abbot" becomes "Abbot, The". Names without a leading article are unchanged.
pub fn move_articles_to_back(name: &str) -> String {
    match LEADING_ARTICLE.captures(name) {
        Some(caps) => format!("{}, {}", &caps[2], &caps[1]),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_move_to_front() {
        assert_eq!(move_articles_to_front("Abbot, The"), "The Abbot");
        assert_eq!(move_articles_to_front("Thing, A"), "A Thing");
        assert_eq!(move_articles_to_front("Other, An"), "An Other");
        assert_eq!(move_articles_to_front("Abbot"), "Abbot");
        // Only a trailing article moves
        assert_eq!(move_articles_to_front("The Rack, Ltd"), "The Rack, Ltd");
    }

    #[test]
    fn articles_move_to_back() {
        assert_eq!(move_articles_to_back("The Abbot"), "Abbot, The");
        assert_eq!(move_articles_to_back("an Ending"), "Ending, an");
        assert_eq!(move_articles_to_back("Theo Bell"), "Theo Bell");
    }

    #[test]
    fn search_text_strips_braces() {
        assert_eq!(
            search_text("{Strike:} +1 bleed. {Only usable by Ventrue.}"),
            "Strike: +1 bleed. Only usable by Ventrue."
        );
    }

    #[test]
    fn cost_type_parses_case_insensitively() {
        assert_eq!("Blood".parse::<CostType>(), Ok(CostType::Blood));
        assert!("gold".parse::<CostType>().is_err());
    }

    #[test]
    fn canonical_name_lowercases_and_trims() {
        assert_eq!(canonical_name("  The Ankara Citadel "), "the ankara citadel");
    }
}
