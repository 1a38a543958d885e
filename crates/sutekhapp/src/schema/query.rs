//! Row selection.
//!
//! A [`Condition`] is the low-level selection language the filter algebra
//! compiles into. Conditions only reference ids and column values, never
//! names, so evaluating one cannot fail.
//!
//! Every row kind exposes the card, physical card and card set it reaches:
//!
//! | Row              | card | physical card | card set |
//! |------------------|------|---------------|----------|
//! | `AbstractCard`   | self | -             | -        |
//! | `PhysicalCard`   | yes  | self          | -        |
//! | `Membership`     | yes  | yes           | owner    |
//! | `CardSet`        | -    | -             | self     |
//!
//! A leaf condition over something the row cannot reach evaluates to false.

use super::{Database, Relation};
use crate::error::{Result, SutekhError};
use crate::model::{
    AbstractCard, CardId, CardSet, CardSetId, CostType, LookupId, MembershipId, PhysicalCard,
    PhysicalCardId,
};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityType {
    AbstractCard,
    PhysicalCard,
    CardSet,
    Membership,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::AbstractCard,
        EntityType::PhysicalCard,
        EntityType::CardSet,
        EntityType::Membership,
    ];
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::AbstractCard => "AbstractCard",
            EntityType::PhysicalCard => "PhysicalCard",
            EntityType::CardSet => "CardSet",
            EntityType::Membership => "Membership",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Row {
    Card(CardId),
    Physical(PhysicalCardId),
    Membership(MembershipId),
    CardSet(CardSetId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntColumn {
    Group,
    Capacity,
    Cost,
    Life,
}

impl IntColumn {
    fn value(&self, card: &AbstractCard) -> Option<i32> {
        match self {
            IntColumn::Group => card.group,
            IntColumn::Capacity => card.capacity,
            IntColumn::Cost => card.cost,
            IntColumn::Life => card.life,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    CardName,
    CardText,
    SearchText,
    CardSetName,
    CardSetAuthor,
    CardSetComment,
    CardSetAnnotations,
}

/// A SQL `LIKE` pattern: `%` matches any run of characters, `_` exactly one.
/// Matching is case-insensitive and anchored at both ends.
#[derive(Debug, Clone)]
pub struct LikePattern {
    source: String,
    regex: Regex,
}

impl LikePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for ch in pattern.chars() {
            match ch {
                '%' => expr.push_str(".*"),
                '_' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');
        let regex = RegexBuilder::new(&expr)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| SutekhError::InvalidFilterValue {
                filter: "pattern".to_string(),
                value: format!("{} ({})", pattern, err),
            })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Wraps `needle` in `%` so it matches anywhere.
    pub fn contains(needle: &str) -> Result<Self> {
        Self::new(&format!("%{}%", needle))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

#[derive(Debug, Clone)]
pub enum Condition {
    True,
    False,
    /// Column value in `values`; rows with no value match only when `or_null`.
    IntIn {
        column: IntColumn,
        values: BTreeSet<i32>,
        or_null: bool,
    },
    CostTypeIn {
        values: BTreeSet<CostType>,
        or_null: bool,
    },
    Like {
        column: TextColumn,
        pattern: LikePattern,
    },
    /// The row's card is linked to any of `ids` through `relation`.
    Join {
        relation: Relation,
        ids: BTreeSet<u32>,
    },
    CardIn(BTreeSet<CardId>),
    PhysicalIn(BTreeSet<PhysicalCardId>),
    /// Expansion of the row's physical card; `None` is "unknown expansion".
    ExpansionIn(BTreeSet<Option<LookupId>>),
    CardSetIn(BTreeSet<CardSetId>),
    ParentIn(BTreeSet<CardSetId>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Database {
    fn row_physical(&self, row: Row) -> Option<&PhysicalCard> {
        match row {
            Row::Physical(id) => self.physical_card(id),
            Row::Membership(id) => self
                .membership(id)
                .and_then(|m| self.physical_card(m.physical_card)),
            Row::Card(_) | Row::CardSet(_) => None,
        }
    }

    fn row_card(&self, row: Row) -> Option<&AbstractCard> {
        match row {
            Row::Card(id) => self.card(id),
            _ => self.row_physical(row).and_then(|pc| self.card(pc.card)),
        }
    }

    fn row_card_set(&self, row: Row) -> Option<&CardSet> {
        match row {
            Row::CardSet(id) => self.card_set(id),
            Row::Membership(id) => self.membership(id).and_then(|m| self.card_set(m.card_set)),
            Row::Card(_) | Row::Physical(_) => None,
        }
    }

    /// All rows of one entity type, in id order.
    pub fn rows(&self, entity: EntityType) -> Vec<Row> {
        match entity {
            EntityType::AbstractCard => self.cards().iter().map(|c| Row::Card(c.id)).collect(),
            EntityType::PhysicalCard => self
                .physical_cards()
                .iter()
                .map(|pc| Row::Physical(pc.id))
                .collect(),
            EntityType::CardSet => self
                .card_sets()
                .iter()
                .map(|cs| Row::CardSet(cs.id))
                .collect(),
            EntityType::Membership => self
                .memberships()
                .iter()
                .map(|m| Row::Membership(m.id))
                .collect(),
        }
    }

    pub fn select(&self, entity: EntityType, condition: &Condition) -> Vec<Row> {
        self.rows(entity)
            .into_iter()
            .filter(|row| self.matches(*row, condition))
            .collect()
    }

    pub fn matches(&self, row: Row, condition: &Condition) -> bool {
        match condition {
            Condition::True => true,
            Condition::False => false,
            Condition::IntIn {
                column,
                values,
                or_null,
            } => match self.row_card(row) {
                Some(card) => match column.value(card) {
                    Some(v) => values.contains(&v),
                    None => *or_null,
                },
                None => false,
            },
            Condition::CostTypeIn { values, or_null } => match self.row_card(row) {
                Some(card) => match card.cost_type {
                    Some(ct) => values.contains(&ct),
                    None => *or_null,
                },
                None => false,
            },
            Condition::Like { column, pattern } => self
                .text_value(row, *column)
                .is_some_and(|text| pattern.is_match(text)),
            Condition::Join { relation, ids } => match (self.row_card(row), self.relation(*relation)) {
                (Some(card), Some(table)) => table.forward(card.id).any(|t| ids.contains(&t)),
                _ => false,
            },
            Condition::CardIn(ids) => self.row_card(row).is_some_and(|c| ids.contains(&c.id)),
            Condition::PhysicalIn(ids) => self
                .row_physical(row)
                .is_some_and(|pc| ids.contains(&pc.id)),
            Condition::ExpansionIn(expansions) => self
                .row_physical(row)
                .is_some_and(|pc| expansions.contains(&pc.expansion)),
            Condition::CardSetIn(ids) => self
                .row_card_set(row)
                .is_some_and(|cs| ids.contains(&cs.id)),
            Condition::ParentIn(ids) => match row {
                Row::CardSet(id) => self
                    .card_set(id)
                    .and_then(|cs| cs.parent)
                    .is_some_and(|p| ids.contains(&p)),
                _ => false,
            },
            Condition::And(parts) => parts.iter().all(|c| self.matches(row, c)),
            Condition::Or(parts) => parts.iter().any(|c| self.matches(row, c)),
            Condition::Not(inner) => !self.matches(row, inner),
        }
    }

    fn text_value(&self, row: Row, column: TextColumn) -> Option<&str> {
        match column {
            TextColumn::CardName => self.row_card(row).map(|c| c.name.as_str()),
            TextColumn::CardText => self.row_card(row).map(|c| c.text.as_str()),
            TextColumn::SearchText => self.row_card(row).map(|c| c.search_text.as_str()),
            TextColumn::CardSetName => self.row_card_set(row).map(|cs| cs.name.as_str()),
            TextColumn::CardSetAuthor => self.row_card_set(row).map(|cs| cs.author.as_str()),
            TextColumn::CardSetComment => self.row_card_set(row).map(|cs| cs.comment.as_str()),
            TextColumn::CardSetAnnotations => {
                self.row_card_set(row).map(|cs| cs.annotations.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards() {
        let pattern = LikePattern::new("%bl_ed%").unwrap();
        assert!(pattern.is_match("+1 BLEED"));
        assert!(pattern.is_match("bleed"));
        assert!(!pattern.is_match("bled"));
        assert!(!pattern.is_match("bd"));
    }

    #[test]
    fn like_escapes_regex_syntax() {
        let pattern = LikePattern::contains("(D) bleed").unwrap();
        assert!(pattern.is_match("+1 stealth (D) bleed at +1 bleed"));
        assert!(!pattern.is_match("D bleed"));
    }

    #[test]
    fn like_is_anchored() {
        let pattern = LikePattern::new("abbot").unwrap();
        assert!(pattern.is_match("Abbot"));
        assert!(!pattern.is_match("The Abbot"));
    }
}
