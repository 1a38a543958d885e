//! Card roles ("untap reactions", "stealth action modifiers", ...) expressed
//! as combinations of card type and card text filters.

use super::Filter;
use crate::error::{Result, SutekhError};
use crate::schema::Database;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardFunction {
    Stealth,
    Intercept,
    Untap,
    Bounce,
    EnterCombat,
    BleedModifier,
    BleedAction,
    BleedReduction,
}

impl CardFunction {
    pub const ALL: [CardFunction; 8] = [
        CardFunction::Stealth,
        CardFunction::Intercept,
        CardFunction::Untap,
        CardFunction::Bounce,
        CardFunction::EnterCombat,
        CardFunction::BleedModifier,
        CardFunction::BleedAction,
        CardFunction::BleedReduction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CardFunction::Stealth => "Stealth action modifiers",
            CardFunction::Intercept => "Intercept reactions",
            CardFunction::Untap => "Untap reactions (Wake)",
            CardFunction::Bounce => "Bleed redirection reactions (Bounce)",
            CardFunction::EnterCombat => "Enter combat actions (Rush)",
            CardFunction::BleedModifier => "Increased bleed action modifiers",
            CardFunction::BleedAction => "Increased bleed actions",
            CardFunction::BleedReduction => "Bleed reduction reactions",
        }
    }

    /// Labels in alphabetical order, as offered to users.
    pub fn labels() -> Vec<&'static str> {
        let mut labels: Vec<_> = Self::ALL.iter().map(CardFunction::label).collect();
        labels.sort_unstable();
        labels
    }

    fn build(&self, db: &Database) -> Result<Filter> {
        let text_any = |patterns: &[&str]| {
            Filter::or(patterns.iter().map(|p| Filter::card_text(p)).collect())
        };
        Ok(match self {
            CardFunction::Stealth => Filter::and(vec![
                Filter::card_type(db, "Action Modifier")?,
                Filter::card_text("+_ stealth"),
            ]),
            CardFunction::Intercept => Filter::and(vec![
                Filter::card_type(db, "Reaction")?,
                Filter::card_text("+_ intercept"),
            ]),
            CardFunction::Untap => Filter::and(vec![
                Filter::card_type(db, "Reaction")?,
                text_any(&[
                    "this vampire untaps",
                    "this reacting vampire untaps",
                    "untap this vampire",
                    "untap this reacting vampire",
                    "as though untapped",
                ]),
            ]),
            CardFunction::Bounce => Filter::and(vec![
                Filter::card_type(db, "Reaction")?,
                Filter::card_text("is now bleeding"),
            ]),
            CardFunction::EnterCombat => Filter::and(vec![
                Filter::card_type(db, "Action")?,
                Filter::card_text("(D) Enter combat"),
            ]),
            CardFunction::BleedModifier => Filter::and(vec![
                Filter::card_type(db, "Action Modifier")?,
                Filter::card_text("+_ bleed"),
            ]),
            CardFunction::BleedAction => Filter::and(vec![
                Filter::card_type(db, "Action")?,
                text_any(&["(D) bleed%at +_ bleed", "(D) bleed%with +_ bleed"]),
            ]),
            // Wording puts "bleed" and "reduce" in either order
            CardFunction::BleedReduction => Filter::and(vec![
                Filter::card_type(db, "Reaction")?,
                Filter::card_text("bleed"),
                Filter::card_text("reduce"),
            ]),
        })
    }
}

impl fmt::Display for CardFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CardFunction {
    type Err = SutekhError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|func| func.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SutekhError::InvalidFilterValue {
                filter: "CardFunction".to_string(),
                value: s.to_string(),
            })
    }
}

impl Filter {
    /// Cards filling any of the given roles.
    ///
    /// Fails if a card type the role depends on is missing from the catalog.
    pub fn card_function(db: &Database, functions: &[CardFunction]) -> Result<Filter> {
        let parts = functions
            .iter()
            .map(|func| func.build(db))
            .collect::<Result<Vec<_>>>()?;
        Ok(Filter::CardFunction {
            functions: functions.iter().copied().collect(),
            composed: Box::new(Filter::or(parts)),
        })
    }
}
