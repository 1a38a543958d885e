//! # Card Name Lookup
//!
//! Import sources hand over card names as typed by people: wrong case,
//! articles moved to the end, missing accents. A [`CardLookup`] turns such a
//! name into a catalog card, or gives up.
//!
//! - [`SimpleLookup`]: exact canonical match, then the article-reordered
//!   forms ("Abbot, The" / "The Abbot").
//! - [`BestGuessLookup`]: [`SimpleLookup`], then the best-guess name pattern,
//!   accepted only when it selects exactly one legal card.
//! - [`PromptLookup`]: [`SimpleLookup`], then a caller-supplied chooser that
//!   sees the best-guess candidates (possibly none) and picks one.
//!
//! Results are memoised per import by [`LookupCache`](crate::cache::LookupCache).

use crate::filters::best_guess_filter;
use crate::model::{CardId, LookupId, LookupKind};
use crate::schema::Database;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait CardLookup {
    fn lookup_card(&mut self, db: &Database, name: &str) -> Option<CardId>;

    /// Expansion names only resolve exactly (or through their alias).
    fn lookup_expansion(&mut self, db: &Database, name: &str) -> Option<LookupId> {
        db.find_lookup(LookupKind::Expansion, name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleLookup;

impl CardLookup for SimpleLookup {
    fn lookup_card(&mut self, db: &Database, name: &str) -> Option<CardId> {
        db.find_card(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BestGuessLookup;

/// Legal cards matching the best-guess pattern for `name`.
pub fn guess_candidates(db: &Database, name: &str) -> Vec<CardId> {
    best_guess_filter(db, name)
        .select_cards(db)
        .unwrap_or_default()
}

impl CardLookup for BestGuessLookup {
    fn lookup_card(&mut self, db: &Database, name: &str) -> Option<CardId> {
        if let Some(id) = db.find_card(name) {
            return Some(id);
        }
        match guess_candidates(db, name).as_slice() {
            [only] => {
                tracing::debug!(name, card = %db.card_name(*only), "best guess");
                Some(*only)
            }
            [] => None,
            many => {
                tracing::debug!(name, candidates = many.len(), "ambiguous best guess");
                None
            }
        }
    }
}

/// Falls back to `choose(name, candidates)` when the name is not exact.
pub struct PromptLookup<F>
where
    F: FnMut(&str, &[CardId]) -> Option<CardId>,
{
    choose: F,
}

impl<F> PromptLookup<F>
where
    F: FnMut(&str, &[CardId]) -> Option<CardId>,
{
    pub fn new(choose: F) -> Self {
        Self { choose }
    }
}

impl<F> CardLookup for PromptLookup<F>
where
    F: FnMut(&str, &[CardId]) -> Option<CardId>,
{
    fn lookup_card(&mut self, db: &Database, name: &str) -> Option<CardId> {
        if let Some(id) = db.find_card(name) {
            return Some(id);
        }
        let candidates = guess_candidates(db, name);
        (self.choose)(name, &candidates)
    }
}

/// Configured lookup strategy for non-interactive callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupMode {
    Exact,
    #[default]
    BestGuess,
}

impl LookupMode {
    pub fn strategy(self) -> Box<dyn CardLookup> {
        match self {
            LookupMode::Exact => Box::new(SimpleLookup),
            LookupMode::BestGuess => Box::new(BestGuessLookup),
        }
    }
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::Exact => f.write_str("exact"),
            LookupMode::BestGuess => f.write_str("best-guess"),
        }
    }
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(LookupMode::Exact),
            "best-guess" | "best_guess" | "guess" => Ok(LookupMode::BestGuess),
            other => Err(format!("unknown lookup mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::CardRecord;

    fn catalog() -> Database {
        let mut db = Database::new();
        for name in ["The Ankara Citadel, Turkey", "Rötschreck", "Dominate", "Dominate Kine"] {
            db.add_card(&CardRecord::new(name)).unwrap();
        }
        db.add_lookup(LookupKind::Expansion, "Lords of the Night", Some("LotN"));
        db
    }

    #[test]
    fn simple_lookup_handles_case_and_articles() {
        let db = catalog();
        let mut lookup = SimpleLookup;
        assert!(lookup.lookup_card(&db, "the ankara citadel, turkey").is_some());
        assert!(lookup.lookup_card(&db, "Ankara Citadel, Turkey, The").is_some());
        assert!(lookup.lookup_card(&db, "Rotschreck").is_none());
    }

    #[test]
    fn best_guess_accepts_unique_matches_only() {
        let db = catalog();
        let mut lookup = BestGuessLookup;
        assert_eq!(
            lookup.lookup_card(&db, "Rotschreck"),
            db.find_card("Rötschreck")
        );
        // "d_m_n" matches both Dominate and Dominate Kine
        assert_eq!(lookup.lookup_card(&db, "Domin"), None);
        assert_eq!(lookup.lookup_card(&db, "Unknown Card"), None);
    }

    #[test]
    fn prompt_lookup_sees_candidates() {
        let db = catalog();
        let mut asked = Vec::new();
        let mut lookup = PromptLookup::new(|name: &str, candidates: &[CardId]| {
            asked.push((name.to_string(), candidates.len()));
            candidates.last().copied()
        });
        let picked = lookup.lookup_card(&db, "Domin");
        assert_eq!(picked, db.find_card("Dominate Kine"));
        assert!(lookup.lookup_card(&db, "Dominate").is_some());
        drop(lookup);
        assert_eq!(asked, vec![("Domin".to_string(), 2)]);
    }

    #[test]
    fn expansions_resolve_through_alias() {
        let db = catalog();
        let mut lookup = SimpleLookup;
        let lotn = db.find_lookup(LookupKind::Expansion, "Lords of the Night");
        assert_eq!(lookup.lookup_expansion(&db, "LotN"), lotn);
        assert_eq!(lookup.lookup_expansion(&db, "Jyhad"), None);
    }

    #[test]
    fn lookup_mode_parses() {
        assert_eq!("exact".parse::<LookupMode>().unwrap(), LookupMode::Exact);
        assert_eq!("Best-Guess".parse::<LookupMode>().unwrap(), LookupMode::BestGuess);
        assert!("fuzzy".parse::<LookupMode>().is_err());
        assert_eq!(LookupMode::default().to_string(), "best-guess");
    }
}
