//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for sutekh operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Resolves names**: card set, card and expansion names become ids here,
//!   so commands only ever see ids
//! - **Owns the lookup state**: the configured [`CardLookup`] strategy and the
//!   [`LookupCache`], which is invalidated when the catalog is refreshed
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types** (`Result<CmdResult>` or plain data)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O operations**: No stdout, stderr, or file reading
//! - **Presentation concerns**: Returns data structures, not strings
//!
//! ## Filter Expressions
//!
//! [`SutekhApi::parse_filter`] reads the compact form used on command lines:
//!
//! - `Keyword=value` or `Keyword=value1|value2` (any of the values)
//! - `Keyword` alone for flag filters such as `SetsInUse`
//! - a leading `!` negates the filter: `!Clan=Toreador`
//!
//! Several expressions passed to [`SutekhApi::filter_cards`] are combined with
//! AND.
//!
//! ## Generic Over DataStore
//!
//! `SutekhApi<S: DataStore>` is generic over the storage backend:
//! - Production: `SutekhApi<FileStore>`
//! - Testing: `SutekhApi<InMemoryStore>`

use crate::cache::LookupCache;
use crate::commands::{self, CmdResult};
use crate::error::{Result, SutekhError};
use crate::filters::{spec, Filter};
use crate::grouping::{self, Grouping};
use crate::holder::CardSetHolder;
use crate::lookup::{CardLookup, LookupMode};
use crate::model::{CardId, CardSetId, LookupId, NewCardSet};
use crate::schema::catalog::CatalogFile;
use crate::schema::Database;
use crate::store::DataStore;
use crate::tabulator::{self, Tabulator};
use std::collections::BTreeMap;

/// Metadata for a new card set, by name.
#[derive(Debug, Clone, Default)]
pub struct CardSetSpec {
    pub name: String,
    pub parent: Option<String>,
    pub author: String,
    pub comment: String,
}

impl CardSetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The main API facade for sutekh operations.
pub struct SutekhApi<S: DataStore> {
    store: S,
    lookup: Box<dyn CardLookup>,
    cache: LookupCache,
}

impl<S: DataStore> SutekhApi<S> {
    pub fn new(store: S) -> Self {
        Self::with_lookup(store, LookupMode::default())
    }

    pub fn with_lookup(store: S, mode: LookupMode) -> Self {
        Self {
            store,
            lookup: mode.strategy(),
            cache: LookupCache::new(),
        }
    }

    /// Replaces the lookup strategy, e.g. with an interactive chooser.
    pub fn set_lookup(&mut self, lookup: Box<dyn CardLookup>) {
        self.lookup = lookup;
        self.cache.invalidate();
    }

    pub fn db(&self) -> &Database {
        self.store.db()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    // --- Name resolution ---

    pub fn card_set_id(&self, name: &str) -> Result<CardSetId> {
        self.db().resolve_card_set(name)
    }

    fn optional_card_set(&self, name: Option<&str>) -> Result<Option<CardSetId>> {
        name.map(|n| self.card_set_id(n)).transpose()
    }

    /// Resolves a card name through the configured lookup and the cache.
    pub fn card_id(&mut self, name: &str) -> Result<CardId> {
        self.cache
            .resolve_card(self.store.db(), self.lookup.as_mut(), name)
            .ok_or_else(|| SutekhError::not_found("Card", name))
    }

    fn expansion_id(&mut self, name: Option<&str>) -> Result<Option<LookupId>> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.cache
            .resolve_expansion(self.store.db(), self.lookup.as_mut(), name)
            .map(Some)
            .ok_or_else(|| SutekhError::not_found("Expansion", name))
    }

    // --- Card sets ---

    pub fn create_card_set(&mut self, spec: CardSetSpec) -> Result<CmdResult> {
        let parent = self.optional_card_set(spec.parent.as_deref())?;
        let new = NewCardSet::new(spec.name)
            .with_parent(parent)
            .with_author(spec.author)
            .with_comment(spec.comment);
        commands::create::run(&mut self.store, new)
    }

    pub fn update_card_set(
        &mut self,
        name: &str,
        update: commands::update::CardSetUpdate,
    ) -> Result<CmdResult> {
        let id = self.card_set_id(name)?;
        commands::update::run(&mut self.store, id, update)
    }

    pub fn add_cards(
        &mut self,
        card_set: &str,
        card: &str,
        expansion: Option<&str>,
        count: u32,
    ) -> Result<CmdResult> {
        let set = self.card_set_id(card_set)?;
        let card = self.card_id(card)?;
        let expansion = self.expansion_id(expansion)?;
        commands::update::add_cards(&mut self.store, set, card, expansion, count)
    }

    pub fn remove_cards(
        &mut self,
        card_set: &str,
        card: &str,
        expansion: Option<&str>,
        count: u32,
    ) -> Result<CmdResult> {
        let set = self.card_set_id(card_set)?;
        let card = self.card_id(card)?;
        let expansion = self.expansion_id(expansion)?;
        commands::update::remove_cards(&mut self.store, set, card, expansion, count)
    }

    pub fn reparent(&mut self, card_set: &str, parent: Option<&str>) -> Result<CmdResult> {
        let id = self.card_set_id(card_set)?;
        let parent = self.optional_card_set(parent)?;
        commands::reparent::run(&mut self.store, id, parent)
    }

    pub fn reparent_children(&mut self, from: &str, to: Option<&str>) -> Result<CmdResult> {
        let from = self.card_set_id(from)?;
        let to = self.optional_card_set(to)?;
        commands::reparent::reparent_all_children(&mut self.store, from, to)
    }

    pub fn check_delete(&self, card_set: &str) -> Result<commands::delete::DeleteCheck> {
        commands::delete::check_ok_to_delete(self.db(), self.card_set_id(card_set)?)
    }

    pub fn delete_card_set(&mut self, card_set: &str) -> Result<CmdResult> {
        let id = self.card_set_id(card_set)?;
        commands::delete::run(&mut self.store, id)
    }

    pub fn repair_loops(&mut self) -> Result<CmdResult> {
        commands::repair::run(&mut self.store)
    }

    pub fn card_set_tree(&self) -> Vec<commands::list::TreeEntry> {
        commands::list::card_set_tree(self.db())
    }

    pub fn card_set_contents(&self, card_set: &str) -> Result<Vec<commands::list::CardLine>> {
        let id = self.card_set_id(card_set)?;
        Ok(commands::list::card_set_contents(self.db(), id))
    }

    pub fn card_set_names(&self) -> BTreeMap<CardSetId, String> {
        commands::catalog::card_set_names(self.db())
    }

    pub fn check_independence(
        &self,
        parent: &str,
        children: &[&str],
    ) -> Result<commands::independence::IndependenceReport> {
        let parent = self.card_set_id(parent)?;
        let children = children
            .iter()
            .map(|name| self.card_set_id(name))
            .collect::<Result<Vec<_>>>()?;
        commands::independence::check(self.db(), parent, &children)
    }

    // --- Imports ---

    pub fn import_holder(
        &mut self,
        holder: &mut CardSetHolder,
        policy: commands::import::ImportPolicy,
    ) -> Result<CmdResult> {
        commands::import::run(
            &mut self.store,
            holder,
            self.lookup.as_mut(),
            &mut self.cache,
            policy,
        )
    }

    /// Imports a plain text deck list. `name` and `parent` override what the
    /// list itself declares.
    pub fn import_deck_list(
        &mut self,
        text: &str,
        name: Option<&str>,
        parent: Option<&str>,
        policy: commands::import::ImportPolicy,
    ) -> Result<CmdResult> {
        let mut holder = commands::import::parse_deck_list(text)?;
        if let Some(name) = name {
            holder.set_name(name);
        }
        if parent.is_some() {
            holder.set_parent(parent.map(str::to_string));
        }
        self.import_holder(&mut holder, policy)
    }

    pub fn refresh_catalog(&mut self, catalog: &CatalogFile) -> Result<CmdResult> {
        commands::catalog::refresh(&mut self.store, catalog, &mut self.cache)
    }

    // --- Filters ---

    /// Parses one filter expression, see the module docs for the syntax.
    pub fn parse_filter(&self, expr: &str) -> Result<Filter> {
        let expr = expr.trim();
        let (negated, expr) = match expr.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, expr),
        };
        let (keyword, values) = match expr.split_once('=') {
            Some((keyword, values)) => (
                keyword.trim(),
                values
                    .split('|')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>(),
            ),
            None => (expr, Vec::new()),
        };
        if keyword.is_empty() {
            return Err(SutekhError::InvalidRequest(format!(
                "filter expression '{}' has no keyword",
                expr
            )));
        }
        let filter = spec::build_filter(self.db(), keyword, &values)?;
        Ok(if negated { filter.negate() } else { filter })
    }

    /// All expressions ANDed together; no expressions selects everything.
    pub fn combined_filter<E: AsRef<str>>(&self, exprs: &[E]) -> Result<Filter> {
        let filters = exprs
            .iter()
            .map(|e| self.parse_filter(e.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(match filters.len() {
            1 => filters.into_iter().next().unwrap_or(Filter::Null),
            _ => Filter::and(filters),
        })
    }

    pub fn filter_cards<E: AsRef<str>>(&self, exprs: &[E]) -> Result<Vec<CardId>> {
        self.combined_filter(exprs)?.select_cards(self.db())
    }

    pub fn filter_values(&self, keyword: &str) -> Result<Vec<String>> {
        let spec =
            spec::get_spec(keyword).ok_or_else(|| SutekhError::not_found("Filter", keyword))?;
        Ok(spec.values(self.db()))
    }

    pub fn card_set_from_filter<E: AsRef<str>>(
        &mut self,
        exprs: &[E],
        spec: CardSetSpec,
    ) -> Result<CmdResult> {
        let filter = self.combined_filter(exprs)?;
        let parent = self.optional_card_set(spec.parent.as_deref())?;
        let new = NewCardSet::new(spec.name)
            .with_parent(parent)
            .with_author(spec.author)
            .with_comment(spec.comment);
        commands::from_filter::run(&mut self.store, &filter, new)
    }

    // --- Card lists ---

    /// Column names and one row per card.
    pub fn tabulate<C: AsRef<str>>(
        &self,
        cards: &[CardId],
        columns: &[C],
    ) -> Result<(Vec<String>, Vec<Vec<i32>>)> {
        let props = tabulator::default_prop_funcs(self.db());
        let tab = Tabulator::new(columns, &props)?;
        Ok((tab.columns().to_vec(), tab.tabulate(self.db(), cards)))
    }

    /// Column names the default tabulator knows about.
    pub fn tabulator_columns(&self) -> Vec<String> {
        tabulator::default_prop_funcs(self.db()).into_keys().collect()
    }

    pub fn group_cards(
        &self,
        cards: &[CardId],
        grouping: Grouping,
    ) -> Vec<(Option<String>, Vec<CardId>)> {
        grouping::group_cards(self.db(), cards, grouping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::import::ImportPolicy;
    use crate::store::InMemoryStore;
    use crate::test_utils::fixture_catalog;

    fn api() -> SutekhApi<InMemoryStore> {
        let db = Database::from_catalog(&fixture_catalog()).unwrap();
        SutekhApi::new(InMemoryStore::from_database(db))
    }

    #[test]
    fn names_are_resolved_before_dispatch() {
        let mut api = api();
        api.create_card_set(CardSetSpec::new("Collection")).unwrap();
        let mut deck = CardSetSpec::new("Deck");
        deck.parent = Some("Collection".into());
        api.create_card_set(deck).unwrap();

        api.add_cards("Deck", "anson", Some("Jyhad"), 2).unwrap();
        assert_eq!(api.card_set_contents("Deck").unwrap()[0].count, 2);

        assert!(api.card_set_id("Nope").is_err());
        assert!(api.add_cards("Deck", "No such card", None, 1).is_err());
        assert!(api.add_cards("Deck", "Anson", Some("Nope"), 1).is_err());
    }

    #[test]
    fn filter_expressions() {
        let api = api();
        let toreador = api.filter_cards(&["Clan=Toreador"]).unwrap();
        let not_toreador = api.filter_cards(&["!Clan=Toreador"]).unwrap();
        assert_eq!(toreador.len() + not_toreador.len(), api.db().cards().len());

        let both = api
            .filter_cards(&["CardType=Vampire", "Clan=Toreador|Ventrue"])
            .unwrap();
        assert!(!both.is_empty());
        assert_eq!(api.filter_cards::<&str>(&[]).unwrap().len(), api.db().cards().len());

        assert!(api.parse_filter("=Toreador").is_err());
        assert!(api.parse_filter("Colour=Red").unwrap_err().is_not_found());
    }

    #[test]
    fn deck_list_import_uses_lookup() {
        let mut api = api();
        let result = api
            .import_deck_list("Deck Name: Test\n2x Anson\n1 Rotschreck\n", None, None, ImportPolicy::Fail)
            .unwrap();
        assert!(!result.has_warnings());
        assert_eq!(api.db().card_count(api.card_set_id("Test").unwrap()), 3);

        let renamed = api
            .import_deck_list("1 Anson", Some("Test"), None, ImportPolicy::Rename)
            .unwrap();
        assert_eq!(renamed.affected_card_sets[0].name, "Test (1)");
    }

    #[test]
    fn tabulate_rejects_unknown_columns() {
        let api = api();
        let cards = api.filter_cards(&["CardType=Vampire"]).unwrap();
        let (columns, rows) = api.tabulate(&cards, &["group", "capacity"]).unwrap();
        assert_eq!(columns, vec!["group", "capacity"]);
        assert_eq!(rows.len(), cards.len());
        assert!(api.tabulate(&cards, &["shoe size"]).is_err());
        assert!(api.tabulator_columns().contains(&"clan: Toreador".to_string()));
    }
}
