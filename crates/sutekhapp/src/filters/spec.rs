//! Filter specifications and registry.
//!
//! This is the user-facing side of the filter algebra: which keywords exist,
//! what they select, which values they accept and how a list of strings typed
//! by a user becomes a [`Filter`].
//!
//! Legal values are computed from the live catalog on every call, so numeric
//! ranges (group, capacity, cost, life) follow the data after a reload.

use super::{CardCount, CardFunction, CostValue, EntitySet, Filter, Resolution};
use crate::error::{Result, SutekhError};
use crate::model::{AbstractCard, CostType, DisciplineLevel, LookupKind, GROUP_ANY};
use crate::schema::{Database, Relation};

/// Value accepted by the cost and cost type filters for "no cost".
pub const NO_COST: &str = "None";
/// Value accepted by the physical expansion filter for "unknown expansion".
pub const NO_EXPANSION: &str = "No Expansion";
/// Upper bound of the explicit card set count buckets.
pub const MAX_COUNT_BUCKET: u32 = 30;

/// How a filter takes its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A list of values from `values()`.
    List,
    /// A list of `"<a> with <b>"` values.
    WithList,
    /// Free text, `%` and `_` act as wildcards.
    Text,
    /// No value.
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    CardType,
    CostType,
    Clan,
    Discipline,
    Group,
    Capacity,
    Cost,
    Life,
    Creed,
    Virtue,
    CardText,
    CardName,
    Sect,
    Title,
    ExpansionRarity,
    DisciplineLevel,
    PhysicalExpansion,
    CardSetName,
    CardSetAuthor,
    CardSetDescription,
    CardSetAnnotations,
    PhysicalCardSet,
    PhysicalCardSetInUse,
    CardSetCardCount,
    CardSetInUse,
    CardFunction,
    ParentCardSet,
    Artist,
    Keyword,
}

/// Specification for one user-facing filter.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    /// The keyword used on the command line (e.g. "Clan", "CardText")
    pub keyword: &'static str,
    pub kind: FilterKind,
    pub input: InputKind,
    /// Entity types the built filter can select
    pub types: EntitySet,
    /// Short label
    pub description: &'static str,
    /// What values mean and what is returned
    pub help: &'static str,
}

impl FilterSpec {
    const fn new(
        keyword: &'static str,
        kind: FilterKind,
        input: InputKind,
        types: EntitySet,
        description: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            keyword,
            kind,
            input,
            types,
            description,
            help,
        }
    }
}

/// Registry of all user-facing filters.
pub const FILTERS: &[FilterSpec] = &[
    FilterSpec::new("CardType", FilterKind::CardType, InputKind::List, EntitySet::CARDS,
        "Card Type", "a list of card types.\nReturns all cards of the given types."),
    FilterSpec::new("CostType", FilterKind::CostType, InputKind::List, EntitySet::CARDS,
        "Cost Type", "a list of cost types.\nReturns cards requiring the selected cost types. \"None\" adds cards with no cost."),
    FilterSpec::new("Clan", FilterKind::Clan, InputKind::List, EntitySet::CARDS,
        "Clan", "a list of clans.\nReturns all cards which require or are of the specified clans."),
    FilterSpec::new("Discipline", FilterKind::Discipline, InputKind::List, EntitySet::CARDS,
        "Discipline", "a list of disciplines.\nReturns all cards which require or have the specified disciplines."),
    FilterSpec::new("Group", FilterKind::Group, InputKind::List, EntitySet::CARDS,
        "Group", "a list of groups.\nReturns all cards belonging to the listed groups. \"Any\" selects cards for any group."),
    FilterSpec::new("Capacity", FilterKind::Capacity, InputKind::List, EntitySet::CARDS,
        "Capacity", "a list of capacities.\nReturns all cards of the selected capacities."),
    FilterSpec::new("Cost", FilterKind::Cost, InputKind::List, EntitySet::CARDS,
        "Cost", "a list of costs.\nReturns all cards with the given costs. \"X\" selects variable costs, \"None\" cards with no cost."),
    FilterSpec::new("Life", FilterKind::Life, InputKind::List, EntitySet::CARDS,
        "Life", "a list of life values.\nReturns allies and retainers with the selected base life."),
    FilterSpec::new("Creed", FilterKind::Creed, InputKind::List, EntitySet::CARDS,
        "Creed", "a list of creeds.\nReturns all cards requiring or of the specified creeds."),
    FilterSpec::new("Virtue", FilterKind::Virtue, InputKind::List, EntitySet::CARDS,
        "Virtue", "a list of virtues.\nReturns all cards requiring or having the specified virtues."),
    FilterSpec::new("CardText", FilterKind::CardText, InputKind::Text, EntitySet::CARDS,
        "Card Text", "the card text to search for (% can be used as a wildcard).\nReturns all cards whose text contains this string."),
    FilterSpec::new("CardName", FilterKind::CardName, InputKind::Text, EntitySet::CARDS,
        "Card Name", "the text to be matched against card names (% can be used as a wildcard).\nReturns all cards whose name contains this string."),
    FilterSpec::new("Sect", FilterKind::Sect, InputKind::List, EntitySet::CARDS,
        "Sect", "a list of sects.\nReturns all cards belonging to the given sects."),
    FilterSpec::new("Title", FilterKind::Title, InputKind::List, EntitySet::CARDS,
        "Title", "a list of titles.\nReturns all cards with the selected titles."),
    FilterSpec::new("Expansion_with_Rarity", FilterKind::ExpansionRarity, InputKind::WithList, EntitySet::CARDS,
        "Expansion with Rarity", "a list of expansions and rarities (each element given as \"<expansion> with <rarity>\").\nReturns all matching cards."),
    FilterSpec::new("Discipline_with_Level", FilterKind::DisciplineLevel, InputKind::WithList, EntitySet::CARDS,
        "Discipline with Level", "a list of disciplines with levels (each element given as \"<discipline> with <inferior|superior>\").\nReturns all matching cards."),
    FilterSpec::new("PhysicalExpansion", FilterKind::PhysicalExpansion, InputKind::List, EntitySet::PHYSICAL,
        "Physical Expansion", "a list of expansions.\nSelects physical cards with the given expansions. \"No Expansion\" selects cards with an unknown expansion."),
    FilterSpec::new("CardSetName", FilterKind::CardSetName, InputKind::Text, EntitySet::CARD_SETS,
        "Card Set Name", "text to match against card set names (% can be used as a wildcard).\nReturns all card sets whose name contains the string."),
    FilterSpec::new("CardSetAuthor", FilterKind::CardSetAuthor, InputKind::Text, EntitySet::CARD_SETS,
        "Card Set Author", "text to match against card set authors (% can be used as a wildcard).\nReturns all card sets whose author includes the string."),
    FilterSpec::new("CardSetDescription", FilterKind::CardSetDescription, InputKind::Text, EntitySet::CARD_SETS,
        "Card Set Description", "text to match against card set descriptions (% can be used as a wildcard).\nReturns all card sets whose description includes the string."),
    FilterSpec::new("CardSetAnnotations", FilterKind::CardSetAnnotations, InputKind::Text, EntitySet::CARD_SETS,
        "Card Set Annotations", "text to match against card set annotations (% can be used as a wildcard).\nReturns all card sets whose annotations include the string."),
    FilterSpec::new("Card_Sets", FilterKind::PhysicalCardSet, InputKind::List, EntitySet::MEMBERSHIP,
        "Card Sets", "a list of card set names.\nSelects the cards in the specified card sets."),
    FilterSpec::new("SetsInUse", FilterKind::PhysicalCardSetInUse, InputKind::Flag, EntitySet::PHYSICAL,
        "In Card Sets in Use", "no value.\nSelects cards in card sets marked as in use."),
    FilterSpec::new("CardCount", FilterKind::CardSetCardCount, InputKind::WithList, EntitySet::CARDS,
        "Card Count", "a list of card counts in card sets (each element given as \"<count> with <card set>\").\nReturns cards whose total count in the card sets is one of the counts."),
    FilterSpec::new("CSSetsInUse", FilterKind::CardSetInUse, InputKind::Flag, EntitySet::CARD_SETS,
        "Card Set Marked as in Use", "no value.\nSelects those card sets which are marked as in use."),
    FilterSpec::new("CardFunction", FilterKind::CardFunction, InputKind::List, EntitySet::CARDS,
        "Card Function", "the chosen function from the list of supported types.\nFunctions include roles such as untap or bleed modifier.\nReturns all cards matching the given functions."),
    FilterSpec::new("ParentCardSet", FilterKind::ParentCardSet, InputKind::List, EntitySet::CARD_SETS,
        "Parent Card Set", "a list of card sets.\nSelects card sets with the specified card sets as parent."),
    FilterSpec::new("Artist", FilterKind::Artist, InputKind::List, EntitySet::CARDS,
        "Artist", "a list of artists.\nReturns all cards where one or more of the specified artists has created art for the card."),
    FilterSpec::new("Keyword", FilterKind::Keyword, InputKind::List, EntitySet::CARDS,
        "Keyword", "a list of keywords.\nReturns all cards with the given keywords."),
];

/// Look up a filter spec by keyword (case-insensitive).
pub fn get_spec(keyword: &str) -> Option<&'static FilterSpec> {
    FILTERS
        .iter()
        .find(|spec| spec.keyword.eq_ignore_ascii_case(keyword))
}

/// Builds the filter named by `keyword` from user-entered values.
pub fn build_filter<S: AsRef<str>>(db: &Database, keyword: &str, values: &[S]) -> Result<Filter> {
    let spec = get_spec(keyword).ok_or_else(|| SutekhError::not_found("Filter", keyword))?;
    let values: Vec<&str> = values.iter().map(|v| v.as_ref().trim()).collect();
    spec.build(db, &values)
}

fn invalid(spec: &FilterSpec, value: &str) -> SutekhError {
    SutekhError::InvalidFilterValue {
        filter: spec.keyword.to_string(),
        value: value.to_string(),
    }
}

fn max_of(db: &Database, column: fn(&AbstractCard) -> Option<i32>) -> i32 {
    db.cards().iter().filter_map(column).max().unwrap_or(0)
}

fn range(from: i32, to: i32) -> Vec<String> {
    (from..=to).map(|v| v.to_string()).collect()
}

fn sorted_names(db: &Database, kind: LookupKind) -> Vec<String> {
    let mut names: Vec<String> = db
        .lookup_entries(kind)
        .iter()
        .map(|e| e.name.clone())
        .collect();
    names.sort_by_key(|n| n.to_lowercase());
    names
}

fn card_set_names(db: &Database) -> Vec<String> {
    let mut names: Vec<String> = db.card_sets().iter().map(|cs| cs.name.clone()).collect();
    names.sort();
    names
}

fn text_value(values: &[&str]) -> String {
    values.join(" ")
}

impl FilterSpec {
    fn relation(&self) -> Option<Relation> {
        match self.kind {
            FilterKind::CardType => Some(Relation::CardType),
            FilterKind::Clan => Some(Relation::Clan),
            FilterKind::Discipline => Some(Relation::Discipline),
            FilterKind::Creed => Some(Relation::Creed),
            FilterKind::Virtue => Some(Relation::Virtue),
            FilterKind::Sect => Some(Relation::Sect),
            FilterKind::Title => Some(Relation::Title),
            FilterKind::Artist => Some(Relation::Artist),
            FilterKind::Keyword => Some(Relation::Keyword),
            _ => None,
        }
    }

    /// Legal values for this filter given the current catalog.
    pub fn values(&self, db: &Database) -> Vec<String> {
        match self.kind {
            FilterKind::Discipline => sorted_names(db, LookupKind::Discipline),
            FilterKind::Group => {
                let mut values = range(1, max_of(db, |c| c.group));
                values.push("Any".to_string());
                values
            }
            FilterKind::Capacity => range(1, max_of(db, |c| c.capacity)),
            FilterKind::Life => range(1, max_of(db, |c| c.life)),
            FilterKind::Cost => {
                let mut values = range(0, max_of(db, |c| c.cost));
                values.push("X".to_string());
                values.push(NO_COST.to_string());
                values
            }
            FilterKind::CostType => {
                let mut values: Vec<String> =
                    CostType::ALL.iter().map(|c| c.to_string()).collect();
                values.push(NO_COST.to_string());
                values
            }
            FilterKind::DisciplineLevel => {
                let mut values = Vec::new();
                for disc in sorted_names(db, LookupKind::Discipline) {
                    let Some(id) = db.find_lookup(LookupKind::Discipline, &disc) else {
                        continue;
                    };
                    for level in DisciplineLevel::ALL {
                        if db.find_discipline_pair(id, level).is_some() {
                            values.push(format!("{} with {}", disc, level));
                        }
                    }
                }
                values
            }
            FilterKind::ExpansionRarity => {
                let mut values: Vec<String> = db
                    .rarity_pairs()
                    .iter()
                    .filter_map(|p| {
                        let exp = db.lookup_name(LookupKind::Expansion, p.expansion)?;
                        let rarity = db.lookup_name(LookupKind::Rarity, p.rarity)?;
                        Some(format!("{} with {}", exp, rarity))
                    })
                    .collect();
                values.sort();
                values
            }
            FilterKind::PhysicalExpansion => {
                let mut values = sorted_names(db, LookupKind::Expansion);
                values.insert(0, NO_EXPANSION.to_string());
                values
            }
            FilterKind::PhysicalCardSet | FilterKind::ParentCardSet => card_set_names(db),
            FilterKind::CardSetCardCount => {
                let mut values: Vec<String> = (0..=MAX_COUNT_BUCKET).map(|n| n.to_string()).collect();
                values.push(format!(">{}", MAX_COUNT_BUCKET));
                values
            }
            FilterKind::CardFunction => CardFunction::labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            FilterKind::CardText
            | FilterKind::CardName
            | FilterKind::CardSetName
            | FilterKind::CardSetAuthor
            | FilterKind::CardSetDescription
            | FilterKind::CardSetAnnotations
            | FilterKind::PhysicalCardSetInUse
            | FilterKind::CardSetInUse => Vec::new(),
            _ => match self.relation().and_then(|r| r.lookup_kind()) {
                Some(kind) => sorted_names(db, kind),
                None => Vec::new(),
            },
        }
    }

    /// Builds a filter from user-entered values. Unknown names are errors.
    pub fn build(&self, db: &Database, values: &[&str]) -> Result<Filter> {
        if let Some(relation) = self.relation() {
            return Filter::lookup(db, relation, values, Resolution::Strict);
        }
        match self.kind {
            FilterKind::Group => {
                let groups = values
                    .iter()
                    .map(|v| {
                        if v.eq_ignore_ascii_case("any") {
                            Ok(GROUP_ANY)
                        } else {
                            v.parse::<i32>().map_err(|_| invalid(self, v))
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Filter::multi_group(&groups))
            }
            FilterKind::Capacity => Ok(Filter::multi_capacity(&self.parse_ints(values)?)),
            FilterKind::Life => Ok(Filter::multi_life(&self.parse_ints(values)?)),
            FilterKind::Cost => {
                let mut costs = Vec::new();
                let mut include_null = false;
                for v in values {
                    if v.eq_ignore_ascii_case("x") {
                        costs.push(CostValue::X);
                    } else if v.eq_ignore_ascii_case(NO_COST) {
                        include_null = true;
                    } else {
                        costs.push(CostValue::Fixed(v.parse().map_err(|_| invalid(self, v))?));
                    }
                }
                Ok(Filter::multi_cost(&costs, include_null))
            }
            FilterKind::CostType => {
                let mut cost_types = Vec::new();
                let mut include_null = false;
                for v in values {
                    if v.eq_ignore_ascii_case(NO_COST) {
                        include_null = true;
                    } else {
                        cost_types.push(v.parse::<CostType>().map_err(|_| invalid(self, v))?);
                    }
                }
                Ok(Filter::multi_cost_type(&cost_types, include_null))
            }
            FilterKind::DisciplineLevel => {
                let pairs = values
                    .iter()
                    .map(|v| {
                        let (disc, level) = v.rsplit_once(" with ").ok_or_else(|| invalid(self, v))?;
                        let level: DisciplineLevel = level.parse().map_err(|_| invalid(self, v))?;
                        Ok((disc.trim(), level))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Filter::multi_discipline_level(db, &pairs, Resolution::Strict)
            }
            FilterKind::ExpansionRarity => {
                let pairs = values
                    .iter()
                    .map(|v| {
                        let (exp, rarity) = v.rsplit_once(" with ").ok_or_else(|| invalid(self, v))?;
                        Ok((exp.trim(), rarity.trim()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Filter::multi_expansion_rarity(db, &pairs, Resolution::Strict)
            }
            FilterKind::PhysicalExpansion => {
                let expansions: Vec<Option<&str>> = values
                    .iter()
                    .map(|v| (!v.eq_ignore_ascii_case(NO_EXPANSION)).then_some(*v))
                    .collect();
                Filter::multi_physical_expansion(db, &expansions, Resolution::Strict)
            }
            FilterKind::CardText => Ok(Filter::card_text(&text_value(values))),
            FilterKind::CardName => Ok(Filter::card_name(&text_value(values))),
            FilterKind::CardSetName => Ok(Filter::card_set_name(&text_value(values))),
            FilterKind::CardSetAuthor => Ok(Filter::card_set_author(&text_value(values))),
            FilterKind::CardSetDescription => {
                Ok(Filter::card_set_description(&text_value(values)))
            }
            FilterKind::CardSetAnnotations => {
                Ok(Filter::card_set_annotations(&text_value(values)))
            }
            FilterKind::PhysicalCardSet => Filter::multi_card_set(db, values, Resolution::Strict),
            FilterKind::PhysicalCardSetInUse => Ok(Filter::cards_in_use()),
            FilterKind::CardSetInUse => Ok(Filter::card_set_in_use()),
            FilterKind::ParentCardSet => Filter::parent_card_set(db, values, Resolution::Strict),
            FilterKind::CardSetCardCount => {
                let mut counts = Vec::new();
                let mut card_sets = Vec::new();
                for v in values {
                    let (count, card_set) = v.split_once(" with ").ok_or_else(|| invalid(self, v))?;
                    counts.push(self.parse_count(count.trim())?);
                    card_sets.push(card_set.trim());
                }
                Filter::card_set_card_count(db, &counts, &card_sets, Resolution::Strict)
            }
            FilterKind::CardFunction => {
                let functions = values
                    .iter()
                    .map(|v| v.parse::<CardFunction>())
                    .collect::<Result<Vec<_>>>()?;
                Filter::card_function(db, &functions)
            }
            // Relation-backed kinds returned above
            _ => Err(invalid(self, &values.join(", "))),
        }
    }

    fn parse_ints(&self, values: &[&str]) -> Result<Vec<i32>> {
        values
            .iter()
            .map(|v| v.parse::<i32>().map_err(|_| invalid(self, v)))
            .collect()
    }

    fn parse_count(&self, value: &str) -> Result<CardCount> {
        match value.strip_prefix('>') {
            Some(rest) => rest
                .trim()
                .parse()
                .map(CardCount::MoreThan)
                .map_err(|_| invalid(self, value)),
            None => value
                .parse()
                .map(CardCount::Exact)
                .map_err(|_| invalid(self, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCardSet, COST_X};
    use crate::schema::catalog::CardRecord;
    use crate::schema::query::EntityType;

    fn catalog() -> Database {
        let mut db = Database::new();
        for record in [
            CardRecord::new("Alpha")
                .types(&["Vampire"])
                .clans(&["Ventrue"])
                .group(2)
                .capacity(8)
                .discipline("dom", DisciplineLevel::Superior),
            CardRecord::new("Beta")
                .types(&["Vampire"])
                .clans(&["Toreador"])
                .group(GROUP_ANY)
                .capacity(3),
            CardRecord::new("Gamma")
                .types(&["Action"])
                .cost(COST_X, CostType::Blood)
                .rarity("Jyhad", "Common"),
            CardRecord::new("Delta").types(&["Ally"]).cost(3, CostType::Pool).life(2),
            CardRecord::new("Epsilon")
                .types(&["Reaction"])
                .text("The acting vampire is now bleeding you."),
        ] {
            db.add_card(&record).unwrap();
        }
        db
    }

    fn names(db: &Database, filter: &Filter) -> Vec<String> {
        filter
            .select_cards(db)
            .unwrap()
            .into_iter()
            .map(|id| db.card_name(id))
            .collect()
    }

    #[test]
    fn registry_keywords_are_unique() {
        for (i, spec) in FILTERS.iter().enumerate() {
            assert!(
                FILTERS[i + 1..].iter().all(|other| other.keyword != spec.keyword),
                "duplicate keyword {}",
                spec.keyword
            );
        }
        assert!(get_spec("clan").is_some());
        assert!(get_spec("nonexistent").is_none());
    }

    #[test]
    fn registry_types_match_built_filters() {
        let mut db = catalog();
        db.insert_card_set(NewCardSet::new("Deck")).unwrap();
        for spec in FILTERS {
            let values = spec.values(&db);
            let sample: Vec<&str> = match spec.input {
                InputKind::Flag => vec![],
                InputKind::Text => vec!["a"],
                InputKind::List => values.iter().take(1).map(String::as_str).collect(),
                InputKind::WithList if spec.kind == FilterKind::CardSetCardCount => vec!["1 with Deck"],
                InputKind::WithList => values.iter().take(1).map(String::as_str).collect(),
            };
            let filter = spec.build(&db, &sample).unwrap();
            assert_eq!(filter.types(), spec.types, "{}", spec.keyword);
        }
    }

    #[test]
    fn numeric_values_follow_catalog_maximum() {
        let db = catalog();
        assert_eq!(get_spec("Group").unwrap().values(&db), vec!["1", "2", "Any"]);
        assert_eq!(get_spec("Capacity").unwrap().values(&db).len(), 8);
        assert_eq!(
            get_spec("Cost").unwrap().values(&db),
            vec!["0", "1", "2", "3", "X", "None"]
        );
        assert_eq!(get_spec("Life").unwrap().values(&db), vec!["1", "2"]);
    }

    #[test]
    fn group_any_and_cost_x_map_to_sentinels() {
        let db = catalog();
        let any = build_filter(&db, "Group", &["Any"]).unwrap();
        assert_eq!(names(&db, &any), vec!["Beta"]);
        let x = build_filter(&db, "Cost", &["X"]).unwrap();
        assert_eq!(names(&db, &x), vec!["Gamma"]);
        let none = build_filter(&db, "Cost", &["None"]).unwrap();
        assert_eq!(names(&db, &none), vec!["Alpha", "Beta", "Epsilon"]);
    }

    #[test]
    fn cost_type_without_cost_value() {
        let mut db = catalog();
        let mut zeta = CardRecord::new("Zeta").types(&["Master"]);
        zeta.cost_type = Some(CostType::Pool);
        db.add_card(&zeta).unwrap();

        let fixed = build_filter(&db, "Cost", &["0", "3", "X"]).unwrap();
        assert_eq!(names(&db, &fixed), vec!["Gamma", "Delta"]);
        let none = build_filter(&db, "Cost", &["None"]).unwrap();
        assert_eq!(names(&db, &none), vec!["Alpha", "Beta", "Epsilon", "Zeta"]);

        let pool = build_filter(&db, "CostType", &["pool"]).unwrap();
        assert_eq!(names(&db, &pool), vec!["Delta", "Zeta"]);
        let untyped = build_filter(&db, "CostType", &["None"]).unwrap();
        assert_eq!(names(&db, &untyped), vec!["Alpha", "Beta", "Epsilon"]);
        let either = build_filter(&db, "CostType", &["blood", "None"]).unwrap();
        assert_eq!(names(&db, &either), vec!["Alpha", "Beta", "Gamma", "Epsilon"]);
        assert!(build_filter(&db, "CostType", &["gold"]).is_err());
    }

    #[test]
    fn with_values_parse() {
        let db = catalog();
        let values = get_spec("Discipline_with_Level").unwrap().values(&db);
        assert_eq!(values, vec!["dom with superior"]);
        let f = build_filter(&db, "Discipline_with_Level", &values).unwrap();
        assert_eq!(names(&db, &f), vec!["Alpha"]);

        let f = build_filter(&db, "Expansion_with_Rarity", &["Jyhad with Common"]).unwrap();
        assert_eq!(names(&db, &f), vec!["Gamma"]);

        let err = build_filter(&db, "Discipline_with_Level", &["dom at superior"]).unwrap_err();
        assert!(matches!(err, SutekhError::InvalidFilterValue { .. }));
    }

    #[test]
    fn strict_build_reports_unknown_names() {
        let db = catalog();
        let err = build_filter(&db, "Clan", &["Ventrue", "Nonexistent"]).unwrap_err();
        assert!(err.is_not_found());
        let err = build_filter(&db, "NoSuchFilter", &["x"]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let db = catalog();
        assert!(matches!(
            build_filter(&db, "Capacity", &["lots"]),
            Err(SutekhError::InvalidFilterValue { .. })
        ));
    }

    #[test]
    fn card_set_filters_select_card_sets() {
        let mut db = catalog();
        let mut new = NewCardSet::new("Tournament deck");
        new.in_use = true;
        let deck = db.insert_card_set(new).unwrap();
        db.insert_card_set(NewCardSet::new("Spares")).unwrap();

        let f = build_filter::<&str>(&db, "CSSetsInUse", &[]).unwrap();
        assert_eq!(f.select_card_sets(&db).unwrap(), vec![deck]);
        let f = build_filter(&db, "CardSetName", &["tourn%deck"]).unwrap();
        assert_eq!(f.select_card_sets(&db).unwrap(), vec![deck]);
        assert!(f.select(&db, EntityType::AbstractCard).is_err());
    }
}
