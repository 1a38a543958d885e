//! One handler per subcommand.
//!
//! Handlers resolve nothing themselves: names go straight to the API, which
//! reports unknown card sets and cards as errors. Output goes through
//! [`super::render`], or through serde_json when `--json` is set.

use super::render::{
    print_messages, render_card_groups, render_config, render_contents, render_csv,
    render_filters, render_independence, render_tree, render_values,
};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use sutekhapp::api::CardSetSpec;
use sutekhapp::commands::import::ImportPolicy;
use sutekhapp::commands::update::CardSetUpdate;
use sutekhapp::filters::spec::FILTERS;
use sutekhapp::grouping::Grouping;
use sutekhapp::init::SutekhContext;
use sutekhapp::model::CardId;
use sutekhapp::schema::catalog::CatalogFile;

pub struct AppState {
    pub ctx: SutekhContext,
    pub json: bool,
}

#[derive(Serialize)]
struct CardGroup {
    group: Option<String>,
    cards: Vec<String>,
}

#[derive(Serialize)]
struct FilterInfo {
    keyword: &'static str,
    description: &'static str,
    help: &'static str,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

/// Card ids ordered by card name.
fn sorted_by_name(state: &AppState, mut cards: Vec<CardId>) -> Vec<CardId> {
    let db = state.ctx.api.db();
    cards.sort_by_cached_key(|id| db.card_name(*id));
    cards
}

pub fn load_catalog(state: &mut AppState, file: &Path) -> Result<()> {
    let text = read_file(file)?;
    let catalog: CatalogFile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a card catalog", file.display()))?;
    let result = state.ctx.api.refresh_catalog(&catalog)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn list(state: &mut AppState) -> Result<()> {
    let tree = state.ctx.api.card_set_tree();
    if state.json {
        return print_json(&tree);
    }
    print!("{}", render_tree(&tree));
    Ok(())
}

pub fn show(state: &mut AppState, name: &str) -> Result<()> {
    let lines = state.ctx.api.card_set_contents(name)?;
    if state.json {
        return print_json(&lines);
    }
    print!("{}", render_contents(name, &lines));
    Ok(())
}

pub fn create(
    state: &mut AppState,
    name: String,
    parent: Option<String>,
    author: String,
    comment: String,
) -> Result<()> {
    let result = state.ctx.api.create_card_set(CardSetSpec {
        name,
        parent,
        author,
        comment,
    })?;
    print_messages(&result.messages);
    Ok(())
}

pub fn update(state: &mut AppState, name: &str, update: CardSetUpdate) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to update, pass at least one of --rename, --author, --comment, --annotations, --in-use");
    }
    let result = state.ctx.api.update_card_set(name, update)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn add(
    state: &mut AppState,
    card_set: &str,
    card: &str,
    expansion: Option<&str>,
    count: u32,
) -> Result<()> {
    let result = state.ctx.api.add_cards(card_set, card, expansion, count)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn remove(
    state: &mut AppState,
    card_set: &str,
    card: &str,
    expansion: Option<&str>,
    count: u32,
) -> Result<()> {
    let result = state.ctx.api.remove_cards(card_set, card, expansion, count)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn reparent(state: &mut AppState, card_set: &str, parent: Option<&str>) -> Result<()> {
    let result = state.ctx.api.reparent(card_set, parent)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn reparent_children(state: &mut AppState, from: &str, to: Option<&str>) -> Result<()> {
    let result = state.ctx.api.reparent_children(from, to)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn delete(state: &mut AppState, name: &str, force: bool) -> Result<()> {
    let check = state.ctx.api.check_delete(name)?;
    if !check.is_clean() && !force {
        let mut problems = Vec::new();
        if check.card_count > 0 {
            problems.push(format!("{} cards", check.card_count));
        }
        if !check.children.is_empty() {
            problems.push(format!("children ({})", check.children.join(", ")));
        }
        bail!(
            "'{}' has {}; use --force to delete it anyway",
            check.name,
            problems.join(" and ")
        );
    }
    let result = state.ctx.api.delete_card_set(name)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn repair(state: &mut AppState) -> Result<()> {
    let result = state.ctx.api.repair_loops()?;
    print_messages(&result.messages);
    Ok(())
}

pub fn import(
    state: &mut AppState,
    file: &Path,
    name: Option<&str>,
    parent: Option<&str>,
    policy: ImportPolicy,
) -> Result<()> {
    let text = read_file(file)?;
    let result = state.ctx.api.import_deck_list(&text, name, parent, policy)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn filters(state: &mut AppState) -> Result<()> {
    if state.json {
        let infos: Vec<FilterInfo> = FILTERS
            .iter()
            .map(|f| FilterInfo {
                keyword: f.keyword,
                description: f.description,
                help: f.help,
            })
            .collect();
        return print_json(&infos);
    }
    print!("{}", render_filters(FILTERS));
    Ok(())
}

pub fn values(state: &mut AppState, keyword: &str) -> Result<()> {
    let values = state.ctx.api.filter_values(keyword)?;
    if state.json {
        return print_json(&values);
    }
    print!("{}", render_values(&values));
    Ok(())
}

pub fn cards(state: &mut AppState, filters: &[String], group: Option<Grouping>) -> Result<()> {
    let ids = state.ctx.api.filter_cards(filters)?;
    let ids = sorted_by_name(state, ids);
    let api = &state.ctx.api;
    let names = |ids: Vec<CardId>| -> Vec<String> {
        ids.into_iter().map(|id| api.db().card_name(id)).collect()
    };
    let groups: Vec<CardGroup> = match group {
        Some(grouping) => api
            .group_cards(&ids, grouping)
            .into_iter()
            .map(|(group, cards)| CardGroup {
                group,
                cards: names(cards),
            })
            .collect(),
        None => vec![CardGroup {
            group: None,
            cards: names(ids),
        }],
    };

    if state.json {
        return print_json(&groups);
    }
    let groups: Vec<(Option<String>, Vec<String>)> =
        groups.into_iter().map(|g| (g.group, g.cards)).collect();
    print!("{}", render_card_groups(&groups));
    Ok(())
}

pub fn table(state: &mut AppState, filters: &[String], columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        print!("{}", render_values(&state.ctx.api.tabulator_columns()));
        return Ok(());
    }
    let ids = state.ctx.api.filter_cards(filters)?;
    let ids = sorted_by_name(state, ids);
    let api = &state.ctx.api;
    let (columns, values) = api.tabulate(&ids, columns)?;
    let rows: Vec<(String, Vec<i32>)> = ids
        .iter()
        .map(|id| api.db().card_name(*id))
        .zip(values)
        .collect();
    print!("{}", render_csv(&columns, &rows));
    Ok(())
}

pub fn from_filter(
    state: &mut AppState,
    name: String,
    filters: &[String],
    parent: Option<String>,
) -> Result<()> {
    let spec = CardSetSpec {
        name,
        parent,
        ..Default::default()
    };
    let result = state.ctx.api.card_set_from_filter(filters, spec)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn independence(state: &mut AppState, parent: &str, children: &[String]) -> Result<()> {
    let children: Vec<&str> = children.iter().map(String::as_str).collect();
    let report = state.ctx.api.check_independence(parent, &children)?;
    if state.json {
        return print_json(&report);
    }
    print!("{}", render_independence(&report));
    Ok(())
}

pub fn config(state: &mut AppState) -> Result<()> {
    if state.json {
        return print_json(&state.ctx.config);
    }
    println!("# {}", state.ctx.data_dir.display());
    print!("{}", render_config(&state.ctx.config));
    Ok(())
}
