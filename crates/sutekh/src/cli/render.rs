//! Text rendering for the CLI.
//!
//! Every renderer returns a `String` and has an `_internal` variant taking
//! `use_color`, so tests can pin styling off regardless of the terminal.
//! Column alignment uses display width, not byte length: card names carry
//! accents ("Rötschreck") and quotes.

use super::styles::{names, style};
use sutekhapp::commands::independence::IndependenceReport;
use sutekhapp::commands::list::{CardLine, TreeEntry};
use sutekhapp::commands::{CmdMessage, MessageLevel};
use sutekhapp::config::SutekhConfig;
use sutekhapp::filters::spec::{FilterSpec, InputKind};
use unicode_width::UnicodeWidthStr;

const INDENT: &str = "  ";
const NO_GROUP: &str = "(none)";

fn paint(name: &str, text: &str, use_color: Option<bool>) -> String {
    let mut s = style(name);
    if let Some(color) = use_color {
        s = s.force_styling(color);
    }
    s.apply_to(text).to_string()
}

fn pad_to(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width())))
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Renders command messages with one style per level.
pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    messages
        .iter()
        .map(|msg| {
            let name = match msg.level {
                MessageLevel::Info => names::INFO,
                MessageLevel::Success => names::SUCCESS,
                MessageLevel::Warning => names::WARNING,
                MessageLevel::Error => names::ERROR,
            };
            format!("{}\n", paint(name, &msg.content, use_color))
        })
        .collect()
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// The card set hierarchy, children indented under their parent.
pub fn render_tree(entries: &[TreeEntry]) -> String {
    render_tree_internal(entries, None)
}

fn render_tree_internal(entries: &[TreeEntry], use_color: Option<bool>) -> String {
    if entries.is_empty() {
        return "No card sets yet, create one with `sutekh create`\n".to_string();
    }
    let labels: Vec<String> = entries
        .iter()
        .map(|e| format!("{}{}", INDENT.repeat(e.depth), e.card_set.name))
        .collect();
    let width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    let mut out = String::new();
    for (entry, label) in entries.iter().zip(&labels) {
        out.push_str(&paint(names::SET_NAME, &pad_to(label, width), use_color));
        out.push_str(INDENT);
        out.push_str(&paint(
            names::SET_COUNT,
            &plural(entry.card_count, "card"),
            use_color,
        ));
        if entry.card_set.in_use {
            out.push(' ');
            out.push_str(&paint(names::IN_USE, "[in use]", use_color));
        }
        out.push('\n');
    }
    out
}

/// Contents of one card set: a title line, then one line per printing.
pub fn render_contents(name: &str, lines: &[CardLine]) -> String {
    render_contents_internal(name, lines, None)
}

fn render_contents_internal(name: &str, lines: &[CardLine], use_color: Option<bool>) -> String {
    let total: u32 = lines.iter().map(|l| l.count).sum();
    let mut out = format!(
        "{} {}\n",
        paint(names::TITLE, name, use_color),
        paint(
            names::SET_COUNT,
            &format!("({})", plural(total as usize, "card")),
            use_color
        )
    );
    if lines.is_empty() {
        out.push_str(&format!("{}{}\n", INDENT, paint(names::MUTED, "(empty)", use_color)));
        return out;
    }

    let count_width = lines
        .iter()
        .map(|l| l.count.to_string().len() + 1)
        .max()
        .unwrap_or(0);
    let name_width = lines.iter().map(|l| l.name.width()).max().unwrap_or(0);
    for line in lines {
        let count = format!("{:>width$}", format!("{}x", line.count), width = count_width);
        out.push_str(INDENT);
        out.push_str(&paint(names::CARD_COUNT, &count, use_color));
        out.push(' ');
        match &line.expansion {
            Some(expansion) => {
                out.push_str(&pad_to(&line.name, name_width));
                out.push_str(INDENT);
                out.push_str(&paint(names::EXPANSION, expansion, use_color));
            }
            None => out.push_str(&line.name),
        }
        out.push('\n');
    }
    out
}

/// Card names, under a header per group unless there is one unnamed group.
pub fn render_card_groups(groups: &[(Option<String>, Vec<String>)]) -> String {
    render_card_groups_internal(groups, None)
}

fn render_card_groups_internal(
    groups: &[(Option<String>, Vec<String>)],
    use_color: Option<bool>,
) -> String {
    if groups.iter().all(|(_, cards)| cards.is_empty()) {
        return "No cards match\n".to_string();
    }
    if let [(None, cards)] = groups {
        return cards.iter().map(|c| format!("{}\n", c)).collect();
    }

    let mut out = String::new();
    for (i, (key, cards)) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let header = key.as_deref().unwrap_or(NO_GROUP);
        out.push_str(&format!(
            "{} {}\n",
            paint(names::GROUP_HEADER, header, use_color),
            paint(names::MUTED, &format!("({})", cards.len()), use_color)
        ));
        for card in cards {
            out.push_str(&format!("{}{}\n", INDENT, card));
        }
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// A CSV table: a header row, then the card name and one value per column.
pub fn render_csv(columns: &[String], rows: &[(String, Vec<i32>)]) -> String {
    let mut out = String::from("Card Name");
    for column in columns {
        out.push(',');
        out.push_str(&csv_field(column));
    }
    out.push('\n');
    for (name, values) in rows {
        out.push_str(&csv_field(name));
        for value in values {
            out.push(',');
            out.push_str(&value.to_string());
        }
        out.push('\n');
    }
    out
}

fn input_hint(input: InputKind) -> &'static str {
    match input {
        InputKind::List => "values",
        InputKind::WithList => "'<a> with <b>' values",
        InputKind::Text => "text",
        InputKind::Flag => "no value",
    }
}

pub fn render_filters(filters: &[FilterSpec]) -> String {
    render_filters_internal(filters, None)
}

fn render_filters_internal(filters: &[FilterSpec], use_color: Option<bool>) -> String {
    let width = filters.iter().map(|f| f.keyword.width()).max().unwrap_or(0);
    filters
        .iter()
        .map(|f| {
            format!(
                "{}{}{} {}\n",
                paint(names::KEYWORD, &pad_to(f.keyword, width), use_color),
                INDENT,
                f.description,
                paint(names::MUTED, &format!("({})", input_hint(f.input)), use_color)
            )
        })
        .collect()
}

pub fn render_values(values: &[String]) -> String {
    if values.is_empty() {
        return "This filter takes free text or no value\n".to_string();
    }
    values.iter().map(|v| format!("{}\n", v)).collect()
}

pub fn render_independence(report: &IndependenceReport) -> String {
    render_independence_internal(report, None)
}

fn render_independence_internal(report: &IndependenceReport, use_color: Option<bool>) -> String {
    let children = report.children.join(", ");
    if report.is_independent() {
        return format!(
            "{}\n",
            paint(
                names::SUCCESS,
                &format!(
                    "{} can all be built from {} at the same time",
                    children, report.parent
                ),
                use_color
            )
        );
    }

    let mut out = format!(
        "{}\n",
        paint(
            names::WARNING,
            &format!("{} cannot all be built from {}:", children, report.parent),
            use_color
        )
    );
    for shortfall in &report.shortfalls {
        let card = match &shortfall.expansion {
            Some(expansion) => format!("{} [{}]", shortfall.card, expansion),
            None => shortfall.card.clone(),
        };
        out.push_str(&format!(
            "{}{}: need {}, have {}\n",
            INDENT, card, shortfall.needed, shortfall.available
        ));
    }
    out
}

pub fn render_config(config: &SutekhConfig) -> String {
    format!(
        "data_file = {}\nlookup = {}\nrepair_loops_on_open = {}\nlog_level = {}\n",
        config.data_file, config.lookup, config.repair_loops_on_open, config.log_level
    )
}
