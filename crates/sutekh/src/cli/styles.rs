//! Styles for the Sutekh CLI.
//!
//! Renderers refer to styles by semantic name (a card set title, a count, a
//! group header) through [`style`]; the names resolve to presentation styles
//! here, so the look can change without touching the renderers.
//!
//! `console` drops the escape codes when stdout is not a terminal, so piped
//! output and the e2e tests see plain text.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Style identifiers shared by the renderers.
pub mod names {
    pub const REGULAR: &str = "regular";
    pub const MUTED: &str = "muted";
    pub const ERROR: &str = "error";
    pub const WARNING: &str = "warning";
    pub const SUCCESS: &str = "success";
    pub const INFO: &str = "info";
    pub const TITLE: &str = "title";
    // Semantic list styles
    pub const SET_NAME: &str = "set-name";
    pub const SET_COUNT: &str = "set-count";
    pub const IN_USE: &str = "in-use";
    pub const CARD_COUNT: &str = "card-count";
    pub const EXPANSION: &str = "expansion";
    pub const GROUP_HEADER: &str = "group-header";
    pub const KEYWORD: &str = "keyword";
}

static THEME: Lazy<HashMap<&'static str, Style>> = Lazy::new(build_theme);

fn build_theme() -> HashMap<&'static str, Style> {
    let regular = Style::new();
    let muted = Style::new().dim();
    let title = Style::new().bold();

    HashMap::from([
        (names::REGULAR, regular.clone()),
        (names::MUTED, muted.clone()),
        (names::ERROR, Style::new().red().bold()),
        (names::WARNING, Style::new().yellow().bold()),
        (names::SUCCESS, Style::new().green()),
        (names::INFO, muted.clone()),
        (names::TITLE, title.clone()),
        (names::SET_NAME, regular),
        (names::SET_COUNT, muted.clone()),
        (names::IN_USE, Style::new().cyan()),
        (names::CARD_COUNT, Style::new().yellow()),
        (names::EXPANSION, muted.italic()),
        (names::GROUP_HEADER, title.underlined()),
        (names::KEYWORD, Style::new().green().bold()),
    ])
}

/// The style registered under `name`; unknown names render unstyled.
pub fn style(name: &str) -> Style {
    THEME.get(name).cloned().unwrap_or_else(Style::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_is_registered() {
        for name in [
            names::REGULAR,
            names::MUTED,
            names::ERROR,
            names::WARNING,
            names::SUCCESS,
            names::INFO,
            names::TITLE,
            names::SET_NAME,
            names::SET_COUNT,
            names::IN_USE,
            names::CARD_COUNT,
            names::EXPANSION,
            names::GROUP_HEADER,
            names::KEYWORD,
        ] {
            assert!(THEME.contains_key(name), "missing style {}", name);
        }
    }
}
