//! # Sutekh
//!
//! Sutekh keeps a catalog of Vampire: The Eternal Struggle cards and the card
//! sets a player builds from it: the collection, the decks drawn from it, the
//! binders and boxes it lives in. Card sets form a hierarchy, so a deck can sit
//! under the collection it is built from and Sutekh can tell whether every deck
//! under a parent can be assembled at the same time.
//!
//! ## Usage
//!
//! ```text
//! sutekh load-catalog cards.json          # Load or refresh the card catalog
//! sutekh create "My Collection"           # Create a top level card set
//! sutekh create "Ventrue" --parent "My Collection"
//! sutekh add "Ventrue" "Hektor" --count 2 # Add two copies of a card
//! sutekh import deck.txt --parent "My Collection"
//! sutekh list                             # The card set hierarchy
//! sutekh show "Ventrue"                   # Contents of a card set
//! sutekh cards -f "Clan=Ventrue" -f "!Cost=X" --group clan
//! sutekh table -f "CardType=Vampire" --columns group,capacity
//! sutekh independence "My Collection" "Ventrue" "Toreador"
//! ```
//!
//! ## Filters
//!
//! A filter expression is `Keyword=value1|value2`, optionally prefixed by `!`
//! to negate it. Several `-f` expressions are ANDed together. `sutekh filters`
//! lists the keywords and `sutekh values <Keyword>` the values each accepts.
//!
//! ## Where Data Lives
//!
//! Everything is stored in one JSON file in the data directory, next to an
//! optional `sutekh.toml` configuration file. The directory is, in order of
//! preference, the `--data` flag, the `SUTEKH_DATA` environment variable or the
//! platform's data directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
