use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use sutekhapp::commands::import::ImportPolicy;
use sutekhapp::grouping::Grouping;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    /// Refuse the import
    Fail,
    /// Delete the existing card set first
    Replace,
    /// Import under the first free "<name> (n)"
    Rename,
}

impl From<OnConflict> for ImportPolicy {
    fn from(value: OnConflict) -> Self {
        match value {
            OnConflict::Fail => ImportPolicy::Fail,
            OnConflict::Replace => ImportPolicy::Replace,
            OnConflict::Rename => ImportPolicy::Rename,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sutekh",
    bin_name = "sutekh",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Card collection and deck manager for Vampire: The Eternal Struggle", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $SUTEKH_DATA or the platform data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Print JSON instead of text where a command supports it
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load or refresh the card catalog from a JSON file
    #[command(alias = "lc", display_order = 1)]
    LoadCatalog {
        /// Catalog file
        file: PathBuf,
    },

    /// Show the card set hierarchy
    #[command(alias = "ls", display_order = 2)]
    List,

    /// Show the contents of a card set
    #[command(display_order = 3)]
    Show {
        /// Card set name
        name: String,
    },

    /// Create a card set
    #[command(alias = "n", display_order = 10)]
    Create {
        /// Card set name
        name: String,

        /// Parent card set
        #[arg(long, short)]
        parent: Option<String>,

        #[arg(long, default_value = "")]
        author: String,

        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Change card set details
    #[command(display_order = 11)]
    Update {
        /// Card set name
        name: String,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        #[arg(long)]
        annotations: Option<String>,

        /// Mark the card set as in use (or not)
        #[arg(long, value_name = "BOOL")]
        in_use: Option<bool>,
    },

    /// Add copies of a card to a card set
    #[command(display_order = 12)]
    Add {
        /// Card set name
        card_set: String,

        /// Card name
        card: String,

        /// Expansion of the printing
        #[arg(long, short)]
        expansion: Option<String>,

        #[arg(long, short, default_value_t = 1)]
        count: u32,
    },

    /// Remove copies of a card from a card set
    #[command(alias = "rm", display_order = 13)]
    Remove {
        /// Card set name
        card_set: String,

        /// Card name
        card: String,

        /// Expansion of the printing
        #[arg(long, short)]
        expansion: Option<String>,

        #[arg(long, short, default_value_t = 1)]
        count: u32,
    },

    /// Move a card set under another parent
    #[command(alias = "mv", display_order = 14)]
    Reparent {
        /// Card set name
        card_set: String,

        /// New parent, omitted for top level
        #[arg(long, short)]
        parent: Option<String>,
    },

    /// Move every child of a card set under another parent
    #[command(display_order = 15)]
    ReparentChildren {
        /// Card set whose children move
        from: String,

        /// New parent, omitted for top level
        #[arg(long)]
        to: Option<String>,
    },

    /// Delete a card set; children move to top level
    #[command(display_order = 16)]
    Delete {
        /// Card set name
        name: String,

        /// Delete even if the card set has cards or children
        #[arg(long, short)]
        force: bool,
    },

    /// Break parent loops in the stored hierarchy
    #[command(display_order = 17)]
    Repair,

    /// Import a plain text deck list
    #[command(display_order = 20)]
    Import {
        /// Deck list file
        file: PathBuf,

        /// Card set name, overriding the one in the file
        #[arg(long)]
        name: Option<String>,

        /// Parent card set, overriding the one in the file
        #[arg(long, short)]
        parent: Option<String>,

        /// What to do when the name is taken
        #[arg(long, value_enum, default_value_t = OnConflict::Fail)]
        on_conflict: OnConflict,
    },

    /// List the filter keywords
    #[command(display_order = 30)]
    Filters,

    /// List the values a filter keyword accepts
    #[command(display_order = 31)]
    Values {
        /// Filter keyword
        keyword: String,
    },

    /// List the cards matching a filter
    #[command(display_order = 32)]
    Cards {
        /// Filter expression, repeatable, ANDed together
        #[arg(long = "filter", short = 'f', value_name = "EXPR")]
        filters: Vec<String>,

        /// Group the list
        #[arg(long, short)]
        group: Option<Grouping>,
    },

    /// Print numeric card features as CSV
    #[command(display_order = 33)]
    Table {
        /// Filter expression, repeatable, ANDed together
        #[arg(long = "filter", short = 'f', value_name = "EXPR")]
        filters: Vec<String>,

        /// Columns to print, comma separated; omitted lists the known columns
        #[arg(long, short, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Create a card set from the cards matching a filter
    #[command(display_order = 34)]
    FromFilter {
        /// New card set name
        name: String,

        /// Filter expression, repeatable, ANDed together
        #[arg(long = "filter", short = 'f', value_name = "EXPR", required = true)]
        filters: Vec<String>,

        /// Parent card set
        #[arg(long, short)]
        parent: Option<String>,
    },

    /// Check whether child card sets can all be built from their parent
    #[command(display_order = 40)]
    Independence {
        /// Parent card set
        parent: String,

        /// Child card sets, at least two
        #[arg(required = true, num_args = 2..)]
        children: Vec<String>,
    },

    /// Show the effective configuration
    #[command(display_order = 50)]
    Config,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
