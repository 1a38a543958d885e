//! # Startup and Dispatch
//!
//! [`run`] is the whole life of one invocation:
//!
//! 1. Parse the arguments.
//! 2. Resolve the data directory and read its configuration.
//! 3. Install the tracing subscriber: the configured level, raised by `-v`.
//!    Logs go to stderr so stdout stays clean for JSON and CSV.
//! 4. Open the store (repairing parent loops if configured) and report what
//!    happened while opening, on stderr as well.
//! 5. Dispatch to the handler. No subcommand means `list`.

use super::handlers::{self, AppState};
use super::render::render_messages;
use super::setup::{parse_cli, Commands};
use anyhow::Result;
use sutekhapp::commands::update::CardSetUpdate;
use sutekhapp::init;
use tracing::Level;

pub fn run() -> Result<()> {
    let cli = parse_cli();

    let data_dir = init::resolve_data_dir(cli.data.clone())?;
    let config = init::config_for(&data_dir);
    init_logging(cli.verbose, &config.log_level);

    let ctx = init::open(data_dir, config)?;
    eprint!("{}", render_messages(&ctx.startup.messages));

    let mut state = AppState {
        ctx,
        json: cli.json,
    };
    dispatch(&mut state, cli.command.unwrap_or(Commands::List))
}

fn log_level(verbose: u8, configured: &str) -> Level {
    match verbose {
        0 => configured.parse().unwrap_or(Level::WARN),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(verbose: u8, configured: &str) {
    // try_init: a subscriber may already be set when run from tests
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(verbose, configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(state: &mut AppState, command: Commands) -> Result<()> {
    match command {
        Commands::LoadCatalog { file } => handlers::load_catalog(state, &file),
        Commands::List => handlers::list(state),
        Commands::Show { name } => handlers::show(state, &name),
        Commands::Create {
            name,
            parent,
            author,
            comment,
        } => handlers::create(state, name, parent, author, comment),
        Commands::Update {
            name,
            rename,
            author,
            comment,
            annotations,
            in_use,
        } => handlers::update(
            state,
            &name,
            CardSetUpdate {
                name: rename,
                author,
                comment,
                annotations,
                in_use,
            },
        ),
        Commands::Add {
            card_set,
            card,
            expansion,
            count,
        } => handlers::add(state, &card_set, &card, expansion.as_deref(), count),
        Commands::Remove {
            card_set,
            card,
            expansion,
            count,
        } => handlers::remove(state, &card_set, &card, expansion.as_deref(), count),
        Commands::Reparent { card_set, parent } => {
            handlers::reparent(state, &card_set, parent.as_deref())
        }
        Commands::ReparentChildren { from, to } => {
            handlers::reparent_children(state, &from, to.as_deref())
        }
        Commands::Delete { name, force } => handlers::delete(state, &name, force),
        Commands::Repair => handlers::repair(state),
        Commands::Import {
            file,
            name,
            parent,
            on_conflict,
        } => handlers::import(
            state,
            &file,
            name.as_deref(),
            parent.as_deref(),
            on_conflict.into(),
        ),
        Commands::Filters => handlers::filters(state),
        Commands::Values { keyword } => handlers::values(state, &keyword),
        Commands::Cards { filters, group } => handlers::cards(state, &filters, group),
        Commands::Table { filters, columns } => handlers::table(state, &filters, &columns),
        Commands::FromFilter {
            name,
            filters,
            parent,
        } => handlers::from_filter(state, name, &filters, parent),
        Commands::Independence { parent, children } => {
            handlers::independence(state, &parent, &children)
        }
        Commands::Config => handlers::config(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(log_level(0, "info"), Level::INFO);
        assert_eq!(log_level(0, "nonsense"), Level::WARN);
        assert_eq!(log_level(1, "error"), Level::DEBUG);
        assert_eq!(log_level(3, "error"), Level::TRACE);
    }
}
