//! # Data Directory and Startup
//!
//! Sutekh keeps one database per data directory:
//!
//! ```text
//! <data dir>/
//! ├── sutekh.json    # Catalog, card sets and memberships (name configurable)
//! └── sutekh.toml    # Configuration
//! ```
//!
//! ## Resolving the Data Directory
//!
//! [`initialize`] picks the directory in this order:
//! 1. The `data_override` argument (the CLI's `--data` flag).
//! 2. The `SUTEKH_DATA` environment variable, mainly used to isolate tests.
//! 3. The OS-appropriate data directory from the `directories` crate.
//!
//! Configuration is read from `sutekh.toml` in the global directory and then in
//! the override directory, later files winning.
//!
//! ## Loop Repair on Open
//!
//! A stored hierarchy with parent loops cannot be committed to (every
//! transaction validates the forest invariant). With `repair_loops_on_open`
//! set, loops are broken right after loading and the repair is reported in
//! [`SutekhContext::startup`].

use crate::api::SutekhApi;
use crate::commands::{self, CmdResult};
use crate::config::SutekhConfig;
use crate::error::{Result, SutekhError};
use crate::graph;
use crate::store::fs_backend::FsBackend;
use crate::store::{CardStore, DataStore, FileStore};
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DATA_ENV: &str = "SUTEKH_DATA";
pub const CONFIG_FILE: &str = "sutekh.toml";

pub struct SutekhContext {
    pub api: SutekhApi<FileStore>,
    pub config: SutekhConfig,
    pub data_dir: PathBuf,
    /// Messages produced while opening the store, e.g. loop repairs.
    pub startup: CmdResult,
}

/// The global data directory: `SUTEKH_DATA`, else the OS data directory.
pub fn global_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("net", "sutekh", "sutekh")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| SutekhError::Store("could not determine the data directory".to_string()))
}

pub fn load_config(search_dirs: &[&Path]) -> SutekhConfig {
    let search_paths = search_dirs
        .iter()
        .map(|dir| SearchPath::Path(dir.to_path_buf()))
        .collect();
    Clapfig::builder()
        .app_name("sutekh")
        .file_name(CONFIG_FILE)
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .no_env()
        .load()
        .unwrap_or_default()
}

/// The data directory to use: the override if given, else the global one.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    match data_override {
        Some(dir) => Ok(dir),
        None => global_data_dir(),
    }
}

/// Configuration for `data_dir`, merged over the global configuration.
pub fn config_for(data_dir: &Path) -> SutekhConfig {
    match global_data_dir() {
        Ok(global) if global != data_dir => load_config(&[&global, data_dir]),
        _ => load_config(&[data_dir]),
    }
}

/// Resolves the data directory and configuration, then [`open`]s the store.
pub fn initialize(data_override: Option<PathBuf>) -> Result<SutekhContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = config_for(&data_dir);
    open(data_dir, config)
}

/// Opens the store in `data_dir` and builds the API.
pub fn open(data_dir: PathBuf, config: SutekhConfig) -> Result<SutekhContext> {
    let backend = FsBackend::new(data_dir.join(config.data_file()));
    let mut store = CardStore::open(backend)?;
    let mut startup = CmdResult::default();
    if config.repair_loops_on_open && !graph::find_loops(store.db()).is_empty() {
        startup = commands::repair::run(&mut store)?;
    }
    tracing::debug!(data_dir = %data_dir.display(), lookup = %config.lookup, "store opened");

    let api = SutekhApi::with_lookup(store, config.lookup);
    Ok(SutekhContext {
        api,
        config,
        data_dir,
        startup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCardSet;

    #[test]
    fn override_directory_holds_data_and_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "data_file = \"collection.json\"\nlookup = \"exact\"\n",
        )
        .unwrap();

        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.config.data_file(), "collection.json");
        assert_eq!(ctx.data_dir, dir.path());
        assert!(ctx.api.location().ends_with("collection.json"));
    }

    #[test]
    fn loops_are_repaired_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().join("sutekh.json"));
        let mut store = CardStore::with_backend(backend);
        let a = store.db_mut().insert_card_set(NewCardSet::new("A")).unwrap();
        let b = store
            .db_mut()
            .insert_card_set(NewCardSet::new("B").with_parent(Some(a)))
            .unwrap();
        store.db_mut().card_set_mut(a).unwrap().parent = Some(b);
        store.commit().unwrap();

        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert!(ctx.startup.has_warnings());
        assert!(graph::find_loops(ctx.api.db()).is_empty());
    }
}
