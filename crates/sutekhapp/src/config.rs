//! # Configuration
//!
//! Sutekh configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files and compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Data directory override**: `sutekh.toml` next to a `--data` directory.
//! 2. **Global Config**: `sutekh.toml` in the OS-appropriate data directory
//!    (via `directories` crate, or `SUTEKH_DATA`).
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_file` | `sutekh.json` | Database document, relative to the data directory |
//! | `lookup` | `best-guess` | Card name lookup for imports (`exact` or `best-guess`) |
//! | `repair_loops_on_open` | `true` | Break card set parent loops found when opening |
//! | `log_level` | `warn` | Default tracing level for the CLI |

use crate::lookup::LookupMode;
use confique::Config;
use serde::{Deserialize, Serialize};

/// Configuration for sutekh, stored in `sutekh.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SutekhConfig {
    /// Database file name, relative to the data directory.
    #[config(default = "sutekh.json")]
    pub data_file: String,

    /// How imported card names are matched against the catalog.
    #[config(default = "best-guess")]
    pub lookup: LookupMode,

    /// Break parent loops in stored card sets when opening the database.
    #[config(default = true)]
    pub repair_loops_on_open: bool,

    /// Default log level (error, warn, info, debug, trace).
    #[config(default = "warn")]
    pub log_level: String,
}

impl Default for SutekhConfig {
    fn default() -> Self {
        Self {
            data_file: "sutekh.json".to_string(),
            lookup: LookupMode::default(),
            repair_loops_on_open: true,
            log_level: "warn".to_string(),
        }
    }
}

impl SutekhConfig {
    /// The data file name, with a `.json` extension added when missing.
    pub fn data_file(&self) -> String {
        if self.data_file.ends_with(".json") {
            self.data_file.clone()
        } else {
            format!("{}.json", self.data_file)
        }
    }
}
