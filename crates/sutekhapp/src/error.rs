use crate::schema::query::EntityType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SutekhError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Card set not found: {0}")]
    CardSetNotFound(String),

    #[error("Card set already exists: {0}")]
    CardSetExists(String),

    #[error(
        "Changing the parent of '{card_set}' to '{parent}' would create a loop ({}); parent left unchanged",
        .chain.join(" -> ")
    )]
    LoopIntroduced {
        card_set: String,
        parent: String,
        chain: Vec<String>,
    },

    #[error("Card set hierarchy contains a loop: {}", .0.join(" -> "))]
    LoopDetected(Vec<String>),

    #[error("Cannot remove {requested} x '{name}' ({}): only {available} present", .expansion.as_deref().unwrap_or("no expansion"))]
    InvalidRemoval {
        name: String,
        expansion: Option<String>,
        requested: u32,
        available: u32,
    },

    #[error("Card set name must be set before the card set can be created")]
    MissingName,

    #[error("No cards to add to card set '{0}'")]
    EmptyHolder(String),

    #[error("Filter '{filter}' cannot select {entity} rows")]
    UnsupportedEntity { filter: String, entity: EntityType },

    #[error("Invalid value for filter '{filter}': {value}")]
    InvalidFilterValue { filter: String, value: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate card: {0}")]
    DuplicateCard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SutekhError>;

impl SutekhError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        SutekhError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// True for lookup misses, which callers building filters from user
    /// input usually report rather than abort on.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SutekhError::NotFound { .. } | SutekhError::CardSetNotFound(_)
        )
    }
}
