pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod host;
pub mod parser;
pub mod session;
pub mod types;

// Public API
pub use config::SearchConfiguration;
pub use error::{FastFindError, Result};
pub use executor::{spawn_search, SearchHandle, SearchOutcome};
pub use history::{resolve_history_path, HistoryStore, ResultStore};
pub use host::{DisplayItem, SearchHost};
pub use parser::parse;
pub use session::{SessionController, SessionState};
pub use types::{MatchRecord, OutputFormat, ResultSet, SearchQuery};
