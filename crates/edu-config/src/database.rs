//! Local libSQL database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    String::from(".edu/edu.db")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:` for a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
