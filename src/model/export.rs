use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

/// Identity of the generated server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub name: String,
    /// Kept wide so out-of-range input can be reported instead of truncated
    pub port: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            name: "Mi API".to_string(),
            port: 3000,
            description: None,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if !(1..=65535).contains(&self.port) {
            return Err(ConfigurationError::PortOutOfRange(self.port));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Mysql,
    Oracle,
    Postgresql,
    Mssql,
    Mongodb,
    Redis,
}

impl DatabaseType {
    pub const ALL: [DatabaseType; 6] = [
        DatabaseType::Mysql,
        DatabaseType::Oracle,
        DatabaseType::Postgresql,
        DatabaseType::Mssql,
        DatabaseType::Mongodb,
        DatabaseType::Redis,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::Mysql => "MySQL",
            DatabaseType::Oracle => "Oracle",
            DatabaseType::Postgresql => "PostgreSQL",
            DatabaseType::Mssql => "SQL Server",
            DatabaseType::Mongodb => "MongoDB",
            DatabaseType::Redis => "Redis",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbConfig {
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub db_type: DatabaseType,
}

impl DbConfig {
    pub fn enabled(db_type: DatabaseType) -> Self {
        Self {
            enabled: true,
            db_type,
        }
    }

    /// Selected backend, or `None` when no connector is wanted
    pub fn active(&self) -> Option<DatabaseType> {
        self.enabled.then_some(self.db_type)
    }
}

/// Everything an export needs besides the graph itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub api: ApiConfig,
    #[serde(default)]
    pub use_env: bool,
    #[serde(default)]
    pub db: DbConfig,
}

impl ExportOptions {
    /// Whether the generated server needs `dotenv` at all
    pub fn needs_env_bootstrap(&self) -> bool {
        self.use_env || self.db.enabled
    }
}

/// Text artifacts produced by a successful export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    pub readme: String,
}
