//! Database / driver identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Database product behind a data source.
///
/// Only the driver's batch reporting behavior matters here: Oracle
/// returns a status sentinel per call instead of an affected-row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    #[serde(alias = "MySQL", alias = "mysql")]
    MySql,
    #[serde(alias = "PostgreSQL", alias = "postgresql")]
    PostgreSql,
    #[serde(alias = "oracle")]
    Oracle,
    #[serde(alias = "SQLServer", alias = "sqlserver")]
    SqlServer,
    #[serde(alias = "h2")]
    H2,
}

impl DatabaseType {
    /// Returns the canonical product name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::MySql => "MySQL",
            DatabaseType::PostgreSql => "PostgreSQL",
            DatabaseType::Oracle => "Oracle",
            DatabaseType::SqlServer => "SQLServer",
            DatabaseType::H2 => "H2",
        }
    }

    /// Returns true if the driver reports per-call affected-row counts
    /// from batch execution.
    pub fn reports_update_counts(&self) -> bool {
        !matches!(self, DatabaseType::Oracle)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseType::MySql),
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSql),
            "oracle" => Ok(DatabaseType::Oracle),
            "sqlserver" => Ok(DatabaseType::SqlServer),
            "h2" => Ok(DatabaseType::H2),
            other => Err(format!("Unsupported database type: '{}'", other)),
        }
    }
}
