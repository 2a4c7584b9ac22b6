use std::fmt;

use serde::{Deserialize, Serialize};

/// Statement category.
///
/// Carried alongside per-unit execution for observability only; nothing in
/// the batch path branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    /// Query
    Dql,
    /// Data manipulation (INSERT / UPDATE / DELETE)
    Dml,
    /// Schema definition
    Ddl,
    /// Access control
    Dcl,
    /// Transaction control
    Tcl,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Dql => "DQL",
            SqlType::Dml => "DML",
            SqlType::Ddl => "DDL",
            SqlType::Dcl => "DCL",
            SqlType::Tcl => "TCL",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
