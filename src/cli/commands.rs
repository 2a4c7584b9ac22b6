//! CLI command implementations
//!
//! `replay` rebuilds a batch from a plan file: every unit gets a simulated
//! statement that answers with recorded per-call results (optionally after
//! a delay, or with an error), and the batch runs through the same
//! builder, engine and reconciler as a live one.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::batch::{BatchExecutor, BatchStatement, BatchUnitsBuilder, ExecutionUnit, StatementError};
use crate::engine::{EngineConfig, ExecutorEngine};
use crate::observability::{Event, Logger, MetricsRegistry, Severity};
use crate::types::{DatabaseType, SqlType};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Recorded batch: physical units and how logical calls were routed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayPlan {
    pub database_type: DatabaseType,

    #[serde(default = "default_sql_type")]
    pub sql_type: SqlType,

    pub units: Vec<PlannedUnit>,

    /// For each logical call, positions in `units` it was routed to
    pub calls: Vec<Vec<usize>>,
}

fn default_sql_type() -> SqlType {
    SqlType::Dml
}

/// One physical target of a recorded batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedUnit {
    pub data_source: String,
    pub sql: String,

    /// Per-call results the statement reports, in local order
    #[serde(default)]
    pub results: Vec<i32>,

    #[serde(default)]
    pub delay_ms: u64,

    /// When set, the statement fails with this driver message
    #[serde(default)]
    pub error: Option<String>,
}

impl PlannedUnit {
    pub fn execution_unit(&self) -> ExecutionUnit {
        ExecutionUnit::new(&self.data_source, &self.sql)
    }
}

impl ReplayPlan {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::plan_invalid(format!("Failed to read plan: {}", e)))?;

        let plan: ReplayPlan = serde_json::from_str(&content)
            .map_err(|e| CliError::plan_invalid(format!("Invalid plan JSON: {}", e)))?;

        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> CliResult<()> {
        let mut seen = HashSet::new();
        for unit in &self.units {
            if !seen.insert((unit.data_source.as_str(), unit.sql.as_str())) {
                return Err(CliError::plan_invalid(format!(
                    "Duplicate unit: '{}'",
                    unit.execution_unit()
                )));
            }
        }

        for (logical, targets) in self.calls.iter().enumerate() {
            if let Some(bad) = targets.iter().find(|p| **p >= self.units.len()) {
                return Err(CliError::plan_invalid(format!(
                    "Call {} routes to unknown unit {}",
                    logical, bad
                )));
            }
        }

        Ok(())
    }
}

/// Statement that replays recorded results
#[derive(Debug, Clone)]
pub struct ReplayStatement {
    results: Vec<i32>,
    delay: Duration,
    error: Option<String>,
}

impl ReplayStatement {
    pub fn from_plan(unit: &PlannedUnit) -> Self {
        Self {
            results: unit.results.clone(),
            delay: Duration::from_millis(unit.delay_ms),
            error: unit.error.clone(),
        }
    }
}

impl BatchStatement for ReplayStatement {
    fn execute_batch(&self) -> Result<Vec<i32>, StatementError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match &self.error {
            Some(message) => Err(StatementError::Driver(message.clone())),
            None => Ok(self.results.clone()),
        }
    }
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Replay {
            plan,
            config,
            verbose,
        } => replay(&plan, config.as_deref(), verbose),
    }
}

/// Replay a batch plan and print the reconciled result
pub fn replay(plan_path: &Path, config_path: Option<&Path>, verbose: bool) -> CliResult<()> {
    Logger::set_min_severity(if verbose { Severity::Trace } else { Severity::Warn });

    let config = match config_path {
        Some(path) => {
            let config = EngineConfig::load(path)
                .map_err(|e| CliError::config_error(e.message().to_string()))?;
            let shown = path.display().to_string();
            Logger::info(Event::ConfigLoaded.as_str(), &[("path", shown.as_str())]);
            config
        }
        None => EngineConfig::default(),
    };

    let plan = ReplayPlan::load(plan_path)?;
    let statements: Vec<Arc<ReplayStatement>> = plan
        .units
        .iter()
        .map(|unit| Arc::new(ReplayStatement::from_plan(unit)))
        .collect();
    let targets: Vec<ExecutionUnit> = plan.units.iter().map(PlannedUnit::execution_unit).collect();

    let mut builder = BatchUnitsBuilder::new();
    for call in &plan.calls {
        let routed: Vec<ExecutionUnit> = call.iter().map(|p| targets[*p].clone()).collect();
        builder
            .add_batch(&routed, |target| {
                targets
                    .iter()
                    .position(|t| t == target)
                    .map(|p| Arc::clone(&statements[p]))
                    .ok_or_else(|| StatementError::Unsupported(format!("no statement for {}", target)))
            })
            .map_err(|e| CliError::plan_invalid(e.to_string()))?;
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let engine = ExecutorEngine::new(config)
        .map_err(|e| CliError::config_error(e.message().to_string()))?
        .with_metrics(Arc::clone(&metrics));
    let executor = BatchExecutor::new(Arc::new(engine), plan.database_type, plan.sql_type, builder.build())
        .with_metrics(Arc::clone(&metrics));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_failed(format!("Failed to create tokio runtime: {}", e)))?;

    match rt.block_on(executor.execute_batch()) {
        Ok(results) => {
            let metrics: serde_json::Value = serde_json::from_str(&metrics.to_json())?;
            write_response(json!({
                "results": results,
                "policy": executor.merge_policy().as_str(),
                "metrics": metrics,
            }))
        }
        Err(e) => {
            write_error(e.code().code(), e.message())?;
            Err(CliError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::io::Write;

    fn plan_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_load_plan_with_defaults() {
        let file = plan_file(
            r#"{
                "database_type": "MySQL",
                "units": [{"data_source": "ds_0", "sql": "INSERT", "results": [1]}],
                "calls": [[0]]
            }"#,
        );

        let plan = ReplayPlan::load(file.path()).unwrap();
        assert_eq!(plan.sql_type, SqlType::Dml);
        assert_eq!(plan.units[0].delay_ms, 0);
        assert!(plan.units[0].error.is_none());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let file = plan_file(
            r#"{"database_type": "H2", "units": [], "calls": [[3]]}"#,
        );
        let err = ReplayPlan::load(file.path()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::PlanInvalid);
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let file = plan_file(
            r#"{
                "database_type": "H2",
                "units": [
                    {"data_source": "ds_0", "sql": "INSERT"},
                    {"data_source": "ds_0", "sql": "INSERT"}
                ],
                "calls": []
            }"#,
        );
        assert!(ReplayPlan::load(file.path()).is_err());
    }

    #[test]
    fn test_replay_statement() {
        let ok = ReplayStatement::from_plan(&PlannedUnit {
            data_source: "ds_0".into(),
            sql: "INSERT".into(),
            results: vec![1, 1],
            delay_ms: 0,
            error: None,
        });
        assert_eq!(ok.execute_batch(), Ok(vec![1, 1]));

        let failing = ReplayStatement::from_plan(&PlannedUnit {
            error: Some("connection reset".into()),
            ..PlannedUnit {
                data_source: "ds_1".into(),
                sql: "INSERT".into(),
                results: vec![],
                delay_ms: 0,
                error: None,
            }
        });
        assert_eq!(
            failing.execute_batch(),
            Err(StatementError::Driver("connection reset".into()))
        );
    }

    #[test]
    fn test_replay_failure_returns_error() {
        let file = plan_file(
            r#"{
                "database_type": "MySQL",
                "units": [{"data_source": "ds_0", "sql": "INSERT", "error": "boom"}],
                "calls": [[0]]
            }"#,
        );

        let err = replay(file.path(), None, false).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BatchFailed);
    }

    #[test]
    fn test_replay_success() {
        let file = plan_file(
            r#"{
                "database_type": "MySQL",
                "units": [
                    {"data_source": "ds_0", "sql": "INSERT", "results": [5, 7], "delay_ms": 20},
                    {"data_source": "ds_1", "sql": "INSERT", "results": [3]}
                ],
                "calls": [[0], [1], [0]]
            }"#,
        );

        assert!(replay(file.path(), None, false).is_ok());
    }
}
