//! Sequential load pipeline
//!
//! Runs rendered statements one at a time, drop → create → copy → insert.
//! The first failure aborts the run; nothing is retried.

use crate::executor::Executor;
use crate::queries::{Phase, QuerySet, Statement};
use crate::schema::Table;
use crate::ui::progress_message::ProgressMessage;
use crate::{Error, Result};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Reset the warehouse: drop every table, then recreate it
pub const CREATE_TABLES: &[Phase] = &[Phase::Drop, Phase::Create];

/// Stage from S3, then load the star schema
pub const ETL: &[Phase] = &[Phase::Copy, Phase::Insert];

/// Everything, from an empty warehouse to a loaded star schema
pub const ALL: &[Phase] = &[Phase::Drop, Phase::Create, Phase::Copy, Phase::Insert];

#[derive(Debug, Clone, Serialize)]
pub struct StatementTiming {
    pub phase: Phase,
    pub table: Table,
    pub elapsed_ms: u128,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub statements: Vec<StatementTiming>,
    pub elapsed_ms: u128,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms as u64)
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Run Report:")?;
        for t in &self.statements {
            writeln!(f, "  {:<7} {:<16} {} ms", t.phase, t.table, t.elapsed_ms)?;
        }
        write!(f, "  Total: {} statements in {} ms", self.statements.len(), self.elapsed_ms)
    }
}

pub struct Pipeline<'a> {
    queries: &'a QuerySet,
}

impl<'a> Pipeline<'a> {
    pub fn new(queries: &'a QuerySet) -> Self {
        Self { queries }
    }

    /// Run the statements of `phases` against `executor`
    pub async fn run<E: Executor + ?Sized>(&self, executor: &mut E, phases: &[Phase]) -> Result<RunReport> {
        self.run_with_progress(executor, phases, |_| {}).await
    }

    /// Like [`Pipeline::run`], reporting each statement to `progress`
    pub async fn run_with_progress<E, F>(
        &self,
        executor: &mut E,
        phases: &[Phase],
        mut progress: F,
    ) -> Result<RunReport>
    where
        E: Executor + ?Sized,
        F: FnMut(ProgressMessage),
    {
        let statements: Vec<&Statement> = self.queries.ordered(phases);
        let total = statements.len();
        tracing::info!("Running {} statements against {}", total, executor.target());

        let run_start = Instant::now();
        let mut report = RunReport::default();
        let mut current_phase = None;

        for (index, statement) in statements.into_iter().enumerate() {
            if current_phase != Some(statement.phase) {
                current_phase = Some(statement.phase);
                tracing::info!("Phase: {}", statement.phase);
                progress(ProgressMessage::PhaseStarted {
                    phase: statement.phase,
                    total: self.queries.phase(statement.phase).len(),
                });
            }

            progress(ProgressMessage::Executing {
                phase: statement.phase,
                table: statement.table,
                current: index + 1,
                total,
            });
            tracing::debug!("Executing {}:{}", statement.label(), statement.sql);

            let started = Instant::now();
            if let Err(e) = executor.execute(statement).await {
                tracing::error!("{} failed: {}", statement.label(), e);
                progress(ProgressMessage::Failed {
                    phase: statement.phase,
                    table: statement.table,
                    error: e.to_string(),
                });
                return Err(Error::StatementFailed {
                    phase: statement.phase,
                    table: statement.table,
                    source: Box::new(e),
                });
            }

            let elapsed = started.elapsed();
            tracing::info!("{} done in {:?}", statement.label(), elapsed);
            progress(ProgressMessage::Executed {
                phase: statement.phase,
                table: statement.table,
                elapsed,
            });

            report.statements.push(StatementTiming {
                phase: statement.phase,
                table: statement.table,
                elapsed_ms: elapsed.as_millis(),
            });
        }

        report.elapsed_ms = run_start.elapsed().as_millis();
        progress(ProgressMessage::Finished {
            statements: report.len(),
        });
        Ok(report)
    }
}
