use crate::queries::Phase;
use crate::schema::Table;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressMessage {
    PhaseStarted {
        phase: Phase,
        total: usize,
    },
    Executing {
        phase: Phase,
        table: Table,
        current: usize,
        total: usize,
    },
    Executed {
        phase: Phase,
        table: Table,
        elapsed: Duration,
    },
    Failed {
        phase: Phase,
        table: Table,
        error: String,
    },
    Finished {
        statements: usize,
    },
}
