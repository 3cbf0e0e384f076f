use crate::queries::QuerySet;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One line of the execution plan
#[derive(Tabled)]
pub struct PlanRow {
    #[tabled(rename = "#")]
    pub order: usize,
    #[tabled(rename = "Phase")]
    pub phase: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Role")]
    pub role: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Every statement in execution order
pub fn plan_table(queries: &QuerySet) -> String {
    let rows: Vec<PlanRow> = queries
        .iter()
        .enumerate()
        .map(|(i, s)| PlanRow {
            order: i + 1,
            phase: s.phase.to_string(),
            table: s.table.qualified_name(),
            role: s.table.role().to_string(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
