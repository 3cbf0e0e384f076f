use indicatif::HumanDuration;
use owo_colors::OwoColorize;
use songplays_dwh::config::{self, DwhConfig};
use songplays_dwh::executor::{DryRunExecutor, Executor, WarehouseExecutor};
use songplays_dwh::output::{emit_success, OutputMode};
use songplays_dwh::pipeline::{Pipeline, RunReport};
use songplays_dwh::ui::{self, Icons, RunProgress};
use songplays_dwh::{Phase, QuerySet, Table};
use std::path::Path;

fn load(config_path: &Path) -> anyhow::Result<DwhConfig> {
    config::load_config(Some(config_path))
        .map_err(|e| anyhow::anyhow!("{} ({})", e, config_path.display()))
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        ui::header(&format!("songplays-dwh {}", env!("CARGO_PKG_VERSION").bold()));
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub fn run_render(
    config_path: &Path,
    phase: Option<Phase>,
    table: Option<Table>,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let config = load(config_path)?;
    let queries = QuerySet::render(&config);
    let phases: Vec<Phase> = match phase {
        Some(p) => vec![p],
        None => Phase::all().to_vec(),
    };
    let statements = match table {
        Some(t) => queries.for_table(t, &phases),
        None => queries.ordered(&phases),
    };

    if output_mode.is_human() {
        if statements.is_empty() {
            ui::warn("No statements match the given filters");
        }
        for stmt in &statements {
            ui::sql_block(&stmt.label(), &stmt.sql);
        }
    } else {
        emit_success(output_mode, "render", statements)?;
    }
    Ok(())
}

pub fn run_plan(config_path: &Path, output_mode: OutputMode) -> anyhow::Result<()> {
    let config = load(config_path)?;
    let queries = QuerySet::render(&config);

    if output_mode.is_human() {
        ui::section("Execution plan");
        println!("{}", ui::plan_table(&queries));
        for p in Phase::all() {
            ui::summary_row(&format!("{}:", p), &queries.phase(*p).len().to_string());
        }
    } else {
        let data: Vec<_> = queries
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::json!({
                    "order": i + 1,
                    "phase": s.phase,
                    "table": s.table.qualified_name(),
                    "role": s.table.role(),
                })
            })
            .collect();
        emit_success(output_mode, "plan", data)?;
    }
    Ok(())
}

pub fn run_check_config(config_path: &Path, output_mode: OutputMode) -> anyhow::Result<()> {
    let config = load(config_path)?;

    if output_mode.is_human() {
        ui::success(&format!("Config OK: {}", config_path.display()));
        ui::section("S3");
        ui::info("LOG_DATA", &config.s3.log_data);
        ui::info("LOG_JSONPATH", &config.s3.log_jsonpath);
        ui::info("SONG_DATA", &config.s3.song_data);
        ui::section("IAM_ROLE");
        ui::info("ARN", &config.iam_role.arn);
        ui::section("MODE");
        ui::info("AUTO", &config.mode.auto);
        match &config.cluster {
            Some(cluster) => {
                ui::section("CLUSTER");
                ui::info("HOST", &cluster.host);
                ui::info("DB_NAME", &cluster.db_name);
                ui::info("DB_USER", &cluster.db_user);
                ui::info("DB_PORT", &cluster.db_port.to_string());
            }
            None => ui::warn("No [CLUSTER] section: only dry runs and rendering are possible"),
        }
    } else {
        emit_success(output_mode, "check-config", &config)?;
    }
    Ok(())
}

/// Run `phases` against the warehouse, or record them with `dry_run`
pub async fn run_phases(
    command: &str,
    config_path: &Path,
    phases: &[Phase],
    dry_run: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let config = load(config_path)?;
    let queries = QuerySet::render(&config);
    let pipeline = Pipeline::new(&queries);

    if dry_run {
        let mut executor = DryRunExecutor::new();
        let report = pipeline.run(&mut executor, phases).await?;
        if output_mode.is_human() {
            ui::header(&format!("{} (dry run)", command));
            for stmt in executor.executed() {
                ui::sql_block(&stmt.label(), &stmt.sql);
            }
            print_report(&report);
        } else {
            emit_success(output_mode, command, serde_json::json!({
                "dry_run": true,
                "statements": executor.executed(),
            }))?;
        }
        return Ok(());
    }

    let cluster = config.require_cluster()?;
    let mut executor = WarehouseExecutor::connect(cluster).await?;

    let report = if output_mode.is_human() {
        ui::header(command);
        ui::info("Target", &executor.target());
        let progress = RunProgress::new();
        pipeline
            .run_with_progress(&mut executor, phases, |m| progress.handle(m))
            .await?
    } else {
        pipeline.run(&mut executor, phases).await?
    };

    if output_mode.is_human() {
        print_report(&report);
    } else {
        emit_success(output_mode, command, &report)?;
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    let count = report.len().to_string();
    let elapsed = format!("{}", HumanDuration(report.elapsed()));
    println!();
    println!(
        "{}",
        ui::stats_table(&[("Statements", count.as_str()), ("Elapsed", elapsed.as_str())])
    );
    println!("{} {}", Icons::CHECK, "Done".style(ui::theme().success.clone()));
}
