//! Statement catalogue
//!
//! COPY templates are rendered once from [`DwhConfig`]; DDL and the
//! star-schema inserts are static. [`QuerySet`] groups the results into the
//! four ordered lists an executor runs: drop, create, copy, insert.

use crate::config::DwhConfig;
use crate::schema::Table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Songplays fact rows: one per NextSong event, joined to song metadata on
/// title and artist name.
pub const SONGPLAY_TABLE_INSERT: &str = r#"
    INSERT INTO public.songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
        SELECT
              DISTINCT(DATEADD(s, evt.ts/1000, '20000101')) AS start_time
            , evt.user_id
            , evt.level
            , sng.song_id
            , sng.artist_id
            , evt.session_id
            , evt.location
            , evt.user_agent
        FROM
            public.staging_events evt
        LEFT JOIN public.staging_songs sng
            ON evt.song = sng.title
            AND evt.artist = sng.artist_name
        WHERE
            evt.page = 'NextSong'
"#;

pub const USER_TABLE_INSERT: &str = r#"
    INSERT INTO public.users (user_id, first_name, last_name, gender, level)
        SELECT
              DISTINCT user_id
            , first_name
            , last_name
            , gender
            , level
        FROM
            public.staging_events
        WHERE
            user_id IS NOT NULL
"#;

pub const SONG_TABLE_INSERT: &str = r#"
    INSERT INTO public.songs (song_id, title, artist_id, year, duration)
        SELECT
              DISTINCT song_id
            , title
            , artist_id
            , year
            , duration
        FROM
            public.staging_songs
"#;

pub const ARTIST_TABLE_INSERT: &str = r#"
    INSERT INTO public.artists (artist_id, name, location, latitude, longitude)
        SELECT
              DISTINCT artist_id
            , artist_name AS name
            , artist_location AS location
            , artist_latitude AS latitude
            , artist_longitude AS longitude
        FROM
            public.staging_songs
"#;

/// Time dimension: event timestamps (ms since 2000-01-01) broken into parts
pub const TIME_TABLE_INSERT: &str = r#"
    INSERT INTO public.time (start_time, hour, day, week, month, year, weekday)
        SELECT
              DISTINCT(DATEADD(s, ts/1000, '20000101')) AS start_time
            , EXTRACT(hour from start_time) AS hour
            , EXTRACT(day from start_time) AS day
            , EXTRACT(week from start_time) AS week
            , EXTRACT(month from start_time) AS month
            , EXTRACT(year from start_time) AS year
            , EXTRACT(weekday from start_time) AS weekday
        FROM
            public.staging_events
"#;

/// Tables loaded by COPY, in copy order
pub const COPY_TABLES: &[Table] = &[Table::StagingEvents, Table::StagingSongs];

/// Tables loaded by INSERT, in insert order
pub const INSERT_TABLES: &[Table] = &[
    Table::Songplays,
    Table::Users,
    Table::Songs,
    Table::Artists,
    Table::Time,
];

/// Render a Redshift `COPY ... FORMAT AS JSON` statement.
///
/// Arguments are substituted verbatim.
pub fn copy_statement(table: Table, source: &str, iam_role: &str, json_format: &str) -> String {
    format!(
        "\n    COPY {} FROM {}\n    iam_role {}\n    FORMAT AS JSON {}\n",
        table.qualified_name(),
        source,
        iam_role,
        json_format
    )
}

/// Event logs need an explicit JSONPaths file to map their camelCase keys
pub fn staging_events_copy(config: &DwhConfig) -> String {
    copy_statement(
        Table::StagingEvents,
        &config.s3.log_data,
        &config.iam_role.arn,
        &config.s3.log_jsonpath,
    )
}

pub fn staging_songs_copy(config: &DwhConfig) -> String {
    copy_statement(
        Table::StagingSongs,
        &config.s3.song_data,
        &config.iam_role.arn,
        &config.mode.auto,
    )
}

/// Rendered COPY for a staging table; `None` for star-schema tables
pub fn copy_sql(table: Table, config: &DwhConfig) -> Option<String> {
    match table {
        Table::StagingEvents => Some(staging_events_copy(config)),
        Table::StagingSongs => Some(staging_songs_copy(config)),
        _ => None,
    }
}

/// Static INSERT for a star-schema table; `None` for staging tables
pub fn insert_sql(table: Table) -> Option<&'static str> {
    match table {
        Table::Songplays => Some(SONGPLAY_TABLE_INSERT),
        Table::Users => Some(USER_TABLE_INSERT),
        Table::Songs => Some(SONG_TABLE_INSERT),
        Table::Artists => Some(ARTIST_TABLE_INSERT),
        Table::Time => Some(TIME_TABLE_INSERT),
        Table::StagingEvents | Table::StagingSongs => None,
    }
}

/// Step of the load. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Drop,
    Create,
    Copy,
    Insert,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Drop => "drop",
            Phase::Create => "create",
            Phase::Copy => "copy",
            Phase::Insert => "insert",
        }
    }

    /// All phases in execution order
    pub fn all() -> &'static [Phase] {
        &[Phase::Drop, Phase::Create, Phase::Copy, Phase::Insert]
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Phase::Drop),
            "create" => Ok(Phase::Create),
            "copy" | "stage" => Ok(Phase::Copy),
            "insert" | "load" => Ok(Phase::Insert),
            _ => Err(Error::UnknownPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered statement ready for execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub phase: Phase,
    pub table: Table,
    pub sql: String,
}

impl Statement {
    pub fn new(phase: Phase, table: Table, sql: impl Into<String>) -> Self {
        Self {
            phase,
            table,
            sql: sql.into(),
        }
    }

    /// Short label for logs, e.g. `copy public.staging_songs`
    pub fn label(&self) -> String {
        format!("{} {}", self.phase, self.table.qualified_name())
    }
}

/// The four ordered statement lists.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySet {
    pub drop_table_queries: Vec<Statement>,
    pub create_table_queries: Vec<Statement>,
    pub copy_table_queries: Vec<Statement>,
    pub insert_table_queries: Vec<Statement>,
}

impl QuerySet {
    /// Format every template against `config`
    pub fn render(config: &DwhConfig) -> Self {
        let drop_table_queries = Table::all()
            .iter()
            .map(|t| Statement::new(Phase::Drop, *t, t.drop_sql()))
            .collect();

        let create_table_queries = Table::all()
            .iter()
            .map(|t| Statement::new(Phase::Create, *t, t.create_sql()))
            .collect();

        let copy_table_queries = COPY_TABLES
            .iter()
            .filter_map(|t| copy_sql(*t, config).map(|sql| Statement::new(Phase::Copy, *t, sql)))
            .collect();

        let insert_table_queries = INSERT_TABLES
            .iter()
            .filter_map(|t| insert_sql(*t).map(|sql| Statement::new(Phase::Insert, *t, sql)))
            .collect();

        Self {
            drop_table_queries,
            create_table_queries,
            copy_table_queries,
            insert_table_queries,
        }
    }

    /// Statements of one phase, in list order
    pub fn phase(&self, phase: Phase) -> &[Statement] {
        match phase {
            Phase::Drop => &self.drop_table_queries,
            Phase::Create => &self.create_table_queries,
            Phase::Copy => &self.copy_table_queries,
            Phase::Insert => &self.insert_table_queries,
        }
    }

    /// Statements of the given phases in execution order.
    ///
    /// Phases are sorted and deduplicated, so `[Insert, Drop]` still drops first.
    pub fn ordered(&self, phases: &[Phase]) -> Vec<&Statement> {
        let mut phases = phases.to_vec();
        phases.sort();
        phases.dedup();
        phases.iter().flat_map(|p| self.phase(*p)).collect()
    }

    /// Statements of the given phases touching `table`, in execution order
    pub fn for_table(&self, table: Table, phases: &[Phase]) -> Vec<&Statement> {
        self.ordered(phases)
            .into_iter()
            .filter(|s| s.table == table)
            .collect()
    }

    /// Every statement, drop through insert
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        Phase::all().iter().flat_map(move |p| self.phase(*p).iter())
    }

    pub fn len(&self) -> usize {
        Phase::all().iter().map(|p| self.phase(*p).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CREATE_STAGING_EVENTS_TABLE, CREATE_STAGING_SONGS_TABLE};
    use sqlparser::dialect::RedshiftSqlDialect;
    use sqlparser::parser::Parser;

    const CONFIG: &str = r#"
[IAM_ROLE]
ARN='arn:aws:iam::123456789012:role/dwhRole'

[S3]
LOG_DATA='s3://udacity-dend/log_data'
LOG_JSONPATH='s3://udacity-dend/log_json_path.json'
SONG_DATA='s3://udacity-dend/song_data'

[MODE]
AUTO='auto'
"#;

    fn sample_queries() -> QuerySet {
        let config = DwhConfig::from_ini_str(CONFIG).unwrap();
        QuerySet::render(&config)
    }

    fn tables(stmts: &[Statement]) -> Vec<Table> {
        stmts.iter().map(|s| s.table).collect()
    }

    fn assert_parses(sql: &str) {
        let dialect = RedshiftSqlDialect {};
        if let Err(e) = Parser::parse_sql(&dialect, sql) {
            panic!("failed to parse: {e}\n{sql}");
        }
    }

    #[test]
    fn test_list_orders() {
        let q = sample_queries();
        assert_eq!(tables(&q.create_table_queries), Table::all().to_vec());
        assert_eq!(tables(&q.drop_table_queries), Table::all().to_vec());
        assert_eq!(tables(&q.copy_table_queries), COPY_TABLES.to_vec());
        assert_eq!(tables(&q.insert_table_queries), INSERT_TABLES.to_vec());
        assert_eq!(q.len(), 21);
    }

    #[test]
    fn test_statements_carry_their_phase() {
        let q = sample_queries();
        for phase in Phase::all() {
            assert!(q.phase(*phase).iter().all(|s| s.phase == *phase));
        }
    }

    #[test]
    fn test_events_copy_uses_jsonpath() {
        let q = sample_queries();
        let sql = &q.copy_table_queries[0].sql;
        assert!(sql.contains("COPY public.staging_events FROM 's3://udacity-dend/log_data'"));
        assert!(sql.contains("iam_role 'arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(sql.contains("FORMAT AS JSON 's3://udacity-dend/log_json_path.json'"));
    }

    #[test]
    fn test_songs_copy_uses_auto_mode() {
        let q = sample_queries();
        let sql = &q.copy_table_queries[1].sql;
        assert!(sql.contains("COPY public.staging_songs FROM 's3://udacity-dend/song_data'"));
        assert!(sql.contains("FORMAT AS JSON 'auto'"));
        assert!(!sql.contains("{}"));
    }

    #[test]
    fn test_ordered_sorts_phases() {
        let q = sample_queries();
        let stmts = q.ordered(&[Phase::Insert, Phase::Drop, Phase::Insert]);
        assert_eq!(stmts.len(), 12);
        assert_eq!(stmts[0].phase, Phase::Drop);
        assert_eq!(stmts[6].phase, Phase::Drop);
        assert_eq!(stmts[7].phase, Phase::Insert);
        assert_eq!(stmts[7].table, Table::Songplays);
    }

    #[test]
    fn test_iter_is_drop_create_copy_insert() {
        let q = sample_queries();
        let phases: Vec<Phase> = q.iter().map(|s| s.phase).collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
        assert_eq!(phases.first(), Some(&Phase::Drop));
        assert_eq!(phases.last(), Some(&Phase::Insert));
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("COPY".parse::<Phase>().unwrap(), Phase::Copy);
        assert_eq!("load".parse::<Phase>().unwrap(), Phase::Insert);
        assert!("truncate".parse::<Phase>().is_err());
    }

    #[test]
    fn test_insert_sql_only_for_star_schema() {
        assert!(insert_sql(Table::StagingEvents).is_none());
        for table in INSERT_TABLES {
            let sql = insert_sql(*table).unwrap();
            assert!(sql.contains(&format!("INSERT INTO {} (", table.qualified_name())));
        }
    }

    #[test]
    fn test_songplays_only_counts_next_song() {
        assert!(SONGPLAY_TABLE_INSERT.contains("evt.page = 'NextSong'"));
        assert!(SONGPLAY_TABLE_INSERT.contains("LEFT JOIN public.staging_songs sng"));
    }

    #[test]
    fn test_drop_statements_parse() {
        for stmt in &sample_queries().drop_table_queries {
            assert_parses(&stmt.sql);
        }
    }

    #[test]
    fn test_copy_sql_only_for_staging() {
        let config = DwhConfig::from_ini_str(CONFIG).unwrap();
        assert!(copy_sql(Table::Songplays, &config).is_none());
        for table in COPY_TABLES {
            let sql = copy_sql(*table, &config).unwrap();
            assert!(sql.contains(&format!("COPY {} FROM", table.qualified_name())));
        }
    }

    #[test]
    fn test_for_table_filters_and_orders() {
        let q = sample_queries();
        let stmts = q.for_table(Table::StagingSongs, Phase::all());
        let phases: Vec<Phase> = stmts.iter().map(|s| s.phase).collect();
        assert_eq!(phases, vec![Phase::Drop, Phase::Create, Phase::Copy]);

        let inserts = q.for_table(Table::Time, &[Phase::Insert]);
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].sql, TIME_TABLE_INSERT);
    }

    #[test]
    fn test_songplays_insert_parses() {
        assert_parses(SONGPLAY_TABLE_INSERT);
    }

    #[test]
    fn test_time_insert_derives_every_part() {
        assert!(TIME_TABLE_INSERT.contains("DISTINCT(DATEADD(s, ts/1000, '20000101')) AS start_time"));
        for field in ["hour", "day", "week", "month", "year", "weekday"] {
            assert!(
                TIME_TABLE_INSERT.contains(&format!("EXTRACT({field} from start_time) AS {field}")),
                "time insert is missing {field}"
            );
        }
        assert!(TIME_TABLE_INSERT.contains("FROM\n            public.staging_events"));
    }

    #[test]
    fn test_dimension_inserts_parse() {
        assert_parses(USER_TABLE_INSERT);
        assert_parses(SONG_TABLE_INSERT);
        assert_parses(ARTIST_TABLE_INSERT);
    }

    #[test]
    fn test_staging_creates_parse() {
        assert_parses(CREATE_STAGING_EVENTS_TABLE);
        assert_parses(CREATE_STAGING_SONGS_TABLE);
    }
}
