//! Warehouse table definitions
//!
//! Two staging tables receive the raw JSON via `COPY`; five star-schema
//! tables are populated from them. Relationships between songplays and the
//! dimensions exist only in the insert JOINs, there are no foreign keys.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Schema every table lives in
pub const SCHEMA: &str = "public";

/// SQL to create the raw event log staging table
pub const CREATE_STAGING_EVENTS_TABLE: &str = r#"
    CREATE TABLE public.staging_events (
        artist VARCHAR,
        auth VARCHAR,
        first_name VARCHAR,
        gender VARCHAR,
        item_in_session SMALLINT,
        last_name VARCHAR,
        length FLOAT,
        level VARCHAR,
        location VARCHAR,
        method VARCHAR,
        page VARCHAR,
        registration BIGINT,
        session_id SMALLINT,
        song VARCHAR,
        status SMALLINT,
        ts BIGINT,
        user_agent VARCHAR,
        user_id SMALLINT
    );
"#;

/// SQL to create the raw song metadata staging table
pub const CREATE_STAGING_SONGS_TABLE: &str = r#"
    CREATE TABLE public.staging_songs (
        num_songs SMALLINT,
        artist_id VARCHAR,
        artist_latitude FLOAT,
        artist_longitude FLOAT,
        artist_location VARCHAR,
        artist_name VARCHAR,
        song_id VARCHAR,
        title VARCHAR,
        duration FLOAT,
        year SMALLINT
    );
"#;

/// SQL to create the songplays fact table
pub const CREATE_SONGPLAYS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS public.songplays (
        songplay_id BIGINT NOT NULL IDENTITY(0,1) PRIMARY KEY,
        start_time TIMESTAMP,
        user_id INTEGER,
        level VARCHAR,
        song_id VARCHAR,
        artist_id VARCHAR,
        session_id INTEGER,
        location VARCHAR,
        user_agent VARCHAR
    ) DISTKEY(songplay_id) SORTKEY(start_time);
"#;

/// SQL to create the users dimension
pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS public.users (
        user_id INTEGER PRIMARY KEY,
        first_name VARCHAR,
        last_name VARCHAR,
        gender VARCHAR,
        level VARCHAR
    ) DISTKEY(user_id) SORTKEY(user_id);
"#;

/// SQL to create the songs dimension
pub const CREATE_SONGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS public.songs (
        song_id VARCHAR PRIMARY KEY,
        title VARCHAR,
        artist_id VARCHAR,
        year SMALLINT,
        duration FLOAT
    ) DISTKEY(song_id) SORTKEY(song_id);
"#;

/// SQL to create the artists dimension
pub const CREATE_ARTISTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS public.artists (
        artist_id VARCHAR PRIMARY KEY,
        name VARCHAR,
        location VARCHAR,
        latitude VARCHAR,
        longitude VARCHAR
    ) DISTKEY(artist_id) SORTKEY(artist_id);
"#;

/// SQL to create the time dimension
pub const CREATE_TIME_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS public.time (
        start_time TIMESTAMP NOT NULL PRIMARY KEY,
        hour SMALLINT NOT NULL,
        day SMALLINT NOT NULL,
        week SMALLINT NOT NULL,
        month SMALLINT NOT NULL,
        year SMALLINT NOT NULL,
        weekday SMALLINT NOT NULL
    ) DISTKEY(start_time) SORTKEY(start_time);
"#;

/// What a table is for in the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableRole {
    /// Raw landing table for bulk-loaded JSON
    Staging,
    /// Central fact table of the star schema
    Fact,
    /// Dimension table of the star schema
    Dimension,
}

impl TableRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableRole::Staging => "staging",
            TableRole::Fact => "fact",
            TableRole::Dimension => "dimension",
        }
    }
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every table the load touches.
///
/// Declaration order is the canonical create/drop order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplays,
    Users,
    Songs,
    Artists,
    Time,
}

impl Table {
    /// Unqualified table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::StagingEvents => "staging_events",
            Table::StagingSongs => "staging_songs",
            Table::Songplays => "songplays",
            Table::Users => "users",
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Time => "time",
        }
    }

    /// Schema-qualified name, e.g. `public.songplays`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", SCHEMA, self.name())
    }

    pub fn role(&self) -> TableRole {
        match self {
            Table::StagingEvents | Table::StagingSongs => TableRole::Staging,
            Table::Songplays => TableRole::Fact,
            Table::Users | Table::Songs | Table::Artists | Table::Time => TableRole::Dimension,
        }
    }

    /// `CREATE TABLE` statement for this table
    pub fn create_sql(&self) -> &'static str {
        match self {
            Table::StagingEvents => CREATE_STAGING_EVENTS_TABLE,
            Table::StagingSongs => CREATE_STAGING_SONGS_TABLE,
            Table::Songplays => CREATE_SONGPLAYS_TABLE,
            Table::Users => CREATE_USERS_TABLE,
            Table::Songs => CREATE_SONGS_TABLE,
            Table::Artists => CREATE_ARTISTS_TABLE,
            Table::Time => CREATE_TIME_TABLE,
        }
    }

    /// `DROP TABLE IF EXISTS` statement for this table
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.qualified_name())
    }

    /// All tables in canonical order
    pub fn all() -> &'static [Table] {
        &[
            Table::StagingEvents,
            Table::StagingSongs,
            Table::Songplays,
            Table::Users,
            Table::Songs,
            Table::Artists,
            Table::Time,
        ]
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bare = s.trim().to_lowercase();
        let bare = bare.strip_prefix("public.").unwrap_or(&bare);
        Table::all()
            .iter()
            .copied()
            .find(|t| t.name() == bare)
            .ok_or_else(|| Error::UnknownTable(s.to_string()))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_roundtrip() {
        for table in Table::all() {
            let parsed: Table = table.name().parse().unwrap();
            assert_eq!(*table, parsed);
            let qualified: Table = table.qualified_name().parse().unwrap();
            assert_eq!(*table, qualified);
        }
    }

    #[test]
    fn test_roles() {
        let staging: Vec<_> = Table::all().iter().filter(|t| t.role() == TableRole::Staging).collect();
        let facts: Vec<_> = Table::all().iter().filter(|t| t.role() == TableRole::Fact).collect();
        assert_eq!(staging, vec![&Table::StagingEvents, &Table::StagingSongs]);
        assert_eq!(facts, vec![&Table::Songplays]);
    }

    #[test]
    fn test_create_sql_targets_own_table() {
        for table in Table::all() {
            assert!(
                table.create_sql().contains(&format!("{} (", table.qualified_name())),
                "DDL for {} does not create it",
                table
            );
        }
    }

    #[test]
    fn test_staging_tables_are_not_conditional() {
        assert!(!CREATE_STAGING_EVENTS_TABLE.contains("IF NOT EXISTS"));
        assert!(!CREATE_STAGING_SONGS_TABLE.contains("IF NOT EXISTS"));
        assert!(CREATE_SONGPLAYS_TABLE.contains("IF NOT EXISTS"));
    }

    fn assert_keys(sql: &str, distkey: &str, sortkey: &str) {
        assert!(sql.contains(&format!("DISTKEY({distkey}) SORTKEY({sortkey});")), "bad keys in {sql}");
    }

    #[test]
    fn test_songplays_ddl() {
        assert!(CREATE_SONGPLAYS_TABLE.contains("songplay_id BIGINT NOT NULL IDENTITY(0,1) PRIMARY KEY"));
        assert_keys(CREATE_SONGPLAYS_TABLE, "songplay_id", "start_time");
    }

    #[test]
    fn test_users_ddl() {
        assert!(CREATE_USERS_TABLE.contains("user_id INTEGER PRIMARY KEY"));
        assert_keys(CREATE_USERS_TABLE, "user_id", "user_id");
    }

    #[test]
    fn test_songs_ddl() {
        assert!(CREATE_SONGS_TABLE.contains("song_id VARCHAR PRIMARY KEY"));
        assert_keys(CREATE_SONGS_TABLE, "song_id", "song_id");
    }

    #[test]
    fn test_artists_ddl() {
        assert!(CREATE_ARTISTS_TABLE.contains("artist_id VARCHAR PRIMARY KEY"));
        assert_keys(CREATE_ARTISTS_TABLE, "artist_id", "artist_id");
    }

    #[test]
    fn test_time_ddl() {
        assert!(CREATE_TIME_TABLE.contains("start_time TIMESTAMP NOT NULL PRIMARY KEY"));
        for part in ["hour", "day", "week", "month", "year", "weekday"] {
            assert!(CREATE_TIME_TABLE.contains(&format!("{part} SMALLINT NOT NULL")), "time.{part} not NOT NULL");
        }
        assert_keys(CREATE_TIME_TABLE, "start_time", "start_time");
    }

    #[test]
    fn test_drop_sql() {
        assert_eq!(Table::Time.drop_sql(), "DROP TABLE IF EXISTS public.time;");
    }

    #[test]
    fn test_unknown_table() {
        assert!(matches!("plays".parse::<Table>(), Err(Error::UnknownTable(s)) if s == "plays"));
    }

    #[test]
    fn test_table_parse_ignores_case_and_whitespace() {
        assert_eq!(" PUBLIC.Songplays ".parse::<Table>().unwrap(), Table::Songplays);
        assert_eq!("Time".parse::<Table>().unwrap(), Table::Time);
    }
}
