//! `dwh.cfg` loader
//!
//! The file is plain INI. Values are pasted into SQL exactly as written, so
//! quoting (`'s3://bucket/log_data'`) belongs in the file, not in the code.

use crate::{Error, Result};
use ini::{Ini, ParseOption, Properties};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const S3_SECTION: &str = "S3";
pub const IAM_ROLE_SECTION: &str = "IAM_ROLE";
pub const MODE_SECTION: &str = "MODE";
pub const CLUSTER_SECTION: &str = "CLUSTER";

/// Port Redshift listens on unless DB_PORT says otherwise
pub const DEFAULT_DB_PORT: u16 = 5439;

/// S3 sources for the staging COPY statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3Config {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IamRoleConfig {
    pub arn: String,
}

/// JSON format option used for the song COPY
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeConfig {
    pub auto: String,
}

/// Connection settings for the Redshift cluster
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    #[serde(skip)]
    pub db_password: String,
    pub db_port: u16,
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"***")
            .field("db_port", &self.db_port)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DwhConfig {
    pub s3: S3Config,
    pub iam_role: IamRoleConfig,
    pub mode: ModeConfig,
    /// Only needed to execute against a warehouse, rendering works without it
    pub cluster: Option<ClusterConfig>,
}

impl DwhConfig {
    /// Parse config from INI text
    pub fn from_ini_str(contents: &str) -> Result<Self> {
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(contents, opt)
            .map_err(|e| Error::ConfigParse(e.to_string()))?;

        let s3 = section(&ini, S3_SECTION)?;
        let iam_role = section(&ini, IAM_ROLE_SECTION)?;
        let mode = section(&ini, MODE_SECTION)?;

        let cluster = match ini.section(Some(CLUSTER_SECTION)) {
            Some(props) => Some(ClusterConfig {
                host: required(props, CLUSTER_SECTION, "HOST")?,
                db_name: required(props, CLUSTER_SECTION, "DB_NAME")?,
                db_user: required(props, CLUSTER_SECTION, "DB_USER")?,
                db_password: required(props, CLUSTER_SECTION, "DB_PASSWORD")?,
                db_port: parse_port(props)?,
            }),
            None => None,
        };

        Ok(Self {
            s3: S3Config {
                log_data: required(s3, S3_SECTION, "LOG_DATA")?,
                log_jsonpath: required(s3, S3_SECTION, "LOG_JSONPATH")?,
                song_data: required(s3, S3_SECTION, "SONG_DATA")?,
            },
            iam_role: IamRoleConfig {
                arn: required(iam_role, IAM_ROLE_SECTION, "ARN")?,
            },
            mode: ModeConfig {
                auto: required(mode, MODE_SECTION, "AUTO")?,
            },
            cluster,
        })
    }

    /// Cluster settings, or an error naming the missing section
    pub fn require_cluster(&self) -> Result<&ClusterConfig> {
        self.cluster
            .as_ref()
            .ok_or_else(|| Error::MissingSection(CLUSTER_SECTION.to_string()))
    }
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| Error::MissingSection(name.to_string()))
}

fn required(props: &Properties, section: &str, key: &str) -> Result<String> {
    let value = props.get(key).map(str::trim).ok_or_else(|| Error::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    })?;

    if value.is_empty() {
        return Err(Error::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            reason: "value is empty".to_string(),
        });
    }

    Ok(value.to_string())
}

fn parse_port(props: &Properties) -> Result<u16> {
    match props.get("DB_PORT").map(str::trim) {
        None | Some("") => Ok(DEFAULT_DB_PORT),
        Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| Error::InvalidValue {
            section: CLUSTER_SECTION.to_string(),
            key: "DB_PORT".to_string(),
            reason: e.to_string(),
        }),
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dwh.cfg")
}

pub fn load_config(path: Option<&Path>) -> Result<DwhConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    tracing::debug!("Loading config from {}", path.display());

    let contents = std::fs::read_to_string(&path)?;
    DwhConfig::from_ini_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[CLUSTER]
HOST=dwhcluster.abc123.us-west-2.redshift.amazonaws.com
DB_NAME=dwh
DB_USER=dwhuser
DB_PASSWORD=Passw0rd
DB_PORT=5439

[IAM_ROLE]
ARN='arn:aws:iam::123456789012:role/dwhRole'

[S3]
LOG_DATA='s3://udacity-dend/log_data'
LOG_JSONPATH='s3://udacity-dend/log_json_path.json'
SONG_DATA='s3://udacity-dend/song_data'

[MODE]
AUTO='auto'
"#;

    #[test]
    fn test_parse_full_config() {
        let config = DwhConfig::from_ini_str(SAMPLE).unwrap();
        assert_eq!(config.s3.log_data, "'s3://udacity-dend/log_data'");
        assert_eq!(config.s3.log_jsonpath, "'s3://udacity-dend/log_json_path.json'");
        assert_eq!(config.iam_role.arn, "'arn:aws:iam::123456789012:role/dwhRole'");
        assert_eq!(config.mode.auto, "'auto'");

        let cluster = config.require_cluster().unwrap();
        assert_eq!(cluster.db_name, "dwh");
        assert_eq!(cluster.db_port, 5439);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let text = SAMPLE.replace("LOG_DATA=", "log_data=").replace("ARN=", "arn=");
        let config = DwhConfig::from_ini_str(&text).unwrap();
        assert_eq!(config.s3.log_data, "'s3://udacity-dend/log_data'");
        assert_eq!(config.iam_role.arn, "'arn:aws:iam::123456789012:role/dwhRole'");
    }

    #[test]
    fn test_cluster_is_optional() {
        let text: String = SAMPLE
            .lines()
            .filter(|l| !l.starts_with("HOST") && !l.starts_with("DB_") && !l.starts_with("[CLUSTER]"))
            .collect::<Vec<_>>()
            .join("\n");
        let config = DwhConfig::from_ini_str(&text).unwrap();
        assert!(config.cluster.is_none());
        assert!(matches!(config.require_cluster(), Err(Error::MissingSection(s)) if s == "CLUSTER"));
    }

    #[test]
    fn test_missing_key_names_section_and_key() {
        let text = SAMPLE.replace("SONG_DATA='s3://udacity-dend/song_data'", "");
        let err = DwhConfig::from_ini_str(&text).unwrap_err();
        match err {
            Error::MissingKey { section, key } => {
                assert_eq!(section, "S3");
                assert_eq!(key, "SONG_DATA");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_section() {
        let text = SAMPLE.replace("[MODE]", "").replace("AUTO='auto'", "");
        let err = DwhConfig::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, Error::MissingSection(s) if s == "MODE"));
    }

    #[test]
    fn test_empty_value_rejected() {
        let text = SAMPLE.replace("AUTO='auto'", "AUTO=");
        let err = DwhConfig::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { key, .. } if key == "AUTO"));
    }

    #[test]
    fn test_bad_port_rejected() {
        let text = SAMPLE.replace("DB_PORT=5439", "DB_PORT=redshift");
        let err = DwhConfig::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { key, .. } if key == "DB_PORT"));
    }

    #[test]
    fn test_password_is_hidden() {
        let config = DwhConfig::from_ini_str(SAMPLE).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("Passw0rd"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("Passw0rd"));
        assert!(json.contains("dwhuser"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.s3.song_data, "'s3://udacity-dend/song_data'");
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.cfg"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
