//! Inputs to the analysis and route-search APIs.

use serde::{Deserialize, Serialize};

/// A SQL source file handed to the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSource {
    pub name: String,
    pub content: String,
}

impl FileSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// SQL dialect for parsing.
///
/// Stored-procedure corpora are usually T-SQL, so `Mssql` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Generic,
    Ansi,
    Bigquery,
    Databricks,
    Duckdb,
    Hive,
    #[default]
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, DatabricksDialect, DuckDbDialect, GenericDialect,
            HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, RedshiftSqlDialect,
            SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }

    /// Whether `GO` lines separate batches in this dialect's scripts.
    pub fn uses_batch_separator(&self) -> bool {
        matches!(self, Self::Mssql | Self::Generic)
    }
}

/// Options controlling a directory scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    pub dialect: Dialect,

    /// File extension (without the dot) of the scripts to analyze.
    pub extension: String,

    /// Descend into sub-directories.
    pub recursive: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            extension: "sql".to_string(),
            recursive: true,
        }
    }
}

impl AnalysisOptions {
    /// True when `path` has the configured extension (case-insensitive).
    pub fn matches_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.trim_start_matches('.')))
    }
}

/// One side of a route query: a table, a field, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Endpoint {
    pub fn new(table: Option<&str>, field: Option<&str>) -> Self {
        fn clean(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }
        Self {
            table: clean(table),
            field: clean(field),
        }
    }

    pub fn table(name: &str) -> Self {
        Self::new(Some(name), None)
    }

    pub fn field(name: &str) -> Self {
        Self::new(None, Some(name))
    }

    pub fn table_field(table: &str, field: &str) -> Self {
        Self::new(Some(table), Some(field))
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_none() && self.field.is_none()
    }
}

/// A route search between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub source: Endpoint,
    pub destination: Endpoint,

    /// Report procedures that touch both endpoints.
    #[serde(default = "default_true")]
    pub direct: bool,

    /// Enumerate join-graph paths between the endpoints.
    #[serde(default = "default_true")]
    pub paths: bool,

    /// Upper bound on the number of path routes; unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl RouteQuery {
    pub fn new(source: Endpoint, destination: Endpoint) -> Self {
        Self {
            source,
            destination,
            direct: true,
            paths: true,
            max_paths: None,
        }
    }

    pub fn direct_only(mut self) -> Self {
        self.direct = true;
        self.paths = false;
        self
    }

    pub fn paths_only(mut self) -> Self {
        self.direct = false;
        self.paths = true;
        self
    }

    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }
}
