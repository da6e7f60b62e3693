//! CLI argument parsing using clap.

use clap::{Parser, Subcommand, ValueEnum};
use sqlroute_core::catalog::DEFAULT_STATE_FILE;
use sqlroute_core::{Endpoint, RouteQuery};
use std::path::PathBuf;

/// SQLRoute - join-path finder for SQL schemas and stored procedures
#[derive(Parser, Debug)]
#[command(name = "sqlroute")]
#[command(about = "Find join routes between SQL tables and fields", long_about = None)]
#[command(version)]
pub struct Args {
    /// Analysis state file written by `scan` and read by every other command
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// SQL dialect used by `scan`
    #[arg(short, long, global = true, default_value = "mssql", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Suppress progress and diagnostics on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a directory of SQL scripts and save the results
    Scan {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File extension to analyze, without the dot
        #[arg(long, default_value = "sql")]
        extension: String,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,
    },
    /// List defined tables
    Tables,
    /// List fields, including computed fields
    Fields {
        /// Only list the fields of this table
        #[arg(long, value_name = "TABLE")]
        table: Option<String>,
    },
    /// List analyzed procedures
    Procedures,
    /// Find routes between two endpoints
    Route(RouteArgs),
    /// Print where a field or procedure is defined
    Locate {
        /// Field, computed field or procedure name
        #[arg(value_name = "NAME")]
        name: String,

        /// Only look at this table's fields
        #[arg(long, value_name = "TABLE")]
        table: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct RouteArgs {
    #[arg(long, value_name = "TABLE")]
    pub from_table: Option<String>,

    #[arg(long, value_name = "FIELD")]
    pub from_field: Option<String>,

    #[arg(long, value_name = "TABLE")]
    pub to_table: Option<String>,

    #[arg(long, value_name = "FIELD")]
    pub to_field: Option<String>,

    /// Report procedures that use both tables
    #[arg(long)]
    pub direct: bool,

    /// Report join paths through the join graph
    #[arg(long)]
    pub paths: bool,

    /// Stop after this many join paths
    #[arg(long, value_name = "N")]
    pub max_paths: Option<usize>,
}

impl RouteArgs {
    /// Builds the query; both modes run when neither flag is given.
    pub fn to_query(&self) -> RouteQuery {
        let source = Endpoint::new(self.from_table.as_deref(), self.from_field.as_deref());
        let destination = Endpoint::new(self.to_table.as_deref(), self.to_field.as_deref());
        let mut query = RouteQuery::new(source, destination);
        if self.direct || self.paths {
            query.direct = self.direct;
            query.paths = self.paths;
        }
        query.max_paths = self.max_paths;
        query
    }
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for sqlroute_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => sqlroute_core::Dialect::Generic,
            DialectArg::Ansi => sqlroute_core::Dialect::Ansi,
            DialectArg::Bigquery => sqlroute_core::Dialect::Bigquery,
            DialectArg::Databricks => sqlroute_core::Dialect::Databricks,
            DialectArg::Duckdb => sqlroute_core::Dialect::Duckdb,
            DialectArg::Hive => sqlroute_core::Dialect::Hive,
            DialectArg::Mssql => sqlroute_core::Dialect::Mssql,
            DialectArg::Mysql => sqlroute_core::Dialect::Mysql,
            DialectArg::Postgres => sqlroute_core::Dialect::Postgres,
            DialectArg::Redshift => sqlroute_core::Dialect::Redshift,
            DialectArg::Snowflake => sqlroute_core::Dialect::Snowflake,
            DialectArg::Sqlite => sqlroute_core::Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_conversion() {
        let dialect: sqlroute_core::Dialect = DialectArg::Postgres.into();
        assert_eq!(dialect, sqlroute_core::Dialect::Postgres);
    }

    #[test]
    fn test_parse_scan_defaults() {
        let args = Args::parse_from(["sqlroute", "scan", "./sql"]);
        assert_eq!(args.dialect, DialectArg::Mssql);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.state, PathBuf::from("analysis_results.json"));
        assert!(!args.quiet);
        match args.command {
            Command::Scan {
                dir,
                extension,
                no_recursive,
            } => {
                assert_eq!(dir, PathBuf::from("./sql"));
                assert_eq!(extension, "sql");
                assert!(!no_recursive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::parse_from([
            "sqlroute",
            "tables",
            "--state",
            "state.json",
            "-f",
            "json",
            "--quiet",
        ]);
        assert_eq!(args.state, PathBuf::from("state.json"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.quiet);
        assert!(matches!(args.command, Command::Tables));
    }

    #[test]
    fn test_route_runs_both_modes_by_default() {
        let args = Args::parse_from([
            "sqlroute",
            "route",
            "--from-table",
            "Orders",
            "--to-field",
            "RegionName",
        ]);
        let Command::Route(route) = args.command else {
            panic!("expected route command");
        };
        let query = route.to_query();
        assert!(query.direct);
        assert!(query.paths);
        assert_eq!(query.source.table.as_deref(), Some("Orders"));
        assert_eq!(query.destination.field.as_deref(), Some("RegionName"));
        assert_eq!(query.max_paths, None);
    }

    #[test]
    fn test_route_mode_flags() {
        let args = Args::parse_from([
            "sqlroute",
            "route",
            "--from-table",
            "A",
            "--to-table",
            "B",
            "--paths",
            "--max-paths",
            "3",
        ]);
        let Command::Route(route) = args.command else {
            panic!("expected route command");
        };
        let query = route.to_query();
        assert!(!query.direct);
        assert!(query.paths);
        assert_eq!(query.max_paths, Some(3));
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        let result = Args::try_parse_from(["sqlroute", "-d", "oracle", "tables"]);
        assert!(result.is_err());
    }
}
