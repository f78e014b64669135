//! SQL dialect selection for parsing.
//!
//! Each variant maps to the corresponding `sqlparser` dialect so the query
//! parser can honor dialect-specific syntax (Snowflake `ILIKE ANY (...)`,
//! T-SQL bracket quoting, BigQuery backticks, and so on).
//!
//! Dialects are identified by their lowercase name. Unrecognized names fall
//! back to [`Dialect::Generic`], which handles most ANSI SQL; parser behavior
//! for those inputs then depends on the generic grammar.

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    BigQueryDialect, DatabricksDialect, Dialect as SqlParserDialect, DuckDbDialect,
    GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Snowflake,
    Postgres,
    TSql,
    MySql,
    BigQuery,
    Databricks,
    Spark,
    Redshift,
    DuckDb,
    Sqlite,
    #[default]
    Generic,
}

impl Dialect {
    /// Resolve a dialect from its name, case-insensitively.
    ///
    /// Unknown names map to [`Dialect::Generic`] rather than failing, since
    /// the pipeline degrades instead of erroring on unexpected input.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "snowflake" => Dialect::Snowflake,
            "postgres" | "postgresql" => Dialect::Postgres,
            "tsql" | "mssql" | "sqlserver" => Dialect::TSql,
            "mysql" => Dialect::MySql,
            "bigquery" => Dialect::BigQuery,
            "databricks" => Dialect::Databricks,
            "spark" => Dialect::Spark,
            "redshift" => Dialect::Redshift,
            "duckdb" => Dialect::DuckDb,
            "sqlite" => Dialect::Sqlite,
            _ => Dialect::Generic,
        }
    }

    /// Dialect name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "snowflake",
            Dialect::Postgres => "postgres",
            Dialect::TSql => "tsql",
            Dialect::MySql => "mysql",
            Dialect::BigQuery => "bigquery",
            Dialect::Databricks => "databricks",
            Dialect::Spark => "spark",
            Dialect::Redshift => "redshift",
            Dialect::DuckDb => "duckdb",
            Dialect::Sqlite => "sqlite",
            Dialect::Generic => "generic",
        }
    }

    /// Get the `sqlparser` grammar for this dialect.
    ///
    /// Spark has no dedicated grammar in sqlparser; Hive is the closest match
    /// and handles Spark SQL's backtick quoting and lateral views.
    pub fn grammar(&self) -> &'static dyn SqlParserDialect {
        match self {
            Dialect::Snowflake => &SnowflakeDialect {},
            Dialect::Postgres => &PostgreSqlDialect {},
            Dialect::TSql => &MsSqlDialect {},
            Dialect::MySql => &MySqlDialect {},
            Dialect::BigQuery => &BigQueryDialect {},
            Dialect::Databricks => &DatabricksDialect {},
            Dialect::Spark => &HiveDialect {},
            Dialect::Redshift => &RedshiftSqlDialect {},
            Dialect::DuckDb => &DuckDbDialect {},
            Dialect::Sqlite => &SQLiteDialect {},
            Dialect::Generic => &GenericDialect {},
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Dialect::from_name(s))
    }
}
