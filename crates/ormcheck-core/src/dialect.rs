//! SQL dialects: capability flags and DDL rendering
//!
//! Backend quirks are recorded once here as [`Capabilities`] instead of being
//! special-cased inside scenarios. Each dialect also knows how to quote
//! identifiers, name bind parameters, and spell every [`ColumnType`].

use crate::errors::{ExError, ExErrorKind};
use crate::schema::{ColumnDef, ColumnType, DecimalSpec, TableSchema};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target database dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
    SqlServer,
    PostgreSql,
    MySql,
    SqlServerMdf,
    Oracle,
    Firebird,
}

/// What a dialect's driver can store faithfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// U+0000 survives in text and char columns
    pub accepts_nul_char: bool,
    /// Other C0 control characters survive in text and char columns
    pub accepts_control_chars: bool,
    /// An empty string reads back as NULL
    pub empty_string_is_null: bool,
    /// Largest decimal precision the dialect accepts
    pub max_decimal_precision: u8,
}

impl Capabilities {
    pub fn accepts_char(&self, c: char) -> bool {
        if c == '\0' {
            self.accepts_nul_char
        } else if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            self.accepts_control_chars
        } else {
            true
        }
    }
}

const DEFAULT_DECIMAL: DecimalSpec = DecimalSpec {
    precision: 38,
    scale: 6,
};

impl Dialect {
    pub const ALL: [Dialect; 7] = [
        Dialect::Sqlite,
        Dialect::SqlServer,
        Dialect::PostgreSql,
        Dialect::MySql,
        Dialect::SqlServerMdf,
        Dialect::Oracle,
        Dialect::Firebird,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
            Dialect::PostgreSql => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::SqlServerMdf => "sqlservermdf",
            Dialect::Oracle => "oracle",
            Dialect::Firebird => "firebird",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let base = Capabilities {
            accepts_nul_char: true,
            accepts_control_chars: true,
            empty_string_is_null: false,
            max_decimal_precision: 38,
        };
        match self {
            // rust_decimal backs SQLite decimals stored as text
            Dialect::Sqlite => Capabilities {
                accepts_nul_char: false,
                max_decimal_precision: 28,
                ..base
            },
            Dialect::SqlServer | Dialect::SqlServerMdf => base,
            Dialect::PostgreSql => Capabilities {
                accepts_nul_char: false,
                accepts_control_chars: false,
                ..base
            },
            Dialect::MySql => Capabilities {
                max_decimal_precision: 65,
                ..base
            },
            Dialect::Oracle => Capabilities {
                accepts_nul_char: false,
                empty_string_is_null: true,
                ..base
            },
            Dialect::Firebird => Capabilities {
                accepts_nul_char: false,
                max_decimal_precision: 18,
                ..base
            },
        }
    }

    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            _ => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Named bind parameter for a column, e.g. `@Flags` or `:Flags`
    pub fn param(&self, name: &str) -> String {
        match self {
            Dialect::PostgreSql | Dialect::Oracle => format!(":{}", name),
            _ => format!("@{}", name),
        }
    }

    /// Rounded-to-three-places filter expression over a float column
    pub fn round3(&self, column: &str) -> String {
        let column = self.quote_ident(column);
        match self {
            Dialect::PostgreSql => format!("round(cast({} as numeric),3)", column),
            _ => format!("round({},3)", column),
        }
    }

    pub fn sql_type(&self, ty: &ColumnType) -> String {
        match self {
            Dialect::Sqlite => sqlite_type(ty),
            Dialect::SqlServer | Dialect::SqlServerMdf => sqlserver_type(ty),
            Dialect::PostgreSql => postgres_type(ty),
            Dialect::MySql => mysql_type(ty),
            Dialect::Oracle => oracle_type(ty),
            Dialect::Firebird => firebird_type(ty),
        }
    }

    fn column_sql(&self, column: &ColumnDef) -> String {
        let name = self.quote_ident(&column.name);
        if column.auto_increment {
            let wide = matches!(column.ty, ColumnType::Int64 | ColumnType::UInt64);
            return match self {
                Dialect::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name),
                Dialect::SqlServer | Dialect::SqlServerMdf => format!(
                    "{} {} IDENTITY(1,1) PRIMARY KEY",
                    name,
                    if wide { "BIGINT" } else { "INTEGER" }
                ),
                Dialect::PostgreSql => format!(
                    "{} {} PRIMARY KEY",
                    name,
                    if wide { "BIGSERIAL" } else { "SERIAL" }
                ),
                Dialect::MySql => format!(
                    "{} {} PRIMARY KEY AUTO_INCREMENT",
                    name,
                    if wide { "BIGINT" } else { "INTEGER" }
                ),
                Dialect::Oracle => format!(
                    "{} NUMBER({}) GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
                    name,
                    if wide { 19 } else { 10 }
                ),
                Dialect::Firebird => format!(
                    "{} {} GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
                    name,
                    if wide { "BIGINT" } else { "INTEGER" }
                ),
            };
        }

        let mut sql = format!("{} {}", name, self.sql_type(&column.ty));
        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// CREATE TABLE followed by one CREATE INDEX per declared index
    pub fn render_create_table(&self, schema: &TableSchema) -> Vec<String> {
        let mut defs: Vec<String> = schema.columns.iter().map(|c| self.column_sql(c)).collect();

        for column in &schema.columns {
            if let Some(fk) = &column.references {
                defs.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    self.quote_ident(&column.name),
                    self.quote_ident(&fk.table),
                    self.quote_ident(&fk.column)
                ));
            }
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} \n(\n  {} \n)",
            self.quote_ident(&schema.name),
            defs.join(", \n  ")
        )];

        for index in &schema.indexes {
            let columns = index
                .columns
                .iter()
                .map(|c| self.quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(format!(
                "CREATE {}INDEX {} ON {} ({})",
                if index.unique { "UNIQUE " } else { "" },
                self.quote_ident(&schema.index_name(index)),
                self.quote_ident(&schema.name),
                columns
            ));
        }

        statements
    }

    pub fn render_drop_table(&self, table: &str) -> String {
        let quoted = self.quote_ident(table);
        match self {
            Dialect::Oracle => format!(
                concat!(
                    "BEGIN EXECUTE IMMEDIATE 'DROP TABLE {}'; ",
                    "EXCEPTION WHEN OTHERS THEN IF SQLCODE != -942 THEN RAISE; END IF; END;"
                ),
                quoted
            ),
            Dialect::Firebird => format!(
                concat!(
                    "EXECUTE BLOCK AS BEGIN IF (EXISTS(SELECT 1 FROM RDB$RELATIONS ",
                    "WHERE RDB$RELATION_NAME = '{}')) THEN EXECUTE STATEMENT 'DROP TABLE {}'; END"
                ),
                table,
                quoted
            ),
            _ => format!("DROP TABLE IF EXISTS {}", quoted),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let alias = match wanted.as_str() {
            "postgres" | "pgsql" => "postgresql",
            "mssql" => "sqlserver",
            other => other,
        };
        Dialect::ALL
            .iter()
            .copied()
            .find(|d| d.name() == alias)
            .ok_or_else(|| {
                ExError::new(ExErrorKind::Config)
                    .with_op("parse_dialect")
                    .with_message(format!("unknown dialect '{}'", s))
            })
    }
}

fn decimal_spec(spec: &Option<DecimalSpec>) -> DecimalSpec {
    spec.unwrap_or(DEFAULT_DECIMAL)
}

fn sqlite_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool
        | ColumnType::Int8
        | ColumnType::UInt8
        | ColumnType::Int16
        | ColumnType::UInt16
        | ColumnType::Int32
        | ColumnType::UInt32
        | ColumnType::Int64
        | ColumnType::UInt64
        | ColumnType::DateTime
        | ColumnType::Interval => "INTEGER".to_string(),
        ColumnType::Float32 | ColumnType::Float64 => "REAL".to_string(),
        // TEXT affinity keeps the canonical decimal string intact
        ColumnType::Decimal(_) => "TEXT".to_string(),
        ColumnType::Text(Some(n)) => format!("VARCHAR({})", n),
        ColumnType::Text(None) => "VARCHAR(8000)".to_string(),
        ColumnType::MaxText | ColumnType::Serialized | ColumnType::DateTimeOffset => {
            "TEXT".to_string()
        }
        ColumnType::Char => "CHAR(1)".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
    }
}

fn sqlserver_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "BIT".to_string(),
        ColumnType::Int8 | ColumnType::Int16 => "SMALLINT".to_string(),
        ColumnType::UInt8 => "TINYINT".to_string(),
        ColumnType::UInt16 | ColumnType::Int32 => "INTEGER".to_string(),
        ColumnType::UInt32 | ColumnType::Int64 | ColumnType::Interval => "BIGINT".to_string(),
        ColumnType::UInt64 => "DECIMAL(20,0)".to_string(),
        ColumnType::Float32 => "REAL".to_string(),
        ColumnType::Float64 => "FLOAT".to_string(),
        ColumnType::Decimal(spec) => {
            let spec = decimal_spec(spec);
            format!("DECIMAL({},{})", spec.precision, spec.scale)
        }
        ColumnType::Text(Some(n)) => format!("NVARCHAR({})", n),
        ColumnType::Text(None) => "NVARCHAR(4000)".to_string(),
        ColumnType::MaxText | ColumnType::Serialized => "NVARCHAR(MAX)".to_string(),
        ColumnType::Char => "NCHAR(1)".to_string(),
        ColumnType::Uuid => "UNIQUEIDENTIFIER".to_string(),
        ColumnType::DateTime => "DATETIME2".to_string(),
        ColumnType::DateTimeOffset => "DATETIMEOFFSET".to_string(),
        ColumnType::Blob => "VARBINARY(MAX)".to_string(),
    }
}

fn postgres_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "BOOLEAN".to_string(),
        ColumnType::Int8 | ColumnType::UInt8 | ColumnType::Int16 => "SMALLINT".to_string(),
        ColumnType::UInt16 | ColumnType::Int32 => "INTEGER".to_string(),
        ColumnType::UInt32 | ColumnType::Int64 => "BIGINT".to_string(),
        ColumnType::UInt64 => "NUMERIC(20,0)".to_string(),
        ColumnType::Float32 => "REAL".to_string(),
        ColumnType::Float64 => "DOUBLE PRECISION".to_string(),
        ColumnType::Decimal(spec) => {
            let spec = decimal_spec(spec);
            format!("NUMERIC({},{})", spec.precision, spec.scale)
        }
        ColumnType::Text(Some(n)) => format!("VARCHAR({})", n),
        ColumnType::Text(None) | ColumnType::MaxText | ColumnType::Serialized => {
            "TEXT".to_string()
        }
        ColumnType::Char => "CHAR(1)".to_string(),
        ColumnType::Uuid => "UUID".to_string(),
        ColumnType::DateTime => "TIMESTAMP".to_string(),
        ColumnType::DateTimeOffset => "TIMESTAMP WITH TIME ZONE".to_string(),
        ColumnType::Interval => "INTERVAL".to_string(),
        ColumnType::Blob => "BYTEA".to_string(),
    }
}

fn mysql_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "TINYINT(1)".to_string(),
        ColumnType::Int8 => "TINYINT".to_string(),
        ColumnType::UInt8 => "TINYINT UNSIGNED".to_string(),
        ColumnType::Int16 => "SMALLINT".to_string(),
        ColumnType::UInt16 => "SMALLINT UNSIGNED".to_string(),
        ColumnType::Int32 => "INT".to_string(),
        ColumnType::UInt32 => "INT UNSIGNED".to_string(),
        ColumnType::Int64 | ColumnType::Interval => "BIGINT".to_string(),
        ColumnType::UInt64 => "BIGINT UNSIGNED".to_string(),
        ColumnType::Float32 => "FLOAT".to_string(),
        ColumnType::Float64 => "DOUBLE".to_string(),
        ColumnType::Decimal(spec) => {
            let spec = decimal_spec(spec);
            format!("DECIMAL({},{})", spec.precision, spec.scale)
        }
        ColumnType::Text(Some(n)) => format!("VARCHAR({})", n),
        ColumnType::Text(None) => "VARCHAR(255)".to_string(),
        ColumnType::MaxText | ColumnType::Serialized => "LONGTEXT".to_string(),
        ColumnType::Char => "CHAR(1)".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::DateTime => "DATETIME(6)".to_string(),
        ColumnType::DateTimeOffset => "VARCHAR(48)".to_string(),
        ColumnType::Blob => "LONGBLOB".to_string(),
    }
}

fn oracle_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "NUMBER(1)".to_string(),
        ColumnType::Int8 | ColumnType::UInt8 => "NUMBER(3)".to_string(),
        ColumnType::Int16 | ColumnType::UInt16 => "NUMBER(5)".to_string(),
        ColumnType::Int32 | ColumnType::UInt32 => "NUMBER(10)".to_string(),
        ColumnType::Int64 | ColumnType::Interval => "NUMBER(19)".to_string(),
        ColumnType::UInt64 => "NUMBER(20)".to_string(),
        ColumnType::Float32 => "BINARY_FLOAT".to_string(),
        ColumnType::Float64 => "BINARY_DOUBLE".to_string(),
        ColumnType::Decimal(spec) => {
            let spec = decimal_spec(spec);
            format!("NUMBER({},{})", spec.precision, spec.scale)
        }
        ColumnType::Text(Some(n)) => format!("VARCHAR2({})", n),
        ColumnType::Text(None) => "VARCHAR2(4000)".to_string(),
        ColumnType::MaxText | ColumnType::Serialized => "CLOB".to_string(),
        ColumnType::Char => "CHAR(1)".to_string(),
        ColumnType::Uuid => "VARCHAR2(36)".to_string(),
        ColumnType::DateTime => "TIMESTAMP".to_string(),
        ColumnType::DateTimeOffset => "TIMESTAMP WITH TIME ZONE".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
    }
}

fn firebird_type(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Bool => "BOOLEAN".to_string(),
        ColumnType::Int8 | ColumnType::UInt8 | ColumnType::Int16 => "SMALLINT".to_string(),
        ColumnType::UInt16 | ColumnType::Int32 => "INTEGER".to_string(),
        ColumnType::UInt32 | ColumnType::Int64 | ColumnType::Interval => "BIGINT".to_string(),
        ColumnType::UInt64 => "DECIMAL(18,0)".to_string(),
        ColumnType::Float32 => "FLOAT".to_string(),
        ColumnType::Float64 => "DOUBLE PRECISION".to_string(),
        ColumnType::Decimal(spec) => {
            let spec = spec.unwrap_or(DecimalSpec {
                precision: 18,
                scale: 6,
            });
            format!("DECIMAL({},{})", spec.precision.min(18), spec.scale)
        }
        ColumnType::Text(Some(n)) => format!("VARCHAR({})", n),
        ColumnType::Text(None) => "VARCHAR(8000)".to_string(),
        ColumnType::MaxText | ColumnType::Serialized => "BLOB SUB_TYPE TEXT".to_string(),
        ColumnType::Char => "CHAR(1)".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::DateTime => "TIMESTAMP".to_string(),
        ColumnType::DateTimeOffset => "VARCHAR(48)".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
    }
}
