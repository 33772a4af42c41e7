//! SQLite backend
//!
//! Owns its connection for its whole lifetime; dropping the backend closes
//! the connection on every exit path, including unwinding out of a failed
//! assertion.

use crate::backend::{Backend, Order, Predicate};
use crate::db;
use crate::errors::{from_rusqlite, unsupported_backend, Result};
use crate::sql;
use ormcheck_core::config::HarnessConfig;
use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::{ExError, ExErrorKind};
use ormcheck_core::schema::TableSchema;
use ormcheck_core::value::{Row, SqlValue};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, Statement};

/// Open the backend named by the configuration
///
/// Only SQLite has a driver here; every other dialect fails with
/// `UnsupportedBackend`.
pub fn open_backend(config: &HarnessConfig) -> Result<Box<dyn Backend>> {
    match config.dialect {
        Dialect::Sqlite => Ok(Box::new(SqliteBackend::open(&config.connection_string())?)),
        other => Err(unsupported_backend(other)),
    }
}

pub struct SqliteBackend {
    conn: Connection,
    location: String,
    last_sql: Option<String>,
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
        SqlValue::Blob(v) => Value::Blob(v.clone()),
    }
}

fn from_sqlite(column: &str, value: ValueRef<'_>) -> Result<SqlValue> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) => SqlValue::Text(
            String::from_utf8(bytes.to_vec()).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("read_row")
                    .with_field(column)
                    .with_message(e.to_string())
            })?,
        ),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    })
}

/// Bind named parameters to a prepared statement
fn bind_named(stmt: &mut Statement<'_>, params: &[(String, SqlValue)]) -> Result<()> {
    for (name, value) in params {
        let index = stmt
            .parameter_index(name)
            .map_err(from_rusqlite)?
            .ok_or_else(|| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("bind")
                    .with_message(format!("statement has no parameter {}", name))
            })?;
        stmt.raw_bind_parameter(index, to_sqlite(value))
            .map_err(from_rusqlite)?;
    }
    Ok(())
}

/// Run a bound query and collect every row by column name
fn collect_rows(stmt: &mut Statement<'_>) -> Result<Vec<Row>> {
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let mut rows = stmt.raw_query();
    let mut out = Vec::new();
    while let Some(r) = rows.next().map_err(from_rusqlite)? {
        let mut row = Row::new();
        for (i, name) in names.iter().enumerate() {
            let value = r.get_ref(i).map_err(from_rusqlite)?;
            row.set(name.as_str(), from_sqlite(name, value)?);
        }
        out.push(row);
    }
    Ok(out)
}

impl SqliteBackend {
    /// Open `:memory:` or a database file
    pub fn open(location: &str) -> Result<Self> {
        let conn = db::open_location(location)?;
        db::configure(&conn)?;
        tracing::debug!(location, "sqlite connection opened");
        Ok(Self {
            conn,
            location: location.to_string(),
            last_sql: None,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(ormcheck_core::config::SQLITE_MEMORY_DB)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn record_sql(&mut self, sql: &str) {
        tracing::debug!(sql, "executing");
        self.last_sql = Some(sql.to_string());
    }

    fn validate(&self, schema: &TableSchema, row: &Row) -> Result<()> {
        schema.validate_row(row, &Dialect::Sqlite.capabilities())
    }

    fn execute_named(&mut self, sql: &str, params: &[(String, SqlValue)]) -> Result<usize> {
        self.record_sql(sql);
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        bind_named(&mut stmt, params)?;
        stmt.raw_execute().map_err(from_rusqlite)
    }
}

impl Drop for SqliteBackend {
    fn drop(&mut self) {
        tracing::debug!(location = %self.location, "sqlite connection closed");
    }
}

impl Backend for SqliteBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn create_table(&mut self, schema: &TableSchema) -> Result<()> {
        schema.check_capabilities(&Dialect::Sqlite.capabilities())?;
        for statement in Dialect::Sqlite.render_create_table(schema) {
            self.record_sql(&statement);
            self.conn.execute_batch(&statement).map_err(from_rusqlite)?;
        }
        Ok(())
    }

    fn drop_table(&mut self, table: &str) -> Result<()> {
        let statement = Dialect::Sqlite.render_drop_table(table);
        self.record_sql(&statement);
        self.conn.execute_batch(&statement).map_err(from_rusqlite)
    }

    fn insert_batch(&mut self, schema: &TableSchema, rows: &[Row]) -> Result<usize> {
        for row in rows {
            self.validate(schema, row)?;
        }

        let sql = sql::insert(Dialect::Sqlite, schema);
        self.record_sql(&sql);

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        {
            let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;
            for row in rows {
                let params = sql::insert_params(Dialect::Sqlite, schema, row)?;
                bind_named(&mut stmt, &params)?;
                stmt.raw_execute().map_err(from_rusqlite)?;
            }
        }
        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(from_rusqlite)?;
        Ok(rows.len())
    }

    fn insert(&mut self, schema: &TableSchema, row: &Row) -> Result<i64> {
        self.validate(schema, row)?;
        let sql = sql::insert(Dialect::Sqlite, schema);
        let params = sql::insert_params(Dialect::Sqlite, schema, row)?;
        self.execute_named(&sql, &params)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_row(&mut self, schema: &TableSchema, row: &Row) -> Result<usize> {
        self.validate(schema, row)?;
        let stmt = sql::update(Dialect::Sqlite, schema, row, &[])?;
        self.execute_named(&stmt.sql, &stmt.params)
    }

    fn update_only(&mut self, schema: &TableSchema, row: &Row, columns: &[&str]) -> Result<usize> {
        if columns.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("update_only")
                .with_table(schema.name.clone())
                .with_message("no columns named for partial update"));
        }
        self.validate(schema, &row.project(columns)?)?;
        let stmt = sql::update(Dialect::Sqlite, schema, row, columns)?;
        self.execute_named(&stmt.sql, &stmt.params)
    }

    fn select_many(
        &mut self,
        schema: &TableSchema,
        predicate: &Predicate,
        order: Option<&Order>,
    ) -> Result<Vec<Row>> {
        let stmt = sql::select(Dialect::Sqlite, schema, predicate, order)?;
        self.record_sql(&stmt.sql);
        let mut prepared = self.conn.prepare(&stmt.sql).map_err(from_rusqlite)?;
        bind_named(&mut prepared, &stmt.params)?;
        collect_rows(&mut prepared)
    }

    fn select_where_sql(
        &mut self,
        schema: &TableSchema,
        filter: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Row>> {
        let sql = sql::select_where(Dialect::Sqlite, schema, filter);
        self.record_sql(&sql);
        let mut prepared = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        for (i, value) in params.iter().enumerate() {
            prepared
                .raw_bind_parameter(i + 1, to_sqlite(value))
                .map_err(from_rusqlite)?;
        }
        collect_rows(&mut prepared)
    }

    fn select_column(&mut self, table: &str, column: &str) -> Result<Vec<SqlValue>> {
        let sql = sql::select_column(Dialect::Sqlite, table, column);
        self.record_sql(&sql);
        let mut prepared = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let mut rows = prepared.query([]).map_err(from_rusqlite)?;
        let mut out = Vec::new();
        while let Some(r) = rows.next().map_err(from_rusqlite)? {
            out.push(from_sqlite(column, r.get_ref(0).map_err(from_rusqlite)?)?);
        }
        Ok(out)
    }

    fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }
}

