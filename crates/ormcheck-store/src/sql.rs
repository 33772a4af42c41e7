//! Statement text builders
//!
//! Every statement binds values by name using the dialect's parameter style
//! (`@Col` or `:Col`), and assignments are written `"Col"=@Col` without
//! spaces around `=`.

use crate::backend::{Order, Predicate};
use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::{ExError, ExErrorKind, Result};
use ormcheck_core::schema::TableSchema;
use ormcheck_core::value::{Row, SqlValue};

/// Statement text plus its named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<(String, SqlValue)>,
}

fn column_list(dialect: Dialect, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn assignments(dialect: Dialect, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{}={}", dialect.quote_ident(c), dialect.param(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn primary_key(schema: &TableSchema) -> Result<&str> {
    schema
        .primary_key()
        .map(|c| c.name.as_str())
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Schema)
                .with_table(schema.name.clone())
                .with_message("table has no primary key")
        })
}

/// Columns written on insert; backend-assigned keys are left out
pub fn insert_columns(schema: &TableSchema) -> Vec<&str> {
    schema
        .columns
        .iter()
        .filter(|c| !c.auto_increment)
        .map(|c| c.name.as_str())
        .collect()
}

/// `INSERT INTO "T" ("A", "B") VALUES (@A, @B)`
pub fn insert(dialect: Dialect, schema: &TableSchema) -> String {
    let columns = insert_columns(schema);
    let params = columns
        .iter()
        .map(|c| dialect.param(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.quote_ident(&schema.name),
        column_list(dialect, &columns),
        params
    )
}

/// Named parameters for one insert
pub fn insert_params(
    dialect: Dialect,
    schema: &TableSchema,
    row: &Row,
) -> Result<Vec<(String, SqlValue)>> {
    insert_columns(schema)
        .into_iter()
        .map(|c| Ok((dialect.param(c), row.require(c)?.clone())))
        .collect()
}

/// Update the named columns of the row identified by its primary key
///
/// An empty `columns` list updates every non-key column.
pub fn update(
    dialect: Dialect,
    schema: &TableSchema,
    row: &Row,
    columns: &[&str],
) -> Result<Statement> {
    let pk = primary_key(schema)?;
    let targets: Vec<&str> = if columns.is_empty() {
        schema
            .columns
            .iter()
            .filter(|c| !c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    } else {
        for column in columns {
            schema.require_column(column)?;
        }
        columns.to_vec()
    };

    if targets.contains(&pk) {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_table(schema.name.clone())
            .with_field(pk)
            .with_message("primary key cannot be updated"));
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {}={}",
        dialect.quote_ident(&schema.name),
        assignments(dialect, &targets),
        dialect.quote_ident(pk),
        dialect.param(pk)
    );

    let mut params = Vec::with_capacity(targets.len() + 1);
    for column in targets.iter().chain(std::iter::once(&pk)) {
        params.push((dialect.param(column), row.require(column)?.clone()));
    }
    Ok(Statement { sql, params })
}

fn select_prefix(dialect: Dialect, schema: &TableSchema) -> String {
    let columns: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    format!(
        "SELECT {} FROM {}",
        column_list(dialect, &columns),
        dialect.quote_ident(&schema.name)
    )
}

/// `SELECT <all columns> FROM "T" [WHERE ...] [ORDER BY ...]`
pub fn select(
    dialect: Dialect,
    schema: &TableSchema,
    predicate: &Predicate,
    order: Option<&Order>,
) -> Result<Statement> {
    let mut sql = select_prefix(dialect, schema);
    let mut params = Vec::new();

    if let Predicate::Eq { column, value } = predicate {
        schema.require_column(column)?;
        if value.is_null() {
            sql.push_str(&format!(" WHERE {} IS NULL", dialect.quote_ident(column)));
        } else {
            sql.push_str(&format!(
                " WHERE {}={}",
                dialect.quote_ident(column),
                dialect.param(column)
            ));
            params.push((dialect.param(column), value.clone()));
        }
    }

    if let Some(order) = order {
        schema.require_column(&order.column)?;
        sql.push_str(&format!(
            " ORDER BY {} {}",
            dialect.quote_ident(&order.column),
            if order.descending { "DESC" } else { "ASC" }
        ));
    }

    Ok(Statement { sql, params })
}

/// `SELECT <all columns> FROM "T" WHERE <filter>`
pub fn select_where(dialect: Dialect, schema: &TableSchema, filter: &str) -> String {
    format!("{} WHERE {}", select_prefix(dialect, schema), filter)
}

/// `SELECT "Col" FROM "T"`
pub fn select_column(dialect: Dialect, table: &str, column: &str) -> String {
    format!(
        "SELECT {} FROM {}",
        dialect.quote_ident(column),
        dialect.quote_ident(table)
    )
}
