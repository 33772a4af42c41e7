//! Round-trip fidelity checker
//!
//! Typed persist / fetch / update over a [`Backend`], plus verification that
//! what came back is structurally equal to what went in. Every operation is
//! logged with its table and the checker's run id.

use crate::backend::{Backend, Order, Predicate};
use crate::errors::Result;
use crate::sqlite::open_backend;
use ormcheck_core::config::HarnessConfig;
use ormcheck_core::core_types::RunId;
use ormcheck_core::equality::StructuralEq;
use ormcheck_core::errors::{not_found, ExError, ExErrorKind};
use ormcheck_core::schema::{Table, TableSchema};
use ormcheck_core::value::SqlValue;
use ormcheck_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

pub struct RoundTripChecker {
    backend: Box<dyn Backend>,
    run_id: RunId,
}

fn primary_key_name(schema: &TableSchema) -> Result<String> {
    schema
        .primary_key()
        .map(|c| c.name.clone())
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Schema)
                .with_table(schema.name.clone())
                .with_message("table has no primary key")
        })
}

impl RoundTripChecker {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            run_id: RunId::new(),
        }
    }

    /// Open the configured backend and wrap it
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Ok(Self::new(open_backend(config)?))
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    /// Run one backend operation with start/end/error logging
    fn observed<R>(
        &mut self,
        op: &'static str,
        table: &str,
        rows: usize,
        f: impl FnOnce(&mut dyn Backend) -> Result<R>,
    ) -> Result<R> {
        let run_id = self.run_id.as_str().to_string();
        log_op_start!(op, table = table, rows = rows, run_id = run_id.as_str());
        let start = Instant::now();

        match f(self.backend.as_mut()) {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = table,
                    run_id = run_id.as_str()
                );
                Ok(value)
            }
            Err(err) => {
                let err = if err.op().is_some() {
                    err
                } else {
                    err.with_op(op)
                };
                log_op_error!(
                    op,
                    &err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = table,
                    run_id = run_id.as_str()
                );
                Err(err)
            }
        }
    }

    /// Drop and recreate the table for `T`
    pub fn recreate<T: Table>(&mut self) -> Result<()> {
        let schema = T::schema();
        self.observed("recreate", &schema.name, 0, |b| {
            b.drop_and_create_table(&schema)
        })
    }

    pub fn drop_table<T: Table>(&mut self) -> Result<()> {
        let schema = T::schema();
        self.observed("drop_table", &schema.name, 0, |b| {
            b.drop_table(&schema.name)
        })
    }

    pub fn create_table<T: Table>(&mut self) -> Result<()> {
        let schema = T::schema();
        self.observed("create_table", &schema.name, 0, |b| b.create_table(&schema))
    }

    /// Write all records in one batch
    pub fn persist<T: Table>(&mut self, records: &[T]) -> Result<usize> {
        let schema = T::schema();
        let rows = records
            .iter()
            .map(Table::to_row)
            .collect::<Result<Vec<_>>>()?;
        self.observed("persist", &schema.name, rows.len(), |b| {
            b.insert_batch(&schema, &rows)
        })
    }

    /// Write one record; returns the row id, backend-assigned for auto-increment keys
    pub fn insert<T: Table>(&mut self, record: &T) -> Result<i64> {
        let schema = T::schema();
        let row = record.to_row()?;
        self.observed("insert", &schema.name, 1, |b| b.insert(&schema, &row))
    }

    pub fn fetch_by_id<T: Table>(&mut self, id: impl Into<SqlValue>) -> Result<T> {
        let schema = T::schema();
        let predicate = Predicate::Eq {
            column: primary_key_name(&schema)?,
            value: id.into(),
        };
        let row = self.observed("fetch_by_id", &schema.name, 1, |b| {
            b.select_one(&schema, &predicate)
        })?;
        T::from_row(&row)
    }

    /// The single record whose `field` holds `value`
    ///
    /// `value` is the column encoding, as returned by [`Table::column_value`].
    pub fn fetch_by_field_equality<T: Table>(
        &mut self,
        field: &str,
        value: SqlValue,
    ) -> Result<T> {
        let schema = T::schema();
        let predicate = Predicate::Eq {
            column: field.to_string(),
            value,
        };
        let row = self.observed("fetch_by_field_equality", &schema.name, 1, |b| {
            b.select_one(&schema, &predicate)
        })?;
        T::from_row(&row)
    }

    /// Every record matching `predicate`, in `order`
    pub fn fetch_where<T: Table>(
        &mut self,
        predicate: &Predicate,
        order: Option<&Order>,
    ) -> Result<Vec<T>> {
        let schema = T::schema();
        let rows = self.observed("fetch_where", &schema.name, 0, |b| {
            b.select_many(&schema, predicate, order)
        })?;
        rows.iter().map(T::from_row).collect()
    }

    /// First record matching `predicate` in `order`; `NotFound` if none match
    pub fn fetch_first<T: Table>(&mut self, predicate: &Predicate, order: &Order) -> Result<T> {
        let schema = T::schema();
        self.fetch_where::<T>(predicate, Some(order))?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(&schema.name, predicate).with_op("fetch_first"))
    }

    /// Full replace by primary key; `NotFound` if no row has the key
    pub fn update<T: Table>(&mut self, record: &T) -> Result<()> {
        let schema = T::schema();
        let row = record.to_row()?;
        let pk = record.primary_key_value()?;
        let changed = self.observed("update", &schema.name, 1, |b| b.update_row(&schema, &row))?;
        if changed == 0 {
            let key = format!("primary key {}", pk);
            return Err(not_found(&schema.name, key).with_op("update"));
        }
        Ok(())
    }

    /// Update only `fields`, leaving every other column as stored
    pub fn update_only<T: Table>(&mut self, record: &T, fields: &[&str]) -> Result<()> {
        let schema = T::schema();
        let row = record.to_row()?;
        let pk = record.primary_key_value()?;
        let changed = self.observed("update_only", &schema.name, 1, |b| {
            b.update_only(&schema, &row, fields)
        })?;
        if changed == 0 {
            let key = format!("primary key {}", pk);
            return Err(not_found(&schema.name, key).with_op("update_only"));
        }
        Ok(())
    }

    /// Raw stored values of one column
    pub fn select_column<T: Table>(&mut self, column: &str) -> Result<Vec<SqlValue>> {
        let schema = T::schema();
        self.observed("select_column", &schema.name, 0, |b| {
            b.select_column(&schema.name, column)
        })
    }

    /// Records matching a raw filter fragment
    pub fn select_where_sql<T: Table>(
        &mut self,
        filter: &str,
        params: &[SqlValue],
    ) -> Result<Vec<T>> {
        let schema = T::schema();
        let rows = self.observed("select_where_sql", &schema.name, 0, |b| {
            b.select_where_sql(&schema, filter, params)
        })?;
        rows.iter().map(T::from_row).collect()
    }

    pub fn last_sql(&self) -> Option<&str> {
        self.backend.last_sql()
    }

    /// Compare what was written with what was read back
    ///
    /// A difference in a float or decimal column is `PrecisionLoss`; any
    /// other difference is `FieldMismatch`. Both carry the field path and
    /// the expected and actual renderings.
    pub fn verify<T: Table + StructuralEq>(&self, expected: &T, actual: &T) -> Result<()> {
        let Some(mismatch) = expected.first_mismatch(actual) else {
            return Ok(());
        };

        let schema = T::schema();
        let numeric = schema
            .find_column(mismatch.root())
            .is_some_and(|c| c.ty.is_numeric());
        let kind = if numeric {
            ExErrorKind::PrecisionLoss
        } else {
            ExErrorKind::FieldMismatch
        };

        let err = ExError::new(kind)
            .with_op("verify")
            .with_table(schema.name.clone())
            .with_field(mismatch.field)
            .with_expected(mismatch.expected)
            .with_actual(mismatch.actual)
            .with_message("value read back differs from value written");
        log_op_error!(
            "verify",
            &err,
            duration_ms = 0u64,
            table = schema.name.as_str(),
            run_id = self.run_id.as_str()
        );
        Err(err)
    }

    /// Fetch `expected` back by its primary key and verify it
    pub fn verify_round_trip<T: Table + StructuralEq>(&mut self, expected: &T) -> Result<T> {
        let actual = self.fetch_by_id::<T>(expected.primary_key_value()?)?;
        self.verify(expected, &actual)?;
        Ok(actual)
    }
}
