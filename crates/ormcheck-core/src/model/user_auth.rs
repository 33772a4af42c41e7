use crate::codec::read_narrow;
use crate::equality::{compare, FieldMismatch, StructuralEq};
use crate::errors::Result;
use crate::schema::{ColumnDef, ColumnType, Table, TableSchema};
use crate::value::Row;

pub mod col {
    pub const ID: &str = "Id";
    pub const COMPANY_ID: &str = "CompanyId";
    pub const USER_NAME: &str = "UserName";
    pub const EMAIL: &str = "Email";
    pub const NAME: &str = "Name";
}

pub const COMPANY_TABLE: &str = "Company";

/// Custom user-auth record, stored under the `UserAuth` table alias
#[derive(Debug, Clone, PartialEq)]
pub struct UserAuth {
    pub id: i32,
    pub company_id: i64,
    pub user_name: String,
    pub email: String,
}

impl Table for UserAuth {
    fn schema() -> TableSchema {
        TableSchema::new("UserAuth")
            .column(ColumnDef::new(col::ID, ColumnType::Int32).auto_increment())
            .column(
                ColumnDef::new(col::COMPANY_ID, ColumnType::Int64)
                    .references(COMPANY_TABLE, col::ID),
            )
            .column(ColumnDef::new(col::USER_NAME, ColumnType::Text(None)).nullable())
            .column(ColumnDef::new(col::EMAIL, ColumnType::Text(None)).nullable())
            .composite_index(true, &[col::COMPANY_ID, col::USER_NAME])
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::ID, self.id)
            .with(col::COMPANY_ID, self.company_id)
            .with(col::USER_NAME, self.user_name.as_str())
            .with(col::EMAIL, self.email.as_str()))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: read_narrow(row, col::ID, "i32")?,
            company_id: row.integer(col::COMPANY_ID)?,
            user_name: row
                .opt_text(col::USER_NAME)?
                .unwrap_or_default()
                .to_string(),
            email: row.opt_text(col::EMAIL)?.unwrap_or_default().to_string(),
        })
    }
}

impl StructuralEq for UserAuth {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::ID, &self.id, &other.id)
            .or_else(|| compare(col::COMPANY_ID, &self.company_id, &other.company_id))
            .or_else(|| compare(col::USER_NAME, &self.user_name, &other.user_name))
            .or_else(|| compare(col::EMAIL, &self.email, &other.email))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: i32,
    pub name: String,
}

impl Table for Company {
    fn schema() -> TableSchema {
        TableSchema::new(COMPANY_TABLE)
            .column(ColumnDef::new(col::ID, ColumnType::Int32).primary_key())
            .column(ColumnDef::new(col::NAME, ColumnType::Text(None)).nullable())
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::ID, self.id)
            .with(col::NAME, self.name.as_str()))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: read_narrow(row, col::ID, "i32")?,
            name: row.opt_text(col::NAME)?.unwrap_or_default().to_string(),
        })
    }
}

impl StructuralEq for Company {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::ID, &self.id, &other.id)
            .or_else(|| compare(col::NAME, &self.name, &other.name))
    }
}
