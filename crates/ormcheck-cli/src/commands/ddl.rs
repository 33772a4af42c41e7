//! DDL command
//!
//! Usage: ormcheck ddl [--dialect <NAME>] [--table <NAME>]

use clap::Args;
use ormcheck_core::dialect::Dialect;
use ormcheck_core::model::{
    AllTypes, Company, Point, TypeWithFlagsEnum, UserAuth, WithAListOfGuids,
};
use ormcheck_core::schema::{Table, TableSchema};

#[derive(Debug, Args)]
pub struct DdlArgs {
    /// Dialect to render for
    #[arg(short, long, default_value = "sqlite")]
    pub dialect: String,

    /// Only render this table
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Every table the scenario suite creates, parents before children
fn all_schemas() -> Vec<TableSchema> {
    vec![
        AllTypes::schema(),
        Point::schema(),
        Company::schema(),
        UserAuth::schema(),
        TypeWithFlagsEnum::schema(),
        WithAListOfGuids::schema(),
    ]
}

fn terminated(statement: &str) -> String {
    if statement.ends_with(';') {
        statement.to_string()
    } else {
        format!("{};", statement)
    }
}

/// Execute ddl command
pub fn execute(args: DdlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dialect: Dialect = args.dialect.parse()?;

    let schemas: Vec<TableSchema> = all_schemas()
        .into_iter()
        .filter(|s| args.table.as_deref().map_or(true, |t| s.name == t))
        .collect();
    if schemas.is_empty() {
        return Err(format!("unknown table '{}'", args.table.unwrap_or_default()).into());
    }

    for schema in &schemas {
        schema.check_capabilities(&dialect.capabilities())?;
        println!("{}", terminated(&dialect.render_drop_table(&schema.name)));
        for statement in dialect.render_create_table(schema) {
            println!("{}", terminated(&statement));
        }
        println!();
    }
    Ok(())
}
