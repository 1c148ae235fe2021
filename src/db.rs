//! Database initialization. Each feature module owns its table DDL; this
//! module runs them all inside one transaction.

use rusqlite::Connection;

use crate::{
    Error,
    budget::create_budget_table,
    expense::create_expense_table,
    group::{create_household_table, create_member_table},
};

/// Create the application's tables if they do not exist yet.
///
/// # Errors
/// Returns an error if any of the DDL statements fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        rusqlite::Transaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_member_table(&transaction)?;
    create_household_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                    AND name IN ('member', 'household', 'expense', 'budget')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 4);
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("First initialization failed");
        initialize(&connection).expect("Second initialization failed");
    }
}
