//! The expense model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, group::MemberId, month::MonthKey};

pub type ExpenseId = i64;

/// The spending categories shared expenses are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Housing,
    Utilities,
    Daily,
    Travel,
    Entertainment,
    Other,
}

impl Category {
    /// Every category, in the order it is shown in selects and on the budgets
    /// page.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Housing,
        Category::Utilities,
        Category::Daily,
        Category::Travel,
        Category::Entertainment,
        Category::Other,
    ];

    /// The stable identifier stored in the database and used in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Daily => "daily",
            Category::Travel => "travel",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// The human-readable name shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Daily => "Daily goods",
            Category::Travel => "Travel",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A shared expense paid by one member on behalf of the household.
///
/// Amounts are whole yen. There are no fractional amounts anywhere in the
/// application, which keeps settlement arithmetic exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount paid in whole yen. Never negative.
    pub amount: i64,
    /// The day the expense occurred.
    pub date: Date,
    /// The spending category.
    pub category: Category,
    /// What the expense was for.
    pub description: Option<String>,
    /// Where the money was spent.
    pub shop: Option<String>,
    /// The member who paid.
    pub payer_id: MemberId,
}

/// The fields needed to create or update an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDetails {
    /// The amount paid in whole yen.
    pub amount: i64,
    /// The day the expense occurred.
    pub date: Date,
    /// The spending category.
    pub category: Category,
    /// What the expense was for.
    pub description: Option<String>,
    /// Where the money was spent.
    pub shop: Option<String>,
    /// The member who paid.
    pub payer_id: MemberId,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            shop TEXT,
            payer_id INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

pub fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(3)?;
    let category = Category::from_str(&raw_category).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown expense category {raw_category:?}").into(),
        )
    })?;

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        category,
        description: row.get(4)?,
        shop: row.get(5)?,
        payer_id: row.get(6)?,
    })
}

fn validate(details: &ExpenseDetails, connection: &Connection) -> Result<(), Error> {
    if details.amount < 0 {
        return Err(Error::InvalidAmount(details.amount));
    }

    crate::group::get_member(details.payer_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidPayer(details.payer_id),
        error => error,
    })?;

    Ok(())
}

/// Record a new expense.
///
/// # Errors
/// This function will return an error if:
/// - the amount is negative,
/// - the payer is not a member of the household,
/// - or there is an SQL error.
pub fn create_expense(details: ExpenseDetails, connection: &Connection) -> Result<Expense, Error> {
    validate(&details, connection)?;

    connection.execute(
        "INSERT INTO expense (amount, date, category, description, shop, payer_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            details.amount,
            details.date,
            details.category.as_str(),
            details.description,
            details.shop,
            details.payer_id,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        amount: details.amount,
        date: details.date,
        category: details.category,
        description: details.description,
        shop: details.shop,
        payer_id: details.payer_id,
    })
}

/// Get an expense by its `id`.
///
/// # Errors
/// This function will return an error if the expense does not exist or there
/// is an SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, amount, date, category, description, shop, payer_id
                FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_expense)
        .map_err(|error| error.into())
}

/// Overwrite an existing expense.
///
/// # Errors
/// This function will return an error if:
/// - the amount is negative,
/// - the payer is not a member of the household,
/// - the expense does not exist,
/// - or there is an SQL error.
pub fn update_expense(
    id: ExpenseId,
    details: ExpenseDetails,
    connection: &Connection,
) -> Result<(), Error> {
    validate(&details, connection)?;

    let rows_affected = connection.execute(
        "UPDATE expense
            SET amount = ?1, date = ?2, category = ?3, description = ?4, shop = ?5, payer_id = ?6
            WHERE id = ?7",
        params![
            details.amount,
            details.date,
            details.category.as_str(),
            details.description,
            details.shop,
            details.payer_id,
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense.
///
/// # Errors
/// This function will return an error if the expense does not exist or there
/// is an SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Get the expenses within `month`, newest first, optionally narrowed to one
/// category.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_expenses_for_month(
    month: MonthKey,
    category: Option<Category>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let start = month.first_day();
    let end = month.last_day();

    let mut stmt = match category {
        Some(_) => connection.prepare(
            "SELECT id, amount, date, category, description, shop, payer_id
                FROM expense
                WHERE date BETWEEN :start AND :end AND category = :category
                ORDER BY date DESC, id DESC",
        )?,
        None => connection.prepare(
            "SELECT id, amount, date, category, description, shop, payer_id
                FROM expense
                WHERE date BETWEEN :start AND :end
                ORDER BY date DESC, id DESC",
        )?,
    };

    let rows = match category {
        Some(category) => stmt.query_map(
            &[
                (":start", &start as &dyn rusqlite::ToSql),
                (":end", &end),
                (":category", &category.as_str()),
            ],
            map_row_to_expense,
        )?,
        None => stmt.query_map(
            &[
                (":start", &start as &dyn rusqlite::ToSql),
                (":end", &end),
            ],
            map_row_to_expense,
        )?,
    };

    rows.map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Sum the expenses within `month` per category. Categories with no spending
/// are absent from the result.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_spending_by_category(
    month: MonthKey,
    connection: &Connection,
) -> Result<Vec<(Category, i64)>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) FROM expense
                WHERE date BETWEEN :start AND :end
                GROUP BY category",
        )?
        .query_map(
            &[
                (":start", &month.first_day() as &dyn rusqlite::ToSql),
                (":end", &month.last_day()),
            ],
            |row| {
                let raw_category: String = row.get(0)?;
                let total: i64 = row.get(1)?;
                Ok((raw_category, total))
            },
        )?
        .map(|maybe_row| {
            let (raw_category, total) = maybe_row?;
            let category = Category::from_str(&raw_category)?;
            Ok((category, total))
        })
        .collect()
}


#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        group::{add_member, create_member_table},
        month::MonthKey,
    };

    use super::{
        Category, ExpenseDetails, create_expense, create_expense_table, delete_expense,
        get_expense, get_expenses_for_month, get_spending_by_category, update_expense,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_member_table(&connection).expect("Could not create member table");
        create_expense_table(&connection).expect("Could not create expense table");
        connection
    }

    fn details(amount: i64, payer_id: i64) -> ExpenseDetails {
        ExpenseDetails {
            amount,
            date: date!(2025 - 08 - 05),
            category: Category::Food,
            description: Some("Groceries".to_string()),
            shop: None,
            payer_id,
        }
    }

    #[test]
    fn create_expense_succeeds() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let expense =
            create_expense(details(1200, member.id), &connection).expect("Could not create");

        assert!(expense.id > 0);
        assert_eq!(expense.amount, 1200);
        assert_eq!(expense.payer_id, member.id);
        assert_eq!(Ok(expense), get_expense(1, &connection));
    }

    #[test]
    fn create_expense_rejects_negative_amount() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let result = create_expense(details(-1, member.id), &connection);

        assert_eq!(result, Err(Error::InvalidAmount(-1)));
    }

    #[test]
    fn create_expense_rejects_unknown_payer() {
        let connection = get_test_connection();

        let result = create_expense(details(1200, 42), &connection);

        assert_eq!(result, Err(Error::InvalidPayer(42)));
    }

    #[test]
    fn update_expense_succeeds() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();
        let expense = create_expense(details(1200, member.id), &connection).unwrap();

        let mut updated = details(800, member.id);
        updated.category = Category::Daily;
        update_expense(expense.id, updated, &connection).expect("Could not update");

        let got = get_expense(expense.id, &connection).unwrap();
        assert_eq!(got.amount, 800);
        assert_eq!(got.category, Category::Daily);
    }

    #[test]
    fn update_missing_expense_returns_error() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let result = update_expense(999, details(800, member.id), &connection);

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_expense_succeeds() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();
        let expense = create_expense(details(1200, member.id), &connection).unwrap();

        let result = delete_expense(expense.id, &connection);

        assert_eq!(result, Ok(()));
        assert_eq!(get_expense(expense.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_expense_returns_error() {
        let connection = get_test_connection();

        let result = delete_expense(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingExpense));
    }

    #[test]
    fn month_filter_excludes_other_months() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let mut in_month = details(1000, member.id);
        in_month.date = date!(2025 - 08 - 31);
        let in_month = create_expense(in_month, &connection).unwrap();

        let mut out_of_month = details(2000, member.id);
        out_of_month.date = date!(2025 - 09 - 01);
        create_expense(out_of_month, &connection).unwrap();

        let month = MonthKey::new(2025, time::Month::August);
        let expenses = get_expenses_for_month(month, None, &connection).unwrap();

        assert_eq!(expenses, vec![in_month]);
    }

    #[test]
    fn category_filter_narrows_results() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let food = create_expense(details(1000, member.id), &connection).unwrap();
        let mut travel = details(5000, member.id);
        travel.category = Category::Travel;
        create_expense(travel, &connection).unwrap();

        let month = MonthKey::new(2025, time::Month::August);
        let expenses =
            get_expenses_for_month(month, Some(Category::Food), &connection).unwrap();

        assert_eq!(expenses, vec![food]);
    }

    #[test]
    fn expenses_are_newest_first() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        let mut early = details(100, member.id);
        early.date = date!(2025 - 08 - 01);
        let early = create_expense(early, &connection).unwrap();

        let mut late = details(200, member.id);
        late.date = date!(2025 - 08 - 20);
        let late = create_expense(late, &connection).unwrap();

        let month = MonthKey::new(2025, time::Month::August);
        let expenses = get_expenses_for_month(month, None, &connection).unwrap();

        assert_eq!(expenses, vec![late, early]);
    }

    #[test]
    fn spending_by_category_sums_within_month() {
        let connection = get_test_connection();
        let member = add_member(Some("Aki"), &connection).unwrap();

        create_expense(details(1000, member.id), &connection).unwrap();
        create_expense(details(500, member.id), &connection).unwrap();
        let mut travel = details(8000, member.id);
        travel.category = Category::Travel;
        create_expense(travel, &connection).unwrap();

        let month = MonthKey::new(2025, time::Month::August);
        let mut spending = get_spending_by_category(month, &connection).unwrap();
        spending.sort_by_key(|(category, _)| category.as_str());

        assert_eq!(
            spending,
            vec![(Category::Food, 1500), (Category::Travel, 8000)]
        );
    }
}
