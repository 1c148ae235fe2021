//! The household and its member roster.
//!
//! The application manages exactly one household (the group sharing expenses).
//! Members are plain roster entries rather than user accounts; identity and
//! sign-in live outside this deployment.

use rusqlite::{Connection, Row};

use crate::Error;

pub type MemberId = i64;
pub type HouseholdId = i64;

/// Shown wherever a member has no display name.
pub const UNNAMED_MEMBER_LABEL: &str = "Unnamed";

/// A participant in the household's shared expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The ID of the member.
    pub id: MemberId,
    /// The member's display name. Optional, some people never fill it in.
    pub name: Option<String>,
}

impl Member {
    /// The name to display for this member, falling back to
    /// [UNNAMED_MEMBER_LABEL] when none was set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_MEMBER_LABEL)
    }
}

/// The single group sharing expenses, along with its split policy.
///
/// `split_ratio` is the percentage of shared costs borne by the member
/// `ratio_holder_id` when the roster has exactly two members. Without a ratio
/// holder (or with any other roster size) costs are split evenly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Household {
    /// The ID of the household row.
    pub id: HouseholdId,
    /// The household's name, e.g. "The Tanakas".
    pub name: String,
    /// The member the split ratio applies to, if one is designated.
    pub ratio_holder_id: Option<MemberId>,
    /// The ratio holder's share of shared costs as a percentage in [0, 100].
    pub split_ratio: u8,
}

pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            name TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn create_household_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS household (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            ratio_holder_id INTEGER,
            split_ratio INTEGER NOT NULL DEFAULT 50
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_member(row: &Row) -> Result<Member, rusqlite::Error> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn map_row_to_household(row: &Row) -> Result<Household, rusqlite::Error> {
    Ok(Household {
        id: row.get(0)?,
        name: row.get(1)?,
        ratio_holder_id: row.get(2)?,
        split_ratio: row.get(3)?,
    })
}

/// Get the household, or `None` if it has not been set up yet.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_household(connection: &Connection) -> Result<Option<Household>, Error> {
    let mut stmt = connection.prepare(
        "SELECT id, name, ratio_holder_id, split_ratio FROM household ORDER BY id LIMIT 1",
    )?;
    let mut rows = stmt.query([])?;

    match rows.next()? {
        Some(row) => Ok(Some(map_row_to_household(row)?)),
        None => Ok(None),
    }
}

/// Create the household.
///
/// # Errors
/// This function will return an error if:
/// - `name` is empty or only whitespace,
/// - a household already exists,
/// - or there is an SQL error.
pub fn create_household(name: &str, connection: &Connection) -> Result<Household, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyHouseholdName);
    }

    if get_household(connection)?.is_some() {
        return Err(Error::HouseholdAlreadyExists);
    }

    connection.execute("INSERT INTO household (name) VALUES (?1)", (name,))?;

    let id = connection.last_insert_rowid();

    Ok(Household {
        id,
        name: name.to_string(),
        ratio_holder_id: None,
        split_ratio: 50,
    })
}

/// Rename the household.
///
/// # Errors
/// This function will return an error if the new name is empty, no household
/// exists, or there is an SQL error.
pub fn rename_household(
    id: HouseholdId,
    name: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyHouseholdName);
    }

    let rows_affected =
        connection.execute("UPDATE household SET name = ?1 WHERE id = ?2", (name, id))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Set the split policy: which member the ratio applies to and their share.
///
/// Passing `ratio_holder_id = None` reverts to an even split.
///
/// # Errors
/// This function will return an error if:
/// - `split_ratio` is not in [0, 100],
/// - `ratio_holder_id` does not refer to a member,
/// - no household exists,
/// - or there is an SQL error.
pub fn update_split_policy(
    id: HouseholdId,
    ratio_holder_id: Option<MemberId>,
    split_ratio: i64,
    connection: &Connection,
) -> Result<(), Error> {
    if !(0..=100).contains(&split_ratio) {
        return Err(Error::InvalidRatio(split_ratio));
    }

    if let Some(member_id) = ratio_holder_id
        && get_member(member_id, connection).is_err()
    {
        return Err(Error::NotFound);
    }

    let rows_affected = connection.execute(
        "UPDATE household SET ratio_holder_id = ?1, split_ratio = ?2 WHERE id = ?3",
        (ratio_holder_id, split_ratio, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Add a member to the roster. A blank name is stored as no name.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn add_member(name: Option<&str>, connection: &Connection) -> Result<Member, Error> {
    let name = name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    connection.execute("INSERT INTO member (name) VALUES (?1)", (&name,))?;

    let id = connection.last_insert_rowid();

    Ok(Member { id, name })
}

/// Get a member by their `id`.
///
/// # Errors
/// This function will return an error if the member does not exist or there is
/// an SQL error.
pub fn get_member(id: MemberId, connection: &Connection) -> Result<Member, Error> {
    connection
        .prepare("SELECT id, name FROM member WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_member)
        .map_err(|error| error.into())
}

/// Get the member roster in insertion order.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_members(connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare("SELECT id, name FROM member ORDER BY id ASC")?
        .query_map([], map_row_to_member)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Remove a member from the roster.
///
/// The member's expenses are kept; their amounts simply stop counting towards
/// settlement. If the member was the ratio holder, the household reverts to an
/// even split.
///
/// # Errors
/// This function will return an error if the member does not exist or there is
/// an SQL error.
pub fn remove_member(id: MemberId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM member WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingMember);
    }

    connection.execute(
        "UPDATE household SET ratio_holder_id = NULL WHERE ratio_holder_id = ?1",
        [id],
    )?;

    Ok(())
}


#[cfg(test)]
mod household_tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{
        add_member, create_household, create_household_table, create_member_table, get_household,
        remove_member, rename_household, update_split_policy,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_member_table(&connection).expect("Could not create member table");
        create_household_table(&connection).expect("Could not create household table");
        connection
    }

    #[test]
    fn create_household_succeeds() {
        let connection = get_test_connection();

        let household =
            create_household("The Tanakas", &connection).expect("Could not create household");

        assert!(household.id > 0);
        assert_eq!(household.name, "The Tanakas");
        assert_eq!(household.ratio_holder_id, None);
        assert_eq!(household.split_ratio, 50);
    }

    #[test]
    fn create_household_fails_on_empty_name() {
        let connection = get_test_connection();

        let result = create_household("   ", &connection);

        assert_eq!(result, Err(Error::EmptyHouseholdName));
    }

    #[test]
    fn create_household_fails_when_one_exists() {
        let connection = get_test_connection();
        create_household("First", &connection).unwrap();

        let result = create_household("Second", &connection);

        assert_eq!(result, Err(Error::HouseholdAlreadyExists));
    }

    #[test]
    fn get_household_returns_none_before_setup() {
        let connection = get_test_connection();

        let household = get_household(&connection).expect("Could not query household");

        assert_eq!(household, None);
    }

    #[test]
    fn rename_household_succeeds() {
        let connection = get_test_connection();
        let household = create_household("Old Name", &connection).unwrap();

        rename_household(household.id, "New Name", &connection).expect("Could not rename");

        let got = get_household(&connection).unwrap().unwrap();
        assert_eq!(got.name, "New Name");
    }

    #[test]
    fn update_split_policy_succeeds() {
        let connection = get_test_connection();
        let household = create_household("The Tanakas", &connection).unwrap();
        let member = add_member(Some("Aki"), &connection).unwrap();

        update_split_policy(household.id, Some(member.id), 70, &connection)
            .expect("Could not update split policy");

        let got = get_household(&connection).unwrap().unwrap();
        assert_eq!(got.ratio_holder_id, Some(member.id));
        assert_eq!(got.split_ratio, 70);
    }

    #[test]
    fn update_split_policy_rejects_ratio_over_100() {
        let connection = get_test_connection();
        let household = create_household("The Tanakas", &connection).unwrap();

        let result = update_split_policy(household.id, None, 101, &connection);

        assert_eq!(result, Err(Error::InvalidRatio(101)));
    }

    #[test]
    fn update_split_policy_rejects_unknown_member() {
        let connection = get_test_connection();
        let household = create_household("The Tanakas", &connection).unwrap();

        let result = update_split_policy(household.id, Some(999), 60, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn removing_ratio_holder_reverts_to_even_split() {
        let connection = get_test_connection();
        let household = create_household("The Tanakas", &connection).unwrap();
        let member = add_member(Some("Aki"), &connection).unwrap();
        update_split_policy(household.id, Some(member.id), 70, &connection).unwrap();

        remove_member(member.id, &connection).expect("Could not remove member");

        let got = get_household(&connection).unwrap().unwrap();
        assert_eq!(got.ratio_holder_id, None);
    }
}
