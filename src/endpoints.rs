//! The application's URIs.
//!
//! For endpoints that take a parameter, e.g. '/expenses/{expense_id}/edit',
//! use [format_endpoint].

/// The root route, which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page: settlement plan and balances for the month.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the month's expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page showing category budgets against the month's spending.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for managing the household, its members, and the split policy.
pub const SETTINGS_VIEW: &str = "/settings";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to record an expense.
pub const POST_EXPENSE: &str = "/api/expenses";
/// The route to update an expense.
pub const PUT_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to set a category budget for a month.
pub const POST_BUDGET: &str = "/api/budgets";
/// The route to create the household.
pub const POST_HOUSEHOLD: &str = "/api/household";
/// The route to rename the household.
pub const PUT_HOUSEHOLD: &str = "/api/household";
/// The route to change the split policy.
pub const PUT_SPLIT_POLICY: &str = "/api/household/split";
/// The route to add a member to the roster.
pub const POST_MEMBER: &str = "/api/members";
/// The route to remove a member from the roster.
pub const DELETE_MEMBER: &str = "/api/members/{member_id}";

/// Replace the braced parameter in `endpoint_path` with `id`.
///
/// Paths are assumed to contain at most one parameter. A path without one is
/// returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{}{}", &endpoint_path[..start], id, &endpoint_path[end..])
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_EXPENSE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_EXPENSE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SETTINGS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::POST_EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::PUT_EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::DELETE_EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::POST_BUDGET);
        assert_endpoint_is_valid_uri(endpoints::POST_HOUSEHOLD);
        assert_endpoint_is_valid_uri(endpoints::PUT_SPLIT_POLICY);
        assert_endpoint_is_valid_uri(endpoints::POST_MEMBER);
        assert_endpoint_is_valid_uri(endpoints::DELETE_MEMBER);
    }

    #[test]
    fn substitutes_the_parameter() {
        let formatted_path = format_endpoint("/expenses/{expense_id}/edit", 7);

        assert_eq!(formatted_path, "/expenses/7/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/expenses", 7);

        assert_eq!(formatted_path, "/expenses");
    }

    #[test]
    fn trailing_parameter_is_replaced() {
        let formatted_path = format_endpoint("/api/members/{member_id}", 3);

        assert_eq!(formatted_path, "/api/members/3");
    }
}
