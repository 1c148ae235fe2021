mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod expenses_page;
mod form;

pub use core::{
    Category, Expense, ExpenseDetails, ExpenseId, create_expense, create_expense_table,
    delete_expense, get_expense, get_expenses_for_month, get_spending_by_category,
    map_row_to_expense, update_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use edit_page::get_edit_expense_page;
pub use expenses_page::get_expenses_page;
