//! The expense form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    expense::{Category, Expense, ExpenseDetails},
    group::{Member, MemberId},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
    },
};

/// The values pre-filled into the form.
pub(super) struct ExpenseFormValues {
    pub amount: Option<i64>,
    pub date: Date,
    pub category: Category,
    pub description: String,
    pub shop: String,
    pub payer_id: Option<MemberId>,
}

impl ExpenseFormValues {
    /// An empty form dated `today`.
    pub fn empty(today: Date) -> Self {
        Self {
            amount: None,
            date: today,
            category: Category::Food,
            description: String::new(),
            shop: String::new(),
            payer_id: None,
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            amount: Some(expense.amount),
            date: expense.date,
            category: expense.category,
            description: expense.description.clone().unwrap_or_default(),
            shop: expense.shop.clone().unwrap_or_default(),
            payer_id: Some(expense.payer_id),
        }
    }
}

/// Where the form submits to. Creating posts, editing puts.
pub(super) enum FormAction {
    Post(String),
    Put(String),
}

pub(super) fn expense_form_view(
    action: &FormAction,
    members: &[Member],
    values: &ExpenseFormValues,
    error_message: &str,
    submit_label: &str,
) -> Markup {
    let (post_url, put_url) = match action {
        FormAction::Post(url) => (Some(url.as_str()), None),
        FormAction::Put(url) => (None, Some(url.as_str())),
    };

    html! {
        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (yen)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0"
                    step="1"
                    value=[values.amount]
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="payer_id" class=(FORM_LABEL_STYLE) { "Paid by" }

                select id="payer_id" name="payer_id" required class=(FORM_SELECT_STYLE)
                {
                    @for member in members {
                        option
                            value=(member.id)
                            selected[values.payer_id == Some(member.id)]
                        {
                            (member.display_name())
                        }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_SELECT_STYLE)
                {
                    @for category in Category::ALL {
                        option
                            value=(category)
                            selected[values.category == category]
                        {
                            (category.label())
                        }
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="Weekly groceries"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="shop" class=(FORM_LABEL_STYLE) { "Shop (optional)" }

                input
                    id="shop"
                    type="text"
                    name="shop"
                    placeholder="Seiyu"
                    value=(values.shop)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

/// The form data posted when creating or editing an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseFormData {
    pub amount: i64,
    pub date: Date,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shop: String,
    pub payer_id: MemberId,
}

impl ExpenseFormData {
    pub(super) fn into_details(self) -> ExpenseDetails {
        let non_blank = |text: String| -> Option<String> {
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        };

        ExpenseDetails {
            amount: self.amount,
            date: self.date,
            category: self.category,
            description: non_blank(self.description),
            shop: non_blank(self.shop),
            payer_id: self.payer_id,
        }
    }
}
