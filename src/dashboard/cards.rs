//! Card components for the dashboard: the settlement plan, balance details,
//! the split ratio, and the monthly total.

use maud::{Markup, html};

use crate::{
    html::{CARD_STYLE, format_signed_yen, format_yen},
    month::MonthKey,
    settlement::{MemberBalance, Transfer},
};

/// Look up a member's display name in the computed balances. Transfers only
/// ever point at members with a balance, but fall back rather than panic.
fn member_name<'a>(balances: &'a [MemberBalance], member_id: i64) -> &'a str {
    balances
        .iter()
        .find(|balance| balance.member_id == member_id)
        .map(|balance| balance.display_name.as_str())
        .unwrap_or("Unknown")
}

/// Renders the "who pays whom" card.
pub(super) fn settlement_plan_card(
    month: MonthKey,
    transfers: &[Transfer],
    balances: &[MemberBalance],
) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3"
            {
                "Settlement plan (" (month.label()) ")"
            }

            @if transfers.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nothing to settle 🎉" }
            } @else {
                div class="flex flex-col gap-2"
                {
                    @for transfer in transfers {
                        div class="flex items-center justify-between"
                        {
                            div class="flex items-center gap-2"
                            {
                                span class="font-medium" { (member_name(balances, transfer.from)) }
                                span class="text-gray-400" { "→" }
                                span class="font-medium" { (member_name(balances, transfer.to)) }
                            }

                            span class="font-semibold" { (format_yen(transfer.amount)) }
                        }
                    }
                }

                p class="mt-3 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Pay these and everyone is even."
                }
            }
        }
    }
}

/// Renders the per-member paid/target/balance breakdown.
pub(super) fn balance_details_card(balances: &[MemberBalance]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "Balance details" }

            div class="flex flex-col gap-3"
            {
                @for balance in balances {
                    div class="flex items-start justify-between"
                    {
                        span class="font-medium" { (balance.display_name) }

                        div class="text-right text-sm"
                        {
                            div class="text-gray-500 dark:text-gray-400"
                            {
                                "paid " (format_yen(balance.paid))
                            }

                            div class="text-gray-500 dark:text-gray-400"
                            {
                                "owes " (format_yen(balance.target))
                            }

                            @let style = if balance.balance >= 0 {
                                "text-green-600 dark:text-green-400 font-semibold"
                            } else {
                                "text-red-600 dark:text-red-400 font-semibold"
                            };

                            div class=(style) { (format_signed_yen(balance.balance)) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the ratio card. Only shown when a custom ratio is active.
pub(super) fn ratio_card(holder_name: &str, holder_percent: u8) -> Markup {
    let partner_percent = 100 - holder_percent;

    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "⚖️ Split ratio" }

            div class="flex items-center gap-2"
            {
                span { (holder_name) ": " (holder_percent) "%" }
                span class="text-gray-400" { ":" }
                span { (partner_percent) "%" }
            }
        }
    }
}

/// Renders the month's total spending.
pub(super) fn total_card(month: MonthKey, total: i64) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-1"
            {
                "Household total (" (month) ")"
            }

            p class="text-3xl font-bold" { (format_yen(total)) }
        }
    }
}
