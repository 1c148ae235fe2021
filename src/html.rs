use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};

use crate::{endpoints, expense::Category, month::MonthKey};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_SELECT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 border \
    border-gray-300 dark:border-gray-600 focus:ring-blue-600 \
    focus:border-blue-600";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Card container
pub const CARD_STYLE: &str = "w-full bg-white dark:bg-gray-800 border \
    border-gray-200 dark:border-gray-700 rounded-lg p-4 shadow-md";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Warikan" }
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-8"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &content)
}

/// Format a whole-yen amount, e.g. `-12345` as "-¥12,345".
pub fn format_yen(amount: i64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let formatter = FMT.get_or_init(|| {
        Formatter::currency("¥")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    if amount < 0 {
        // numfmt's prefix sits between the sign and the digits otherwise.
        format!("-{}", formatter.fmt_string(amount.abs()))
    } else if amount > 0 {
        formatter.fmt_string(amount)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "¥0".to_owned()
    }
}

/// Format a balance with an explicit sign, e.g. "+¥200" / "-¥200" / "±¥0".
pub fn format_signed_yen(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_yen(amount))
    } else if amount == 0 {
        format!("±{}", format_yen(0))
    } else {
        format_yen(amount)
    }
}

/// Previous/next month navigation, preserving the category filter.
pub fn month_nav(view_endpoint: &str, month: MonthKey, category: Option<Category>) -> Markup {
    let filter_query = |month: MonthKey| -> String {
        match category {
            Some(category) => format!("{view_endpoint}?month={month}&category={category}"),
            None => format!("{view_endpoint}?month={month}"),
        }
    };

    html! {
        div class="flex items-center justify-center gap-4 my-4"
        {
            a href=(filter_query(month.previous())) class=(LINK_STYLE) { "← previous" }

            span class="text-lg font-semibold" { (month.label()) }

            a href=(filter_query(month.next())) class=(LINK_STYLE) { "next →" }
        }
    }
}

/// Category filter links: "All" plus one link per category.
pub fn category_filter(
    view_endpoint: &str,
    month: MonthKey,
    selected: Option<Category>,
) -> Markup {
    let link_style = |is_current: bool| -> &'static str {
        if is_current {
            "px-2.5 py-1 rounded-full text-xs font-semibold bg-blue-600 text-white"
        } else {
            "px-2.5 py-1 rounded-full text-xs font-semibold bg-gray-200 \
            text-gray-700 hover:bg-blue-100 dark:bg-gray-700 dark:text-gray-300"
        }
    };

    html! {
        div class="flex flex-wrap items-center justify-center gap-2 mb-4"
        {
            a
                href=(format!("{view_endpoint}?month={month}"))
                class=(link_style(selected.is_none()))
            {
                "All"
            }

            @for category in Category::ALL {
                a
                    href=(format!("{view_endpoint}?month={month}&category={category}"))
                    class=(link_style(selected == Some(category)))
                {
                    (category.label())
                }
            }
        }
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}

/// The markup for a page telling the user to set up their household first.
pub fn household_setup_prompt() -> Markup {
    html! {
        div class="flex flex-col items-center gap-2 py-16 text-center"
        {
            p class="text-xl font-semibold" { "Welcome to Warikan" }

            p
            {
                "Set up your household and add its members in the "
                (link(endpoints::SETTINGS_VIEW, "settings"))
                " to start tracking shared expenses."
            }
        }
    }
}
