//! Defines the settings page: household setup, the member roster, and the
//! split policy.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    group::{Household, Member, get_household, get_members},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the settings page.
#[derive(Debug, Clone)]
pub struct SettingsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLock)?;

    let household = get_household(&connection)?;
    let members = get_members(&connection)?;

    Ok(settings_view(household.as_ref(), &members).into_response())
}

fn settings_view(household: Option<&Household>, members: &[Member]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col items-center gap-6 px-6 py-4 mx-auto max-w-md text-gray-900 dark:text-white"
        {
            @match household {
                Some(household) => {
                    (household_card(household))
                    (members_card(members))
                    (split_policy_card(household, members))
                }
                None => {
                    (create_household_card())
                }
            }
        }
    };

    base("Settings", &content)
}

fn create_household_card() -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "Set up your household" }

            form
                hx-post=(endpoints::POST_HOUSEHOLD)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Household name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="The Tanakas"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Household" }
            }
        }
    }
}

fn household_card(household: &Household) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "Household" }

            form
                hx-put=(endpoints::PUT_HOUSEHOLD)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        value=(household.name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Rename" }
            }
        }
    }
}

fn members_card(members: &[Member]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "Members" }

            @if members.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400 mb-3" { "No members yet." }
            } @else {
                ul class="mb-3 divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for member in members {
                        li class="flex items-center justify-between py-2"
                        {
                            span { (member.display_name()) }

                            button
                                class=(BUTTON_DELETE_STYLE)
                                hx-delete=(endpoints::format_endpoint(endpoints::DELETE_MEMBER, member.id))
                                hx-target="closest li"
                                hx-swap="outerHTML"
                                hx-target-error="#alert-container"
                                hx-confirm="Remove this member? Their recorded expenses stop counting towards settlement."
                            {
                                "Remove"
                            }
                        }
                    }
                }
            }

            form
                hx-post=(endpoints::POST_MEMBER)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="member_name" class=(FORM_LABEL_STYLE) { "Name (optional)" }

                    input
                        id="member_name"
                        type="text"
                        name="name"
                        placeholder="Aki"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Member" }
            }
        }
    }
}

fn split_policy_card(household: &Household, members: &[Member]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-lg font-semibold mb-3" { "Split policy" }

            p class="text-sm text-gray-500 dark:text-gray-400 mb-3"
            {
                "The custom ratio applies while the household has exactly two members. \
                Otherwise costs are split evenly."
            }

            form
                hx-put=(endpoints::PUT_SPLIT_POLICY)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="ratio_holder" class=(FORM_LABEL_STYLE) { "Who bears the ratio" }

                    select id="ratio_holder" name="ratio_holder" class=(FORM_SELECT_STYLE)
                    {
                        option value="none" selected[household.ratio_holder_id.is_none()]
                        {
                            "No one (even split)"
                        }

                        @for member in members {
                            option
                                value=(member.id)
                                selected[household.ratio_holder_id == Some(member.id)]
                            {
                                (member.display_name())
                            }
                        }
                    }
                }

                div
                {
                    label for="split_ratio" class=(FORM_LABEL_STYLE) { "Their share (%)" }

                    input
                        id="split_ratio"
                        type="number"
                        name="split_ratio"
                        min="0"
                        max="100"
                        step="1"
                        value=(household.split_ratio)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Split Policy" }
            }
        }
    }
}
