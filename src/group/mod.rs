mod core;
mod household_endpoints;
mod member_endpoints;
mod settings_page;

pub use core::{
    Household, HouseholdId, Member, MemberId, UNNAMED_MEMBER_LABEL, add_member,
    create_household, create_household_table, create_member_table, get_household, get_member,
    get_members, map_row_to_member, remove_member, rename_household, update_split_policy,
};
pub use household_endpoints::{
    create_household_endpoint, rename_household_endpoint, update_split_policy_endpoint,
};
pub use member_endpoints::{add_member_endpoint, remove_member_endpoint};
pub use settings_page::get_settings_page;
