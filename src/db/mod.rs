//! Persistence split into one submodule per table. Every function takes a
//! borrowed connection and runs a single statement (or a short loop of them),
//! so callers decide when to open and close the database.

mod connection;
mod item_lists;
mod items;
mod memberships;
mod settings;

pub use connection::{ensure_schema, open, open_in_memory};
pub use item_lists::{
    create_item_list, delete_all_item_lists, delete_item_list, fetch_item_list,
    fetch_item_list_by_name, fetch_item_lists, rename_item_list, seed_default_item_lists,
    DEFAULT_ITEM_LIST_NAMES,
};
pub use items::{
    create_item, delete_all_items, delete_item, fetch_item, fetch_item_by_name, fetch_items,
    fetch_or_create_item, rename_item, seed_default_items, DEFAULT_ITEM_NAMES,
};
pub use memberships::{
    add_item_to_list, delete_all_memberships, fetch_item_ids_for_list, fetch_items_for_list,
    fetch_items_not_in_list, fetch_membership, fetch_memberships, remove_item_from_list,
};
pub use settings::{
    create_setting, delete_all_settings, delete_setting, fetch_setting, fetch_setting_by_name,
    fetch_settings, update_setting,
};
