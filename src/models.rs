//! Domain models that mirror the SQLite schema. They stay plain data holders
//! so the stores, the chooser and the TUI can pass them around freely.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single thing that can be chosen, e.g. a restaurant name.
pub struct Item {
    /// Primary key from the `items` table. Edit and delete flows hand it back
    /// to the store.
    pub id: i64,
    /// Unique display name.
    pub name: String,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named group of items the chooser can pick from.
pub struct ItemList {
    pub id: i64,
    /// Unique list name. Also what the settings remember as the default list.
    pub list_name: String,
}

impl fmt::Display for ItemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// "Item belongs to list". The pair is the whole record.
pub struct ListMembership {
    pub item_list_id: i64,
    pub item_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Key/value row from the `settings` table.
pub struct Setting {
    pub id: i64,
    pub name: String,
    /// `None` maps to SQL NULL, e.g. when no default list was picked yet.
    pub value: Option<String>,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {}", self.name, value),
            None => write!(f, "{} = <unset>", self.name),
        }
    }
}
