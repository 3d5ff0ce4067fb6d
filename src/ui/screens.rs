use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::fetch_items_not_in_list;
use crate::models::{Item, ItemList};

use super::helpers::step_selection;

/// A plain scrollable list with a cursor. Backs the items, lists and members
/// screens, which differ only in what they do with the selected row.
pub(crate) struct Picker<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> Picker<T> {
    pub(crate) fn new(rows: Vec<T>) -> Self {
        Self { rows, selected: 0 }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.rows.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    /// Swap in fresh rows and put the cursor on the first row matching
    /// `focus`, or keep it in bounds.
    pub(crate) fn replace_rows(&mut self, rows: Vec<T>, focus: impl Fn(&T) -> bool) {
        self.rows = rows;
        if let Some(idx) = self.rows.iter().position(focus) {
            self.selected = idx;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }
}

/// Members screen: one list and the items in it.
pub(crate) struct MembersScreen {
    pub(crate) list: ItemList,
    pub(crate) items: Picker<Item>,
}

/// Multi-select palette for adding items to a list.
pub(crate) struct AddMembersState {
    pub(crate) list_id: i64,
    pub(crate) items: Vec<Item>,
    pub(crate) selected: usize,
    pub(crate) checked: HashSet<i64>,
}

impl AddMembersState {
    pub(crate) fn load(conn: &Connection, list_id: i64) -> Result<Self> {
        let items = fetch_items_not_in_list(conn, list_id)
            .context("failed to load items for the picker")?;
        Ok(Self {
            list_id,
            items,
            selected: 0,
            checked: HashSet::new(),
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.items.len(), offset);
    }

    pub(crate) fn toggle_current(&mut self) {
        if let Some(item) = self.items.get(self.selected) {
            if !self.checked.remove(&item.id) {
                self.checked.insert(item.id);
            }
        }
    }

    pub(crate) fn is_checked(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_some_and(|item| self.checked.contains(&item.id))
    }

    /// Checked items, or the highlighted one when nothing is checked.
    pub(crate) fn selection(&self) -> Vec<Item> {
        if self.checked.is_empty() {
            return self.items.get(self.selected).cloned().into_iter().collect();
        }
        self.items
            .iter()
            .filter(|item| self.checked.contains(&item.id))
            .cloned()
            .collect()
    }
}
