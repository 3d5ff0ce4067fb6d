use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Item, ItemList};

/// Single-line text input used for item names, list names and the custom
/// dice range.
#[derive(Default, Clone)]
pub(crate) struct TextForm {
    pub(crate) value: String,
    pub(crate) digits_only: bool,
    pub(crate) error: Option<String>,
}

impl TextForm {
    pub(crate) fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub(crate) fn numeric(value: i64) -> Self {
        Self {
            value: value.to_string(),
            digits_only: true,
            error: None,
        }
    }

    /// Append a character, rejecting control characters and, for numeric
    /// forms, anything that is not a digit.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = if self.digits_only {
            ch.is_ascii_digit()
        } else {
            !ch.is_control()
        };
        if accepted {
            self.value.push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Trimmed, non-empty name ready for the store.
    pub(crate) fn parse_name(&self, what: &str) -> Result<String> {
        let name = self.value.trim();
        if name.is_empty() {
            return Err(anyhow!("{what} name is required."));
        }
        Ok(name.to_string())
    }

    pub(crate) fn build_line(&self, field_name: &str) -> Line<'static> {
        let display = if self.value.is_empty() {
            "<required>".to_string()
        } else {
            self.value.clone()
        };
        let style = if self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// What a pending confirmation dialog would delete.
#[derive(Clone)]
pub(crate) enum DeleteTarget {
    Item(Item),
    AllItems,
    List(ItemList),
    AllLists,
    Member { list: ItemList, item: Item },
}

impl DeleteTarget {
    pub(crate) fn prompt(&self) -> String {
        match self {
            DeleteTarget::Item(item) => format!("Delete item \"{}\"?", item.name),
            DeleteTarget::AllItems => "Really delete ALL items?".to_string(),
            DeleteTarget::List(list) => format!("Delete list \"{}\"?", list.list_name),
            DeleteTarget::AllLists => "Really delete ALL lists?".to_string(),
            DeleteTarget::Member { list, item } => {
                format!("Remove \"{}\" from \"{}\"?", item.name, list.list_name)
            }
        }
    }

    /// Extra line explaining the side effects, if any.
    pub(crate) fn detail(&self) -> Option<&'static str> {
        match self {
            DeleteTarget::Item(_) | DeleteTarget::AllItems => {
                Some("The item is also removed from every list.")
            }
            DeleteTarget::List(_) | DeleteTarget::AllLists => {
                Some("Items stay in the item catalogue.")
            }
            DeleteTarget::Member { .. } => None,
        }
    }
}
