//! The three persisted preferences, loaded once at startup and written back on
//! shutdown. Rows that are missing (fresh database, or a database from an
//! older build) are created with defaults on load.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::chooser::{ChoiceMethod, CUSTOM_DICE_RANGE_DEFAULT};
use crate::db::{create_setting, fetch_setting_by_name, update_setting};
use crate::error::StoreError;
use crate::models::Setting;

pub const CHOICE_METHOD_KEY: &str = "CHOICEMETHOD";
pub const CUSTOM_DICE_RANGE_KEY: &str = "CUSTOM_DICE_MAXIMUM_RANGE_VALUE";
pub const DEFAULT_LIST_NAME_KEY: &str = "CHOICEMETHOD_FROM_LIST_LISTNAME";

/// In-memory view of the settings table.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub choice_method: ChoiceMethod,
    pub custom_dice_range: i64,
    pub default_list_name: Option<String>,
    method_row: Setting,
    range_row: Setting,
    list_row: Setting,
}

impl AppSettings {
    pub fn load_or_create(conn: &Connection) -> Result<Self, StoreError> {
        let method_row = load_or_create_row(
            conn,
            CHOICE_METHOD_KEY,
            Some(ChoiceMethod::default().as_str()),
        )?;
        let default_range = CUSTOM_DICE_RANGE_DEFAULT.to_string();
        let range_row = load_or_create_row(conn, CUSTOM_DICE_RANGE_KEY, Some(&default_range))?;
        let list_row = load_or_create_row(conn, DEFAULT_LIST_NAME_KEY, None)?;

        let choice_method = match method_row.value.as_deref().map(str::parse::<ChoiceMethod>) {
            Some(Ok(method)) => method,
            Some(Err(err)) => {
                warn!(%err, "falling back to the default choice method");
                ChoiceMethod::default()
            }
            None => ChoiceMethod::default(),
        };

        let custom_dice_range = match parse_range_value(&range_row) {
            Some(range) => range,
            None => {
                warn!(value = ?range_row.value, "falling back to the default custom dice range");
                CUSTOM_DICE_RANGE_DEFAULT
            }
        };

        let default_list_name = list_row
            .value
            .clone()
            .filter(|name| !name.trim().is_empty());

        Ok(Self {
            choice_method,
            custom_dice_range,
            default_list_name,
            method_row,
            range_row,
            list_row,
        })
    }

    /// Write the current values into their rows.
    pub fn persist(&self, conn: &Connection) -> Result<(), StoreError> {
        let mut method_row = self.method_row.clone();
        method_row.value = Some(self.choice_method.as_str().to_string());
        update_setting(conn, &method_row)?;

        let mut range_row = self.range_row.clone();
        range_row.value = Some(self.custom_dice_range.to_string());
        update_setting(conn, &range_row)?;

        let mut list_row = self.list_row.clone();
        list_row.value = self.default_list_name.clone();
        update_setting(conn, &list_row)?;

        info!(
            method = %self.choice_method,
            range = self.custom_dice_range,
            list = ?self.default_list_name,
            "saved settings"
        );
        Ok(())
    }
}

fn parse_range_value(row: &Setting) -> Option<i64> {
    row.value
        .as_deref()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|range| *range > 0)
}

fn load_or_create_row(
    conn: &Connection,
    name: &str,
    default: Option<&str>,
) -> Result<Setting, StoreError> {
    match fetch_setting_by_name(conn, name) {
        Ok(setting) => Ok(setting),
        Err(StoreError::NotFound { .. }) => {
            info!(name, ?default, "creating missing setting");
            create_setting(conn, name, default)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_settings, open, open_in_memory};

    #[test]
    fn fresh_database_gets_defaults() {
        let conn = open_in_memory().unwrap();
        let settings = AppSettings::load_or_create(&conn).unwrap();
        assert_eq!(settings.choice_method, ChoiceMethod::ThrowCoin);
        assert_eq!(settings.custom_dice_range, CUSTOM_DICE_RANGE_DEFAULT);
        assert_eq!(settings.default_list_name, None);
        assert_eq!(fetch_settings(&conn).unwrap().len(), 3);

        AppSettings::load_or_create(&conn).unwrap();
        assert_eq!(fetch_settings(&conn).unwrap().len(), 3);
    }

    #[test]
    fn persisted_values_come_back_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("choice.sqlite");
        {
            let conn = open(&path).unwrap();
            let mut settings = AppSettings::load_or_create(&conn).unwrap();
            settings.choice_method = ChoiceMethod::RuleCustomDice;
            settings.custom_dice_range = 42;
            settings.default_list_name = Some("Lunch".to_string());
            settings.persist(&conn).unwrap();
        }

        let conn = open(&path).unwrap();
        let settings = AppSettings::load_or_create(&conn).unwrap();
        assert_eq!(settings.choice_method, ChoiceMethod::RuleCustomDice);
        assert_eq!(settings.custom_dice_range, 42);
        assert_eq!(settings.default_list_name.as_deref(), Some("Lunch"));
    }

    #[test]
    fn only_missing_rows_are_created() {
        let conn = open_in_memory().unwrap();
        create_setting(&conn, CUSTOM_DICE_RANGE_KEY, Some("8")).unwrap();
        let settings = AppSettings::load_or_create(&conn).unwrap();
        assert_eq!(settings.custom_dice_range, 8);
        assert_eq!(fetch_settings(&conn).unwrap().len(), 3);
    }

    #[test]
    fn unreadable_values_fall_back_to_defaults() {
        let conn = open_in_memory().unwrap();
        create_setting(&conn, CHOICE_METHOD_KEY, Some("SPIN_BOTTLE")).unwrap();
        create_setting(&conn, CUSTOM_DICE_RANGE_KEY, Some("-1")).unwrap();
        create_setting(&conn, DEFAULT_LIST_NAME_KEY, Some("  ")).unwrap();

        let settings = AppSettings::load_or_create(&conn).unwrap();
        assert_eq!(settings.choice_method, ChoiceMethod::default());
        assert_eq!(settings.custom_dice_range, CUSTOM_DICE_RANGE_DEFAULT);
        assert_eq!(settings.default_list_name, None);
    }
}
