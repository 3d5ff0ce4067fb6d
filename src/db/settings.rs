use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{map_unique_constraint, sql, StoreError};
use crate::models::Setting;

const ENTITY: &str = "Setting";

fn row_to_setting(row: &Row<'_>) -> rusqlite::Result<Setting> {
    Ok(Setting {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
    })
}

pub fn fetch_settings(conn: &Connection) -> Result<Vec<Setting>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, name, value FROM settings ORDER BY id")
        .map_err(sql("prepare settings query"))?;

    let settings = stmt
        .query_map([], row_to_setting)
        .map_err(sql("load settings"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect settings"))?;

    Ok(settings)
}

pub fn fetch_setting(conn: &Connection, id: i64) -> Result<Setting, StoreError> {
    conn.query_row(
        "SELECT id, name, value FROM settings WHERE id = ?1",
        params![id],
        row_to_setting,
    )
    .optional()
    .map_err(sql("load setting"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn fetch_setting_by_name(conn: &Connection, name: &str) -> Result<Setting, StoreError> {
    conn.query_row(
        "SELECT id, name, value FROM settings WHERE name = ?1",
        params![name],
        row_to_setting,
    )
    .optional()
    .map_err(sql("load setting by name"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, name))
}

pub fn create_setting(
    conn: &Connection,
    name: &str,
    value: Option<&str>,
) -> Result<Setting, StoreError> {
    conn.execute(
        "INSERT INTO settings (name, value) VALUES (?1, ?2)",
        params![name, value],
    )
    .map_err(|err| map_unique_constraint(err, ENTITY, name, "insert setting"))?;

    let id = conn.last_insert_rowid();
    debug!(id, name, ?value, "created setting");
    Ok(Setting {
        id,
        name: name.to_string(),
        value: value.map(str::to_string),
    })
}

/// Write name and value back by id.
pub fn update_setting(conn: &Connection, setting: &Setting) -> Result<(), StoreError> {
    let updated = conn
        .execute(
            "UPDATE settings SET name = ?1, value = ?2 WHERE id = ?3",
            params![setting.name, setting.value, setting.id],
        )
        .map_err(|err| map_unique_constraint(err, ENTITY, &setting.name, "update setting"))?;

    if updated == 0 {
        Err(StoreError::not_found(ENTITY, setting.id))
    } else {
        debug!(name = %setting.name, value = ?setting.value, "updated setting");
        Ok(())
    }
}

pub fn delete_setting(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let deleted = conn
        .execute("DELETE FROM settings WHERE id = ?1", params![id])
        .map_err(sql("delete setting"))?;

    if deleted == 0 {
        Err(StoreError::not_found(ENTITY, id))
    } else {
        Ok(())
    }
}

pub fn delete_all_settings(conn: &Connection) -> Result<usize, StoreError> {
    conn.execute("DELETE FROM settings", [])
        .map_err(sql("delete all settings"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open, open_in_memory};

    #[test]
    fn stored_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.sqlite");
        {
            let conn = open(&path).unwrap();
            create_setting(&conn, "COLOR", Some("blue")).unwrap();
        }
        let conn = open(&path).unwrap();
        let setting = fetch_setting_by_name(&conn, "COLOR").unwrap();
        assert_eq!(setting.value.as_deref(), Some("blue"));
    }

    #[test]
    fn null_values_round_trip() {
        let conn = open_in_memory().unwrap();
        let created = create_setting(&conn, "LIST", None).unwrap();
        assert_eq!(fetch_setting(&conn, created.id).unwrap().value, None);
    }

    #[test]
    fn update_changes_value() {
        let conn = open_in_memory().unwrap();
        let mut setting = create_setting(&conn, "RANGE", Some("20")).unwrap();
        setting.value = Some("12".to_string());
        update_setting(&conn, &setting).unwrap();
        assert_eq!(
            fetch_setting_by_name(&conn, "RANGE").unwrap().value.as_deref(),
            Some("12")
        );
    }

    #[test]
    fn duplicate_name_and_missing_id() {
        let conn = open_in_memory().unwrap();
        create_setting(&conn, "RANGE", Some("20")).unwrap();
        assert!(create_setting(&conn, "RANGE", Some("6"))
            .unwrap_err()
            .is_duplicate());

        let ghost = Setting {
            id: 99,
            name: "GHOST".to_string(),
            value: None,
        };
        assert!(matches!(
            update_setting(&conn, &ghost),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_one_and_all() {
        let conn = open_in_memory().unwrap();
        let a = create_setting(&conn, "A", None).unwrap();
        create_setting(&conn, "B", None).unwrap();
        delete_setting(&conn, a.id).unwrap();
        assert_eq!(fetch_settings(&conn).unwrap().len(), 1);
        assert_eq!(delete_all_settings(&conn).unwrap(), 1);
        assert!(fetch_settings(&conn).unwrap().is_empty());
    }
}
