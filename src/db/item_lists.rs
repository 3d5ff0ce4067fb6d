use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{map_unique_constraint, require_name, sql, StoreError};
use crate::models::ItemList;

const ENTITY: &str = "List";

/// Lists created by the "add default lists" action.
pub const DEFAULT_ITEM_LIST_NAMES: &[&str] = &["Restaurants Bonn", "Antworten"];

fn row_to_item_list(row: &Row<'_>) -> rusqlite::Result<ItemList> {
    Ok(ItemList {
        id: row.get(0)?,
        list_name: row.get(1)?,
    })
}

pub fn fetch_item_lists(conn: &Connection) -> Result<Vec<ItemList>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, list_name FROM item_lists ORDER BY list_name COLLATE NOCASE, id")
        .map_err(sql("prepare item lists query"))?;

    let lists = stmt
        .query_map([], row_to_item_list)
        .map_err(sql("load item lists"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect item lists"))?;

    Ok(lists)
}

pub fn fetch_item_list(conn: &Connection, id: i64) -> Result<ItemList, StoreError> {
    conn.query_row(
        "SELECT id, list_name FROM item_lists WHERE id = ?1",
        params![id],
        row_to_item_list,
    )
    .optional()
    .map_err(sql("load item list"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

/// Resolve a list by its unique name. The chooser goes through here because
/// the settings remember the default list by name, not by id.
pub fn fetch_item_list_by_name(conn: &Connection, list_name: &str) -> Result<ItemList, StoreError> {
    conn.query_row(
        "SELECT id, list_name FROM item_lists WHERE list_name = ?1",
        params![list_name],
        row_to_item_list,
    )
    .optional()
    .map_err(sql("load item list by name"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, list_name))
}

pub fn create_item_list(conn: &Connection, list_name: &str) -> Result<ItemList, StoreError> {
    require_name(ENTITY, list_name)?;
    conn.execute(
        "INSERT INTO item_lists (list_name) VALUES (?1)",
        params![list_name],
    )
    .map_err(|err| map_unique_constraint(err, ENTITY, list_name, "insert item list"))?;

    let id = conn.last_insert_rowid();
    debug!(id, list_name, "created item list");
    Ok(ItemList {
        id,
        list_name: list_name.to_string(),
    })
}

pub fn rename_item_list(conn: &Connection, id: i64, list_name: &str) -> Result<(), StoreError> {
    require_name(ENTITY, list_name)?;
    let updated = conn
        .execute(
            "UPDATE item_lists SET list_name = ?1 WHERE id = ?2",
            params![list_name, id],
        )
        .map_err(|err| map_unique_constraint(err, ENTITY, list_name, "update item list"))?;

    if updated == 0 {
        Err(StoreError::not_found(ENTITY, id))
    } else {
        Ok(())
    }
}

/// Remove a list. Memberships cascade; the items themselves stay.
pub fn delete_item_list(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let deleted = conn
        .execute("DELETE FROM item_lists WHERE id = ?1", params![id])
        .map_err(sql("delete item list"))?;

    if deleted == 0 {
        Err(StoreError::not_found(ENTITY, id))
    } else {
        debug!(id, "deleted item list");
        Ok(())
    }
}

pub fn delete_all_item_lists(conn: &Connection) -> Result<usize, StoreError> {
    conn.execute("DELETE FROM item_lists", [])
        .map_err(sql("delete all item lists"))
}

/// Insert the default lists, skipping names that already exist. Returns how
/// many rows were actually added.
pub fn seed_default_item_lists(conn: &Connection) -> Result<usize, StoreError> {
    let mut added = 0;
    for list_name in DEFAULT_ITEM_LIST_NAMES {
        match create_item_list(conn, list_name) {
            Ok(_) => added += 1,
            Err(err) if err.is_duplicate() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_item, fetch_items, open_in_memory};

    #[test]
    fn create_fetch_rename_delete() {
        let conn = open_in_memory().unwrap();
        let lunch = create_item_list(&conn, "Lunch").unwrap();
        assert_eq!(fetch_item_list_by_name(&conn, "Lunch").unwrap(), lunch);

        rename_item_list(&conn, lunch.id, "Dinner").unwrap();
        assert_eq!(fetch_item_list(&conn, lunch.id).unwrap().list_name, "Dinner");
        assert!(matches!(
            fetch_item_list_by_name(&conn, "Lunch"),
            Err(StoreError::NotFound { .. })
        ));

        delete_item_list(&conn, lunch.id).unwrap();
        assert!(fetch_item_lists(&conn).unwrap().is_empty());
    }

    #[test]
    fn duplicate_list_name_is_rejected() {
        let conn = open_in_memory().unwrap();
        create_item_list(&conn, "Lunch").unwrap();
        assert!(create_item_list(&conn, "Lunch").unwrap_err().is_duplicate());
    }

    #[test]
    fn blank_list_names_are_rejected() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            create_item_list(&conn, ""),
            Err(StoreError::EmptyName { entity: "List" })
        ));
        let lunch = create_item_list(&conn, "Lunch").unwrap();
        assert!(matches!(
            rename_item_list(&conn, lunch.id, "\t "),
            Err(StoreError::EmptyName { .. })
        ));
        assert_eq!(fetch_item_lists(&conn).unwrap(), [lunch]);
    }

    #[test]
    fn seeding_default_lists_twice_adds_nothing() {
        let conn = open_in_memory().unwrap();
        create_item_list(&conn, "Antworten").unwrap();
        assert_eq!(seed_default_item_lists(&conn).unwrap(), 1);
        assert_eq!(seed_default_item_lists(&conn).unwrap(), 0);
        let names: Vec<_> = fetch_item_lists(&conn)
            .unwrap()
            .into_iter()
            .map(|list| list.list_name)
            .collect();
        assert_eq!(names, ["Antworten", "Restaurants Bonn"]);
    }

    #[test]
    fn delete_all_keeps_items() {
        let conn = open_in_memory().unwrap();
        create_item_list(&conn, "A").unwrap();
        create_item_list(&conn, "B").unwrap();
        create_item(&conn, "Soup").unwrap();

        assert_eq!(delete_all_item_lists(&conn).unwrap(), 2);
        assert!(fetch_item_lists(&conn).unwrap().is_empty());
        assert_eq!(fetch_items(&conn).unwrap().len(), 1);
    }
}
