use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{map_unique_constraint, require_name, sql, StoreError};
use crate::models::Item;

const ENTITY: &str = "Item";

/// Sample names offered by the "add default items" action.
pub const DEFAULT_ITEM_NAMES: &[&str] = &[
    "Friend's Burger",
    "Currywurstbude",
    "VÖB Kantine",
    "Boge Kantine",
    "Mauel Bäckerei",
    "SES Schnellrestaurant (Döner)",
    "Supermarkt",
    "Snackmobil",
    "'Obstladen'",
    "Pizzeria Il Tartufo",
];

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Every item, ordered case-insensitively so the editor lists read naturally.
pub fn fetch_items(conn: &Connection) -> Result<Vec<Item>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM items ORDER BY name COLLATE NOCASE, id")
        .map_err(sql("prepare items query"))?;

    let items = stmt
        .query_map([], row_to_item)
        .map_err(sql("load items"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect items"))?;

    Ok(items)
}

pub fn fetch_item(conn: &Connection, id: i64) -> Result<Item, StoreError> {
    conn.query_row(
        "SELECT id, name FROM items WHERE id = ?1",
        params![id],
        row_to_item,
    )
    .optional()
    .map_err(sql("load item"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn fetch_item_by_name(conn: &Connection, name: &str) -> Result<Item, StoreError> {
    conn.query_row(
        "SELECT id, name FROM items WHERE name = ?1",
        params![name],
        row_to_item,
    )
    .optional()
    .map_err(sql("load item by name"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, name))
}

/// Insert a new item and echo the hydrated struct back. A second item with
/// the same name is rejected with `StoreError::Duplicate`, a blank one with
/// `StoreError::EmptyName`.
pub fn create_item(conn: &Connection, name: &str) -> Result<Item, StoreError> {
    require_name(ENTITY, name)?;
    conn.execute("INSERT INTO items (name) VALUES (?1)", params![name])
        .map_err(|err| map_unique_constraint(err, ENTITY, name, "insert item"))?;

    let id = conn.last_insert_rowid();
    debug!(id, name, "created item");
    Ok(Item {
        id,
        name: name.to_string(),
    })
}

/// Return the item called `name`, creating it first when it does not exist.
pub fn fetch_or_create_item(conn: &Connection, name: &str) -> Result<Item, StoreError> {
    match fetch_item_by_name(conn, name) {
        Ok(item) => Ok(item),
        Err(StoreError::NotFound { .. }) => create_item(conn, name),
        Err(err) => Err(err),
    }
}

pub fn rename_item(conn: &Connection, id: i64, name: &str) -> Result<(), StoreError> {
    require_name(ENTITY, name)?;
    let updated = conn
        .execute(
            "UPDATE items SET name = ?1 WHERE id = ?2",
            params![name, id],
        )
        .map_err(|err| map_unique_constraint(err, ENTITY, name, "update item"))?;

    if updated == 0 {
        Err(StoreError::not_found(ENTITY, id))
    } else {
        debug!(id, name, "renamed item");
        Ok(())
    }
}

/// Remove an item. Its list memberships cascade away with it.
pub fn delete_item(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let deleted = conn
        .execute("DELETE FROM items WHERE id = ?1", params![id])
        .map_err(sql("delete item"))?;

    if deleted == 0 {
        Err(StoreError::not_found(ENTITY, id))
    } else {
        debug!(id, "deleted item");
        Ok(())
    }
}

/// Empty the table. Rows are deleted rather than the table being dropped, so
/// `AUTOINCREMENT` keeps handing out fresh ids afterwards.
pub fn delete_all_items(conn: &Connection) -> Result<usize, StoreError> {
    let deleted = conn
        .execute("DELETE FROM items", [])
        .map_err(sql("delete all items"))?;
    debug!(deleted, "deleted all items");
    Ok(deleted)
}

/// Insert the sample items, skipping names that already exist. Returns how
/// many rows were actually added.
pub fn seed_default_items(conn: &Connection) -> Result<usize, StoreError> {
    let mut added = 0;
    for name in DEFAULT_ITEM_NAMES {
        match create_item(conn, name) {
            Ok(_) => added += 1,
            Err(err) if err.is_duplicate() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(added)
}
