use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{is_constraint, is_foreign_key_violation, sql, StoreError};
use crate::models::{Item, ListMembership};

const ENTITY: &str = "Membership";

fn pair_key(item_list_id: i64, item_id: i64) -> String {
    format!("{item_list_id}/{item_id}")
}

pub fn fetch_memberships(conn: &Connection) -> Result<Vec<ListMembership>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT item_list_id, item_id FROM item_lists_items
             ORDER BY item_list_id, item_id",
        )
        .map_err(sql("prepare memberships query"))?;

    let pairs = stmt
        .query_map([], |row| {
            Ok(ListMembership {
                item_list_id: row.get(0)?,
                item_id: row.get(1)?,
            })
        })
        .map_err(sql("load memberships"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect memberships"))?;

    Ok(pairs)
}

pub fn fetch_membership(
    conn: &Connection,
    item_list_id: i64,
    item_id: i64,
) -> Result<ListMembership, StoreError> {
    conn.query_row(
        "SELECT item_list_id, item_id FROM item_lists_items
         WHERE item_list_id = ?1 AND item_id = ?2",
        params![item_list_id, item_id],
        |row| {
            Ok(ListMembership {
                item_list_id: row.get(0)?,
                item_id: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(sql("load membership"))?
    .ok_or_else(|| StoreError::not_found(ENTITY, pair_key(item_list_id, item_id)))
}

/// Ids of every item in a list. The chooser indexes into this vector, so the
/// order has to be stable between calls.
pub fn fetch_item_ids_for_list(conn: &Connection, item_list_id: i64) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT item_id FROM item_lists_items WHERE item_list_id = ?1 ORDER BY item_id")
        .map_err(sql("prepare list item ids query"))?;

    let ids = stmt
        .query_map([item_list_id], |row| row.get(0))
        .map_err(sql("load list item ids"))?
        .collect::<Result<Vec<i64>, _>>()
        .map_err(sql("collect list item ids"))?;

    Ok(ids)
}

/// Items belonging to a list, for the members screen.
pub fn fetch_items_for_list(conn: &Connection, item_list_id: i64) -> Result<Vec<Item>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT i.id, i.name
             FROM items i
             INNER JOIN item_lists_items li ON li.item_id = i.id
             WHERE li.item_list_id = ?1
             ORDER BY i.name COLLATE NOCASE",
        )
        .map_err(sql("prepare list items query"))?;

    let items = stmt
        .query_map([item_list_id], |row| {
            Ok(Item {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(sql("load list items"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect list items"))?;

    Ok(items)
}

/// Items that are not yet in the list, so the "add" picker only offers
/// eligible entries.
pub fn fetch_items_not_in_list(conn: &Connection, item_list_id: i64) -> Result<Vec<Item>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT i.id, i.name
             FROM items i
             WHERE NOT EXISTS (
                 SELECT 1 FROM item_lists_items li
                 WHERE li.item_id = i.id AND li.item_list_id = ?1
             )
             ORDER BY i.name COLLATE NOCASE",
        )
        .map_err(sql("prepare available items query"))?;

    let items = stmt
        .query_map([item_list_id], |row| {
            Ok(Item {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(sql("load available items"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql("collect available items"))?;

    Ok(items)
}

/// Link an item to a list. Linking the same pair twice is a `Duplicate`;
/// linking ids that do not exist is a `MissingReference`.
pub fn add_item_to_list(
    conn: &Connection,
    item_list_id: i64,
    item_id: i64,
) -> Result<ListMembership, StoreError> {
    conn.execute(
        "INSERT INTO item_lists_items (item_list_id, item_id) VALUES (?1, ?2)",
        params![item_list_id, item_id],
    )
    .map_err(|err| {
        if is_foreign_key_violation(&err) {
            StoreError::MissingReference {
                item_list_id,
                item_id,
            }
        } else if is_constraint(&err) {
            StoreError::Duplicate {
                entity: ENTITY,
                key: pair_key(item_list_id, item_id),
            }
        } else {
            StoreError::Sqlite {
                action: "link item to list",
                source: err,
            }
        }
    })?;

    debug!(item_list_id, item_id, "linked item to list");
    Ok(ListMembership {
        item_list_id,
        item_id,
    })
}

pub fn remove_item_from_list(
    conn: &Connection,
    item_list_id: i64,
    item_id: i64,
) -> Result<(), StoreError> {
    let deleted = conn
        .execute(
            "DELETE FROM item_lists_items WHERE item_list_id = ?1 AND item_id = ?2",
            params![item_list_id, item_id],
        )
        .map_err(sql("unlink item from list"))?;

    if deleted == 0 {
        Err(StoreError::not_found(ENTITY, pair_key(item_list_id, item_id)))
    } else {
        Ok(())
    }
}

pub fn delete_all_memberships(conn: &Connection) -> Result<usize, StoreError> {
    conn.execute("DELETE FROM item_lists_items", [])
        .map_err(sql("delete all memberships"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_item, create_item_list, delete_item, delete_item_list, open_in_memory};

    #[test]
    fn link_and_list_members() {
        let conn = open_in_memory().unwrap();
        let list = create_item_list(&conn, "Lunch").unwrap();
        let soup = create_item(&conn, "Soup").unwrap();
        let pizza = create_item(&conn, "Pizza").unwrap();
        let salad = create_item(&conn, "Salad").unwrap();

        add_item_to_list(&conn, list.id, soup.id).unwrap();
        add_item_to_list(&conn, list.id, pizza.id).unwrap();

        let members: Vec<_> = fetch_items_for_list(&conn, list.id)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(members, ["Pizza", "Soup"]);

        let available = fetch_items_not_in_list(&conn, list.id).unwrap();
        assert_eq!(available, vec![salad]);

        let mut ids = fetch_item_ids_for_list(&conn, list.id).unwrap();
        ids.sort();
        assert_eq!(ids, vec![soup.id, pizza.id]);
        assert!(fetch_membership(&conn, list.id, soup.id).is_ok());
    }

    #[test]
    fn same_pair_twice_is_a_duplicate() {
        let conn = open_in_memory().unwrap();
        let list = create_item_list(&conn, "Lunch").unwrap();
        let soup = create_item(&conn, "Soup").unwrap();
        add_item_to_list(&conn, list.id, soup.id).unwrap();
        assert!(add_item_to_list(&conn, list.id, soup.id)
            .unwrap_err()
            .is_duplicate());
        assert_eq!(fetch_memberships(&conn).unwrap().len(), 1);
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let conn = open_in_memory().unwrap();
        let list = create_item_list(&conn, "Lunch").unwrap();
        assert!(matches!(
            add_item_to_list(&conn, list.id, 999),
            Err(StoreError::MissingReference { .. })
        ));
    }

    #[test]
    fn deleting_item_or_list_cascades() {
        let conn = open_in_memory().unwrap();
        let lunch = create_item_list(&conn, "Lunch").unwrap();
        let dinner = create_item_list(&conn, "Dinner").unwrap();
        let soup = create_item(&conn, "Soup").unwrap();
        let pizza = create_item(&conn, "Pizza").unwrap();
        add_item_to_list(&conn, lunch.id, soup.id).unwrap();
        add_item_to_list(&conn, dinner.id, soup.id).unwrap();
        add_item_to_list(&conn, dinner.id, pizza.id).unwrap();

        delete_item(&conn, soup.id).unwrap();
        assert!(fetch_item_ids_for_list(&conn, lunch.id).unwrap().is_empty());
        assert_eq!(fetch_item_ids_for_list(&conn, dinner.id).unwrap(), vec![pizza.id]);

        delete_item_list(&conn, dinner.id).unwrap();
        assert!(fetch_memberships(&conn).unwrap().is_empty());
    }

    #[test]
    fn unlinking_missing_pair_is_not_found() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            remove_item_from_list(&conn, 1, 1),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_all_memberships_keeps_rows_on_both_sides() {
        let conn = open_in_memory().unwrap();
        let list = create_item_list(&conn, "Lunch").unwrap();
        let soup = create_item(&conn, "Soup").unwrap();
        add_item_to_list(&conn, list.id, soup.id).unwrap();

        assert_eq!(delete_all_memberships(&conn).unwrap(), 1);
        assert_eq!(fetch_items_not_in_list(&conn, list.id).unwrap(), vec![soup]);
    }
}
