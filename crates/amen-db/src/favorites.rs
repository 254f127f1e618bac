use crate::Database;
use crate::models::FavoriteRow;
use crate::queries::OptionalExt;
use anyhow::Result;

const FAVORITE_COLUMNS: &str = "id, user_id, item_type, item_id, title, subtitle, created_at";

impl Database {
    /// Insert a favorite, or return the existing row when the user already
    /// bookmarked this item. Re-favoriting is a no-op, never an error.
    pub fn add_favorite(
        &self,
        id: &str,
        user_id: &str,
        item_type: &str,
        item_id: &str,
        title: &str,
        subtitle: Option<&str>,
    ) -> Result<FavoriteRow> {
        self.with_conn_mut(|conn| {
            let existing = conn
                .query_row(
                    &format!(
                        "SELECT {FAVORITE_COLUMNS} FROM favorites
                         WHERE user_id = ?1 AND item_type = ?2 AND item_id = ?3"
                    ),
                    [user_id, item_type, item_id],
                    map_favorite_row,
                )
                .optional()?;

            if let Some(row) = existing {
                return Ok(row);
            }

            conn.execute(
                "INSERT INTO favorites (id, user_id, item_type, item_id, title, subtitle)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, item_type, item_id, title, subtitle],
            )?;

            let row = conn.query_row(
                &format!("SELECT {FAVORITE_COLUMNS} FROM favorites WHERE id = ?1"),
                [id],
                map_favorite_row,
            )?;
            Ok(row)
        })
    }

    pub fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FAVORITE_COLUMNS} FROM favorites
                 WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], map_favorite_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_favorite(&self, id: &str) -> Result<Option<FavoriteRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {FAVORITE_COLUMNS} FROM favorites WHERE id = ?1"),
                    [id],
                    map_favorite_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_favorite(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM favorites WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn map_favorite_row(row: &rusqlite::Row<'_>) -> std::result::Result<FavoriteRow, rusqlite::Error> {
    Ok(FavoriteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_type: row.get(2)?,
        item_id: row.get(3)?,
        title: row.get(4)?,
        subtitle: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_user() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "Grace", Some("g@example.com"), Some("h"), "email", None)
            .unwrap();
        db
    }

    #[test]
    fn refavoriting_returns_existing_row() {
        let db = db_with_user();
        let first = db
            .add_favorite("f1", "u1", "devotion", "d1", "Morning Peace", None)
            .unwrap();
        let second = db
            .add_favorite("f2", "u1", "devotion", "d1", "Morning Peace", None)
            .unwrap();

        assert_eq!(first.id, "f1");
        assert_eq!(second.id, "f1");
        assert_eq!(db.list_favorites("u1").unwrap().len(), 1);
    }

    #[test]
    fn favorites_are_scoped_to_owner() {
        let db = db_with_user();
        db.create_user("u2", "Hope", Some("h@example.com"), Some("h"), "email", None)
            .unwrap();
        db.add_favorite("f1", "u1", "verse", "s1", "Psalm 23:1", Some("NIV"))
            .unwrap();

        assert_eq!(db.list_favorites("u1").unwrap().len(), 1);
        assert!(db.list_favorites("u2").unwrap().is_empty());
    }

    #[test]
    fn delete_favorite_reports_misses() {
        let db = db_with_user();
        db.add_favorite("f1", "u1", "video", "v1", "Morning Word", None)
            .unwrap();
        assert!(db.delete_favorite("f1").unwrap());
        assert!(!db.delete_favorite("f1").unwrap());
        assert!(db.get_favorite("f1").unwrap().is_none());
    }
}
