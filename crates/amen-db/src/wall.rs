use crate::Database;
use crate::models::{CommentLikeRow, CommentRow, PrayerRow};
use crate::queries::OptionalExt;
use anyhow::Result;

const PRAYER_COLUMNS: &str =
    "id, user_id, text, category, anonymous, author_name, image_url, prayer_count, created_at";

impl Database {
    // -- Prayers --

    pub fn insert_prayer(
        &self,
        id: &str,
        user_id: &str,
        text: &str,
        category: &str,
        anonymous: bool,
        author_name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO prayers (id, user_id, text, category, anonymous, author_name, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, user_id, text, category, anonymous, author_name, image_url],
            )?;
            Ok(())
        })
    }

    pub fn get_prayer(&self, id: &str) -> Result<Option<PrayerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {PRAYER_COLUMNS} FROM prayers WHERE id = ?1"))?;
            let row = stmt.query_row([id], map_prayer_row).optional()?;
            Ok(row)
        })
    }

    /// Newest-first listing with optional category filter and cursor-based
    /// pagination: `before` is the `created_at` of the oldest prayer from the
    /// previous page.
    pub fn list_prayers(
        &self,
        category: Option<&str>,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<PrayerRow>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {PRAYER_COLUMNS} FROM prayers WHERE 1=1");
            let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            if let Some(cat) = &category {
                sql.push_str(" AND category = ?");
                params.push(cat);
            }
            if let Some(cursor) = &before {
                sql.push_str(" AND created_at < ?");
                params.push(cursor);
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
            params.push(&limit);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), map_prayer_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_prayer(&self, id: &str, text: &str, category: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE prayers SET text = ?1, category = ?2 WHERE id = ?3",
                [text, category, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Remove a prayer together with its comments, comment likes, and
    /// support rows, atomically.
    pub fn delete_prayer(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "DELETE FROM comment_likes WHERE comment_id IN
                     (SELECT id FROM comments WHERE prayer_id = ?1)",
                [id],
            )?;
            tx.execute("DELETE FROM comments WHERE prayer_id = ?1", [id])?;
            tx.execute("DELETE FROM prayer_support WHERE prayer_id = ?1", [id])?;
            let changed = tx.execute("DELETE FROM prayers WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(changed > 0)
        })
    }

    // -- "I prayed" support --

    /// Count a pray action, subject to the once-per-24h-per-prayer rule.
    /// Returns the new prayer_count when counted, None when the caller is
    /// still inside the window. The support insert and the counter update
    /// commit together or not at all.
    pub fn record_pray(&self, support_id: &str, prayer_id: &str, user_id: &str) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;

            let recent: Option<String> = tx
                .query_row(
                    "SELECT id FROM prayer_support
                     WHERE prayer_id = ?1 AND user_id = ?2
                       AND prayed_at > datetime('now', '-1 day')
                     ORDER BY prayed_at DESC LIMIT 1",
                    [prayer_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            if recent.is_some() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO prayer_support (id, prayer_id, user_id) VALUES (?1, ?2, ?3)",
                [support_id, prayer_id, user_id],
            )?;
            tx.execute(
                "UPDATE prayers SET prayer_count = prayer_count + 1 WHERE id = ?1",
                [prayer_id],
            )?;

            let count = tx.query_row(
                "SELECT prayer_count FROM prayers WHERE id = ?1",
                [prayer_id],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(Some(count))
        })
    }

    /// Which of the given prayers has this user prayed for inside the 24h
    /// window? Feeds the per-viewer `has_prayed` flag.
    pub fn prayed_within_day(&self, user_id: &str, prayer_ids: &[String]) -> Result<Vec<String>> {
        if prayer_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (2..=prayer_ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT DISTINCT prayer_id FROM prayer_support
                 WHERE user_id = ?1 AND prayed_at > datetime('now', '-1 day')
                   AND prayer_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&user_id];
            params.extend(prayer_ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

            let rows = stmt
                .query_map(params.as_slice(), |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        prayer_id: &str,
        user_id: &str,
        author_name: &str,
        text: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (id, prayer_id, user_id, author_name, text)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                [id, prayer_id, user_id, author_name, text],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, prayer_id, user_id, author_name, text, created_at
                 FROM comments WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_comment_row).optional()?;
            Ok(row)
        })
    }

    /// Batch-fetch comments for a set of prayer IDs, oldest first.
    pub fn get_comments_for_prayers(&self, prayer_ids: &[String]) -> Result<Vec<CommentRow>> {
        if prayer_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=prayer_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, prayer_id, user_id, author_name, text, created_at
                 FROM comments WHERE prayer_id IN ({})
                 ORDER BY created_at ASC, id ASC",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = prayer_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), map_comment_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comment likes --

    /// Toggle a like: removes if present, inserts if not.
    /// Returns true when the like was added, false when removed.
    pub fn toggle_comment_like(&self, id: &str, comment_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM comment_likes WHERE comment_id = ?1 AND user_id = ?2",
                    [comment_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM comment_likes WHERE id = ?1", [&existing_id])?;
                Ok(false)
            } else {
                conn.execute(
                    "INSERT INTO comment_likes (id, comment_id, user_id) VALUES (?1, ?2, ?3)",
                    [id, comment_id, user_id],
                )?;
                Ok(true)
            }
        })
    }

    pub fn count_comment_likes(&self, comment_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?1",
                [comment_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Batch-fetch likes for a set of comment IDs.
    pub fn get_likes_for_comments(&self, comment_ids: &[String]) -> Result<Vec<CommentLikeRow>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=comment_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, comment_id, user_id, created_at
                 FROM comment_likes WHERE comment_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = comment_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(CommentLikeRow {
                        id: row.get(0)?,
                        comment_id: row.get(1)?,
                        user_id: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_prayer_row(row: &rusqlite::Row<'_>) -> std::result::Result<PrayerRow, rusqlite::Error> {
    Ok(PrayerRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        category: row.get(3)?,
        anonymous: row.get::<_, i64>(4)? != 0,
        author_name: row.get(5)?,
        image_url: row.get(6)?,
        prayer_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> std::result::Result<CommentRow, rusqlite::Error> {
    Ok(CommentRow {
        id: row.get(0)?,
        prayer_id: row.get(1)?,
        user_id: row.get(2)?,
        author_name: row.get(3)?,
        text: row.get(4)?,
        created_at: row.get(5)?,
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

    fn add_prayer(db: &Database, id: &str, category: &str) {
        db.insert_prayer(id, "u1", "Please pray for my family", category, false, Some("Grace"), None)
            .unwrap();
    }

    #[test]
    fn pray_counts_once_per_day() {
        let db = db_with_user();
        add_prayer(&db, "p1", "family");

        // First pray counts
        assert_eq!(db.record_pray("s1", "p1", "u1").unwrap(), Some(1));
        // Second within the window does not
        assert_eq!(db.record_pray("s2", "p1", "u1").unwrap(), None);
        assert_eq!(db.get_prayer("p1").unwrap().unwrap().prayer_count, 1);

        // A different user is not affected
        db.create_user("u2", "Hope", Some("h@example.com"), Some("h"), "email", None)
            .unwrap();
        assert_eq!(db.record_pray("s3", "p1", "u2").unwrap(), Some(2));
    }

    #[test]
    fn pray_counts_again_after_window_expires() {
        let db = db_with_user();
        add_prayer(&db, "p1", "family");
        assert_eq!(db.record_pray("s1", "p1", "u1").unwrap(), Some(1));

        // Age the support row past the 24h window
        db.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE prayer_support SET prayed_at = datetime('now', '-2 days') WHERE id = 's1'",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        assert_eq!(db.record_pray("s2", "p1", "u1").unwrap(), Some(2));
        assert_eq!(
            db.prayed_within_day("u1", &["p1".to_string()]).unwrap(),
            vec!["p1".to_string()]
        );
    }

    #[test]
    fn pray_rolls_back_support_row_when_count_update_fails() {
        let db = db_with_user();
        add_prayer(&db, "p1", "family");

        // Force the counter update to fail mid-way
        db.with_conn_mut(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER block_count BEFORE UPDATE ON prayers
                 BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.record_pray("s1", "p1", "u1").is_err());

        // The support insert must not survive the failed counter update,
        // otherwise the user is locked out for 24h with nothing counted.
        db.with_conn_mut(|conn| {
            conn.execute_batch("DROP TRIGGER block_count;")?;
            Ok(())
        })
        .unwrap();
        assert!(db.prayed_within_day("u1", &["p1".to_string()]).unwrap().is_empty());
        assert_eq!(db.record_pray("s2", "p1", "u1").unwrap(), Some(1));
    }

    #[test]
    fn comment_like_toggles() {
        let db = db_with_user();
        add_prayer(&db, "p1", "healing");
        db.insert_comment("c1", "p1", "u1", "Grace", "Praying for you").unwrap();

        assert!(db.toggle_comment_like("l1", "c1", "u1").unwrap());
        assert_eq!(db.count_comment_likes("c1").unwrap(), 1);

        assert!(!db.toggle_comment_like("l2", "c1", "u1").unwrap());
        assert_eq!(db.count_comment_likes("c1").unwrap(), 0);
    }

    #[test]
    fn delete_prayer_removes_children() {
        let db = db_with_user();
        add_prayer(&db, "p1", "healing");
        db.insert_comment("c1", "p1", "u1", "Grace", "Amen").unwrap();
        db.toggle_comment_like("l1", "c1", "u1").unwrap();
        db.record_pray("s1", "p1", "u1").unwrap();

        assert!(db.delete_prayer("p1").unwrap());
        assert!(db.get_prayer("p1").unwrap().is_none());
        assert!(db.get_comment("c1").unwrap().is_none());
        assert_eq!(db.count_comment_likes("c1").unwrap(), 0);
        assert!(db.prayed_within_day("u1", &["p1".to_string()]).unwrap().is_empty());

        // Deleting twice reports the miss
        assert!(!db.delete_prayer("p1").unwrap());
    }

    #[test]
    fn list_filters_by_category_and_paginates() {
        let db = db_with_user();
        add_prayer(&db, "p1", "family");
        add_prayer(&db, "p2", "healing");
        add_prayer(&db, "p3", "family");

        // Spread created_at so the cursor has distinct values
        db.with_conn_mut(|conn| {
            conn.execute("UPDATE prayers SET created_at = '2026-08-24 08:00:00' WHERE id = 'p1'", [])?;
            conn.execute("UPDATE prayers SET created_at = '2026-08-25 08:00:00' WHERE id = 'p2'", [])?;
            conn.execute("UPDATE prayers SET created_at = '2026-08-26 08:00:00' WHERE id = 'p3'", [])?;
            Ok(())
        })
        .unwrap();

        let family = db.list_prayers(Some("family"), 50, None).unwrap();
        let ids: Vec<&str> = family.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1"]);

        let page = db.list_prayers(None, 2, None).unwrap();
        assert_eq!(page.len(), 2);
        let older = db
            .list_prayers(None, 2, Some(&page[1].created_at))
            .unwrap();
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].id, "p1");
    }

    #[test]
    fn comments_batch_fetch_spans_prayers() {
        let db = db_with_user();
        add_prayer(&db, "p1", "family");
        add_prayer(&db, "p2", "family");
        db.insert_comment("c1", "p1", "u1", "Grace", "Amen").unwrap();
        db.insert_comment("c2", "p2", "u1", "Grace", "Standing with you").unwrap();
        db.insert_comment("c3", "p1", "u1", "Grace", "Praying").unwrap();

        let comments = db
            .get_comments_for_prayers(&["p1".to_string(), "p2".to_string()])
            .unwrap();
        assert_eq!(comments.len(), 3);
        assert!(db.get_comments_for_prayers(&[]).unwrap().is_empty());
    }
}
