use crate::Database;
use crate::models::{DevotionRow, VerseRow, VideoRow};
use anyhow::Result;

impl Database {
    // -- Devotions --

    pub fn insert_devotion(
        &self,
        id: &str,
        title: &str,
        excerpt: &str,
        body: &str,
        author: &str,
        date: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO devotions (id, title, excerpt, body, author, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, title, excerpt, body, author, date],
            )?;
            Ok(())
        })
    }

    pub fn list_devotions(&self) -> Result<Vec<DevotionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, excerpt, body, author, date, created_at
                 FROM devotions ORDER BY date DESC, created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(DevotionRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        excerpt: row.get(2)?,
                        body: row.get(3)?,
                        author: row.get(4)?,
                        date: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_devotions(&self) -> Result<i64> {
        self.count_rows("devotions")
    }

    // -- Verses --

    pub fn insert_verse(
        &self,
        id: &str,
        reference: &str,
        text: &str,
        translation: &str,
        date: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO verses (id, reference, text, translation, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, reference, text, translation, date],
            )?;
            Ok(())
        })
    }

    pub fn list_verses(&self) -> Result<Vec<VerseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, reference, text, translation, date, created_at
                 FROM verses ORDER BY date DESC, created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(VerseRow {
                        id: row.get(0)?,
                        reference: row.get(1)?,
                        text: row.get(2)?,
                        translation: row.get(3)?,
                        date: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_verses(&self) -> Result<i64> {
        self.count_rows("verses")
    }

    // -- Videos --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_video(
        &self,
        id: &str,
        title: &str,
        speaker: &str,
        url: &str,
        thumbnail_url: Option<&str>,
        duration_seconds: Option<u32>,
        category: &str,
        date: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO videos (id, title, speaker, url, thumbnail_url, duration_seconds, category, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![id, title, speaker, url, thumbnail_url, duration_seconds, category, date],
            )?;
            Ok(())
        })
    }

    pub fn list_videos(&self) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, speaker, url, thumbnail_url, duration_seconds, category, date, created_at
                 FROM videos ORDER BY date DESC, created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(VideoRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        speaker: row.get(2)?,
                        url: row.get(3)?,
                        thumbnail_url: row.get(4)?,
                        duration_seconds: row.get(5)?,
                        category: row.get(6)?,
                        date: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_videos(&self) -> Result<i64> {
        self.count_rows("videos")
    }

    fn count_rows(&self, table: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn devotions_sorted_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_devotion("d1", "Monday", "e", "b", "Pastor J", "2026-08-24")
            .unwrap();
        db.insert_devotion("d2", "Wednesday", "e", "b", "Pastor J", "2026-08-26")
            .unwrap();
        db.insert_devotion("d3", "Tuesday", "e", "b", "Pastor J", "2026-08-25")
            .unwrap();

        let titles: Vec<String> = db
            .list_devotions()
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["Wednesday", "Tuesday", "Monday"]);
        assert_eq!(db.count_devotions().unwrap(), 3);
    }

    #[test]
    fn video_optional_fields_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_video(
            "v1",
            "Morning Word",
            "T. Evans",
            "https://cdn.example.com/v1.mp4",
            None,
            Some(312),
            "faith",
            "2026-08-26",
        )
        .unwrap();

        let videos = db.list_videos().unwrap();
        assert_eq!(videos.len(), 1);
        assert!(videos[0].thumbnail_url.is_none());
        assert_eq!(videos[0].duration_seconds, Some(312));
    }

    #[test]
    fn counts_start_empty() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_verses().unwrap(), 0);
        db.insert_verse("s1", "Psalm 23:1", "The Lord is my shepherd", "NIV", "2026-08-26")
            .unwrap();
        assert_eq!(db.count_verses().unwrap(), 1);
    }
}
