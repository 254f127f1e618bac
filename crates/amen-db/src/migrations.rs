use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            email           TEXT UNIQUE,
            password        TEXT,
            provider        TEXT NOT NULL DEFAULT 'email',
            subject         TEXT,
            email_verified  INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(provider, subject)
        );

        CREATE TABLE IF NOT EXISTS devotions (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            excerpt     TEXT NOT NULL,
            body        TEXT NOT NULL,
            author      TEXT NOT NULL,
            date        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS verses (
            id          TEXT PRIMARY KEY,
            reference   TEXT NOT NULL,
            text        TEXT NOT NULL,
            translation TEXT NOT NULL,
            date        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS videos (
            id               TEXT PRIMARY KEY,
            title            TEXT NOT NULL,
            speaker          TEXT NOT NULL,
            url              TEXT NOT NULL,
            thumbnail_url    TEXT,
            duration_seconds INTEGER,
            category         TEXT NOT NULL,
            date             TEXT NOT NULL,
            created_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS prayers (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL REFERENCES users(id),
            text          TEXT NOT NULL,
            category      TEXT NOT NULL,
            anonymous     INTEGER NOT NULL DEFAULT 0,
            author_name   TEXT,
            image_url     TEXT,
            prayer_count  INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_prayers_category
            ON prayers(category, created_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            prayer_id   TEXT NOT NULL REFERENCES prayers(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            author_name TEXT NOT NULL,
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_prayer
            ON comments(prayer_id, created_at);

        CREATE TABLE IF NOT EXISTS comment_likes (
            id          TEXT PRIMARY KEY,
            comment_id  TEXT NOT NULL REFERENCES comments(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(comment_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_comment_likes_comment
            ON comment_likes(comment_id);

        -- One row per counted 'I prayed' action; the 24h limit reads the
        -- caller's most recent row for the prayer.
        CREATE TABLE IF NOT EXISTS prayer_support (
            id          TEXT PRIMARY KEY,
            prayer_id   TEXT NOT NULL REFERENCES prayers(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            prayed_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_prayer_support_user
            ON prayer_support(prayer_id, user_id, prayed_at);

        CREATE TABLE IF NOT EXISTS favorites (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            item_type   TEXT NOT NULL,
            item_id     TEXT NOT NULL,
            title       TEXT NOT NULL,
            subtitle    TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, item_type, item_id)
        );

        CREATE INDEX IF NOT EXISTS idx_favorites_user
            ON favorites(user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
