/// Database row types — these map directly to SQLite rows.
/// Distinct from amen-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub provider: String,
    pub subject: Option<String>,
    pub email_verified: bool,
    pub created_at: String,
}

pub struct DevotionRow {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub author: String,
    pub date: String,
    pub created_at: String,
}

pub struct VerseRow {
    pub id: String,
    pub reference: String,
    pub text: String,
    pub translation: String,
    pub date: String,
    pub created_at: String,
}

pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub speaker: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub category: String,
    pub date: String,
    pub created_at: String,
}

pub struct PrayerRow {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub category: String,
    pub anonymous: bool,
    pub author_name: Option<String>,
    pub image_url: Option<String>,
    pub prayer_count: i64,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub prayer_id: String,
    pub user_id: String,
    pub author_name: String,
    pub text: String,
    pub created_at: String,
}

pub struct CommentLikeRow {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    pub created_at: String,
}

pub struct FavoriteRow {
    pub id: String,
    pub user_id: String,
    pub item_type: String,
    pub item_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub created_at: String,
}
