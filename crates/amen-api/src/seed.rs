use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use amen_db::Database;
use amen_types::api::SeedResponse;

use crate::auth::AppStateInner;
use crate::content::join_error;

/// Bundled starter content, compiled into the binary. The seeder copies it
/// into the database the first time it runs against an empty collection.
const DEVOTIONS_JSON: &str = include_str!("../fixtures/devotions.json");
const VERSES_JSON: &str = include_str!("../fixtures/verses.json");
const VIDEOS_JSON: &str = include_str!("../fixtures/videos.json");

#[derive(Debug, Deserialize)]
struct FixtureDevotion {
    title: String,
    excerpt: String,
    body: String,
    author: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct FixtureVerse {
    reference: String,
    text: String,
    translation: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct FixtureVideo {
    title: String,
    speaker: String,
    url: String,
    thumbnail_url: Option<String>,
    duration_seconds: Option<u32>,
    category: String,
    date: String,
}

/// POST /admin/seed — load the bundled fixtures into any collection that is
/// still empty. Collections with data are skipped, so repeat calls are no-ops.
pub async fn seed(
    State(state): State<Arc<AppStateInner>>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let response = tokio::task::spawn_blocking(move || run_seed(&db.db))
        .await
        .map_err(join_error)?
        .map_err(|e| {
            error!("Fixture seeding failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(response))
}

pub(crate) fn run_seed(db: &Database) -> anyhow::Result<SeedResponse> {
    let mut response = SeedResponse {
        devotions: 0,
        verses: 0,
        videos: 0,
    };

    if db.count_devotions()? == 0 {
        let fixtures: Vec<FixtureDevotion> = serde_json::from_str(DEVOTIONS_JSON)?;
        for d in &fixtures {
            db.insert_devotion(
                &Uuid::new_v4().to_string(),
                &d.title,
                &d.excerpt,
                &d.body,
                &d.author,
                &d.date,
            )?;
        }
        response.devotions = fixtures.len();
    }

    if db.count_verses()? == 0 {
        let fixtures: Vec<FixtureVerse> = serde_json::from_str(VERSES_JSON)?;
        for v in &fixtures {
            db.insert_verse(
                &Uuid::new_v4().to_string(),
                &v.reference,
                &v.text,
                &v.translation,
                &v.date,
            )?;
        }
        response.verses = fixtures.len();
    }

    if db.count_videos()? == 0 {
        let fixtures: Vec<FixtureVideo> = serde_json::from_str(VIDEOS_JSON)?;
        for v in &fixtures {
            db.insert_video(
                &Uuid::new_v4().to_string(),
                &v.title,
                &v.speaker,
                &v.url,
                v.thumbnail_url.as_deref(),
                v.duration_seconds,
                &v.category,
                &v.date,
            )?;
        }
        response.videos = fixtures.len();
    }

    info!(
        "Seeded fixtures: {} devotions, {} verses, {} videos",
        response.devotions, response.verses, response.videos
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_fixtures_parse() {
        let devotions: Vec<FixtureDevotion> = serde_json::from_str(DEVOTIONS_JSON).unwrap();
        let verses: Vec<FixtureVerse> = serde_json::from_str(VERSES_JSON).unwrap();
        let videos: Vec<FixtureVideo> = serde_json::from_str(VIDEOS_JSON).unwrap();

        assert!(!devotions.is_empty());
        assert!(!verses.is_empty());
        assert!(!videos.is_empty());
    }

    #[test]
    fn seeding_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let first = run_seed(&db).unwrap();
        assert!(first.devotions > 0);
        assert!(first.verses > 0);
        assert!(first.videos > 0);

        let second = run_seed(&db).unwrap();
        assert_eq!(second.devotions, 0);
        assert_eq!(second.verses, 0);
        assert_eq!(second.videos, 0);

        assert_eq!(db.count_devotions().unwrap() as usize, first.devotions);
    }

    #[test]
    fn seeder_skips_populated_collections() {
        let db = Database::open_in_memory().unwrap();
        db.insert_devotion("d1", "Existing", "e", "b", "A", "2026-01-01")
            .unwrap();

        let result = run_seed(&db).unwrap();
        assert_eq!(result.devotions, 0);
        assert!(result.verses > 0);
        assert_eq!(db.count_devotions().unwrap(), 1);
    }
}
