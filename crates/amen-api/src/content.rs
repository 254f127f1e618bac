use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;
use uuid::Uuid;

use amen_db::models::{DevotionRow, VerseRow, VideoRow};
use amen_types::api::{AddDevotionRequest, AddVerseRequest, AddVideoRequest};
use amen_types::models::{Devotion, Verse, Video};

use crate::auth::AppStateInner;
use crate::timestamps::parse_created_at;

// -- Devotions --

pub async fn list_devotions(
    State(state): State<Arc<AppStateInner>>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_devotions())
        .await
        .map_err(join_error)?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let devotions: Vec<Devotion> = rows.into_iter().map(devotion_from_row).collect();
    Ok(Json(devotions))
}

pub async fn add_devotion(
    State(state): State<Arc<AppStateInner>>,
    Json(req): Json<AddDevotionRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.title.is_empty() || req.body.is_empty() || req.date.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let id = Uuid::new_v4();

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let did = id.to_string();
    let insert = req.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_devotion(
            &did,
            &insert.title,
            &insert.excerpt,
            &insert.body,
            &insert.author,
            &insert.date,
        )
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(Devotion {
            id,
            title: req.title,
            excerpt: req.excerpt,
            body: req.body,
            author: req.author,
            date: req.date,
            created_at: chrono::Utc::now(),
        }),
    ))
}

// -- Verses --

pub async fn list_verses(
    State(state): State<Arc<AppStateInner>>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_verses())
        .await
        .map_err(join_error)?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let verses: Vec<Verse> = rows.into_iter().map(verse_from_row).collect();
    Ok(Json(verses))
}

pub async fn add_verse(
    State(state): State<Arc<AppStateInner>>,
    Json(req): Json<AddVerseRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.reference.is_empty() || req.text.is_empty() || req.date.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let id = Uuid::new_v4();

    let db = state.clone();
    let vid = id.to_string();
    let (reference, text, translation, date) = (
        req.reference.clone(),
        req.text.clone(),
        req.translation.clone(),
        req.date.clone(),
    );
    tokio::task::spawn_blocking(move || {
        db.db.insert_verse(&vid, &reference, &text, &translation, &date)
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(Verse {
            id,
            reference: req.reference,
            text: req.text,
            translation: req.translation,
            date: req.date,
            created_at: chrono::Utc::now(),
        }),
    ))
}

// -- Videos --

pub async fn list_videos(
    State(state): State<Arc<AppStateInner>>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_videos())
        .await
        .map_err(join_error)?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let videos: Vec<Video> = rows.into_iter().map(video_from_row).collect();
    Ok(Json(videos))
}

pub async fn add_video(
    State(state): State<Arc<AppStateInner>>,
    Json(req): Json<AddVideoRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.title.is_empty() || req.url.is_empty() || req.date.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let id = Uuid::new_v4();

    let db = state.clone();
    let vid = id.to_string();
    let insert = req.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_video(
            &vid,
            &insert.title,
            &insert.speaker,
            &insert.url,
            insert.thumbnail_url.as_deref(),
            insert.duration_seconds,
            &insert.category,
            &insert.date,
        )
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(Video {
            id,
            title: req.title,
            speaker: req.speaker,
            url: req.url,
            thumbnail_url: req.thumbnail_url,
            duration_seconds: req.duration_seconds,
            category: req.category,
            date: req.date,
            created_at: chrono::Utc::now(),
        }),
    ))
}

// -- Row mapping --

pub(crate) fn devotion_from_row(row: DevotionRow) -> Devotion {
    Devotion {
        id: parse_id(&row.id, "devotion"),
        created_at: parse_created_at(&row.created_at, &format!("devotion '{}'", row.id)),
        title: row.title,
        excerpt: row.excerpt,
        body: row.body,
        author: row.author,
        date: row.date,
    }
}

pub(crate) fn verse_from_row(row: VerseRow) -> Verse {
    Verse {
        id: parse_id(&row.id, "verse"),
        created_at: parse_created_at(&row.created_at, &format!("verse '{}'", row.id)),
        reference: row.reference,
        text: row.text,
        translation: row.translation,
        date: row.date,
    }
}

pub(crate) fn video_from_row(row: VideoRow) -> Video {
    Video {
        id: parse_id(&row.id, "video"),
        created_at: parse_created_at(&row.created_at, &format!("video '{}'", row.id)),
        title: row.title,
        speaker: row.speaker,
        url: row.url,
        thumbnail_url: row.thumbnail_url,
        duration_seconds: row.duration_seconds,
        category: row.category,
        date: row.date,
    }
}

pub(crate) fn parse_id(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!("Corrupt {} id '{}': {}", context, raw, e);
        Uuid::default()
    })
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
