use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use amen_db::models::{CommentRow, PrayerRow};
use amen_types::api::{
    AddPrayerRequest, Claims, CommentResponse, PrayResponse, PrayerResponse, UpdatePrayerRequest,
};
use amen_types::events::WallEvent;

use crate::auth::AppStateInner;
use crate::content::{join_error, parse_id};
use crate::timestamps::parse_created_at;

pub(crate) const MAX_PRAYER_LEN: usize = 2000;

/// Length limits are in characters, not bytes, so multibyte text gets the
/// same room as ASCII.
pub(crate) fn over_char_limit(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}

#[derive(Debug, Deserialize)]
pub struct PrayerQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub category: Option<String>,
    /// Cursor-based pagination — pass the `created_at` of the oldest prayer
    /// from the previous page to fetch older ones.
    pub before: Option<String>,
}

fn default_limit() -> u32 {
    50
}

pub async fn get_prayers(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<PrayerQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let limit = query.limit.min(200);
    let category = query.category;
    let before = query.before;
    let viewer = claims.sub.to_string();

    // Run all blocking DB queries off the async runtime
    let (rows, comment_rows, like_rows, prayed_ids) = tokio::task::spawn_blocking(move || {
        let rows = db
            .db
            .list_prayers(category.as_deref(), limit, before.as_deref())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let prayer_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let comment_rows = db
            .db
            .get_comments_for_prayers(&prayer_ids)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let comment_ids: Vec<String> = comment_rows.iter().map(|c| c.id.clone()).collect();
        let like_rows = db
            .db
            .get_likes_for_comments(&comment_ids)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let prayed_ids = db
            .db
            .prayed_within_day(&viewer, &prayer_ids)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        Ok::<_, StatusCode>((rows, comment_rows, like_rows, prayed_ids))
    })
    .await
    .map_err(join_error)??;

    // Group likes by comment, comments by prayer (cheap in-memory work)
    let viewer_id = claims.sub.to_string();
    let mut like_map: HashMap<String, Vec<String>> = HashMap::new();
    for like in like_rows {
        like_map.entry(like.comment_id).or_default().push(like.user_id);
    }

    let mut comment_map: HashMap<String, Vec<CommentResponse>> = HashMap::new();
    for row in comment_rows {
        let prayer_key = row.prayer_id.clone();
        let likers = like_map.remove(&row.id).unwrap_or_default();
        let response = comment_response(row, &likers, &viewer_id);
        comment_map.entry(prayer_key).or_default().push(response);
    }

    let prayed: HashSet<String> = prayed_ids.into_iter().collect();

    let prayers: Vec<PrayerResponse> = rows
        .into_iter()
        .map(|row| {
            let comments = comment_map.remove(&row.id).unwrap_or_default();
            let has_prayed = prayed.contains(&row.id);
            prayer_response(row, comments, has_prayed)
        })
        .collect();

    Ok(Json(prayers))
}

pub async fn add_prayer(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddPrayerRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let text = req.text.trim().to_string();
    if text.is_empty() || over_char_limit(&text, MAX_PRAYER_LEN) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.category.is_empty() || req.category.len() > 64 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let prayer_id = Uuid::new_v4();
    let author_name = if req.anonymous {
        None
    } else {
        Some(claims.name.clone())
    };

    let db = state.clone();
    let pid = prayer_id.to_string();
    let uid = claims.sub.to_string();
    let insert_text = text.clone();
    let category = req.category.clone();
    let name = author_name.clone();
    let image_url = req.image_url.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_prayer(
            &pid,
            &uid,
            &insert_text,
            &category,
            req.anonymous,
            name.as_deref(),
            image_url.as_deref(),
        )
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let now = chrono::Utc::now();

    state.dispatcher.broadcast(WallEvent::PrayerCreate {
        id: prayer_id,
        text: text.clone(),
        category: req.category.clone(),
        anonymous: req.anonymous,
        author_name: author_name.clone(),
        image_url: req.image_url.clone(),
        created_at: now,
    });

    Ok((
        StatusCode::CREATED,
        Json(PrayerResponse {
            id: prayer_id,
            text,
            category: req.category,
            anonymous: req.anonymous,
            author_name,
            image_url: req.image_url,
            prayer_count: 0,
            has_prayed: false,
            comment_count: 0,
            comments: vec![],
            created_at: now,
        }),
    ))
}

pub async fn update_prayer(
    State(state): State<Arc<AppStateInner>>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePrayerRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let pid = prayer_id.to_string();
    let row = tokio::task::spawn_blocking(move || db.db.get_prayer(&pid))
        .await
        .map_err(join_error)?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if row.user_id != claims.sub.to_string() {
        return Err(StatusCode::FORBIDDEN);
    }

    let text = match req.text {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() || over_char_limit(&t, MAX_PRAYER_LEN) {
                return Err(StatusCode::BAD_REQUEST);
            }
            t
        }
        None => row.text,
    };
    let category = match req.category {
        Some(c) => {
            if c.is_empty() || c.len() > 64 {
                return Err(StatusCode::BAD_REQUEST);
            }
            c
        }
        None => row.category,
    };

    let db = state.clone();
    let pid = prayer_id.to_string();
    let new_text = text.clone();
    let new_category = category.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.db.update_prayer(&pid, &new_text, &new_category)
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    state.dispatcher.broadcast(WallEvent::PrayerUpdate {
        id: prayer_id,
        text: text.clone(),
        category: category.clone(),
    });

    Ok(Json(serde_json::json!({
        "id": prayer_id,
        "text": text,
        "category": category,
    })))
}

pub async fn delete_prayer(
    State(state): State<Arc<AppStateInner>>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let pid = prayer_id.to_string();
    let uid = claims.sub.to_string();
    let category = tokio::task::spawn_blocking(move || {
        let row = match db.db.get_prayer(&pid).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
            Some(row) => row,
            None => return Err(StatusCode::NOT_FOUND),
        };
        if row.user_id != uid {
            return Err(StatusCode::FORBIDDEN);
        }
        db.db
            .delete_prayer(&pid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(row.category)
    })
    .await
    .map_err(join_error)??;

    state.dispatcher.broadcast(WallEvent::PrayerDelete {
        id: prayer_id,
        category,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /prayers/{id}/pray — the "I prayed for this" action. The
/// once-per-24h-per-prayer-per-user limit is enforced here, against the
/// support table, not by the client.
pub async fn pray(
    State(state): State<Arc<AppStateInner>>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let support_id = Uuid::new_v4();

    let db = state.clone();
    let pid = prayer_id.to_string();
    let uid = claims.sub.to_string();
    let (category, counted, prayer_count) = tokio::task::spawn_blocking(move || {
        let row = match db.db.get_prayer(&pid).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
            Some(row) => row,
            None => return Err(StatusCode::NOT_FOUND),
        };

        match db
            .db
            .record_pray(&support_id.to_string(), &pid, &uid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        {
            Some(count) => Ok((row.category, true, count)),
            None => Ok((row.category, false, row.prayer_count)),
        }
    })
    .await
    .map_err(join_error)??;

    if counted {
        state.dispatcher.broadcast(WallEvent::PrayerCountUpdate {
            prayer_id,
            category,
            prayer_count,
            user_id: claims.sub,
        });
    }

    Ok(Json(PrayResponse {
        counted,
        prayer_count,
    }))
}

// -- Response assembly --

pub(crate) fn prayer_response(
    row: PrayerRow,
    comments: Vec<CommentResponse>,
    has_prayed: bool,
) -> PrayerResponse {
    PrayerResponse {
        id: parse_id(&row.id, "prayer"),
        created_at: parse_created_at(&row.created_at, &format!("prayer '{}'", row.id)),
        // Anonymity wins even if a name slipped into the row
        author_name: if row.anonymous { None } else { row.author_name },
        text: row.text,
        category: row.category,
        anonymous: row.anonymous,
        image_url: row.image_url,
        prayer_count: row.prayer_count,
        has_prayed,
        comment_count: comments.len(),
        comments,
    }
}

pub(crate) fn comment_response(
    row: CommentRow,
    liker_ids: &[String],
    viewer_id: &str,
) -> CommentResponse {
    CommentResponse {
        id: parse_id(&row.id, "comment"),
        prayer_id: parse_id(&row.prayer_id, "comment prayer ref"),
        created_at: parse_created_at(&row.created_at, &format!("comment '{}'", row.id)),
        author_name: row.author_name,
        text: row.text,
        like_count: liker_ids.len(),
        liked: liker_ids.iter().any(|id| id == viewer_id),
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_PRAYER_LEN, over_char_limit};

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 2000 three-byte characters is 6000 bytes but exactly at the limit
        let text = "祈".repeat(MAX_PRAYER_LEN);
        assert!(text.len() > MAX_PRAYER_LEN);
        assert!(!over_char_limit(&text, MAX_PRAYER_LEN));
    }

    #[test]
    fn limit_rejects_one_character_over() {
        let text = "a".repeat(MAX_PRAYER_LEN + 1);
        assert!(over_char_limit(&text, MAX_PRAYER_LEN));
    }
}
