use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use amen_types::api::{AddCommentRequest, Claims, CommentResponse, LikeResponse};
use amen_types::events::WallEvent;

use crate::auth::AppStateInner;
use crate::content::join_error;
use crate::prayers::over_char_limit;

pub(crate) const MAX_COMMENT_LEN: usize = 1000;

pub async fn add_comment(
    State(state): State<Arc<AppStateInner>>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let text = req.text.trim().to_string();
    if text.is_empty() || over_char_limit(&text, MAX_COMMENT_LEN) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let comment_id = Uuid::new_v4();

    let db = state.clone();
    let pid = prayer_id.to_string();
    let cid = comment_id.to_string();
    let uid = claims.sub.to_string();
    let author = claims.name.clone();
    let insert_text = text.clone();
    let category = tokio::task::spawn_blocking(move || {
        let row = match db.db.get_prayer(&pid).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
            Some(row) => row,
            None => return Err(StatusCode::NOT_FOUND),
        };
        db.db
            .insert_comment(&cid, &pid, &uid, &author, &insert_text)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(row.category)
    })
    .await
    .map_err(join_error)??;

    let now = chrono::Utc::now();

    state.dispatcher.broadcast(WallEvent::CommentCreate {
        id: comment_id,
        prayer_id,
        category,
        author_name: claims.name.clone(),
        text: text.clone(),
        created_at: now,
    });

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment_id,
            prayer_id,
            author_name: claims.name,
            text,
            like_count: 0,
            liked: false,
            created_at: now,
        }),
    ))
}

pub async fn toggle_like(
    State(state): State<Arc<AppStateInner>>,
    Path((prayer_id, comment_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let like_id = Uuid::new_v4();

    let db = state.clone();
    let pid = prayer_id.to_string();
    let cid = comment_id.to_string();
    let uid = claims.sub.to_string();
    let (category, liked, like_count) = tokio::task::spawn_blocking(move || {
        let comment = match db.db.get_comment(&cid).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
            Some(comment) => comment,
            None => return Err(StatusCode::NOT_FOUND),
        };
        if comment.prayer_id != pid {
            return Err(StatusCode::NOT_FOUND);
        }

        let prayer = db
            .db
            .get_prayer(&pid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::NOT_FOUND)?;

        let liked = db
            .db
            .toggle_comment_like(&like_id.to_string(), &cid, &uid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        let like_count = db
            .db
            .count_comment_likes(&cid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        Ok((prayer.category, liked, like_count as usize))
    })
    .await
    .map_err(join_error)??;

    state.dispatcher.broadcast(WallEvent::CommentLikeUpdate {
        comment_id,
        prayer_id,
        category,
        like_count,
        user_id: claims.sub,
        liked,
    });

    Ok(Json(LikeResponse { liked, like_count }))
}
