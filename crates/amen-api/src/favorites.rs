use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use amen_db::models::FavoriteRow;
use amen_types::api::{AddFavoriteRequest, Claims, FavoriteResponse};
use amen_types::models::FavoriteKind;

use crate::auth::AppStateInner;
use crate::content::{join_error, parse_id};
use crate::timestamps::parse_created_at;

pub async fn list_favorites(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_favorites(&uid))
        .await
        .map_err(join_error)?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let favorites: Vec<FavoriteResponse> = rows.into_iter().map(favorite_from_row).collect();
    Ok(Json(favorites))
}

pub async fn add_favorite(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.title.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let favorite_id = Uuid::new_v4();

    let db = state.clone();
    let fid = favorite_id.to_string();
    let uid = claims.sub.to_string();
    let row = tokio::task::spawn_blocking(move || {
        db.db.add_favorite(
            &fid,
            &uid,
            req.item_type.as_str(),
            &req.item_id.to_string(),
            &req.title,
            req.subtitle.as_deref(),
        )
    })
    .await
    .map_err(join_error)?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // The DB may have returned a pre-existing bookmark for this item
    let created = row.id == favorite_id.to_string();
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(favorite_from_row(row))))
}

pub async fn delete_favorite(
    State(state): State<Arc<AppStateInner>>,
    Path(favorite_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let fid = favorite_id.to_string();
    let uid = claims.sub.to_string();
    tokio::task::spawn_blocking(move || {
        let row = match db.db.get_favorite(&fid).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
            Some(row) => row,
            None => return Err(StatusCode::NOT_FOUND),
        };
        if row.user_id != uid {
            return Err(StatusCode::FORBIDDEN);
        }
        db.db
            .delete_favorite(&fid)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(())
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}

fn favorite_from_row(row: FavoriteRow) -> FavoriteResponse {
    FavoriteResponse {
        id: parse_id(&row.id, "favorite"),
        item_type: FavoriteKind::parse(&row.item_type).unwrap_or_else(|| {
            warn!("Unknown favorite kind '{}' on '{}'", row.item_type, row.id);
            FavoriteKind::Devotion
        }),
        item_id: parse_id(&row.item_id, "favorite item ref"),
        created_at: parse_created_at(&row.created_at, &format!("favorite '{}'", row.id)),
        title: row.title,
        subtitle: row.subtitle,
    }
}
