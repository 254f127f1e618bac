use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AuthProvider, FavoriteKind, User};

// -- JWT Claims --

/// JWT claims shared between amen-api (REST middleware) and amen-gateway
/// (WebSocket Identify). Canonical definition lives here in amen-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Optional; when present it must be `email` — social accounts go
    /// through `/auth/social` instead.
    #[serde(default)]
    pub provider: Option<AuthProvider>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in via a social provider. The provider's subject identifier keys the
/// account; no upstream token verification happens server-side.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLoginRequest {
    pub provider: AuthProvider,
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: String,
}

// -- Content collections --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddDevotionRequest {
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub author: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddVerseRequest {
    pub reference: String,
    pub text: String,
    pub translation: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddVideoRequest {
    pub title: String,
    pub speaker: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub category: String,
    pub date: String,
}

/// Per-collection insert counts from the fixture seeder. A count of zero
/// means the collection already had data and was skipped.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub devotions: usize,
    pub verses: usize,
    pub videos: usize,
}

// -- Prayer wall --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddPrayerRequest {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub anonymous: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePrayerRequest {
    pub text: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrayerResponse {
    pub id: Uuid,
    pub text: String,
    pub category: String,
    pub anonymous: bool,
    /// None when the prayer was posted anonymously.
    pub author_name: Option<String>,
    pub image_url: Option<String>,
    pub prayer_count: i64,
    /// True when the viewer's latest counted pray is inside the 24h window.
    pub has_prayed: bool,
    pub comment_count: usize,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PrayResponse {
    /// False when the 24h per-user-per-prayer limit swallowed the action.
    pub counted: bool,
    pub prayer_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub prayer_id: Uuid,
    pub author_name: String,
    pub text: String,
    pub like_count: usize,
    /// True when the viewer has liked this comment.
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: usize,
}

// -- Favorites --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddFavoriteRequest {
    pub item_type: FavoriteKind,
    pub item_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub item_type: FavoriteKind,
    pub item_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_explicit_email_provider() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Grace","email":"g@example.com","password":"longenough","provider":"email"}"#,
        )
        .unwrap();
        assert_eq!(req.provider, Some(AuthProvider::Email));
    }

    #[test]
    fn register_provider_is_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Grace","email":"g@example.com","password":"longenough"}"#,
        )
        .unwrap();
        assert!(req.provider.is_none());
    }

    #[test]
    fn register_still_rejects_unknown_fields() {
        let result = serde_json::from_str::<RegisterRequest>(
            r#"{"name":"Grace","email":"g@example.com","password":"longenough","role":"admin"}"#,
        );
        assert!(result.is_err());
    }
}
