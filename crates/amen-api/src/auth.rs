use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::warn;
use uuid::Uuid;

use amen_db::Database;
use amen_db::models::UserRow;
use amen_gateway::dispatcher::Dispatcher;
use amen_types::api::{
    AuthResponse, Claims, LoginRequest, RegisterRequest, SocialLoginRequest, UpdateProfileRequest,
};
use amen_types::models::{AuthProvider, User};

use crate::timestamps::parse_created_at;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub dispatcher: Dispatcher,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.name.is_empty() || req.name.len() > 64 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !req.email.contains('@') || req.email.len() > 254 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }
    // Password registration only creates email accounts
    if req.provider.is_some_and(|p| p != AuthProvider::Email) {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Check if email is taken
    if state
        .db
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(
            &user_id.to_string(),
            &req.name,
            Some(&req.email),
            Some(&password_hash),
            AuthProvider::Email.as_str(),
            None,
        )
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let token = create_token(&state.jwt_secret, user_id, &req.name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(user_from_row)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = state
        .db
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Social accounts have no password to check
    let stored_hash = row.password.as_deref().ok_or(StatusCode::UNAUTHORIZED)?;

    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: Uuid = row
        .id
        .parse()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let token = create_token(&state.jwt_secret, user_id, &row.name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(AuthResponse {
        user: user_from_row(row),
        token,
    }))
}

/// Social sign-in: the account is keyed by (provider, subject) and created on
/// first sight. The upstream identity token was checked by the provider's own
/// SDK on-device; the server does not re-verify it.
pub async fn social_login(
    State(state): State<AppState>,
    Json(req): Json<SocialLoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.provider == AuthProvider::Email {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.subject.is_empty() || req.name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let existing = state
        .db
        .get_user_by_subject(req.provider.as_str(), &req.subject)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let (row, created) = match existing {
        Some(row) => (row, false),
        None => {
            let user_id = Uuid::new_v4();
            state
                .db
                .create_user(
                    &user_id.to_string(),
                    &req.name,
                    req.email.as_deref(),
                    None,
                    req.provider.as_str(),
                    Some(&req.subject),
                )
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            let row = state
                .db
                .get_user_by_id(&user_id.to_string())
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
            (row, true)
        }
    };

    let user_id: Uuid = row
        .id
        .parse()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let token = create_token(&state.jwt_secret, user_id, &row.name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AuthResponse {
            user: user_from_row(row),
            token,
        }),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user_from_row(row)))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.name.is_empty() || req.name.len() > 64 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let updated = state
        .db
        .update_user_name(&claims.sub.to_string(), &req.name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user_from_row(row)))
}

pub(crate) fn create_token(secret: &str, user_id: Uuid, name: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt user id '{}': {}", row.id, e);
            Uuid::default()
        }),
        provider: AuthProvider::parse(&row.provider).unwrap_or_else(|| {
            warn!("Unknown auth provider '{}' on user '{}'", row.provider, row.id);
            AuthProvider::Email
        }),
        created_at: parse_created_at(&row.created_at, &format!("user '{}'", row.id)),
        name: row.name,
        email: row.email,
        email_verified: row.email_verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn issued_tokens_decode_with_same_secret() {
        let user_id = Uuid::new_v4();
        let token = create_token("test-secret", user_id, "Grace").unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.name, "Grace");
    }

    #[test]
    fn issued_tokens_fail_with_wrong_secret() {
        let token = create_token("test-secret", Uuid::new_v4(), "Grace").unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn corrupt_rows_degrade_instead_of_panicking() {
        let user = user_from_row(UserRow {
            id: "not-a-uuid".into(),
            name: "Grace".into(),
            email: None,
            password: None,
            provider: "myspace".into(),
            subject: None,
            email_verified: false,
            created_at: "garbage".into(),
        });

        assert_eq!(user.id, Uuid::default());
        assert_eq!(user.provider, AuthProvider::Email);
    }
}
