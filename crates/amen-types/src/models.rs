use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an account was created. Only `email` accounts carry a password hash;
/// the others are keyed by the provider's subject identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
    Apple,
    Phone,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Google => "google",
            Self::Apple => "apple",
            Self::Phone => "phone",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "google" => Some(Self::Google),
            "apple" => Some(Self::Apple),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Absent for phone-provider accounts.
    pub email: Option<String>,
    pub provider: AuthProvider,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Devotion {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub author: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    pub id: Uuid,
    pub reference: String,
    pub text: String,
    pub translation: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub speaker: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub category: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// Content kinds a favorite may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Devotion,
    Verse,
    Video,
    Prayer,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devotion => "devotion",
            Self::Verse => "verse",
            Self::Video => "video",
            Self::Prayer => "prayer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "devotion" => Some(Self::Devotion),
            "verse" => Some(Self::Verse),
            "video" => Some(Self::Video),
            "prayer" => Some(Self::Prayer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_str() {
        for p in [
            AuthProvider::Email,
            AuthProvider::Google,
            AuthProvider::Apple,
            AuthProvider::Phone,
        ] {
            assert_eq!(AuthProvider::parse(p.as_str()), Some(p));
        }
        assert_eq!(AuthProvider::parse("facebook"), None);
    }

    #[test]
    fn favorite_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FavoriteKind::Devotion).unwrap();
        assert_eq!(json, "\"devotion\"");
        assert_eq!(FavoriteKind::parse("prayer"), Some(FavoriteKind::Prayer));
    }
}
