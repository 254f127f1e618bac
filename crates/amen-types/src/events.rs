use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events pushed over the WebSocket gateway when the prayer wall changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WallEvent {
    /// Server confirms successful authentication
    Ready { user_id: Uuid, name: String },

    /// A new prayer request was posted to the wall
    PrayerCreate {
        id: Uuid,
        text: String,
        category: String,
        anonymous: bool,
        author_name: Option<String>,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    },

    /// A prayer's text or category was edited
    PrayerUpdate {
        id: Uuid,
        text: String,
        category: String,
    },

    /// A prayer was removed, along with its comments and likes
    PrayerDelete { id: Uuid, category: String },

    /// Someone's "I prayed" action was counted
    PrayerCountUpdate {
        prayer_id: Uuid,
        category: String,
        prayer_count: i64,
        user_id: Uuid,
    },

    /// A comment was added to a prayer
    CommentCreate {
        id: Uuid,
        prayer_id: Uuid,
        category: String,
        author_name: String,
        text: String,
        created_at: DateTime<Utc>,
    },

    /// A comment like was toggled
    CommentLikeUpdate {
        comment_id: Uuid,
        prayer_id: Uuid,
        category: String,
        like_count: usize,
        user_id: Uuid,
        liked: bool,
    },
}

impl WallEvent {
    /// Returns the prayer category if this event is scoped to one.
    /// Events that return `None` are delivered to every connected client.
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::PrayerCreate { category, .. }
            | Self::PrayerUpdate { category, .. }
            | Self::PrayerDelete { category, .. }
            | Self::PrayerCountUpdate { category, .. }
            | Self::CommentCreate { category, .. }
            | Self::CommentLikeUpdate { category, .. } => Some(category),
            Self::Ready { .. } => None,
        }
    }
}

/// Commands sent FROM client TO server over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WallCommand {
    /// Authenticate the WebSocket connection
    Identify { token: String },

    /// Restrict wall events to the given prayer categories. Until the first
    /// Subscribe arrives, every event is delivered.
    Subscribe { categories: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_is_global() {
        let ev = WallEvent::Ready {
            user_id: Uuid::new_v4(),
            name: "Grace".into(),
        };
        assert!(ev.category().is_none());
    }

    #[test]
    fn wall_events_carry_their_category() {
        let ev = WallEvent::PrayerCountUpdate {
            prayer_id: Uuid::new_v4(),
            category: "healing".into(),
            prayer_count: 3,
            user_id: Uuid::new_v4(),
        };
        assert_eq!(ev.category(), Some("healing"));
    }

    #[test]
    fn commands_use_tagged_encoding() {
        let cmd: WallCommand =
            serde_json::from_str(r#"{"type":"Subscribe","data":{"categories":["hope"]}}"#)
                .unwrap();
        match cmd {
            WallCommand::Subscribe { categories } => assert_eq!(categories, vec!["hope"]),
            _ => panic!("wrong variant"),
        }
    }
}
