//! The message entity and its insert payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum message content length in Unicode scalar values.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// A persisted row of the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Auto-increment primary key.
    pub id: u64,
    /// Message body, non-empty and at most [`MAX_CONTENT_CHARS`] characters.
    pub content: String,
    /// Identity of the author, derived from the bearer token's `sub` claim.
    pub user_id: String,
    /// Insertion timestamp, assigned by the database.
    pub created_at: DateTime<Utc>,
}

/// A validated message ready to be inserted.
///
/// Produced by the POST validation path; the store layer never re-checks
/// the content invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub content: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_flat() {
        let msg = Message {
            id: 7,
            content: "hello".to_string(),
            user_id: "user-1".to_string(),
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["content"], "hello");
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
    }
}
