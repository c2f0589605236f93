//! # Domain Models
//!
//! These structs represent the core entities of Paperboard.
//! Users are identified by UUID; news items, comments and notes use the
//! integer row ids that appear in their URLs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the string form stored in session cookies.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// PHC-formatted argon2 hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff accounts may publish news through the seed tool.
    pub is_staff: bool,
    pub joined_at: DateTime<Utc>,
}

/// A published news item. Read-only for end users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date; the home page sorts on it, newest first.
    pub date: NaiveDate,
}

/// Input for publishing a news item.
#[derive(Debug, Clone)]
pub struct NewNewsItem {
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

/// A reader comment attached to exactly one news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    /// Set at creation, never reassigned.
    pub author_id: UserId,
    /// Denormalized for rendering; not part of the ownership check.
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A private note owned by its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Globally unique URL identifier
    pub slug: String,
    pub author_id: UserId,
}

/// Validated note fields ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}
