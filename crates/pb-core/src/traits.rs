//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Comment, NewNewsItem, NewsItem, Note, NoteDraft, User, UserId};

/// Persistence contract for news items and their comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NewsRepo: Send + Sync {
    // News Operations
    async fn create_news(&self, item: NewNewsItem) -> anyhow::Result<NewsItem>;
    async fn get_news(&self, id: i64) -> anyhow::Result<Option<NewsItem>>;
    /// Newest publication date first; equal dates keep insertion order.
    async fn list_latest_news(&self, limit: i64) -> anyhow::Result<Vec<NewsItem>>;

    // Comment Operations
    async fn create_comment(
        &self,
        news_id: i64,
        author_id: UserId,
        text: String,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<Comment>;
    async fn get_comment(&self, id: i64) -> anyhow::Result<Option<Comment>>;
    /// Oldest comment first.
    async fn list_comments(&self, news_id: i64) -> anyhow::Result<Vec<Comment>>;
    async fn update_comment_text(&self, id: i64, text: String) -> anyhow::Result<()>;
    async fn delete_comment(&self, id: i64) -> anyhow::Result<()>;
    async fn count_comments(&self) -> anyhow::Result<i64>;
}

/// Persistence contract for private notes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NoteRepo: Send + Sync {
    async fn create_note(&self, author_id: UserId, draft: NoteDraft) -> anyhow::Result<Note>;
    async fn get_note_by_slug(&self, slug: &str) -> anyhow::Result<Option<Note>>;
    async fn list_notes_by_author(&self, author_id: UserId) -> anyhow::Result<Vec<Note>>;
    /// Global uniqueness probe; `except` skips the note being edited.
    async fn slug_exists(&self, slug: &str, except: Option<i64>) -> anyhow::Result<bool>;
    async fn update_note(&self, id: i64, draft: NoteDraft) -> anyhow::Result<()>;
    async fn delete_note(&self, id: i64) -> anyhow::Result<()>;
    async fn count_notes(&self) -> anyhow::Result<i64>;
}

/// Account storage contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Produces a PHC string suitable for `User::password_hash`.
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored PHC string.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}
