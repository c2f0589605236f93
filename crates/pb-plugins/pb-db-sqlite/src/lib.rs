//! # pb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `pb-core` domain models. One `SqliteRepo` serves all three ports.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pb_core::models::{Comment, NewNewsItem, NewsItem, Note, NoteDraft, User, UserId};
use pb_core::traits::{NewsRepo, NoteRepo, UserRepo};
use pb_core::UniqueViolation;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: UserId) -> Vec<u8> {
    id.as_uuid().as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> UserId {
    UserId::new(Uuid::from_slice(blob).unwrap_or_default())
}

/// Tags a uniqueness failure on `field` so services can report it on the form.
fn unique_on(err: sqlx::Error, field: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return UniqueViolation { field }.into();
        }
    }
    err.into()
}

impl SqliteRepo {
    /// Opens (or creates) the database at `url` and applies migrations.
    ///
    /// An in-memory database lives as long as its connection, so
    /// `sqlite::memory:` gets a single connection that never expires.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(url, "sqlite store ready");
        Ok(Self { pool })
    }
}

fn news_from_row(row: &SqliteRow) -> Result<NewsItem, sqlx::Error> {
    Ok(NewsItem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        date: row.try_get("date")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        news_id: row.try_get("news_id")?,
        author_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("author_id")?.as_slice()),
        author_name: row.try_get("username")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}

fn note_from_row(row: &SqliteRow) -> Result<Note, sqlx::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        slug: row.try_get("slug")?,
        author_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("author_id")?.as_slice()),
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice()),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        is_staff: row.try_get("is_staff")?,
        joined_at: row.try_get("joined_at")?,
    })
}

const COMMENT_SELECT: &str = "SELECT c.id, c.news_id, c.author_id, u.username, c.text, c.created_at \
     FROM comments c JOIN users u ON u.id = c.author_id";

#[async_trait]
impl NewsRepo for SqliteRepo {
    async fn create_news(&self, item: NewNewsItem) -> anyhow::Result<NewsItem> {
        let id = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
            .bind(&item.title)
            .bind(&item.text)
            .bind(item.date)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(NewsItem {
            id,
            title: item.title,
            text: item.text,
            date: item.date,
        })
    }

    async fn get_news(&self, id: i64) -> anyhow::Result<Option<NewsItem>> {
        let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(news_from_row).transpose()?)
    }

    /// Ties on the date fall back to insertion order.
    async fn list_latest_news(&self, limit: i64) -> anyhow::Result<Vec<NewsItem>> {
        let rows = sqlx::query("SELECT id, title, text, date FROM news ORDER BY date DESC, id ASC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(news_from_row).collect::<Result<_, _>>()?)
    }

    async fn create_comment(
        &self,
        news_id: i64,
        author_id: UserId,
        text: String,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<Comment> {
        let id = sqlx::query("INSERT INTO comments (news_id, author_id, text, created_at) VALUES (?, ?, ?, ?)")
            .bind(news_id)
            .bind(uuid_to_blob(author_id))
            .bind(&text)
            .bind(created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        self.get_comment(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment {id} vanished after insert"))
    }

    async fn get_comment(&self, id: i64) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn list_comments(&self, news_id: i64) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "{COMMENT_SELECT} WHERE c.news_id = ? ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(news_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(comment_from_row).collect::<Result<_, _>>()?)
    }

    async fn update_comment_text(&self, id: i64, text: String) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_comments(&self) -> anyhow::Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl NoteRepo for SqliteRepo {
    async fn create_note(&self, author_id: UserId, draft: NoteDraft) -> anyhow::Result<Note> {
        let id = sqlx::query("INSERT INTO notes (title, text, slug, author_id) VALUES (?, ?, ?, ?)")
            .bind(&draft.title)
            .bind(&draft.text)
            .bind(&draft.slug)
            .bind(uuid_to_blob(author_id))
            .execute(&self.pool)
            .await
            .map_err(|e| unique_on(e, "slug"))?
            .last_insert_rowid();

        Ok(Note {
            id,
            title: draft.title,
            text: draft.text,
            slug: draft.slug,
            author_id,
        })
    }

    async fn get_note_by_slug(&self, slug: &str) -> anyhow::Result<Option<Note>> {
        let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(note_from_row).transpose()?)
    }

    async fn list_notes_by_author(&self, author_id: UserId) -> anyhow::Result<Vec<Note>> {
        let rows = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id ASC")
            .bind(uuid_to_blob(author_id))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(note_from_row).collect::<Result<_, _>>()?)
    }

    async fn slug_exists(&self, slug: &str, except: Option<i64>) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM notes WHERE slug = ? AND id IS NOT ? LIMIT 1")
            .bind(slug)
            .bind(except)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn update_note(&self, id: i64, draft: NoteDraft) -> anyhow::Result<()> {
        sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
            .bind(draft.title)
            .bind(draft.text)
            .bind(draft.slug)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_on(e, "slug"))?;
        Ok(())
    }

    async fn delete_note(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_notes(&self) -> anyhow::Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl UserRepo for SqliteRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO users (id, username, password_hash, is_staff, joined_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.is_staff)
            .bind(user.joined_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_on(e, "username"))?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}
