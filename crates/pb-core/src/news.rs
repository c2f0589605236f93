//! # News Service
//!
//! Public news feed plus reader comments. Reading is open to everyone;
//! writing comments needs a login, and only a comment's author can touch it
//! afterwards. Other users get a 404, never a hint that the comment exists.

use std::sync::Arc;

use chrono::Utc;

use crate::access::{authorize, require_login, Identity, Operation, Resource, Verb};
use crate::content::ContentFilter;
use crate::error::{AppError, FieldError, Result};
use crate::models::{Comment, NewNewsItem, NewsItem};
use crate::traits::NewsRepo;

/// Default cap on the home page list.
pub const NEWS_PER_PAGE: i64 = 10;

/// Outcome of a comment edit by its author.
#[derive(Debug)]
pub enum CommentEdit {
    Saved(Comment),
    /// The new text failed the filter. Carries the stored comment for re-rendering.
    Rejected { comment: Comment, errors: Vec<FieldError> },
}

/// Orchestrates news reads and comment writes.
#[derive(Clone)]
pub struct NewsService {
    repo: Arc<dyn NewsRepo>,
    filter: ContentFilter,
    per_page: i64,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepo>, filter: ContentFilter, per_page: i64) -> Self {
        Self { repo, filter, per_page: per_page.max(1) }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Publishes a news item. Only reachable from trusted tooling.
    pub async fn publish(&self, item: NewNewsItem) -> Result<NewsItem> {
        let created = self.repo.create_news(item).await?;
        tracing::info!(news_id = created.id, "news item published");
        Ok(created)
    }

    /// The home page: at most one page of items, newest first.
    pub async fn home(&self) -> Result<Vec<NewsItem>> {
        Ok(self.repo.list_latest_news(self.per_page).await?)
    }

    /// A news item with its comments, oldest comment first.
    pub async fn detail(&self, news_id: i64) -> Result<(NewsItem, Vec<Comment>)> {
        let item = self
            .repo
            .get_news(news_id)
            .await?
            .ok_or_else(|| AppError::not_found("News", news_id))?;
        let comments = self.repo.list_comments(news_id).await?;
        Ok((item, comments))
    }

    pub async fn add_comment(&self, identity: &Identity, news_id: i64, text: &str) -> Result<Comment> {
        let author = require_login(identity)?;
        if self.repo.get_news(news_id).await?.is_none() {
            return Err(AppError::not_found("News", news_id));
        }
        self.filter.check(text)?;

        let comment = self
            .repo
            .create_comment(news_id, author, text.trim().to_string(), Utc::now())
            .await?;
        tracing::info!(comment_id = comment.id, news_id, author = %author, "comment created");
        Ok(comment)
    }

    /// Loads a comment the caller is allowed to act on.
    pub async fn comment_for(
        &self,
        identity: &Identity,
        comment_id: i64,
        op: Operation,
        verb: Verb,
    ) -> Result<Comment> {
        require_login(identity)?;
        let comment = self
            .repo
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", comment_id))?;
        authorize(
            identity,
            Resource::Comment,
            op,
            verb,
            Some(comment.author_id),
            &comment_id.to_string(),
        )?;
        Ok(comment)
    }

    /// Replaces the text of the caller's own comment.
    pub async fn edit_comment(&self, identity: &Identity, comment_id: i64, text: &str) -> Result<CommentEdit> {
        let mut comment = self
            .comment_for(identity, comment_id, Operation::Edit, Verb::Write)
            .await?;
        match self.filter.check(text) {
            Ok(()) => {}
            Err(AppError::Validation(errors)) => return Ok(CommentEdit::Rejected { comment, errors }),
            Err(e) => return Err(e),
        }

        comment.text = text.trim().to_string();
        self.repo.update_comment_text(comment.id, comment.text.clone()).await?;
        tracing::info!(comment_id, "comment edited");
        Ok(CommentEdit::Saved(comment))
    }

    /// Deletes the caller's own comment, returning it for the redirect target.
    pub async fn delete_comment(&self, identity: &Identity, comment_id: i64) -> Result<Comment> {
        let comment = self
            .comment_for(identity, comment_id, Operation::Delete, Verb::Write)
            .await?;
        self.repo.delete_comment(comment.id).await?;
        tracing::info!(comment_id, "comment deleted");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::traits::MockNewsRepo;
    use chrono::NaiveDate;

    fn item(id: i64) -> NewsItem {
        NewsItem {
            id,
            title: "Тестовая новость".into(),
            text: "Несколько букв".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    fn comment(id: i64, author: UserId) -> Comment {
        Comment {
            id,
            news_id: 1,
            author_id: author,
            author_name: "author".into(),
            text: "Первый!".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn home_asks_repo_for_one_page() {
        let mut repo = MockNewsRepo::new();
        repo.expect_list_latest_news()
            .withf(|limit| *limit == NEWS_PER_PAGE)
            .returning(|_| Ok(vec![item(1)]));
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);
        assert_eq!(svc.home().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn banned_comment_never_reaches_the_repo() {
        let mut repo = MockNewsRepo::new();
        repo.expect_get_news().returning(|id| Ok(Some(item(id))));
        repo.expect_create_comment().never();
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);

        let err = svc
            .add_comment(&Identity::User(UserId::random()), 1, "Ты редиска")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn anonymous_comment_requires_login_before_any_lookup() {
        let mut repo = MockNewsRepo::new();
        repo.expect_get_news().never();
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);

        let err = svc.add_comment(&Identity::Anonymous, 1, "Комментарий").await.unwrap_err();
        assert!(matches!(err, AppError::LoginRequired));
    }

    #[tokio::test]
    async fn stranger_cannot_delete_and_sees_not_found() {
        let owner = UserId::random();
        let mut repo = MockNewsRepo::new();
        repo.expect_get_comment().returning(move |id| Ok(Some(comment(id, owner))));
        repo.expect_delete_comment().never();
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);

        let err = svc
            .delete_comment(&Identity::User(UserId::random()), 7)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn author_edits_own_comment() {
        let owner = UserId::random();
        let mut repo = MockNewsRepo::new();
        repo.expect_get_comment().returning(move |id| Ok(Some(comment(id, owner))));
        repo.expect_update_comment_text()
            .withf(|id, text| *id == 3 && text == "Обновленный комментарий")
            .times(1)
            .returning(|_, _| Ok(()));
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);

        let outcome = svc
            .edit_comment(&Identity::User(owner), 3, "Обновленный комментарий")
            .await
            .unwrap();
        assert!(matches!(outcome, CommentEdit::Saved(c) if c.text == "Обновленный комментарий"));
    }

    #[tokio::test]
    async fn rejected_edit_returns_the_stored_comment() {
        let owner = UserId::random();
        let mut repo = MockNewsRepo::new();
        repo.expect_get_comment().times(1).returning(move |id| Ok(Some(comment(id, owner))));
        repo.expect_update_comment_text().never();
        let svc = NewsService::new(Arc::new(repo), ContentFilter::default(), NEWS_PER_PAGE);

        let outcome = svc
            .edit_comment(&Identity::User(owner), 3, "Ты негодяй")
            .await
            .unwrap();
        match outcome {
            CommentEdit::Rejected { comment, errors } => {
                assert_eq!(comment.text, "Первый!");
                assert_eq!(errors[0].message, crate::content::CURSE_WARNING);
            }
            CommentEdit::Saved(_) => panic!("filtered text was saved"),
        }
    }
}
