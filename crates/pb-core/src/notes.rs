//! # Notes Service
//!
//! Private notes addressed by a globally unique slug. Every operation needs
//! a login. Another user's note reads as missing (404) on GET and is refused
//! outright (403) on a mutating POST.

use std::sync::Arc;

use serde::Deserialize;

use crate::access::{authorize, require_login, Identity, Operation, Resource, Verb};
use crate::error::{AppError, FieldError, Result};
use crate::models::{Note, NoteDraft};
use crate::slug::{is_valid_slug, slugify, MAX_SLUG_LEN};
use crate::traits::NoteRepo;

pub const MAX_TITLE_LEN: usize = 100;
pub const DUPLICATE_SLUG: &str = "a note with this slug already exists";

/// Raw note form fields as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteInput {
    pub title: String,
    pub text: String,
    /// Blank means "derive from the title".
    pub slug: String,
}

impl From<&Note> for NoteInput {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: note.slug.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepo>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepo>) -> Self {
        Self { repo }
    }

    /// The caller's notes and nobody else's.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Note>> {
        authorize(identity, Resource::Note, Operation::ViewList, Verb::Read, None, "list")?;
        let author = require_login(identity)?;
        Ok(self.repo.list_notes_by_author(author).await?)
    }

    /// Loads a note the caller may perform `op` on.
    pub async fn note_for(
        &self,
        identity: &Identity,
        slug: &str,
        op: Operation,
        verb: Verb,
    ) -> Result<Note> {
        require_login(identity)?;
        let note = self
            .repo
            .get_note_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Note", slug))?;
        authorize(identity, Resource::Note, op, verb, Some(note.author_id), slug)?;
        Ok(note)
    }

    pub async fn create(&self, identity: &Identity, input: &NoteInput) -> Result<Note> {
        let author = require_login(identity)?;
        let draft = self.validate(input, None).await?;
        let note = self
            .repo
            .create_note(author, draft)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_SLUG))?;
        tracing::info!(note_id = note.id, slug = %note.slug, author = %author, "note created");
        Ok(note)
    }

    pub async fn update(&self, identity: &Identity, slug: &str, input: &NoteInput) -> Result<Note> {
        let note = self.note_for(identity, slug, Operation::Edit, Verb::Write).await?;
        let draft = self.validate(input, Some(note.id)).await?;
        self.repo
            .update_note(note.id, draft.clone())
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_SLUG))?;
        tracing::info!(note_id = note.id, slug = %draft.slug, "note updated");
        Ok(Note {
            title: draft.title,
            text: draft.text,
            slug: draft.slug,
            ..note
        })
    }

    pub async fn delete(&self, identity: &Identity, slug: &str) -> Result<Note> {
        let note = self.note_for(identity, slug, Operation::Delete, Verb::Write).await?;
        self.repo.delete_note(note.id).await?;
        tracing::info!(note_id = note.id, slug, "note deleted");
        Ok(note)
    }

    /// Checks every field and resolves the slug. `except` is the id of the
    /// note being edited so its current slug does not collide with itself.
    async fn validate(&self, input: &NoteInput, except: Option<i64>) -> Result<NoteDraft> {
        let mut errors = Vec::new();

        let title = input.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "this field is required"));
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.push(FieldError::new(
                "title",
                format!("ensure this value has at most {MAX_TITLE_LEN} characters"),
            ));
        }

        let text = input.text.trim();
        if text.is_empty() {
            errors.push(FieldError::new("text", "this field is required"));
        }

        let explicit = input.slug.trim();
        let slug = if explicit.is_empty() {
            slugify(title)
        } else {
            explicit.to_string()
        };
        if slug.is_empty() {
            if !title.is_empty() {
                errors.push(FieldError::new("slug", "could not derive a slug from the title; enter one"));
            }
        } else if !is_valid_slug(&slug) {
            errors.push(FieldError::new(
                "slug",
                format!(
                    "enter a valid slug of at most {MAX_SLUG_LEN} letters, numbers, underscores or hyphens"
                ),
            ));
        } else if self.repo.slug_exists(&slug, except).await? {
            errors.push(FieldError::new("slug", DUPLICATE_SLUG));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(NoteDraft {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::traits::MockNoteRepo;

    fn input(title: &str, slug: &str) -> NoteInput {
        NoteInput {
            title: title.into(),
            text: "Какой-то текст".into(),
            slug: slug.into(),
        }
    }

    fn note(author: UserId) -> Note {
        Note {
            id: 1,
            title: "Заголовок".into(),
            text: "Текст".into(),
            slug: "test-slug".into(),
            author_id: author,
        }
    }

    #[tokio::test]
    async fn blank_slug_is_derived_from_title() {
        let mut repo = MockNoteRepo::new();
        repo.expect_slug_exists()
            .withf(|slug, except| slug == "testovaya-zametka" && except.is_none())
            .returning(|_, _| Ok(false));
        repo.expect_create_note()
            .withf(|_, draft| draft.slug == "testovaya-zametka")
            .times(1)
            .returning(|author, draft| {
                Ok(Note { id: 1, title: draft.title, text: draft.text, slug: draft.slug, author_id: author })
            });
        let svc = NoteService::new(Arc::new(repo));

        let author = UserId::random();
        let created = svc
            .create(&Identity::User(author), &input("Тестовая заметка", ""))
            .await
            .unwrap();
        assert_eq!(created.slug, "testovaya-zametka");
        assert_eq!(created.author_id, author);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_field_error_and_nothing_is_written() {
        let mut repo = MockNoteRepo::new();
        repo.expect_slug_exists().returning(|_, _| Ok(true));
        repo.expect_create_note().never();
        let svc = NoteService::new(Arc::new(repo));

        let err = svc
            .create(&Identity::User(UserId::random()), &input("Не новая заметка", "non_unique_slug"))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::new("slug", DUPLICATE_SLUG)]);
    }

    #[tokio::test]
    async fn slug_taken_between_check_and_insert_is_a_field_error() {
        let mut repo = MockNoteRepo::new();
        repo.expect_slug_exists().returning(|_, _| Ok(false));
        repo.expect_create_note()
            .returning(|_, _| Err(crate::error::UniqueViolation { field: "slug" }.into()));
        let svc = NoteService::new(Arc::new(repo));

        let err = svc
            .create(&Identity::User(UserId::random()), &input("Заметка", "raced-slug"))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::new("slug", DUPLICATE_SLUG)]);
    }

    #[tokio::test]
    async fn missing_fields_are_all_reported() {
        let repo = MockNoteRepo::new();
        let svc = NoteService::new(Arc::new(repo));

        let err = svc
            .create(&Identity::User(UserId::random()), &NoteInput::default())
            .await
            .unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "text"]);
    }

    #[tokio::test]
    async fn stranger_post_is_forbidden_and_get_is_hidden() {
        let owner = UserId::random();
        let mut repo = MockNoteRepo::new();
        repo.expect_get_note_by_slug().returning(move |_| Ok(Some(note(owner))));
        repo.expect_update_note().never();
        repo.expect_delete_note().never();
        let svc = NoteService::new(Arc::new(repo));
        let stranger = Identity::User(UserId::random());

        let err = svc.update(&stranger, "test-slug", &input("Новое", "test-slug")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = svc.delete(&stranger, "test-slug").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = svc
            .note_for(&stranger, "test-slug", Operation::ViewDetail, Verb::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn editing_keeps_own_slug() {
        let owner = UserId::random();
        let mut repo = MockNoteRepo::new();
        repo.expect_get_note_by_slug().returning(move |_| Ok(Some(note(owner))));
        repo.expect_slug_exists()
            .withf(|slug, except| slug == "test-slug" && *except == Some(1))
            .returning(|_, _| Ok(false));
        repo.expect_update_note().times(1).returning(|_, _| Ok(()));
        let svc = NoteService::new(Arc::new(repo));

        let updated = svc
            .update(&Identity::User(owner), "test-slug", &input("Обновлённая заметка", "test-slug"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Обновлённая заметка");
        assert_eq!(updated.slug, "test-slug");
    }
}
