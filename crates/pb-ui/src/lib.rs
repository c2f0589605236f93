//! # pb-ui
//!
//! Askama page templates. Every page extends `base.html`, which needs the
//! logged-in username (if any) for the navigation bar.

use askama::Template;
use pb_core::models::{Comment, NewsItem, Note};
use pb_core::FieldError;

/// Field errors attached to a re-rendered form.
#[derive(Debug, Clone, Default)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn new(errors: &[FieldError]) -> Self {
        Self(errors.to_vec())
    }

    /// Messages for one field, in the order they were raised.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State of the single-field comment form.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub text: String,
    pub errors: FormErrors,
}

/// State of the note create/edit form.
#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    pub slug: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "notes_home.html")]
pub struct NotesHomeTemplate<'a> {
    pub current_user: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "news_list.html")]
pub struct NewsListTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub news: &'a [NewsItem],
}

#[derive(Template)]
#[template(path = "news_detail.html")]
pub struct NewsDetailTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub news: &'a NewsItem,
    pub comments: &'a [Comment],
    /// `None` for anonymous visitors: they get no comment form.
    pub form: Option<CommentForm>,
}

impl NewsDetailTemplate<'_> {
    /// Edit/delete links are shown on the viewer's own comments only.
    pub fn owns(&self, comment: &Comment) -> bool {
        self.current_user == Some(comment.author_name.as_str())
    }
}

#[derive(Template)]
#[template(path = "comment_edit.html")]
pub struct CommentEditTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub comment: &'a Comment,
    pub form: CommentForm,
}

#[derive(Template)]
#[template(path = "comment_delete.html")]
pub struct CommentDeleteTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub comment: &'a Comment,
}

#[derive(Template)]
#[template(path = "notes_list.html")]
pub struct NotesListTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub notes: &'a [Note],
}

#[derive(Template)]
#[template(path = "note_form.html")]
pub struct NoteFormTemplate<'a> {
    pub current_user: Option<&'a str>,
    /// Form POST target
    pub action: &'a str,
    pub heading: &'a str,
    pub form: NoteForm,
}

#[derive(Template)]
#[template(path = "note_detail.html")]
pub struct NoteDetailTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub note: &'a Note,
}

#[derive(Template)]
#[template(path = "note_delete.html")]
pub struct NoteDeleteTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub note: &'a Note,
}

#[derive(Template)]
#[template(path = "note_done.html")]
pub struct NoteDoneTemplate<'a> {
    pub current_user: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub username: &'a str,
    /// Carried through the form so a successful login lands back on it
    pub next: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate<'a> {
    pub current_user: Option<&'a str>,
    pub username: &'a str,
    pub errors: FormErrors,
}
