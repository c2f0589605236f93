use actix_web::web;
use pb_core::access::{Operation, Verb};
use pb_core::news::CommentEdit;
use pb_core::AppError;
use pb_ui::{
    CommentDeleteTemplate, CommentEditTemplate, CommentForm, FormErrors, NewsDetailTemplate,
    NewsListTemplate,
};
use serde::Deserialize;

use super::render;
use crate::error::{redirect, PageResult};
use crate::viewer::{ForViewer, Viewer};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    pub text: String,
}

fn comments_anchor(news_id: i64) -> String {
    format!("/news/{news_id}/#comments")
}

/// GET /news/
pub async fn news_list(state: web::Data<AppState>, viewer: Viewer) -> PageResult {
    let news = state.news.home().await.for_viewer(&viewer)?;
    render(&NewsListTemplate {
        current_user: viewer.username(),
        news: &news,
    })
}

/// GET /news/{id}/
pub async fn news_detail(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> PageResult {
    let news_id = path.into_inner();
    let form = viewer.identity.is_authenticated().then(CommentForm::default);
    detail_page(&state, &viewer, news_id, form).await
}

/// POST /news/{id}/
///
/// An unreadable body counts as empty text, so the login check still runs first.
pub async fn add_comment(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
    form: Option<web::Form<CommentInput>>,
) -> PageResult {
    let news_id = path.into_inner();
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    let result = state.news.add_comment(&viewer.identity, news_id, &input.text).await;
    match result {
        Ok(_) => Ok(redirect(&comments_anchor(news_id))),
        Err(AppError::Validation(errors)) => {
            let form = CommentForm {
                text: input.text,
                errors: FormErrors::new(&errors),
            };
            detail_page(&state, &viewer, news_id, Some(form)).await
        }
        Err(e) => Err(viewer.fail(e)),
    }
}

async fn detail_page(
    state: &AppState,
    viewer: &Viewer,
    news_id: i64,
    form: Option<CommentForm>,
) -> PageResult {
    let (item, comments) = state.news.detail(news_id).await.for_viewer(viewer)?;
    render(&NewsDetailTemplate {
        current_user: viewer.username(),
        news: &item,
        comments: &comments,
        form,
    })
}

/// GET /news/comment/{id}/edit/
pub async fn edit_comment_page(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> PageResult {
    let comment = state
        .news
        .comment_for(&viewer.identity, path.into_inner(), Operation::Edit, Verb::Read)
        .await
        .for_viewer(&viewer)?;
    let form = CommentForm {
        text: comment.text.clone(),
        errors: FormErrors::default(),
    };
    render(&CommentEditTemplate {
        current_user: viewer.username(),
        comment: &comment,
        form,
    })
}

/// POST /news/comment/{id}/edit/
pub async fn edit_comment(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
    form: Option<web::Form<CommentInput>>,
) -> PageResult {
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    let outcome = state
        .news
        .edit_comment(&viewer.identity, path.into_inner(), &input.text)
        .await
        .for_viewer(&viewer)?;
    match outcome {
        CommentEdit::Saved(updated) => Ok(redirect(&comments_anchor(updated.news_id))),
        CommentEdit::Rejected { comment, errors } => render(&CommentEditTemplate {
            current_user: viewer.username(),
            comment: &comment,
            form: CommentForm {
                text: input.text,
                errors: FormErrors::new(&errors),
            },
        }),
    }
}

/// GET /news/comment/{id}/delete/
pub async fn delete_comment_page(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> PageResult {
    let comment = state
        .news
        .comment_for(&viewer.identity, path.into_inner(), Operation::Delete, Verb::Read)
        .await
        .for_viewer(&viewer)?;
    render(&CommentDeleteTemplate {
        current_user: viewer.username(),
        comment: &comment,
    })
}

/// POST /news/comment/{id}/delete/
pub async fn delete_comment(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> PageResult {
    let deleted = state
        .news
        .delete_comment(&viewer.identity, path.into_inner())
        .await
        .for_viewer(&viewer)?;
    Ok(redirect(&comments_anchor(deleted.news_id)))
}
