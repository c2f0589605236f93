use actix_web::web;
use pb_core::accounts::{LoginInput, RegistrationInput};
use pb_core::AppError;
use pb_ui::{FormErrors, LoginTemplate, RegisterTemplate};
use serde::Deserialize;

use super::render;
use crate::error::{redirect, PageResult, LOGIN_PATH};
use crate::session::SessionContext;
use crate::viewer::Viewer;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
pub(crate) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// GET /auth/register/
pub async fn register_page(viewer: Viewer) -> PageResult {
    render(&RegisterTemplate {
        current_user: viewer.username(),
        username: "",
        errors: FormErrors::default(),
    })
}

/// POST /auth/register/
pub async fn register(
    state: web::Data<AppState>,
    viewer: Viewer,
    form: web::Form<RegistrationInput>,
) -> PageResult {
    match state.accounts.register(&form).await {
        Ok(_) => Ok(redirect(LOGIN_PATH)),
        Err(AppError::Validation(errors)) => render(&RegisterTemplate {
            current_user: viewer.username(),
            username: &form.username,
            errors: FormErrors::new(&errors),
        }),
        Err(e) => Err(viewer.fail(e)),
    }
}

/// GET /auth/login/
pub async fn login_page(viewer: Viewer, query: web::Query<NextQuery>) -> PageResult {
    render(&LoginTemplate {
        current_user: viewer.username(),
        username: "",
        next: query.next.as_deref().unwrap_or_default(),
        error: None,
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: Viewer,
    session: SessionContext,
    form: web::Form<LoginInput>,
) -> PageResult {
    match state.accounts.login(&form.username, &form.password).await {
        Ok(user) => {
            session.persist_user(&user.id)?;
            Ok(redirect(safe_next(form.next.as_deref())))
        }
        Err(AppError::Unauthorized(message)) => render(&LoginTemplate {
            current_user: viewer.username(),
            username: &form.username,
            next: form.next.as_deref().unwrap_or_default(),
            error: Some(message.as_str()),
        }),
        Err(e) => Err(viewer.fail(e)),
    }
}

/// GET or POST /auth/logout/
pub async fn logout(session: SessionContext) -> PageResult {
    session.clear();
    Ok(redirect("/"))
}
