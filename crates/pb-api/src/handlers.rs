//! # pb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! services. Handlers resolve a `Viewer`, call one service operation with the
//! viewer's identity, then either render a page or redirect.

pub mod auth;
pub mod news;
pub mod notes;

use actix_web::HttpResponse;
use askama::Template;

use crate::error::{ApiError, PageResult};

/// Renders an askama page as a 200 HTML response.
pub(crate) fn render<T: Template>(template: &T) -> PageResult {
    let html = template
        .render()
        .map_err(|e| ApiError::internal(format!("template rendering failed: {e}")))?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
