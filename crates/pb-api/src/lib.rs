//! # pb-api
//!
//! The web routing and orchestration layer for Paperboard.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod viewer;

use actix_web::web;
use pb_core::accounts::AccountService;
use pb_core::news::NewsService;
use pb_core::notes::NoteService;

use handlers::{auth, news, notes};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub news: NewsService,
    pub notes: NoteService,
    pub accounts: AccountService,
}

/// Configures every page route.
///
/// The fixed `/notes/add/` and `/notes/done/` paths are registered before
/// `/notes/{slug}/` so they are never read as slugs.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(notes::home))
        // News
        .route("/news/", web::get().to(news::news_list))
        .service(
            web::resource("/news/{id}/")
                .route(web::get().to(news::news_detail))
                .route(web::post().to(news::add_comment)),
        )
        .service(
            web::resource("/news/comment/{id}/edit/")
                .route(web::get().to(news::edit_comment_page))
                .route(web::post().to(news::edit_comment)),
        )
        .service(
            web::resource("/news/comment/{id}/delete/")
                .route(web::get().to(news::delete_comment_page))
                .route(web::post().to(news::delete_comment)),
        )
        // Notes
        .route("/notes/", web::get().to(notes::list))
        .route("/notes/done/", web::get().to(notes::done))
        .service(
            web::resource("/notes/add/")
                .route(web::get().to(notes::add_page))
                .route(web::post().to(notes::add)),
        )
        .route("/notes/{slug}/", web::get().to(notes::detail))
        .service(
            web::resource("/notes/{slug}/edit/")
                .route(web::get().to(notes::edit_page))
                .route(web::post().to(notes::edit)),
        )
        .service(
            web::resource("/notes/{slug}/delete/")
                .route(web::get().to(notes::delete_page))
                .route(web::post().to(notes::delete)),
        )
        // Accounts
        .service(
            web::resource("/auth/register/")
                .route(web::get().to(auth::register_page))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/auth/login/")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .service(
            web::resource("/auth/logout/")
                .route(web::get().to(auth::logout))
                .route(web::post().to(auth::logout)),
        );
}
