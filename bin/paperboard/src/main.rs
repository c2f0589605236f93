//! # Paperboard Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use pb_api::middleware::{security_headers, standard_middleware};
use pb_api::session::session_middleware;
use pb_api::{configure_routes, AppState};
use pb_config::Settings;
use pb_core::accounts::AccountService;
use pb_core::content::ContentFilter;
use pb_core::news::NewsService;
use pb_core::notes::NoteService;
use tracing_subscriber::EnvFilter;

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("paperboard needs the `db-sqlite` and `auth-simple` features");

#[cfg(feature = "db-sqlite")]
use pb_db_sqlite::SqliteRepo;

#[cfg(feature = "auth-simple")]
use pb_auth_simple::SimpleAuthProvider;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn session_key(settings: &Settings) -> anyhow::Result<Key> {
    match settings.session.secret_bytes() {
        Some(bytes) => Key::try_from(bytes).context("session.secret is not usable as a cookie key"),
        None => {
            tracing::warn!("no session.secret configured; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load()?;

    // 1. Storage
    let repo = Arc::new(
        SqliteRepo::new(&settings.database.url)
            .await
            .context("failed to open the database")?,
    );

    // 2. Password hashing
    let auth = Arc::new(SimpleAuthProvider::new());

    // 3. Services over the shared ports
    let filter = ContentFilter::new(&settings.news.bad_words);
    let state = web::Data::new(AppState {
        news: NewsService::new(repo.clone(), filter, settings.news.per_page),
        notes: NoteService::new(repo.clone()),
        accounts: AccountService::new(repo, auth),
    });

    let key = session_key(&settings)?;
    let secure_cookie = settings.session.secure_cookie;
    let (host, port) = settings.bind_address();
    tracing::info!(%host, port, "paperboard starting");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(session_middleware(key.clone(), secure_cookie))
            .wrap(security_headers())
            .wrap(standard_middleware())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
