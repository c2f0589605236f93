//! Per-scenario fixtures: every test builds its own in-memory database and
//! application, so no state leaks between tests.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web, App};
use chrono::{NaiveDate, Utc};
use pb_api::session::{session_middleware, SESSION_COOKIE};
use pb_api::{configure_routes, AppState};
use pb_auth_simple::SimpleAuthProvider;
use pb_core::accounts::{AccountService, RegistrationInput};
use pb_core::content::ContentFilter;
use pb_core::models::{Comment, NewNewsItem, NewsItem, Note, NoteDraft, User};
use pb_core::news::{NewsService, NEWS_PER_PAGE};
use pb_core::notes::NoteService;
use pb_core::traits::{NewsRepo, NoteRepo};
use pb_db_sqlite::SqliteRepo;

pub const PASSWORD: &str = "correct-horse-battery";

pub type Request = actix_http::Request;

pub struct Fixture {
    pub repo: Arc<SqliteRepo>,
    pub state: web::Data<AppState>,
}

impl Fixture {
    pub async fn new() -> Self {
        let repo = Arc::new(SqliteRepo::new("sqlite::memory:").await.expect("in-memory db"));
        let state = web::Data::new(AppState {
            news: NewsService::new(repo.clone(), ContentFilter::default(), NEWS_PER_PAGE),
            notes: NoteService::new(repo.clone()),
            accounts: AccountService::new(repo.clone(), Arc::new(SimpleAuthProvider::insecure_fast())),
        });
        Self { repo, state }
    }

    pub async fn user(&self, username: &str) -> User {
        self.state
            .accounts
            .register(&RegistrationInput {
                username: username.into(),
                password1: PASSWORD.into(),
                password2: PASSWORD.into(),
            })
            .await
            .expect("register user")
    }

    pub async fn news(&self, title: &str, date: NaiveDate) -> NewsItem {
        self.repo
            .create_news(NewNewsItem {
                title: title.into(),
                text: "Просто текст.".into(),
                date,
            })
            .await
            .expect("create news")
    }

    pub async fn comment(&self, author: &User, news: &NewsItem, text: &str) -> Comment {
        self.repo
            .create_comment(news.id, author.id, text.into(), Utc::now())
            .await
            .expect("create comment")
    }

    pub async fn note(&self, author: &User, title: &str, slug: &str) -> Note {
        self.repo
            .create_note(
                author.id,
                NoteDraft {
                    title: title.into(),
                    text: "Текст заметки".into(),
                    slug: slug.into(),
                },
            )
            .await
            .expect("create note")
    }

    pub async fn comment_count(&self) -> i64 {
        self.repo.count_comments().await.expect("count comments")
    }

    pub async fn note_count(&self) -> i64 {
        self.repo.count_notes().await.expect("count notes")
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session_middleware(Key::generate(), false))
                .configure(configure_routes),
        )
        .await
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Logs `username` in through the real login form and returns the session cookie.
pub async fn login<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", username), ("password", PASSWORD)])
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 302, "login as {username} failed");
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie")
        .into_owned()
}

pub fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text<B: MessageBody>(res: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(res).await.to_vec()).expect("utf-8 body")
}
