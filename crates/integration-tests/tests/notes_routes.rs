mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{location, login, Fixture};

#[actix_web::test]
async fn notes_home_is_public() {
    let fx = Fixture::new().await;
    let app = fx.app().await;
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn user_pages_open_for_authenticated() {
    let fx = Fixture::new().await;
    fx.user("author").await;
    let app = fx.app().await;
    let cookie = login(&app, "author").await;

    for uri in ["/notes/", "/notes/add/", "/notes/done/"] {
        let req = test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
    }
}

#[actix_web::test]
async fn anonymous_is_redirected_to_login() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    let note = fx.note(&author, "Заголовок", "note-slug").await;
    let app = fx.app().await;

    let detail = format!("/notes/{}/", note.slug);
    let edit = format!("/notes/{}/edit/", note.slug);
    let delete = format!("/notes/{}/delete/", note.slug);
    for uri in ["/notes/", "/notes/add/", "/notes/done/", detail.as_str(), edit.as_str(), delete.as_str()] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND, "GET {uri}");
        assert_eq!(location(&res), format!("/auth/login/?next={uri}"));
    }
}

#[actix_web::test]
async fn note_pages_open_for_author_only() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    fx.user("reader").await;
    let note = fx.note(&author, "Заголовок", "note-slug").await;
    let app = fx.app().await;
    let author_cookie = login(&app, "author").await;
    let reader_cookie = login(&app, "reader").await;

    for suffix in ["", "edit/", "delete/"] {
        let uri = format!("/notes/{}/{suffix}", note.slug);

        let req = test::TestRequest::get().uri(&uri).cookie(author_cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "author GET {uri}");

        let req = test::TestRequest::get().uri(&uri).cookie(reader_cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "reader GET {uri}");
    }
}

#[actix_web::test]
async fn missing_note_is_not_found() {
    let fx = Fixture::new().await;
    fx.user("author").await;
    let app = fx.app().await;
    let cookie = login(&app, "author").await;

    let req = test::TestRequest::get().uri("/notes/no-such-note/").cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
