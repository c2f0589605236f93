//! Identity resolution: session cookie → `Viewer`.
//!
//! Every page handler takes a `Viewer` and passes its `identity` into the
//! services explicitly.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use pb_core::access::Identity;
use pb_core::models::User;
use pb_core::AppError;

use crate::error::ApiError;
use crate::session::SessionContext;
use crate::AppState;

/// The caller of the current request.
pub struct Viewer {
    pub identity: Identity,
    pub user: Option<User>,
    /// Path and query of the current request, the login `next` target
    pub return_to: String,
}

impl Viewer {
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Attaches this request's return path to a service error.
    pub fn fail(&self, error: AppError) -> ApiError {
        ApiError::new(error, self.return_to.clone())
    }
}

/// `.for_viewer(&viewer)?` converts service results inside page handlers.
pub trait ForViewer<T> {
    fn for_viewer(self, viewer: &Viewer) -> Result<T, ApiError>;
}

impl<T> ForViewer<T> for pb_core::Result<T> {
    fn for_viewer(self, viewer: &Viewer) -> Result<T, ApiError> {
        self.map_err(|e| viewer.fail(e))
    }
}

impl FromRequest for Viewer {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let return_to = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        Box::pin(async move {
            let session = session.await?;
            let state = state.ok_or_else(|| ApiError::internal("application state is not configured"))?;
            let user_id = session.user_id()?;
            let (identity, user) = state.accounts.resolve(user_id).await.map_err(ApiError::from)?;
            Ok(Viewer { identity, user, return_to })
        })
    }
}
