//! # Access Control
//!
//! Per-request decision of whether an identity may act on a record.
//! The identity is an explicit value resolved by the HTTP layer; nothing here
//! reads session state.
//!
//! Denials differ per resource and verb:
//!
//! | caller            | comment edit/delete | note detail/edit/delete (GET) | note edit/delete (POST) |
//! |-------------------|---------------------|-------------------------------|-------------------------|
//! | anonymous         | login redirect      | login redirect                | login redirect          |
//! | other user        | 404                 | 404                           | 403                     |
//! | owner             | allowed             | allowed                       | allowed                 |

use crate::error::{AppError, Result};
use crate::models::UserId;

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    News,
    Comment,
    Note,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Self::News => "News",
            Self::Comment => "Comment",
            Self::Note => "Note",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewList,
    ViewDetail,
    Create,
    Edit,
    Delete,
}

/// GET renders a page, POST mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Redirect to the login page with a return path.
    LoginRequired,
    /// Pretend the record does not exist (404).
    Hidden,
    /// Refuse explicitly (403).
    Forbidden,
}

/// Decides whether `identity` may perform `op` on a record of `resource`
/// owned by `owner` (`None` for collections and creation).
pub fn decide(
    identity: &Identity,
    resource: Resource,
    op: Operation,
    verb: Verb,
    owner: Option<UserId>,
) -> Decision {
    let public_read = matches!(
        (resource, op),
        (Resource::News | Resource::Comment, Operation::ViewList | Operation::ViewDetail)
    );
    if public_read {
        return Decision::Allow;
    }

    let Some(caller) = identity.user_id() else {
        return Decision::LoginRequired;
    };

    match (resource, op) {
        (Resource::News, _) => Decision::Forbidden,
        (_, Operation::Create) | (Resource::Note, Operation::ViewList) => Decision::Allow,
        (_, _) if owner == Some(caller) => Decision::Allow,
        (Resource::Note, _) if verb == Verb::Write => Decision::Forbidden,
        _ => Decision::Hidden,
    }
}

/// Runs [`decide`] and turns a denial into the matching [`AppError`].
pub fn authorize(
    identity: &Identity,
    resource: Resource,
    op: Operation,
    verb: Verb,
    owner: Option<UserId>,
    key: &str,
) -> Result<()> {
    match decide(identity, resource, op, verb, owner) {
        Decision::Allow => Ok(()),
        Decision::LoginRequired => Err(AppError::LoginRequired),
        Decision::Hidden => Err(AppError::not_found(resource.label(), key)),
        Decision::Forbidden => Err(AppError::Forbidden(format!(
            "{} {key} belongs to another user",
            resource.label()
        ))),
    }
}

/// Shorthand for endpoints that only need a logged-in caller.
pub fn require_login(identity: &Identity) -> Result<UserId> {
    identity.user_id().ok_or(AppError::LoginRequired)
}
