//! paperboard/crates/pb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Paperboard:
//! a public news feed with reader comments and a private notebook.

pub mod access;
pub mod accounts;
pub mod content;
pub mod error;
pub mod models;
pub mod news;
pub mod notes;
pub mod slug;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
