//! Per-domain endpoint catalog.
//!
//! Thin parameter-to-path mappings over [`crate::client::ApiClient`].
//! Nothing here interprets envelopes or reacts to auth expiry; both are
//! already handled by the time a result reaches these functions' callers.

mod admin;
mod auth;
mod errand;
mod lostfound;

pub use admin::AdminApi;
pub use auth::{AuthApi, LoginPayload};
pub use errand::ErrandApi;
pub use lostfound::LostFoundApi;
