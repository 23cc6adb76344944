//! campus-client - Unified network-access layer
//!
//! Shared client layer for the two campus marketplace front ends (errand
//! running and lost-and-found). Provides:
//! - Request execution with injected bearer credentials per backend target
//! - Normalization of three inconsistent backend response envelopes
//! - Failure classification (business error / auth expiry / transport)
//! - A session controller owning login/logout/restore transitions
//! - A one-shot URL-token bridge carrying a session across the two apps
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            EndpointCatalog               │
//! │   (auth / errand / lostfound / admin)    │
//! └───────────────────┬──────────────────────┘
//!                     ▼
//! ┌──────────────┐  ┌──────────────────┐
//! │ ApiClient    │─▶│ RequestExecutor  │──▶ backend
//! │ (401 funnel) │  │ + normalizer     │
//! └──────┬───────┘  └──────────────────┘
//!        ▼
//! ┌───────────────────┐   ┌─────────────────┐
//! │ SessionController │──▶│ CredentialStore │
//! └───────────────────┘   └─────────────────┘
//!        ▲
//! ┌──────┴──────┐
//! │SessionBridge│  (runs once at startup)
//! └─────────────┘
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod store;
pub mod upload;

// Re-export main types for convenience
pub use bridge::{BridgeConfig, BridgeOutcome, LandingTable, LocationPort, SessionBridge};
pub use client::ApiClient;
pub use config::{ClientConfig, Service};
pub use error::{ApiError, Result};
pub use request::{Method, Query, RawOutcome, RequestSpec};
pub use response::{normalize, normalize_as};
pub use session::{
    NoopHooks, Role, Session, SessionController, SessionHooks, SessionState, UserProfile,
};
pub use store::{CredentialStore, FileStore, MemoryStore};
pub use upload::{BatchUploadReport, FileDescriptor, UploadFailure, UploadFile};
