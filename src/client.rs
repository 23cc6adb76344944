//! Client entry point.
//!
//! Wires the credential store, request executor, normalizer and session
//! controller together. Every call dispatched through here funnels an
//! expired-credential classification into the session controller before
//! the error is returned, so no call site reacts to a 401 ad hoc.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ClientConfig, Service};
use crate::endpoints::{AdminApi, AuthApi, ErrandApi, LostFoundApi};
use crate::error::{ApiError, Result};
use crate::request::{Query, RequestExecutor, RequestSpec};
use crate::response::{normalize, normalize_as};
use crate::session::{SessionController, SessionHooks};
use crate::store::CredentialStore;
use crate::upload::Uploads;

/// Unified access point toward both backends.
pub struct ApiClient {
    executor: RequestExecutor,
    session: Arc<SessionController>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        let session = Arc::new(SessionController::new(store.clone(), hooks));
        Self {
            executor: RequestExecutor::new(config, store),
            session,
        }
    }

    /// Restore a persisted session; call once at process start (after the
    /// session bridge, if one runs).
    pub async fn init(&self) -> Result<()> {
        self.session.init().await
    }

    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Route an expired-credential classification into the controller
    /// before handing the error back. Used by every dispatch path.
    pub(crate) async fn funnel<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ApiError::AuthExpired) = &result {
            self.session.handle_auth_expired().await;
        }
        result
    }

    /// Dispatch a spec and normalize the outcome, funneling auth expiry
    /// into the session controller.
    pub async fn call<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let outcome = self.executor.execute(&spec).await?;
        self.funnel(normalize_as(outcome)).await
    }

    /// Like [`Self::call`] but without typed projection.
    pub async fn call_raw(&self, spec: RequestSpec) -> Result<Value> {
        let outcome = self.executor.execute(&spec).await?;
        self.funnel(normalize(outcome)).await
    }

    pub async fn get(&self, service: Service, path: &str, query: Query) -> Result<Value> {
        self.call_raw(RequestSpec::get(service, path).query(query))
            .await
    }

    pub async fn post(&self, service: Service, path: &str, body: Value) -> Result<Value> {
        self.call_raw(RequestSpec::post(service, path).body(body))
            .await
    }

    pub async fn put(&self, service: Service, path: &str, body: Value) -> Result<Value> {
        self.call_raw(RequestSpec::put(service, path).body(body))
            .await
    }

    pub async fn delete(&self, service: Service, path: &str) -> Result<Value> {
        self.call_raw(RequestSpec::delete(service, path)).await
    }

    /// Authentication endpoints for one of the two services.
    pub fn auth(&self, service: Service) -> AuthApi<'_> {
        AuthApi::new(self, service)
    }

    /// Errand-service catalog: tasks, orders, chat, notifications, stats.
    pub fn errand(&self) -> ErrandApi<'_> {
        ErrandApi::new(self)
    }

    /// Lost-and-found catalog: items, clues, search, announcements.
    pub fn lostfound(&self) -> LostFoundApi<'_> {
        LostFoundApi::new(self)
    }

    /// Admin catalog: user management, announcements, review queue.
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    /// File upload operations (multipart path).
    pub fn uploads(&self) -> Uploads<'_> {
        Uploads::new(self)
    }
}
