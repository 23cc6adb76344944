//! Authentication endpoints.
//!
//! Both backends expose the same auth surface; the profile path is the
//! one place they disagree.

use serde::Deserialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::request::RequestSpec;
use crate::session::{Session, UserProfile};

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    pub user: UserProfile,
}

/// Auth catalog for one backend.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
    service: Service,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient, service: Service) -> Self {
        Self { client, service }
    }

    fn profile_path(&self) -> &'static str {
        match self.service {
            Service::Errand => "/user/info",
            Service::LostFound => "/users/profile",
        }
    }

    /// Register a new account.
    pub async fn register(&self, user_info: Value) -> Result<Value> {
        self.client
            .post(self.service, "/auth/register", user_info)
            .await
    }

    /// Log in and establish the session (persisted through the store).
    pub async fn login(&self, credentials: Value) -> Result<Session> {
        let payload: LoginPayload = self
            .client
            .call(RequestSpec::post(self.service, "/auth/login").body(credentials))
            .await?;
        let session = Session {
            token: payload.token,
            user: payload.user,
        };
        self.client.session().login(session.clone()).await?;
        Ok(session)
    }

    /// Log out: tell the backend, then drop the session locally whether
    /// or not the backend call succeeded.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .client
            .post(self.service, "/auth/logout", serde_json::json!({}))
            .await;
        self.client.session().logout().await?;
        result.map(|_| ())
    }

    /// Fetch the signed-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile> {
        self.client
            .call(RequestSpec::get(self.service, self.profile_path()))
            .await
    }
}
