//! Admin catalog: user management, announcement management and the
//! reviewer queue on the lost-and-found service.

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::request::{Query, RequestSpec};

const SERVICE: Service = Service::LostFound;

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // ---- user management ----

    pub async fn users(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/admin/users", params).await
    }

    pub async fn update_user_status(&self, user_id: i64, status: &str) -> Result<Value> {
        self.client
            .put(
                SERVICE,
                &format!("/admin/users/{}/status", user_id),
                json!({ "status": status }),
            )
            .await
    }

    pub async fn reset_user_password(&self, user_id: i64) -> Result<Value> {
        self.client
            .post(
                SERVICE,
                &format!("/admin/users/{}/reset-password", user_id),
                json!({}),
            )
            .await
    }

    pub async fn update_user(&self, user_id: i64, user_info: Value) -> Result<Value> {
        self.client
            .put(SERVICE, &format!("/admin/users/{}", user_id), user_info)
            .await
    }

    pub async fn batch_update_user_status(
        &self,
        user_ids: &[i64],
        status: &str,
    ) -> Result<Value> {
        self.client
            .put(
                SERVICE,
                "/admin/users/batch-status",
                json!({ "userIds": user_ids, "status": status }),
            )
            .await
    }

    pub async fn batch_operate_users(&self, user_ids: &[i64], action: &str) -> Result<Value> {
        self.client
            .post(
                SERVICE,
                "/admin/users/batch",
                json!({ "userIds": user_ids, "action": action }),
            )
            .await
    }

    pub async fn batch_delete_users(&self, user_ids: &[i64]) -> Result<Value> {
        self.client
            .call_raw(
                RequestSpec::delete(SERVICE, "/admin/users/batch-delete")
                    .body(json!({ "userIds": user_ids })),
            )
            .await
    }

    pub async fn export_users(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/admin/users/export", params).await
    }

    // ---- announcements ----

    pub async fn announcements(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/admin/announcements", Query::new())
            .await
    }

    pub async fn publish_announcement(&self, announcement: Value) -> Result<Value> {
        self.client
            .post(SERVICE, "/admin/announcements", announcement)
            .await
    }

    pub async fn update_announcement(&self, id: i64, announcement: Value) -> Result<Value> {
        self.client
            .put(SERVICE, &format!("/admin/announcements/{}", id), announcement)
            .await
    }

    pub async fn delete_announcement(&self, id: i64) -> Result<Value> {
        self.client
            .delete(SERVICE, &format!("/admin/announcements/{}", id))
            .await
    }

    // ---- reviewer queue ----

    pub async fn reviewer_dashboard(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/review/dashboard", Query::new())
            .await
    }

    pub async fn pending_reviews(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/review/pending", params).await
    }

    pub async fn review_item(&self, id: i64, decision: Value) -> Result<Value> {
        self.client
            .put(SERVICE, &format!("/review/{}", id), decision)
            .await
    }

    pub async fn batch_review(&self, decisions: Value) -> Result<Value> {
        self.client.put(SERVICE, "/review/batch", decisions).await
    }

    pub async fn review_history(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/review/history", params).await
    }
}
