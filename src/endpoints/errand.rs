//! Errand-service catalog: tasks, orders, chat, notifications,
//! runner applications and dashboard statistics.

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::request::Query;

const SERVICE: Service = Service::Errand;

pub struct ErrandApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ErrandApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // ---- tasks ----

    pub async fn create_task(&self, task: Value) -> Result<Value> {
        self.client.post(SERVICE, "/task/publish", task).await
    }

    pub async fn tasks(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/task/list", params).await
    }

    pub async fn task_detail(&self, task_id: i64) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/task/{}/detail", task_id), Query::new())
            .await
    }

    pub async fn accept_task(&self, task_id: i64) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/task/{}/accept", task_id), json!({}))
            .await
    }

    pub async fn cancel_task(&self, task_id: i64) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/task/{}/cancel", task_id), json!({}))
            .await
    }

    pub async fn complete_task(&self, task_id: i64, data: Value) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/task/{}/complete", task_id), data)
            .await
    }

    pub async fn my_tasks(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/task/user-tasks", params).await
    }

    pub async fn nearby_tasks(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/map/nearby", params).await
    }

    pub async fn route_plan(&self, start: Value, end: Value) -> Result<Value> {
        self.client
            .post(SERVICE, "/map/route", json!({ "start": start, "end": end }))
            .await
    }

    // ---- orders ----

    pub async fn orders(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/orders", params).await
    }

    pub async fn order_detail(&self, order_id: i64) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/orders/{}", order_id), Query::new())
            .await
    }

    pub async fn update_order_status(&self, order_id: i64, status: &str) -> Result<Value> {
        self.client
            .put(
                SERVICE,
                &format!("/orders/{}/status", order_id),
                json!({ "status": status }),
            )
            .await
    }

    pub async fn order_stats(&self) -> Result<Value> {
        self.client.get(SERVICE, "/orders/stats", Query::new()).await
    }

    // ---- chat ----

    pub async fn conversations(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/chat/conversations", Query::new())
            .await
    }

    pub async fn messages(&self, conversation_id: i64, params: Query) -> Result<Value> {
        self.client
            .get(
                SERVICE,
                &format!("/chat/{}/messages", conversation_id),
                params,
            )
            .await
    }

    pub async fn send_message(&self, conversation_id: i64, message: Value) -> Result<Value> {
        self.client
            .post(
                SERVICE,
                &format!("/chat/{}/messages", conversation_id),
                message,
            )
            .await
    }

    // ---- reviews ----

    pub async fn submit_review(&self, order_id: i64, review: Value) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/reviews/{}", order_id), review)
            .await
    }

    pub async fn user_reviews(&self, user_id: i64, params: Query) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/reviews/user/{}", user_id), params)
            .await
    }

    // ---- notifications ----

    pub async fn notifications(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/notifications", params).await
    }

    pub async fn unread_count(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/notifications/unread-count", Query::new())
            .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<Value> {
        self.client
            .put(SERVICE, &format!("/notifications/{}/read", id), json!({}))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<Value> {
        self.client
            .put(SERVICE, "/notifications/read-all", json!({}))
            .await
    }

    pub async fn clear_notifications(&self) -> Result<Value> {
        self.client
            .delete(SERVICE, "/notifications/clear-all")
            .await
    }

    // ---- runner applications ----

    pub async fn runner_applications(&self, params: Query) -> Result<Value> {
        self.client
            .get(SERVICE, "/runner/applications/list", params)
            .await
    }

    pub async fn approve_runner_application(&self, id: i64, comment: &str) -> Result<Value> {
        self.client
            .put(
                SERVICE,
                &format!("/runner/applications/approve/{}", id),
                json!({ "comment": comment }),
            )
            .await
    }

    pub async fn reject_runner_application(&self, id: i64, comment: &str) -> Result<Value> {
        self.client
            .put(
                SERVICE,
                &format!("/runner/applications/reject/{}", id),
                json!({ "comment": comment }),
            )
            .await
    }

    pub async fn runner_application_detail(&self, id: i64) -> Result<Value> {
        self.client
            .get(
                SERVICE,
                &format!("/runner/applications/detail/{}", id),
                Query::new(),
            )
            .await
    }

    // ---- home / statistics ----

    pub async fn home_data(&self) -> Result<Value> {
        self.client.get(SERVICE, "/home/all", Query::new()).await
    }

    pub async fn platform_notices(&self) -> Result<Value> {
        self.client.get(SERVICE, "/home/notices", Query::new()).await
    }

    pub async fn banners(&self) -> Result<Value> {
        self.client.get(SERVICE, "/home/banners", Query::new()).await
    }

    pub async fn home_user_stats(&self) -> Result<Value> {
        self.client.get(SERVICE, "/home/stats", Query::new()).await
    }

    pub async fn recommended_runners(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/home/recommended-runners", Query::new())
            .await
    }

    pub async fn user_stats(&self) -> Result<Value> {
        self.client.get(SERVICE, "/stats/user", Query::new()).await
    }

    pub async fn platform_stats(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/stats/platform", Query::new())
            .await
    }
}
