//! Lost-and-found catalog: items, clues, search and public announcements.

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::request::Query;

const SERVICE: Service = Service::LostFound;

pub struct LostFoundApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LostFoundApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // ---- items ----

    pub async fn publish_lost_item(&self, item: Value) -> Result<Value> {
        self.client.post(SERVICE, "/items/lost-items", item).await
    }

    pub async fn publish_found_item(&self, item: Value) -> Result<Value> {
        self.client.post(SERVICE, "/items/found-items", item).await
    }

    pub async fn lost_items(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/items/lost-items", params).await
    }

    pub async fn found_items(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/items/found-items", params).await
    }

    pub async fn lost_item_detail(&self, item_id: i64) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/items/lost-item/{}", item_id), Query::new())
            .await
    }

    pub async fn found_item_detail(&self, item_id: i64) -> Result<Value> {
        self.client
            .get(
                SERVICE,
                &format!("/items/found-item/{}", item_id),
                Query::new(),
            )
            .await
    }

    pub async fn update_item(&self, item_id: i64, item: Value) -> Result<Value> {
        self.client
            .put(SERVICE, &format!("/items/items/{}", item_id), item)
            .await
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<Value> {
        self.client
            .delete(SERVICE, &format!("/items/items/{}", item_id))
            .await
    }

    pub async fn update_image_association(&self, data: Value) -> Result<Value> {
        self.client
            .post(SERVICE, "/items/update-image-association", data)
            .await
    }

    pub async fn search(&self, params: Query) -> Result<Value> {
        self.client.get(SERVICE, "/search/text", params).await
    }

    // ---- clues ----

    pub async fn item_detail(&self, item_id: i64) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/api/item/{}", item_id), Query::new())
            .await
    }

    pub async fn submit_clue(&self, item_id: i64, clue: Value) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/api/item/{}/clue", item_id), clue)
            .await
    }

    pub async fn item_clues(&self, item_id: i64) -> Result<Value> {
        self.client
            .get(SERVICE, &format!("/api/item/{}/clues", item_id), Query::new())
            .await
    }

    pub async fn mark_recovered(&self, item_id: i64) -> Result<Value> {
        self.client
            .post(SERVICE, &format!("/items/{}/recovered", item_id), json!({}))
            .await
    }

    // ---- announcements / stats / health ----

    pub async fn latest_announcement(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/announcements/latest", Query::new())
            .await
    }

    pub async fn user_stats(&self) -> Result<Value> {
        self.client
            .get(SERVICE, "/items/stats/user", Query::new())
            .await
    }

    pub async fn health_check(&self) -> Result<Value> {
        self.client.get(SERVICE, "/test/health", Query::new()).await
    }
}
