// src/api/notifications.rs
use serde_json::Value;

use super::path_id;
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::error::ApiError;
use crate::types::notification::Notification;
use crate::types::response::UnreadCount;

pub struct NotificationsApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> NotificationsApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        let response = self.client.send(ApiRequest::get("/notifications")).await?;
        Ok(response.list())
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<Option<String>, ApiError> {
        let notification_id = path_id("notificationId", notification_id)?;
        let response = self
            .client
            .send(ApiRequest::put(format!("/notifications/{}/read", notification_id)))
            .await?;
        Ok(response.message())
    }

    pub async fn mark_all_read(&self) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::put("/notifications/read-all"))
            .await?;
        Ok(response.message())
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/notifications/unread-count"))
            .await?;
        read_count(&response.body)
            .ok_or_else(|| ApiError::InvalidResponse("missing unread count".to_string()))
    }

    pub async fn delete(&self, notification_id: &str) -> Result<Option<String>, ApiError> {
        let notification_id = path_id("notificationId", notification_id)?;
        let response = self
            .client
            .send(ApiRequest::delete(format!("/notifications/{}", notification_id)))
            .await?;
        Ok(response.message())
    }
}

/// `{count}`, `{unreadCount}`, `{data: {count}}` or `{data: 3}`.
fn read_count(body: &Value) -> Option<u64> {
    let parse = |v: &Value| {
        serde_json::from_value::<UnreadCount>(v.clone())
            .ok()
            .map(|c| c.count)
    };
    parse(body).or_else(|| {
        let data = body.get("data")?;
        data.as_u64().or_else(|| parse(data))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{client_with, StubTransport};
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_read_count_shapes() {
        assert_eq!(read_count(&json!({"count": 2})), Some(2));
        assert_eq!(read_count(&json!({"success": true, "unreadCount": 4})), Some(4));
        assert_eq!(read_count(&json!({"data": {"count": 5}})), Some(5));
        assert_eq!(read_count(&json!({"data": 7})), Some(7));
        assert_eq!(read_count(&json!({"data": []})), None);
    }

    #[tokio::test]
    async fn test_notification_calls() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(
            200,
            json!({"success": true, "data": [
                {"_id": "n1", "type": "application", "content": "Nouvelle candidature", "read": false},
                {"_id": "n2", "type": "status_change", "content": "Candidature acceptée", "read": true}
            ]}),
        );
        stub.push_json(200, json!({"success": true}));
        stub.push_json(200, json!({"success": true, "message": "Toutes lues"}));
        stub.push_json(200, json!({"success": true, "data": {"count": 0}}));
        let client = client_with(stub.clone(), Some("jwt"));
        let api = NotificationsApi::new(&client);

        let listed = api.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(crate::types::notification::unread(&listed), 1);
        assert_eq!(listed[0].kind, "application");

        api.mark_read("n1").await.unwrap();
        assert_eq!(api.mark_all_read().await.unwrap().as_deref(), Some("Toutes lues"));
        assert_eq!(api.unread_count().await.unwrap(), 0);

        let requests = stub.requests();
        assert_eq!(requests[1].method, Method::PUT);
        assert!(requests[1].url.ends_with("/notifications/n1/read"));
        assert!(requests[2].url.ends_with("/notifications/read-all"));
    }

    #[tokio::test]
    async fn test_delete_notification() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(200, json!({"success": true, "message": "Notification supprimée"}));
        let client = client_with(stub.clone(), Some("jwt"));

        let message = NotificationsApi::new(&client).delete("n4").await.unwrap();
        assert_eq!(message.as_deref(), Some("Notification supprimée"));

        let sent = stub.last_request();
        assert_eq!(sent.method, Method::DELETE);
        assert!(sent.url.ends_with("/notifications/n4"));
        assert!(sent.query_value("_t").is_none());
    }
}
