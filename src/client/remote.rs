//! Remote HTTP implementation of [`BoardApi`].
//!
//! Each logical operation maps to exactly one HTTP call against the
//! configured base address. Responses are deserialized against a single
//! explicit schema per operation and fail fast on mismatch. Non-2xx
//! responses keep the raw body for diagnostics; connect-level failures
//! become [`ApiError::NetworkUnavailable`] so the caller can suggest
//! checking that the backend is up.

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::BoardApi;
use crate::errors::{ApiError, ApiResult};
use crate::models::{
    Ack, Board, BoardDetail, Column, CreateBoardRequest, CreateColumnRequest, CreateTaskRequest,
    InviteRequest, LoginRequest, Member, PingResponse, RegisterRequest, RenameRequest, Role, Task,
    TaskPatch, TokenResponse, User,
};
use crate::store::SharedStore;

/// The mutation/fetch target, used to turn a 404 into a typed `NotFound`.
type Target = Option<(&'static str, i64)>;

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    store: SharedStore,
}

impl RemoteClient {
    pub fn new(base_url: String, store: SharedStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token (when one exists), send, and map failures.
    /// The token is read from the store at request-issue time.
    async fn dispatch(&self, req: reqwest::RequestBuilder, target: Target) -> ApiResult<String> {
        let token = self.store.token();
        let req = if token.is_empty() {
            req
        } else {
            req.bearer_auth(token)
        };

        let resp = req.send().await.map_err(|e| {
            debug!(error = %e, "request failed before a response arrived");
            ApiError::NetworkUnavailable {
                url: self.base_url.clone(),
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        if (200..300).contains(&status) {
            return Ok(body);
        }
        Err(map_status(status, body, target))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, target: Target) -> ApiResult<T> {
        let body = self.dispatch(self.http.get(self.url(path)), target).await?;
        parse(path, &body)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
        target: Target,
    ) -> ApiResult<T> {
        let body = self
            .dispatch(self.http.post(self.url(path)).json(payload), target)
            .await?;
        parse(path, &body)
    }

    async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
        target: Target,
    ) -> ApiResult<T> {
        let body = self
            .dispatch(self.http.patch(self.url(path)).json(payload), target)
            .await?;
        parse(path, &body)
    }

    async fn delete(&self, path: &str, target: Target) -> ApiResult<()> {
        let body = self
            .dispatch(self.http.delete(self.url(path)), target)
            .await?;
        // Tolerate an empty ack body; anything else must match the schema.
        if !body.trim().is_empty() {
            let _: Ack = parse(path, &body)?;
        }
        Ok(())
    }
}

/// Non-2xx → typed failure. 404 only becomes `NotFound` when the caller
/// named a target; everything unclassified stays `Http` with the raw body.
fn map_status(status: u16, body: String, target: Target) -> ApiError {
    match (status, target) {
        (401, _) => ApiError::Unauthorized,
        (404, Some((resource, id))) => ApiError::not_found(resource, id),
        _ => ApiError::Http { status, body },
    }
}

fn parse<T: DeserializeOwned>(path: &str, body: &str) -> ApiResult<T> {
    serde_json::from_str(body)
        .with_context(|| format!("Unexpected response shape from {}: {}", path, body))
        .map_err(ApiError::from)
}

#[async_trait]
impl BoardApi for RemoteClient {
    async fn ping(&self) -> ApiResult<PingResponse> {
        self.get_json("/__ping", None).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String> {
        let resp: TokenResponse = self
            .post_json("/auth/login", &LoginRequest { email, password }, None)
            .await?;
        self.store.set_token(&resp.token)?;
        Ok(resp.token)
    }

    async fn register_user(&self, name: &str, email: &str, password: &str) -> ApiResult<String> {
        let result: ApiResult<TokenResponse> = self
            .post_json(
                "/auth/register",
                &RegisterRequest {
                    name,
                    email,
                    password,
                },
                None,
            )
            .await;
        let resp = result.map_err(|e| match e {
            ApiError::Http { status: 409, .. } => ApiError::Conflict {
                email: email.to_string(),
            },
            other => other,
        })?;
        self.store.set_token(&resp.token)?;
        Ok(resp.token)
    }

    async fn who_am_i(&self) -> ApiResult<User> {
        if !self.store.has_token() {
            return Err(ApiError::Unauthorized);
        }
        self.get_json("/auth/me", None).await
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        self.get_json("/boards", None).await
    }

    async fn create_board(&self, name: &str) -> ApiResult<Board> {
        self.post_json("/boards", &CreateBoardRequest { name }, None)
            .await
    }

    async fn rename_board(&self, id: i64, name: &str) -> ApiResult<Board> {
        self.patch_json(
            &format!("/boards/{}", id),
            &RenameRequest { name },
            Some(("board", id)),
        )
        .await
    }

    async fn delete_board(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/boards/{}", id), Some(("board", id)))
            .await
    }

    async fn board_detail(&self, id: i64) -> ApiResult<BoardDetail> {
        self.get_json(&format!("/boards/{}", id), Some(("board", id)))
            .await
    }

    async fn list_members(&self, board_id: i64) -> ApiResult<Vec<Member>> {
        self.get_json(
            &format!("/boards/{}/members", board_id),
            Some(("board", board_id)),
        )
        .await
    }

    async fn invite_member(&self, board_id: i64, email: &str, role: Role) -> ApiResult<()> {
        let _: Ack = self
            .post_json(
                &format!("/boards/{}/invite", board_id),
                &InviteRequest { email, role },
                Some(("board", board_id)),
            )
            .await?;
        Ok(())
    }

    async fn create_column(
        &self,
        board_id: i64,
        name: &str,
        position: Option<i64>,
    ) -> ApiResult<Column> {
        self.post_json(
            &format!("/boards/{}/columns", board_id),
            &CreateColumnRequest { name, position },
            Some(("board", board_id)),
        )
        .await
    }

    async fn rename_column(&self, id: i64, name: &str) -> ApiResult<Column> {
        self.patch_json(
            &format!("/columns/{}", id),
            &RenameRequest { name },
            Some(("column", id)),
        )
        .await
    }

    async fn delete_column(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/columns/{}", id), Some(("column", id)))
            .await
    }

    async fn create_task(
        &self,
        column_id: i64,
        title: &str,
        description: Option<&str>,
        position: Option<i64>,
    ) -> ApiResult<Task> {
        self.post_json(
            &format!("/columns/{}/tasks", column_id),
            &CreateTaskRequest {
                title,
                description,
                position,
            },
            Some(("column", column_id)),
        )
        .await
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> ApiResult<Task> {
        self.patch_json(&format!("/tasks/{}", id), &patch, Some(("task", id)))
            .await
    }

    async fn delete_task(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/tasks/{}", id), Some(("task", id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CredentialStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn make_client(base_url: &str) -> (RemoteClient, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(CredentialStore::open(dir.path().join("store.json")).unwrap());
        (RemoteClient::new(base_url.to_string(), store), dir)
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let (client, _dir) = make_client("http://localhost:8000/api/");
        assert_eq!(client.url("/boards"), "http://localhost:8000/api/boards");
    }

    #[test]
    fn test_map_status_401_is_unauthorized() {
        assert!(matches!(
            map_status(401, "nope".into(), None),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn test_map_status_404_with_target_is_not_found() {
        match map_status(404, String::new(), Some(("board", 7))) {
            ApiError::NotFound { resource, id } => {
                assert_eq!(resource, "board");
                assert_eq!(id, 7);
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_map_status_404_without_target_stays_http() {
        assert!(matches!(
            map_status(404, "gone".into(), None),
            ApiError::Http { status: 404, .. }
        ));
    }

    #[test]
    fn test_map_status_other_preserves_body() {
        match map_status(500, "boom".into(), Some(("task", 1))) {
            ApiError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected Http, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_shape_mismatch() {
        let result: ApiResult<TokenResponse> = parse("/auth/login", "{\"tok\":\"x\"}");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/auth/login"));
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_network_unavailable() {
        // Port 1 on loopback refuses immediately.
        let (client, _dir) = make_client("http://127.0.0.1:1/api");
        match client.ping().await {
            Err(ApiError::NetworkUnavailable { url }) => {
                assert_eq!(url, "http://127.0.0.1:1/api");
            }
            other => panic!("Expected NetworkUnavailable, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_who_am_i_without_token_short_circuits() {
        // No network involved: the missing-token check fires first.
        let (client, _dir) = make_client("http://127.0.0.1:1/api");
        assert!(matches!(
            client.who_am_i().await,
            Err(ApiError::Unauthorized)
        ));
    }
}
