//! Board data client: one capability-uniform interface with two
//! interchangeable backends.
//!
//! The backend is chosen once, at construction time, by [`connect`];
//! call sites never branch on the mode. Both implementations read the
//! session token from the shared [`CredentialStore`] at request-issue
//! time and persist tokens returned by `authenticate`/`register_user`.

pub mod mock;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::ApiResult;
use crate::models::{
    Board, BoardDetail, Column, Member, PingResponse, Role, Task, TaskPatch, User,
};
use crate::store::SharedStore;

pub use mock::MockClient;
pub use remote::RemoteClient;

/// The full operation set of the board backend. Every operation is a
/// single request; there are no retries and no client-side caching.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Liveness probe (`GET /__ping`).
    async fn ping(&self) -> ApiResult<PingResponse>;

    // ── Auth ──────────────────────────────────────────────────────────

    /// Exchange credentials for a session token. The token is persisted
    /// into the credential store on success.
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String>;

    /// Create an account and auto-issue a session token.
    async fn register_user(&self, name: &str, email: &str, password: &str) -> ApiResult<String>;

    /// Resolve the profile behind the current token.
    async fn who_am_i(&self) -> ApiResult<User>;

    // ── Boards ────────────────────────────────────────────────────────

    async fn list_boards(&self) -> ApiResult<Vec<Board>>;
    async fn create_board(&self, name: &str) -> ApiResult<Board>;
    async fn rename_board(&self, id: i64, name: &str) -> ApiResult<Board>;
    /// Cascades: the board's columns and their tasks go with it.
    async fn delete_board(&self, id: i64) -> ApiResult<()>;
    async fn board_detail(&self, id: i64) -> ApiResult<BoardDetail>;

    // ── Members ───────────────────────────────────────────────────────

    async fn list_members(&self, board_id: i64) -> ApiResult<Vec<Member>>;
    /// Appends unconditionally; duplicate memberships are possible.
    async fn invite_member(&self, board_id: i64, email: &str, role: Role) -> ApiResult<()>;

    // ── Columns ───────────────────────────────────────────────────────

    /// `position` defaults to the board's current column count.
    async fn create_column(
        &self,
        board_id: i64,
        name: &str,
        position: Option<i64>,
    ) -> ApiResult<Column>;
    async fn rename_column(&self, id: i64, name: &str) -> ApiResult<Column>;
    /// Cascades to the column's tasks.
    async fn delete_column(&self, id: i64) -> ApiResult<()>;

    // ── Tasks ─────────────────────────────────────────────────────────

    /// Assignee defaults to the caller; `position` defaults to the
    /// "last" sentinel.
    async fn create_task(
        &self,
        column_id: i64,
        title: &str,
        description: Option<&str>,
        position: Option<i64>,
    ) -> ApiResult<Task>;
    /// Partial merge; a `column_id` change is a move and triggers no
    /// position renumbering on either side.
    async fn update_task(&self, id: i64, patch: TaskPatch) -> ApiResult<Task>;
    async fn delete_task(&self, id: i64) -> ApiResult<()>;
}

/// Construct the backend selected by the configuration.
pub fn connect(config: &ApiConfig, store: SharedStore) -> ApiResult<Arc<dyn BoardApi>> {
    if config.mock {
        debug!("selected simulated backend");
        Ok(Arc::new(MockClient::new(store)?))
    } else {
        debug!(base_url = %config.base_url, "selected remote backend");
        Ok(Arc::new(RemoteClient::new(config.base_url.clone(), store)))
    }
}
