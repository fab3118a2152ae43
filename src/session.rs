//! Session/Identity manager.
//!
//! Owns the current authentication state and mediates login, register and
//! logout against the board data client. The state machine:
//!
//! ```text
//! LoggedOut ──initialize (persisted token)──▶ Loading ──whoAmI ok──▶ LoggedIn
//!     ▲                                          │
//!     │◀──────────whoAmI failed (token cleared)──┘
//!     │
//!     │◀──logout / profile-fetch failure── LoggedIn ◀──login/register── LoggedOut
//! ```
//!
//! Protected operations must be refused while `Loading`; an `Unauthorized`
//! profile fetch is an implicit logout, never surfaced raw to the user.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::BoardApi;
use crate::errors::{ApiError, ApiResult};
use crate::models::User;
use crate::store::SharedStore;

#[derive(Debug, Clone)]
pub enum AuthState {
    LoggedOut,
    /// A persisted token exists and its profile fetch is in flight.
    Loading,
    LoggedIn(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}

pub struct SessionManager {
    api: Arc<dyn BoardApi>,
    store: SharedStore,
    state: AuthState,
}

impl SessionManager {
    pub fn new(api: Arc<dyn BoardApi>, store: SharedStore) -> Self {
        Self {
            api,
            store,
            state: AuthState::LoggedOut,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// In-memory profile; `None` unless `LoggedIn`.
    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            AuthState::LoggedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Persisted token; empty when unauthenticated.
    pub fn current_token(&self) -> String {
        self.store.token()
    }

    /// Startup resolution of a previously persisted token.
    ///
    /// No token: settles `LoggedOut` immediately. With a token, enters
    /// `Loading` and resolves the profile; `Unauthorized` clears the stale
    /// session silently, while other failures (typically the backend being
    /// unreachable) leave the token in place and propagate so the caller
    /// can report them.
    pub async fn initialize(&mut self) -> ApiResult<&AuthState> {
        if !self.store.has_token() {
            self.state = AuthState::LoggedOut;
            return Ok(&self.state);
        }

        self.state = AuthState::Loading;
        match self.api.who_am_i().await {
            Ok(user) => {
                debug!(user_id = user.id, "session restored");
                self.state = AuthState::LoggedIn(user);
            }
            Err(e) if e.is_unauthorized() => {
                // Expired or invalid token: implicit logout.
                warn!("persisted token rejected, clearing session");
                self.store.clear_token()?;
                self.state = AuthState::LoggedOut;
            }
            Err(e) => {
                self.state = AuthState::LoggedOut;
                return Err(e);
            }
        }
        Ok(&self.state)
    }

    /// Authenticate and resolve the profile. On failure the prior session
    /// state is left untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<&User> {
        self.api.authenticate(email, password).await?;
        let user = self.api.who_am_i().await?;
        info!(user_id = user.id, "logged in");
        self.state = AuthState::LoggedIn(user);
        match &self.state {
            AuthState::LoggedIn(user) => Ok(user),
            _ => unreachable!(),
        }
    }

    /// Create an account, then behave exactly like a successful login.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> ApiResult<&User> {
        self.api.register_user(name, email, password).await?;
        let user = self.api.who_am_i().await?;
        info!(user_id = user.id, "registered and logged in");
        self.state = AuthState::LoggedIn(user);
        match &self.state {
            AuthState::LoggedIn(user) => Ok(user),
            _ => unreachable!(),
        }
    }

    /// Clears the persisted token and in-memory profile. Idempotent.
    pub fn logout(&mut self) -> ApiResult<()> {
        self.store.clear_token()?;
        self.state = AuthState::LoggedOut;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{self, MockClient};
    use crate::config::ApiConfig;
    use crate::models::{
        Board, BoardDetail, Column, Member, PingResponse, Role, Task, TaskPatch,
    };
    use crate::store::CredentialStore;
    use async_trait::async_trait;
    use tempfile::tempdir;

    fn make_session() -> (SessionManager, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(CredentialStore::open(dir.path().join("store.json")).unwrap());
        let api = Arc::new(MockClient::new(store.clone()).unwrap());
        (SessionManager::new(api, store), dir)
    }

    #[tokio::test]
    async fn test_initialize_without_token_is_logged_out() {
        let (mut session, _dir) = make_session();
        let state = session.initialize().await.unwrap();
        assert!(matches!(state, AuthState::LoggedOut));
        assert!(session.current_user().is_none());
        assert_eq!(session.current_token(), "");
    }

    #[tokio::test]
    async fn test_login_transitions_to_logged_in() {
        let (mut session, _dir) = make_session();
        let user = session.login("owner@example.com", "1234").await.unwrap();
        assert_eq!(user.id, 1);
        assert!(session.state().is_authenticated());
        assert_eq!(session.current_token(), "mock-token-1");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_prior_state_untouched() {
        let (mut session, _dir) = make_session();
        session.login("owner@example.com", "1234").await.unwrap();
        let err = session.login("owner@example.com", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        // Still logged in as the owner from before.
        assert_eq!(session.current_user().unwrap().id, 1);
        assert_eq!(session.current_token(), "mock-token-1");
    }

    #[tokio::test]
    async fn test_register_auto_issues_session() {
        let (mut session, _dir) = make_session();
        let user = session
            .register("Fresh", "fresh@x.com", "pw")
            .await
            .unwrap();
        assert_eq!(user.name, "Fresh");
        assert!(session.state().is_authenticated());
        assert_eq!(session.current_token(), "mock-token-5");
    }

    #[tokio::test]
    async fn test_logout_is_synchronous_and_idempotent() {
        let (mut session, _dir) = make_session();
        session.login("owner@example.com", "1234").await.unwrap();
        session.logout().unwrap();
        assert!(matches!(session.state(), AuthState::LoggedOut));
        assert_eq!(session.current_token(), "");
        session.logout().unwrap();
        assert!(matches!(session.state(), AuthState::LoggedOut));
    }

    #[tokio::test]
    async fn test_initialize_restores_persisted_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = Arc::new(CredentialStore::open(path.clone()).unwrap());
            let api = Arc::new(MockClient::new(store.clone()).unwrap());
            let mut session = SessionManager::new(api, store);
            session.login("alice@example.com", "1234").await.unwrap();
        }
        {
            let store = Arc::new(CredentialStore::open(path).unwrap());
            let api = Arc::new(MockClient::new(store.clone()).unwrap());
            let mut session = SessionManager::new(api, store);
            let state = session.initialize().await.unwrap();
            match state {
                AuthState::LoggedIn(user) => assert_eq!(user.email, "alice@example.com"),
                other => panic!("Expected LoggedIn, got {:?}", other),
            }
        }
    }

    /// Backend stub whose profile fetch always rejects the token.
    struct RejectingApi;

    #[async_trait]
    impl crate::client::BoardApi for RejectingApi {
        async fn ping(&self) -> ApiResult<PingResponse> {
            Err(ApiError::Unauthorized)
        }
        async fn authenticate(&self, _: &str, _: &str) -> ApiResult<String> {
            Err(ApiError::Unauthorized)
        }
        async fn register_user(&self, _: &str, _: &str, _: &str) -> ApiResult<String> {
            Err(ApiError::Unauthorized)
        }
        async fn who_am_i(&self) -> ApiResult<User> {
            Err(ApiError::Unauthorized)
        }
        async fn list_boards(&self) -> ApiResult<Vec<Board>> {
            Err(ApiError::Unauthorized)
        }
        async fn create_board(&self, _: &str) -> ApiResult<Board> {
            Err(ApiError::Unauthorized)
        }
        async fn rename_board(&self, _: i64, _: &str) -> ApiResult<Board> {
            Err(ApiError::Unauthorized)
        }
        async fn delete_board(&self, _: i64) -> ApiResult<()> {
            Err(ApiError::Unauthorized)
        }
        async fn board_detail(&self, _: i64) -> ApiResult<BoardDetail> {
            Err(ApiError::Unauthorized)
        }
        async fn list_members(&self, _: i64) -> ApiResult<Vec<Member>> {
            Err(ApiError::Unauthorized)
        }
        async fn invite_member(&self, _: i64, _: &str, _: Role) -> ApiResult<()> {
            Err(ApiError::Unauthorized)
        }
        async fn create_column(&self, _: i64, _: &str, _: Option<i64>) -> ApiResult<Column> {
            Err(ApiError::Unauthorized)
        }
        async fn rename_column(&self, _: i64, _: &str) -> ApiResult<Column> {
            Err(ApiError::Unauthorized)
        }
        async fn delete_column(&self, _: i64) -> ApiResult<()> {
            Err(ApiError::Unauthorized)
        }
        async fn create_task(
            &self,
            _: i64,
            _: &str,
            _: Option<&str>,
            _: Option<i64>,
        ) -> ApiResult<Task> {
            Err(ApiError::Unauthorized)
        }
        async fn update_task(&self, _: i64, _: TaskPatch) -> ApiResult<Task> {
            Err(ApiError::Unauthorized)
        }
        async fn delete_task(&self, _: i64) -> ApiResult<()> {
            Err(ApiError::Unauthorized)
        }
    }

    #[tokio::test]
    async fn test_initialize_clears_rejected_token() {
        let dir = tempdir().unwrap();
        let store = Arc::new(CredentialStore::open(dir.path().join("store.json")).unwrap());
        store.set_token("stale-token").unwrap();

        let mut session = SessionManager::new(Arc::new(RejectingApi), store.clone());
        let state = session.initialize().await.unwrap();
        assert!(matches!(state, AuthState::LoggedOut));
        assert!(!store.has_token(), "stale token must be cleared");
    }

    #[tokio::test]
    async fn test_initialize_keeps_token_on_network_failure() {
        let dir = tempdir().unwrap();
        let store = Arc::new(CredentialStore::open(dir.path().join("store.json")).unwrap());
        store.set_token("mock-token-1").unwrap();

        // Remote client pointed at a dead address.
        let cfg = ApiConfig {
            base_url: "http://127.0.0.1:1/api".into(),
            mock: false,
            data_dir: dir.path().to_path_buf(),
        };
        let api = client::connect(&cfg, store.clone()).unwrap();
        let mut session = SessionManager::new(api, store.clone());

        let err = session.initialize().await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkUnavailable { .. }));
        assert!(matches!(session.state(), AuthState::LoggedOut));
        assert!(
            store.has_token(),
            "an unreachable backend must not destroy the session"
        );
    }
}
