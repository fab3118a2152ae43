//! Simulated backend: the full [`BoardApi`] surface against process-local
//! state, used when no real backend is configured.
//!
//! The registered-user directory and the session token live in the durable
//! [`CredentialStore`]; boards, columns and tasks are in-memory only and
//! reset on every process start. That reset is the intended demo behavior,
//! not an oversight.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::debug;

use super::BoardApi;
use crate::errors::{ApiError, ApiResult};
use crate::models::{
    Board, BoardDetail, Column, LAST_POSITION, Member, PingResponse, Role, Tag, Task, TaskPatch,
    User,
};
use crate::store::{SharedStore, StoredUser};

/// Ids below this are reserved for seeded fixtures.
const FIRST_DYNAMIC_ID: i64 = 1000;

/// In-memory board data. Explicit object with a defined lifecycle:
/// constructed once per client, reset only by building a fresh one.
#[derive(Debug)]
pub struct MockState {
    boards: Vec<Board>,
    columns_by_board: HashMap<i64, Vec<Column>>,
    tasks: Vec<Task>,
    members_by_board: HashMap<i64, Vec<Member>>,
    next_id: i64,
}

impl MockState {
    /// Empty state, no demo fixtures. Test setups build on this.
    pub fn empty() -> Self {
        Self {
            boards: Vec::new(),
            columns_by_board: HashMap::new(),
            tasks: Vec::new(),
            members_by_board: HashMap::new(),
            next_id: FIRST_DYNAMIC_ID,
        }
    }

    /// Demo fixtures: one board with three columns, one welcome task, and
    /// the first three registered users as members.
    pub fn seeded(users: &[StoredUser]) -> Self {
        let mut state = Self::empty();
        state.boards.push(Board {
            id: 1,
            name: "Demo Board".into(),
        });
        state.columns_by_board.insert(
            1,
            vec![
                Column {
                    id: 11,
                    name: "To Do".into(),
                    position: 0,
                },
                Column {
                    id: 12,
                    name: "In Progress".into(),
                    position: 1,
                },
                Column {
                    id: 13,
                    name: "Done".into(),
                    position: 2,
                },
            ],
        );
        state.tasks.push(Task {
            id: 100,
            title: "Welcome to Kanban".into(),
            description: "This is a mock task.".into(),
            column_id: 11,
            position: 0,
            assignee_id: Some(1),
            tags: vec![Tag {
                name: "demo".into(),
            }],
        });
        state.members_by_board.insert(
            1,
            users
                .iter()
                .take(3)
                .map(|u| Member {
                    id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    role: u.role,
                })
                .collect(),
        );
        state
    }

    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MockClient {
    state: Mutex<MockState>,
    store: SharedStore,
}

impl MockClient {
    /// Seeds the durable user directory (first run only) and the in-memory
    /// demo board.
    pub fn new(store: SharedStore) -> ApiResult<Self> {
        let users = store.ensure_seed_users()?;
        Ok(Self {
            state: Mutex::new(MockState::seeded(&users)),
            store,
        })
    }

    /// Client over explicit state, for tests that need a blank slate.
    pub fn with_state(state: MockState, store: SharedStore) -> Self {
        Self {
            state: Mutex::new(state),
            store,
        }
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|e| ApiError::from(anyhow!("Mock state lock poisoned: {}", e)))
    }

    /// The caller's identity, as a membership row.
    fn current_member(&self) -> ApiResult<Option<Member>> {
        Ok(self.store.current_user()?.map(|u| Member {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }))
    }
}

fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[async_trait]
impl BoardApi for MockClient {
    async fn ping(&self) -> ApiResult<PingResponse> {
        Ok(PingResponse {
            ok: true,
            mode: Some("mock".into()),
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String> {
        let user = self
            .store
            .find_by_credentials(email, password)?
            .ok_or(ApiError::Unauthorized)?;
        self.store.set_current_user(user.id)?;
        let token = format!("mock-token-{}", user.id);
        self.store.set_token(&token)?;
        debug!(user_id = user.id, "mock login");
        Ok(token)
    }

    async fn register_user(&self, name: &str, email: &str, password: &str) -> ApiResult<String> {
        if self.store.email_exists(email)? {
            return Err(ApiError::Conflict {
                email: email.to_string(),
            });
        }
        let name = if name.trim().is_empty() {
            name_from_email(email)
        } else {
            name.to_string()
        };
        let user = self.store.add_user(
            name,
            email.to_string(),
            password.to_string(),
            Role::Member,
        )?;
        self.store.set_current_user(user.id)?;
        let token = format!("mock-token-{}", user.id);
        self.store.set_token(&token)?;
        Ok(token)
    }

    async fn who_am_i(&self) -> ApiResult<User> {
        if !self.store.has_token() {
            return Err(ApiError::Unauthorized);
        }
        self.store
            .current_user()?
            .map(|u| u.profile())
            .ok_or(ApiError::Unauthorized)
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        Ok(self.lock()?.boards.clone())
    }

    async fn create_board(&self, name: &str) -> ApiResult<Board> {
        let member = self.current_member()?;
        let mut state = self.lock()?;
        let board = Board {
            id: state.alloc_id(),
            name: name.to_string(),
        };
        state.boards.push(board.clone());
        state.columns_by_board.insert(board.id, Vec::new());
        state
            .members_by_board
            .insert(board.id, member.into_iter().collect());
        Ok(board)
    }

    async fn rename_board(&self, id: i64, name: &str) -> ApiResult<Board> {
        let mut state = self.lock()?;
        let board = state
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::not_found("board", id))?;
        board.name = name.to_string();
        Ok(board.clone())
    }

    async fn delete_board(&self, id: i64) -> ApiResult<()> {
        let mut state = self.lock()?;
        // Idempotent: deleting an already-gone board acks without error.
        state.boards.retain(|b| b.id != id);
        let column_ids: Vec<i64> = state
            .columns_by_board
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.id)
            .collect();
        state.tasks.retain(|t| !column_ids.contains(&t.column_id));
        state.members_by_board.remove(&id);
        debug!(board_id = id, cascaded_columns = column_ids.len(), "mock board deleted");
        Ok(())
    }

    async fn board_detail(&self, id: i64) -> ApiResult<BoardDetail> {
        let member = self.current_member()?;
        let state = self.lock()?;
        let board = state
            .boards
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("board", id))?;
        let columns = state.columns_by_board.get(&id).cloned().unwrap_or_default();
        let tasks = state
            .tasks
            .iter()
            .filter(|t| columns.iter().any(|c| c.id == t.column_id))
            .cloned()
            .collect();
        let members = state
            .members_by_board
            .get(&id)
            .cloned()
            .unwrap_or_else(|| member.into_iter().collect());
        Ok(BoardDetail {
            board,
            columns,
            tasks,
            members,
        })
    }

    async fn list_members(&self, board_id: i64) -> ApiResult<Vec<Member>> {
        let member = self.current_member()?;
        let state = self.lock()?;
        Ok(state
            .members_by_board
            .get(&board_id)
            .cloned()
            .unwrap_or_else(|| member.into_iter().collect()))
    }

    async fn invite_member(&self, board_id: i64, email: &str, role: Role) -> ApiResult<()> {
        let mut state = self.lock()?;
        let entry = Member {
            id: state.alloc_id(),
            name: name_from_email(email),
            email: email.to_string(),
            role,
        };
        // Appended even when the email is already a member (known gap).
        state.members_by_board.entry(board_id).or_default().push(entry);
        Ok(())
    }

    async fn create_column(
        &self,
        board_id: i64,
        name: &str,
        position: Option<i64>,
    ) -> ApiResult<Column> {
        let mut state = self.lock()?;
        let id = state.alloc_id();
        let columns = state.columns_by_board.entry(board_id).or_default();
        let column = Column {
            id,
            name: name.to_string(),
            position: position.unwrap_or(columns.len() as i64),
        };
        columns.push(column.clone());
        Ok(column)
    }

    async fn rename_column(&self, id: i64, name: &str) -> ApiResult<Column> {
        let mut state = self.lock()?;
        let column = state
            .columns_by_board
            .values_mut()
            .flat_map(|cols| cols.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("column", id))?;
        column.name = name.to_string();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: i64) -> ApiResult<()> {
        let mut state = self.lock()?;
        for columns in state.columns_by_board.values_mut() {
            columns.retain(|c| c.id != id);
        }
        state.tasks.retain(|t| t.column_id != id);
        Ok(())
    }

    async fn create_task(
        &self,
        column_id: i64,
        title: &str,
        description: Option<&str>,
        position: Option<i64>,
    ) -> ApiResult<Task> {
        let assignee_id = self.store.current_user()?.map(|u| u.id);
        let mut state = self.lock()?;
        let column_exists = state
            .columns_by_board
            .values()
            .flatten()
            .any(|c| c.id == column_id);
        if !column_exists {
            return Err(ApiError::not_found("column", column_id));
        }
        let task = Task {
            id: state.alloc_id(),
            title: title.to_string(),
            description: description.unwrap_or_default().to_string(),
            column_id,
            position: position.unwrap_or(LAST_POSITION),
            assignee_id,
            tags: Vec::new(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> ApiResult<Task> {
        let mut state = self.lock()?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found("task", id))?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(column_id) = patch.column_id {
            // A move: identity, tags and assignee stay with the task.
            task.column_id = column_id;
        }
        if let Some(position) = patch.position {
            task.position = position;
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> ApiResult<()> {
        let mut state = self.lock()?;
        state.tasks.retain(|t| t.id != id);
        Ok(())
    }
}
