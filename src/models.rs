use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Position assigned to a task created without an explicit position.
/// Sorts after any realistically numbered sibling ("last" sentinel).
pub const LAST_POSITION: i64 = 9999;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Authenticated user profile as returned by `/auth/me`.
/// Never carries the password; the simulated store keeps that separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub name: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column_id: i64,
    pub position: i64,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Membership row as returned by the members/invite endpoints.
/// Duplicate entries per board are possible (invite never dedupes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Envelope returned by `GET /boards/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    pub board: Board,
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
    pub members: Vec<Member>,
}

impl BoardDetail {
    /// Columns in display order. The API does not guarantee order;
    /// position is the only contract.
    pub fn columns_sorted(&self) -> Vec<&Column> {
        let mut cols: Vec<&Column> = self.columns.iter().collect();
        cols.sort_by_key(|c| (c.position, c.id));
        cols
    }

    /// Tasks of one column in display order. Ties in position are broken
    /// by task id so the ordering is stable across reloads.
    pub fn tasks_in_column(&self, column_id: i64) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .collect();
        tasks.sort_by_key(|t| (t.position, t.id));
        tasks
    }

    pub fn member_by_id(&self, id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
}

/// Partial update for a task. `None` fields are left untouched; moving a
/// task between columns is just `column_id: Some(target)` with no
/// renumbering of either column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl TaskPatch {
    /// Patch that only reassigns the owning column (a "move").
    pub fn move_to(column_id: i64) -> Self {
        Self {
            column_id: Some(column_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.column_id.is_none()
            && self.position.is_none()
            && self.assignee_id.is_none()
            && self.tags.is_none()
    }
}

// ── Wire payload types ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBoardRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RenameRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateColumnRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InviteRequest<'a> {
    pub email: &'a str,
    pub role: Role,
}

/// Ack body for deletes and invites (`{"ok": true}`).
#[derive(Debug, Deserialize)]
pub struct Ack {
    pub ok: bool,
}
