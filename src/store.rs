//! Durable local state shared by the session manager and both client
//! implementations.
//!
//! One JSON file holds the current session token, the registered-user
//! directory of the simulated backend, and the id of the currently
//! logged-in simulated user. Boards, columns and tasks are deliberately
//! *not* persisted here; simulated board data resets on every process
//! start (demo behavior).

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Role, User};

/// A registered user as kept by the simulated backend.
///
/// The password is plaintext; this store only ever backs the demo login.
/// It never leaves the store: profiles handed to callers go through
/// [`StoredUser::profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl StoredUser {
    pub fn profile(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    token: String,
    #[serde(default)]
    token_issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    users: Vec<StoredUser>,
    #[serde(default)]
    current_user_id: Option<i64>,
}

/// File-backed credential store. The token is the only cross-request shared
/// mutable resource: it is read at request-issue time and fully replaced by
/// login/logout, so there is no read-modify-write on it.
pub struct CredentialStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

pub type SharedStore = Arc<CredentialStore>;

impl CredentialStore {
    /// Open the store at `path`, creating empty state if the file is missing.
    /// A corrupt file is treated as empty rather than fatal: losing a demo
    /// session beats refusing to start.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "credential store corrupt, resetting");
                    StoreData::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read store at {}", path.display()));
            }
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>> {
        self.data
            .lock()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))
    }

    /// Persist the current state atomically (write temp file, then rename).
    fn save(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(data).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write store at {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store at {}", self.path.display()))?;
        Ok(())
    }

    // ── Session token ─────────────────────────────────────────────────

    /// Current token; empty string when unauthenticated.
    pub fn token(&self) -> String {
        self.lock().map(|d| d.token.clone()).unwrap_or_default()
    }

    pub fn has_token(&self) -> bool {
        !self.token().is_empty()
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        let mut data = self.lock()?;
        data.token = token.to_string();
        data.token_issued_at = Some(Utc::now());
        debug!("session token persisted");
        self.save(&data)
    }

    /// Idempotent: clearing an already-empty token is a no-op write.
    pub fn clear_token(&self) -> Result<()> {
        let mut data = self.lock()?;
        data.token.clear();
        data.token_issued_at = None;
        data.current_user_id = None;
        self.save(&data)
    }

    // ── Registered-user directory (simulated backend) ─────────────────

    /// Seed the four demo users on first use. Returns the directory.
    pub fn ensure_seed_users(&self) -> Result<Vec<StoredUser>> {
        let mut data = self.lock()?;
        if data.users.is_empty() {
            data.users = seed_users();
            self.save(&data)?;
            debug!(count = data.users.len(), "seeded demo users");
        }
        Ok(data.users.clone())
    }

    pub fn users(&self) -> Result<Vec<StoredUser>> {
        Ok(self.lock()?.users.clone())
    }

    pub fn find_by_credentials(&self, email: &str, password: &str) -> Result<Option<StoredUser>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned())
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.lock()?.users.iter().any(|u| u.email == email))
    }

    /// Append a new user with the next free id and return it.
    pub fn add_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: Role,
    ) -> Result<StoredUser> {
        let mut data = self.lock()?;
        let id = data.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = StoredUser {
            id,
            name,
            email,
            password,
            role,
        };
        data.users.push(user.clone());
        self.save(&data)?;
        Ok(user)
    }

    // ── Current simulated user ────────────────────────────────────────

    pub fn set_current_user(&self, id: i64) -> Result<()> {
        let mut data = self.lock()?;
        data.current_user_id = Some(id);
        self.save(&data)
    }

    /// The logged-in simulated user; falls back to the first registered
    /// user when no id has been recorded.
    pub fn current_user(&self) -> Result<Option<StoredUser>> {
        let data = self.lock()?;
        let user = data
            .current_user_id
            .and_then(|id| data.users.iter().find(|u| u.id == id))
            .or_else(|| data.users.first())
            .cloned();
        Ok(user)
    }
}

fn seed_users() -> Vec<StoredUser> {
    vec![
        StoredUser {
            id: 1,
            name: "Demo Owner".into(),
            email: "owner@example.com".into(),
            password: "1234".into(),
            role: Role::Owner,
        },
        StoredUser {
            id: 2,
            name: "Alice Member".into(),
            email: "alice@example.com".into(),
            password: "1234".into(),
            role: Role::Member,
        },
        StoredUser {
            id: 3,
            name: "Bob Member".into(),
            email: "bob@example.com".into(),
            password: "1234".into(),
            role: Role::Member,
        },
        StoredUser {
            id: 4,
            name: "QA Viewer".into(),
            email: "qa@example.com".into(),
            password: "1234".into(),
            role: Role::Member,
        },
    ]
}
