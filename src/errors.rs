//! Typed failure taxonomy for the board data client.
//!
//! Every operation on [`crate::client::BoardApi`] resolves to one of these
//! variants. The client never retries; callers own user-visible messaging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials, or a missing/invalid/expired session token.
    #[error("Unauthorized: invalid credentials or session token")]
    Unauthorized,

    /// Registration with an email that already has an account.
    #[error("Conflict: email {email} is already registered")]
    Conflict { email: String },

    /// The target of a fetch or mutation no longer exists.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// The remote host could not be reached at all (DNS, connection refused).
    /// Distinct from an HTTP error so the caller can suggest checking that
    /// the backend is running.
    #[error("Network unreachable. Is your backend running at {url}?")]
    NetworkUnavailable { url: String },

    /// Any other non-2xx response, with the raw body kept for diagnostics.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound { resource, id }
    }

    /// True for failures the session manager treats as an implicit logout.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_resource_and_id() {
        let err = ApiError::not_found("board", 42);
        match &err {
            ApiError::NotFound { resource, id } => {
                assert_eq!(*resource, "board");
                assert_eq!(*id, 42);
            }
            _ => panic!("Expected NotFound variant"),
        }
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn network_unavailable_message_names_the_address() {
        let err = ApiError::NetworkUnavailable {
            url: "http://localhost:8000/api".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://localhost:8000/api"));
        assert!(msg.contains("backend running"));
    }

    #[test]
    fn http_error_preserves_status_and_body() {
        let err = ApiError::Http {
            status: 422,
            body: "{\"detail\":\"bad name\"}".into(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("bad name"));
    }

    #[test]
    fn unauthorized_is_flagged_for_implicit_logout() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(
            !ApiError::Conflict {
                email: "a@b.c".into()
            }
            .is_unauthorized()
        );
    }

    #[test]
    fn converts_from_anyhow() {
        let err: ApiError = anyhow::anyhow!("store corrupted").into();
        assert!(matches!(err, ApiError::Other(_)));
    }
}
