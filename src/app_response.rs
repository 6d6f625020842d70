use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, RegisterError, StoreError};

/// JSON envelope returned across the FFI boundary.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Unauthorized(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<StoreError> for AppResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedStoredData { .. } | StoreError::Serialization(_) => {
                AppResponse::SerializationError(err.to_string())
            }
            StoreError::UnknownCollection(_) => AppResponse::NotFound(err.to_string()),
            StoreError::InvalidFieldValue { .. } => AppResponse::ValidationError(err.to_string()),
            StoreError::StorageWriteFailure { .. }
            | StoreError::StorageReadFailure { .. }
            | StoreError::QuotaExceeded { .. }
            | StoreError::Database(_) => AppResponse::DatabaseError(err.to_string()),
        }
    }
}

impl From<AuthError> for AppResponse {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownEmail | AuthError::WrongPassword => {
                AppResponse::Unauthorized(err.to_string())
            }
            AuthError::InvalidSessionTtl(_) => AppResponse::BadRequest(err.to_string()),
            AuthError::Store(e) => AppResponse::from(e),
        }
    }
}

impl From<RegisterError> for AppResponse {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::DuplicateEmail(_) => AppResponse::ValidationError(err.to_string()),
            RegisterError::Store(e) => AppResponse::from(e),
        }
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Serializes `value` into an `Ok` response.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::SerializationError(format!("Failed to serialize result: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_unauthorized() {
        assert_eq!(
            AppResponse::from(AuthError::WrongPassword),
            AppResponse::Unauthorized("Incorrect password".to_string())
        );
    }

    #[test]
    fn bad_session_ttl_is_a_bad_request() {
        assert!(matches!(
            AppResponse::from(AuthError::InvalidSessionTtl(-1)),
            AppResponse::BadRequest(_)
        ));
    }

    #[test]
    fn envelope_shape() {
        let json = serde_json::to_string(&AppResponse::success("done")).unwrap();
        assert_eq!(json, r#"{"Ok":"done"}"#);
        assert_eq!(AppResponse::NotFound("x".into()).to_string(), "Not found: x");
    }
}
