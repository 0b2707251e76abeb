//! Store errors and the denied-request report.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ErrorCode;

/// Kind of access a security rule evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOperation {
    Get,
    List,
    Create,
    Update,
    Delete,
    Write,
}

impl StoreOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Write => "write",
        }
    }
}

/// What was being accessed when a rule denied the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRuleContext {
    /// Document path relative to the database root, e.g. `surveys/abc`.
    pub path: String,
    pub operation: StoreOperation,
    #[serde(default)]
    pub request_resource_data: Option<serde_json::Value>,
}

/// Signed-in user as seen by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub uid: String,
    pub token: AuthToken,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthToken {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone_number: Option<String>,
}

/// A request refused by the store's security rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionDenied {
    pub context: SecurityRuleContext,
    pub auth: Option<AuthContext>,
}

impl PermissionDenied {
    /// The `{"rules": {...}}` object describing the refused request.
    #[must_use]
    pub fn denied_request(&self) -> serde_json::Value {
        json!({
            "rules": {
                "auth": self.auth,
                "method": self.context.operation,
                "path": format!("/databases/(default)/documents/{}", self.context.path),
                "resource": { "data": self.context.request_resource_data },
            }
        })
    }
}

impl std::fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pretty = serde_json::to_string_pretty(&self.denied_request()).map_err(|_| std::fmt::Error)?;
        write!(
            f,
            "Missing or insufficient permissions: The following request was denied by Security Rules:\n{pretty}"
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store config incomplete: {0} is not set")]
    MissingConfig(&'static str),

    #[error("{0}")]
    PermissionDenied(Box<PermissionDenied>),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingConfig(_) => "E_STORE_CONFIG",
            Self::PermissionDenied(_) => "E_PERMISSION_DENIED",
        }
    }
}
