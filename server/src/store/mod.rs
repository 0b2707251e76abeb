//! Document/auth store handle.
//!
//! DESIGN
//! ======
//! The store is configured once at startup and handed to request handlers
//! through `AppState`. Nothing reads or writes documents yet: the handle
//! only knows where the auth and document endpoints live and what the
//! browser needs to talk to them (`public_config`).
//!
//! Document calls happen in the browser with `public_config`. Requests the
//! security rules refuse are reported back to
//! `POST /api/store/permission-errors` and published on a broadcast channel;
//! one listener task logs them.

mod errors;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::non_blank;

pub use errors::{AuthContext, PermissionDenied, SecurityRuleContext, StoreError};

pub const DEFAULT_DOCUMENTS_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

const PERMISSION_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub project_id: String,
    pub api_key: String,
    pub auth_domain: String,
    /// `host:port` of a local emulator; plain HTTP when set.
    pub emulator_host: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("emulator_host", &self.emulator_host)
            .finish()
    }
}

impl StoreConfig {
    /// # Errors
    ///
    /// See [`StoreConfig::from_lookup`].
    pub fn from_env() -> Result<Option<Self>, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `Ok(None)` when the store is not configured at all.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingConfig`] when only some of the required
    /// variables are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, StoreError> {
        let project_id = non_blank(&lookup, "STORE_PROJECT_ID");
        let api_key = non_blank(&lookup, "STORE_API_KEY");
        let auth_domain = non_blank(&lookup, "STORE_AUTH_DOMAIN");

        if project_id.is_none() && api_key.is_none() && auth_domain.is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            project_id: project_id.ok_or(StoreError::MissingConfig("STORE_PROJECT_ID"))?,
            api_key: api_key.ok_or(StoreError::MissingConfig("STORE_API_KEY"))?,
            auth_domain: auth_domain.ok_or(StoreError::MissingConfig("STORE_AUTH_DOMAIN"))?,
            emulator_host: non_blank(&lookup, "STORE_EMULATOR_HOST"),
        }))
    }
}

/// Client-facing configuration, safe to hand to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStoreConfig {
    pub project_id: String,
    pub api_key: String,
    pub auth_domain: String,
}

// =============================================================================
// HANDLES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHandle {
    endpoint: String,
}

impl AuthHandle {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentsHandle {
    root: String,
}

impl DocumentsHandle {
    /// `{base}/projects/{id}/databases/(default)/documents`.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }
}

pub struct StoreHandle {
    config: StoreConfig,
    auth: AuthHandle,
    documents: DocumentsHandle,
    permission_tx: broadcast::Sender<PermissionDenied>,
}

impl StoreHandle {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let (auth_base, documents_base) = match &config.emulator_host {
            Some(host) => {
                (format!("http://{host}/identitytoolkit.googleapis.com/v1"), format!("http://{host}/v1"))
            }
            None => (DEFAULT_AUTH_BASE_URL.to_string(), DEFAULT_DOCUMENTS_BASE_URL.to_string()),
        };
        let auth = AuthHandle { endpoint: auth_base };
        let documents = DocumentsHandle {
            root: format!("{documents_base}/projects/{}/databases/(default)/documents", config.project_id),
        };
        let (permission_tx, _) = broadcast::channel(PERMISSION_CHANNEL_CAPACITY);
        Self { config, auth, documents, permission_tx }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthHandle {
        &self.auth
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentsHandle {
        &self.documents
    }

    #[must_use]
    pub fn public_config(&self) -> PublicStoreConfig {
        PublicStoreConfig {
            project_id: self.config.project_id.clone(),
            api_key: self.config.api_key.clone(),
            auth_domain: self.config.auth_domain.clone(),
        }
    }

    #[must_use]
    pub fn subscribe_permission_errors(&self) -> broadcast::Receiver<PermissionDenied> {
        self.permission_tx.subscribe()
    }

    /// Publish a denied request and return it as an error for the caller.
    pub fn report_permission_denied(&self, context: SecurityRuleContext, auth: Option<AuthContext>) -> StoreError {
        let denied = PermissionDenied { context, auth };
        // No subscribers is fine.
        let _ = self.permission_tx.send(denied.clone());
        StoreError::PermissionDenied(Box::new(denied))
    }
}

// =============================================================================
// PERMISSION LISTENER
// =============================================================================

/// Log every published permission error until the handle is dropped.
#[must_use]
pub fn spawn_permission_listener(store: &StoreHandle) -> JoinHandle<()> {
    let mut rx = store.subscribe_permission_errors();
    info!(project = %store.config.project_id, "store: permission listener started");
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(denied) => {
                    error!(
                        path = %denied.context.path,
                        method = denied.context.operation.as_str(),
                        "store: {denied}"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "store: permission listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
