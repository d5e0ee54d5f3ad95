//! Session lifecycle: SAML handshake, session-loss detection and the
//! per-run staging buffer.
//!
//! The handshake is three posts long:
//!
//! ```text
//! registerPostSignIn ──SAMLRequest──► IdP /samlsso ──SAMLResponse──► SP /saml/SSO/alias/<sp>
//!                                        │
//!                                        └─ login form? ─► IdP /commonauth (credentials)
//! ```

use chrono::Utc;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::portal::NOT_LOGGED_IN_MARKER;
use crate::enrollment::{StagedOperation, StagingFailure};
use crate::errors::{AuthenticationError, RegistrarError, Result, TransportError};
use crate::portal::extract::{
    form_field, SAML_REQUEST_FIELD, SAML_RESPONSE_FIELD, SESSION_DATA_KEY_FIELD,
};
use crate::portal::{HeaderProfile, PortalClient};

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Tokens exchanged during the last handshake
#[derive(Debug, Clone, Default)]
pub struct SamlArtifacts {
    pub saml_request: Option<String>,
    pub saml_response: Option<String>,
    pub completed_handshakes: u32,
}

/// State of one registration pipeline run
#[derive(Debug)]
pub struct Session {
    unique_session_id: String,
    staged: Vec<StagedOperation>,
    rejected: Vec<StagingFailure>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let prefix: String = Uuid::new_v4().simple().to_string().chars().take(5).collect();
        Self {
            unique_session_id: format!("{}{}", prefix, Utc::now().timestamp_millis()),
            staged: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn unique_session_id(&self) -> &str {
        &self.unique_session_id
    }

    pub fn staged(&self) -> &[StagedOperation] {
        &self.staged
    }

    pub fn rejected(&self) -> &[StagingFailure] {
        &self.rejected
    }

    pub fn reject(&mut self, failure: StagingFailure) {
        self.rejected.push(failure);
    }

    pub fn is_staged(&self, crn: &str) -> bool {
        self.staged.iter().any(|op| op.crn() == Some(crn))
    }

    /// Append an operation. A CRN already staged keeps its first action.
    pub fn stage(&mut self, operation: StagedOperation) -> bool {
        if let Some(crn) = operation.crn() {
            if self.is_staged(crn) {
                warn!(
                    "CRN {} is already staged, keeping its existing action",
                    crn
                );
                return false;
            }
        }
        self.staged.push(operation);
        true
    }
}

/// Drives authentication for one transport. Clones share the handshake lock.
#[derive(Clone)]
pub struct SessionManager {
    client: PortalClient,
    credentials: Arc<Credentials>,
    artifacts: Arc<Mutex<SamlArtifacts>>,
}

impl SessionManager {
    pub fn new(client: PortalClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials: Arc::new(credentials),
            artifacts: Arc::new(Mutex::new(SamlArtifacts::default())),
        }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    pub async fn artifacts(&self) -> SamlArtifacts {
        self.artifacts.lock().await.clone()
    }

    /// Probe the lightweight authenticated endpoint
    pub async fn is_authenticated(&self) -> Result<bool> {
        let operation = "Checking Auth Session";
        let (status, body) = self
            .client
            .get_raw(
                &self.client.endpoints().auth_probe(),
                &[],
                HeaderProfile::Document,
                operation,
            )
            .await?;

        if status == StatusCode::UNAUTHORIZED || body.contains(NOT_LOGGED_IN_MARKER) {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(true)
    }

    /// Probe, and run the full handshake only when the session is gone
    pub async fn ensure_authenticated(&self) -> Result<()> {
        let mut artifacts = self.artifacts.lock().await;

        if self.is_authenticated().await? {
            debug!("Session still authenticated");
            return Ok(());
        }

        info!("Session not logged in, starting SAML handshake");
        self.handshake(&mut artifacts).await?;
        artifacts.completed_handshakes += 1;
        info!("SAML handshake completed");
        Ok(())
    }

    async fn handshake(&self, artifacts: &mut SamlArtifacts) -> Result<()> {
        let saml_request = self.request_saml_token().await?;
        artifacts.saml_request = Some(saml_request.clone());

        let saml_response = self.submit_to_identity_provider(&saml_request).await?;
        artifacts.saml_response = Some(saml_response.clone());

        self.submit_assertion(&saml_response).await
    }

    async fn request_saml_token(&self) -> Result<String> {
        let step = "Register Post Sign In";
        let body = self
            .client
            .get_text(
                &self.client.endpoints().register_post_sign_in(),
                &[("mode", "registration")],
                HeaderProfile::Document,
                step,
            )
            .await?;

        form_field(&body, SAML_REQUEST_FIELD)
            .ok_or_else(|| RegistrarError::missing_token(step, SAML_REQUEST_FIELD))
    }

    async fn submit_to_identity_provider(&self, saml_request: &str) -> Result<String> {
        let step = "Submitting SAML SSO";
        let body = self
            .client
            .post_form(
                &self.client.endpoints().idp_sso(),
                &[],
                &[(SAML_REQUEST_FIELD, saml_request)],
                step,
            )
            .await?;

        if let Some(token) = form_field(&body, SAML_RESPONSE_FIELD) {
            return Ok(token);
        }

        match form_field(&body, SESSION_DATA_KEY_FIELD) {
            Some(session_data_key) => self.submit_credentials(&session_data_key).await,
            None => Err(RegistrarError::missing_token(step, SAML_RESPONSE_FIELD)),
        }
    }

    async fn submit_credentials(&self, session_data_key: &str) -> Result<String> {
        let step = "Submitting Identity Provider Login";
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(AuthenticationError::MissingCredentials.into());
        }

        debug!("Identity provider requested credentials");
        let body = self
            .client
            .post_form(
                &self.client.endpoints().idp_commonauth(),
                &[],
                &[
                    ("username", self.credentials.username.as_str()),
                    ("password", self.credentials.password.as_str()),
                    (SESSION_DATA_KEY_FIELD, session_data_key),
                ],
                step,
            )
            .await?;

        form_field(&body, SAML_RESPONSE_FIELD)
            .ok_or_else(|| RegistrarError::missing_token(step, SAML_RESPONSE_FIELD))
    }

    async fn submit_assertion(&self, saml_response: &str) -> Result<()> {
        self.client
            .post_form(
                &self.client.endpoints().sp_assertion(),
                &[],
                &[(SAML_RESPONSE_FIELD, saml_response)],
                "Submitting SSB SP",
            )
            .await?;
        Ok(())
    }
}
