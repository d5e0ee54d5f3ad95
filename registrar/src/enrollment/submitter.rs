use tracing::{info, warn};

use super::models::{
    ActionCode, AddItemResponse, BatchRequest, BatchResponse, BatchResult, SectionDetails,
    StagedOperation,
};
use super::StagingFailure;
use crate::constants::portal::CRN_KEY;
use crate::errors::{RegistrarError, Result, SubmissionError};
use crate::portal::{decode_json, HeaderProfile, PortalClient};
use crate::session::Session;

/// Stages worksheet rows and submits them as one batch
#[derive(Clone)]
pub struct BatchSubmitter {
    client: PortalClient,
    term: String,
    waitlist: bool,
}

impl BatchSubmitter {
    pub fn new(client: PortalClient, term: &str, waitlist: bool) -> Self {
        Self {
            client,
            term: term.to_string(),
            waitlist,
        }
    }

    /// Opens the registration worksheet; failures only logged
    pub async fn visit_class_registration(&self) {
        if let Err(e) = self
            .client
            .head(
                &self.client.endpoints().class_registration(),
                "Visiting Class Registration",
            )
            .await
        {
            warn!("[{}] Could not open class registration: {}", self.term, e);
        }
    }

    /// Log the portal's description of each section. Best effort.
    pub async fn check_sections(&self, crns: &[String]) {
        for crn in crns {
            let operation = format!("Checking Course ({})", crn);
            let details = self
                .client
                .get_text(
                    &self.client.endpoints().section_details(),
                    &[("courseReferenceNumber", crn.as_str()), ("term", self.term.as_str())],
                    HeaderProfile::Document,
                    &operation,
                )
                .await
                .and_then(|body| decode_json::<SectionDetails>(&body, &operation));

            match details {
                Ok(details) if !details.olr => {
                    info!(
                        "[{}] {}",
                        crn,
                        details.response_display.unwrap_or_default()
                    );
                }
                Ok(_) => info!("[{}] - Unable To Get Data", crn),
                Err(e) => warn!("[{}] Section check failed: {}", crn, e),
            }
        }
    }

    pub async fn stage_drops(&self, session: &mut Session, crns: &[String]) -> Result<()> {
        for crn in crns {
            self.stage(session, crn, ActionCode::WebDrop).await?;
        }
        Ok(())
    }

    pub async fn stage_adds(&self, session: &mut Session, crns: &[String]) -> Result<()> {
        let action = ActionCode::for_add(self.waitlist);
        for crn in crns {
            self.stage(session, crn, action).await?;
        }
        Ok(())
    }

    async fn stage(&self, session: &mut Session, crn: &str, action: ActionCode) -> Result<()> {
        if session.is_staged(crn) {
            warn!(
                "[{}] Already staged in this batch, not staging it again as {}",
                crn, action
            );
            return Ok(());
        }

        let operation = match action {
            ActionCode::WebDrop => format!("Preparing to Drop Course ({})", crn),
            _ => format!("Adding Course ({})", crn),
        };

        let body = self
            .client
            .get_text(
                &self.client.endpoints().add_registration_item(),
                &[
                    ("term", self.term.as_str()),
                    ("courseReferenceNumber", crn),
                    ("olr", "false"),
                ],
                HeaderProfile::Document,
                &operation,
            )
            .await?;
        let response: AddItemResponse = decode_json(&body, &operation)?;

        if !response.success {
            let message = response.message.unwrap_or_default();
            warn!("Error staging course ({}) as {} - {}", crn, action, message);
            session.reject(StagingFailure {
                crn: crn.to_string(),
                action,
                message,
            });
            return Ok(());
        }

        let mut model = response
            .model
            .ok_or_else(|| RegistrarError::json(&operation, "response carries no worksheet model"))?;
        if let Some(row) = model.as_object_mut() {
            row.entry(CRN_KEY)
                .or_insert_with(|| serde_json::Value::String(crn.to_string()));
        }

        let staged = StagedOperation::new(model, action)
            .ok_or_else(|| RegistrarError::json(&operation, "worksheet model is not an object"))?;
        if session.stage(staged) {
            info!("Staged course {} as {}", crn, action);
        }
        Ok(())
    }

    /// Submit every staged row in one POST
    pub async fn submit_batch(&self, session: &Session) -> Result<Vec<BatchResult>> {
        if session.staged().is_empty() {
            return Err(SubmissionError::NothingToSubmit.into());
        }

        let operation = "Submitting Batch Update";
        let request = BatchRequest {
            update: session.staged(),
            unique_session_id: session.unique_session_id(),
        };

        info!(
            "[{}] Submitting batch with {} staged operation(s)",
            self.term,
            session.staged().len()
        );
        let body = self
            .client
            .post_json(&self.client.endpoints().submit_batch(), &request, operation)
            .await?;
        let response: BatchResponse = decode_json(&body, operation)?;

        Ok(response.data.update)
    }
}
