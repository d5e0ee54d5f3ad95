//! Enrollment batch submission
//!
//! Drops and adds are staged one CRN at a time through the portal's
//! `addRegistrationItem` endpoint (the same call for both; only the action
//! code set on the returned worksheet row differs), then submitted in a
//! single batch. The batch response is reconciled into one outcome per
//! requested CRN.
//!
//! # Action codes
//!
//! - `RW` register
//! - `WL` waitlist
//! - `DW` web drop

pub mod models;
pub mod reconcile;
pub mod submitter;

pub use models::{ActionCode, BatchResult, StagedOperation};
pub use reconcile::{reconcile, BatchReport, Outcome, RequestedSection, SectionOutcome};
pub use submitter::BatchSubmitter;

/// A section the portal refused to stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingFailure {
    pub crn: String,
    pub action: ActionCode,
    pub message: String,
}
