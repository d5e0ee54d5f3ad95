//! Turns raw batch results into per-section outcomes.
//!
//! Pure: nothing here touches the session or the network.

use std::fmt;

use super::models::{ActionCode, BatchResult};
use super::StagingFailure;
use crate::constants::portal::{
    STATUS_DROPPED, STATUS_ERRORS, STATUS_REGISTERED, STATUS_WAITLISTED,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Enrolled,
    Waitlisted,
    Dropped,
    /// `Errors Preventing Registration`, with the per-section messages
    Errors(Vec<String>),
    /// Any other status text, passed through
    Status(String),
    /// Portal refused to stage the section
    StagingRejected(String),
    /// Staged and submitted, but absent from the batch response
    NoResult,
}

impl Outcome {
    pub fn from_status(result: &BatchResult) -> Self {
        let status = result.status();
        if status == STATUS_REGISTERED {
            Outcome::Enrolled
        } else if status == STATUS_WAITLISTED {
            Outcome::Waitlisted
        } else if STATUS_DROPPED.contains(&status) {
            Outcome::Dropped
        } else if status == STATUS_ERRORS {
            Outcome::Errors(result.error_messages())
        } else {
            Outcome::Status(status.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Enrolled | Outcome::Waitlisted | Outcome::Dropped)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Enrolled => write!(f, "Successfully Registered"),
            Outcome::Waitlisted => write!(f, "Successfully Waitlisted"),
            Outcome::Dropped => write!(f, "Successfully Dropped"),
            Outcome::Errors(messages) => {
                write!(f, "{} error(s): {}", messages.len(), messages.join("; "))
            }
            Outcome::Status(status) => write!(f, "Status: {}", status),
            Outcome::StagingRejected(message) => write!(f, "Could not be staged: {}", message),
            Outcome::NoResult => write!(f, "No result returned by the portal"),
        }
    }
}

/// What the student asked for, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedSection {
    pub crn: String,
    pub action: ActionCode,
}

impl RequestedSection {
    /// Drops first, then adds; a CRN appears once, with its first action
    pub fn from_lists(drops: &[String], adds: &[String], waitlist: bool) -> Vec<Self> {
        let mut requested: Vec<Self> = Vec::with_capacity(drops.len() + adds.len());
        let tagged = drops
            .iter()
            .map(|crn| (crn, ActionCode::WebDrop))
            .chain(adds.iter().map(|crn| (crn, ActionCode::for_add(waitlist))));

        for (crn, action) in tagged {
            if !requested.iter().any(|r| &r.crn == crn) {
                requested.push(Self {
                    crn: crn.clone(),
                    action,
                });
            }
        }
        requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutcome {
    pub crn: String,
    pub action: ActionCode,
    pub subject: Option<String>,
    pub course_number: Option<String>,
    pub course_title: Option<String>,
    pub outcome: Outcome,
}

impl SectionOutcome {
    /// `CRN - SUBJ NUM - Title`, or just the CRN when the portal gave no details
    pub fn label(&self) -> String {
        match (&self.subject, &self.course_number, &self.course_title) {
            (Some(subject), Some(number), Some(title)) => {
                format!("{} - {} {} - {}", self.crn, subject, number, title)
            }
            _ => self.crn.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sections: Vec<SectionOutcome>,
}

impl BatchReport {
    pub fn get(&self, crn: &str) -> Option<&SectionOutcome> {
        self.sections.iter().find(|s| s.crn == crn)
    }

    pub fn all_succeeded(&self) -> bool {
        !self.sections.is_empty() && self.sections.iter().all(|s| s.outcome.is_success())
    }
}

/// Report one outcome per requested CRN. Results for CRNs that were not
/// requested are ignored.
pub fn reconcile(
    requested: &[RequestedSection],
    results: &[BatchResult],
    rejected: &[StagingFailure],
) -> BatchReport {
    let sections = requested
        .iter()
        .map(|request| {
            let result = results
                .iter()
                .find(|r| r.course_reference_number == request.crn);

            let outcome = match (result, rejected.iter().find(|f| f.crn == request.crn)) {
                (Some(result), _) => Outcome::from_status(result),
                (None, Some(failure)) => Outcome::StagingRejected(failure.message.clone()),
                (None, None) => Outcome::NoResult,
            };

            SectionOutcome {
                crn: request.crn.clone(),
                action: request.action,
                subject: result.and_then(|r| r.subject.clone()),
                course_number: result.and_then(|r| r.course_number.clone()),
                course_title: result.and_then(|r| r.course_title.clone()),
                outcome,
            }
        })
        .collect();

    BatchReport { sections }
}
