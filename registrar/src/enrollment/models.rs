use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::portal::{
    ACTION_REGISTER, ACTION_WAITLIST, ACTION_WEB_DROP, CRN_KEY, SELECTED_ACTION_KEY,
};

/// Client-set worksheet action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCode {
    Register,
    Waitlist,
    WebDrop,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::Register => ACTION_REGISTER,
            ActionCode::Waitlist => ACTION_WAITLIST,
            ActionCode::WebDrop => ACTION_WEB_DROP,
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            ACTION_REGISTER => Some(ActionCode::Register),
            ACTION_WAITLIST => Some(ActionCode::Waitlist),
            ACTION_WEB_DROP => Some(ActionCode::WebDrop),
            _ => None,
        }
    }

    /// Action used when adding a course
    pub fn for_add(waitlist: bool) -> Self {
        if waitlist {
            ActionCode::Waitlist
        } else {
            ActionCode::Register
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worksheet row returned by the portal, tagged with an action code.
///
/// The row is kept opaque: it is sent back verbatim in the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StagedOperation(Map<String, Value>);

impl StagedOperation {
    /// `None` unless `model` is a JSON object
    pub fn new(model: Value, action: ActionCode) -> Option<Self> {
        let Value::Object(mut row) = model else {
            return None;
        };
        row.insert(
            SELECTED_ACTION_KEY.to_string(),
            Value::String(action.as_str().to_string()),
        );
        Some(Self(row))
    }

    pub fn crn(&self) -> Option<&str> {
        self.0.get(CRN_KEY).and_then(Value::as_str)
    }

    pub fn action(&self) -> Option<ActionCode> {
        self.0
            .get(SELECTED_ACTION_KEY)
            .and_then(Value::as_str)
            .and_then(ActionCode::parse)
    }
}

/// `addRegistrationItem` response
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemResponse {
    #[serde(default, alias = "Success")]
    pub success: bool,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
    #[serde(default, alias = "Model")]
    pub model: Option<Value>,
}

/// `getSectionDetailsFromCRN` response
#[derive(Debug, Clone, Deserialize)]
pub struct SectionDetails {
    #[serde(default, alias = "Olr")]
    pub olr: bool,
    #[serde(default, rename = "responseDisplay", alias = "ResponseDisplay")]
    pub response_display: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub update: &'a [StagedOperation],
    #[serde(rename = "uniqueSessionId")]
    pub unique_session_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(alias = "Data")]
    pub data: BatchData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchData {
    #[serde(default, alias = "Update")]
    pub update: Vec<BatchResult>,
}

/// Per-section error entry; the portal sends objects, older builds plain strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CrnError {
    Detailed {
        #[serde(alias = "Message")]
        message: String,
    },
    Plain(String),
}

impl CrnError {
    pub fn message(&self) -> &str {
        match self {
            CrnError::Detailed { message } => message,
            CrnError::Plain(message) => message,
        }
    }
}

/// One submitted section as reported back by the portal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    #[serde(alias = "CourseReferenceNumber", alias = "CRN", alias = "crn")]
    pub course_reference_number: String,
    #[serde(default, alias = "Subject")]
    pub subject: Option<String>,
    #[serde(default, alias = "CourseNumber")]
    pub course_number: Option<String>,
    #[serde(default, alias = "CourseTitle")]
    pub course_title: Option<String>,
    #[serde(default, alias = "StatusDescription")]
    pub status_description: Option<String>,
    #[serde(default, alias = "CrnErrors")]
    pub crn_errors: Option<Vec<CrnError>>,
}

impl BatchResult {
    pub fn status(&self) -> &str {
        self.status_description.as_deref().unwrap_or_default()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.crn_errors
            .iter()
            .flatten()
            .map(|e| e.message().to_string())
            .collect()
    }
}
