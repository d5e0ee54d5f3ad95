//! Common test data and portal document builders

use serde_json::{json, Value};

pub const TEST_TERM: &str = "202632";
pub const TEST_USERNAME: &str = "20123456";
pub const TEST_PASSWORD: &str = "correct-horse";
pub const TEST_SP_ALIAS: &str = "registrationssb-test-sp";

pub const SAML_REQUEST_TOKEN: &str = "PHNhbWxwOkF1dGhuUmVxdWVzdA==";
pub const SAML_RESPONSE_TOKEN: &str = "PHNhbWxwOlJlc3BvbnNlIC8+";
pub const SESSION_DATA_KEY: &str = "8d1c6b0e-61a4-4a8f-9d0c-3f4f1e2b7a55";

pub const CRN_CALCULUS: &str = "40123";
pub const CRN_PHYSICS: &str = "40456";
pub const CRN_CHEMISTRY: &str = "40789";
pub const CRN_HISTORY: &str = "41011";

/// Auto-submitting form carrying one hidden field
pub fn hidden_form(action: &str, field: &str, value: &str) -> String {
    format!(
        r#"<html><body onload="document.forms[0].submit()">
<form method="post" action="{action}">
  <input type="hidden" name="{field}" value="{value}"/>
  <noscript><input type="submit" value="Continue"/></noscript>
</form>
</body></html>"#
    )
}

/// Identity provider login page
pub fn login_page(session_data_key: &str) -> String {
    format!(
        r#"<html><body>
<form method="post" action="../commonauth">
  <input type="text" name="username" value=""/>
  <input type="password" name="password" value=""/>
  <input type="hidden" name="sessionDataKey" value="{session_data_key}"/>
</form>
</body></html>"#
    )
}

/// `getEnrollmentInfo` fragment with the four seat counters
pub fn enrollment_info_html(
    enrollment_available: u32,
    waitlist_capacity: u32,
    waitlist_actual: u32,
    waitlist_available: u32,
) -> String {
    format!(
        r#"<section aria-labelledby="enrollmentInfo">
  <span class="status-bold">Enrollment Actual:</span> <span dir="ltr">40</span><br/>
  <span class="status-bold">Enrollment Maximum:</span> <span dir="ltr">40</span><br/>
  <span class="status-bold">Enrollment Seats Available:</span> <span dir="ltr">{enrollment_available}</span><br/>
  <span class="status-bold">Waitlist Capacity:</span> <span dir="ltr">{waitlist_capacity}</span><br/>
  <span class="status-bold">Waitlist Actual:</span> <span dir="ltr">{waitlist_actual}</span><br/>
  <span class="status-bold">Waitlist Seats Available:</span> <span dir="ltr">{waitlist_available}</span>
</section>"#
    )
}

/// Worksheet row as returned by `addRegistrationItem`
pub fn worksheet_row(crn: &str, subject: &str, course_number: &str, title: &str) -> Value {
    json!({
        "courseReferenceNumber": crn,
        "subject": subject,
        "courseNumber": course_number,
        "courseTitle": title,
        "term": TEST_TERM,
        "creditHour": 5.0,
        "registrationStatusDate": null
    })
}

pub fn batch_result(crn: &str, subject: &str, title: &str, status: &str) -> Value {
    json!({
        "courseReferenceNumber": crn,
        "subject": subject,
        "courseNumber": "1A",
        "courseTitle": title,
        "statusDescription": status,
        "crnErrors": []
    })
}

pub fn batch_error(crn: &str, messages: &[&str]) -> Value {
    json!({
        "courseReferenceNumber": crn,
        "statusDescription": "Errors Preventing Registration",
        "crnErrors": messages
            .iter()
            .map(|m| json!({ "message": m }))
            .collect::<Vec<_>>()
    })
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
