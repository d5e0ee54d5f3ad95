//! Mock registration portal for testing the client-side engine
//!
//! One wiremock server plays both the SSB portal (at the root) and its
//! identity provider (under `/idp`).

use registrar::portal::{PortalClient, PortalEndpoints};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

use super::test_data::*;

pub const AUTH_PROBE_PATH: &str = "/login/authAjax";
pub const REGISTER_POST_SIGN_IN_PATH: &str = "/ssb/registration/registerPostSignIn";
pub const IDP_SSO_PATH: &str = "/idp/samlsso";
pub const IDP_COMMONAUTH_PATH: &str = "/idp/commonauth";
pub const TERM_SEARCH_PATH: &str = "/ssb/term/search";
pub const CLASS_REGISTRATION_PATH: &str = "/ssb/classRegistration/classRegistration";
pub const ADD_ITEM_PATH: &str = "/ssb/classRegistration/addRegistrationItem";
pub const SECTION_DETAILS_PATH: &str = "/ssb/classRegistration/getSectionDetailsFromCRN";
pub const BATCH_PATH: &str = "/ssb/classRegistration/submitRegistration/batch";
pub const ENROLLMENT_INFO_PATH: &str = "/ssb/searchResults/getEnrollmentInfo";

/// Mock portal server that simulates SSB and its identity provider
pub struct MockPortalServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockPortalServer {
    /// Create a new mock portal server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn endpoints(&self) -> PortalEndpoints {
        PortalEndpoints::new(
            &self.base_url,
            &format!("{}/idp", self.base_url),
            TEST_SP_ALIAS,
        )
    }

    pub fn client(&self) -> PortalClient {
        PortalClient::new(self.endpoints()).expect("portal client")
    }

    pub fn sp_assertion_path() -> String {
        format!("/saml/SSO/alias/{}", TEST_SP_ALIAS)
    }

    /// Auth probe reports a live session
    pub async fn mock_authenticated(&self) {
        Mock::given(method("GET"))
            .and(path(AUTH_PROBE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "set": true })))
            .mount(&self.server)
            .await;
    }

    /// Auth probe reports a lost session for the first `times` calls.
    /// Mount before [`Self::mock_authenticated`] so it takes precedence.
    pub async fn mock_not_logged_in(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path(AUTH_PROBE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("userNotLoggedIn"))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Auth probe answers 401 for the first `times` calls
    pub async fn mock_unauthorized(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path(AUTH_PROBE_PATH))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_probe_failure(&self, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(AUTH_PROBE_PATH))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// Three-step SAML handshake, each step expected exactly `expected` times
    pub async fn mock_saml_handshake(&self, expected: u64) {
        self.mock_register_post_sign_in(expected).await;

        Mock::given(method("POST"))
            .and(path(IDP_SSO_PATH))
            .and(body_string_contains("SAMLRequest="))
            .respond_with(ResponseTemplate::new(200).set_body_string(hidden_form(
                "/saml/SSO",
                "SAMLResponse",
                SAML_RESPONSE_TOKEN,
            )))
            .expect(expected)
            .mount(&self.server)
            .await;

        self.mock_sp_assertion(expected).await;
    }

    /// Handshake where the identity provider shows its login form first
    pub async fn mock_saml_handshake_with_login(&self) {
        self.mock_register_post_sign_in(1).await;

        Mock::given(method("POST"))
            .and(path(IDP_SSO_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(login_page(SESSION_DATA_KEY)),
            )
            .expect(1)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(IDP_COMMONAUTH_PATH))
            .and(body_string_contains(format!("username={}", TEST_USERNAME)))
            .and(body_string_contains(format!("sessionDataKey={}", SESSION_DATA_KEY)))
            .respond_with(ResponseTemplate::new(200).set_body_string(hidden_form(
                "/saml/SSO",
                "SAMLResponse",
                SAML_RESPONSE_TOKEN,
            )))
            .expect(1)
            .mount(&self.server)
            .await;

        self.mock_sp_assertion(1).await;
    }

    async fn mock_register_post_sign_in(&self, expected: u64) {
        Mock::given(method("GET"))
            .and(path(REGISTER_POST_SIGN_IN_PATH))
            .and(query_param("mode", "registration"))
            .respond_with(ResponseTemplate::new(200).set_body_string(hidden_form(
                "/idp/samlsso",
                "SAMLRequest",
                SAML_REQUEST_TOKEN,
            )))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    async fn mock_sp_assertion(&self, expected: u64) {
        Mock::given(method("POST"))
            .and(path(Self::sp_assertion_path()))
            .and(body_string_contains("SAMLResponse="))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// SAML request page without the token
    pub async fn mock_missing_saml_request(&self) {
        Mock::given(method("GET"))
            .and(path(REGISTER_POST_SIGN_IN_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>Maintenance</body></html>"),
            )
            .mount(&self.server)
            .await;
    }

    /// Eligibility answer for every call
    pub async fn mock_term_search(&self, failures: &[&str]) {
        Mock::given(method("POST"))
            .and(path(TERM_SEARCH_PATH))
            .and(query_param("mode", "registration"))
            .and(body_string_contains(format!("term={}", TEST_TERM)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "studentEligFailures": failures })),
            )
            .mount(&self.server)
            .await;
    }

    /// Eligibility answer for the first `times` calls only
    pub async fn mock_term_search_times(&self, failures: &[&str], times: u64) {
        Mock::given(method("POST"))
            .and(path(TERM_SEARCH_PATH))
            .and(query_param("mode", "registration"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "studentEligFailures": failures })),
            )
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_class_registration(&self) {
        Mock::given(method("HEAD"))
            .and(path(CLASS_REGISTRATION_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_section_details(&self, crn: &str, display: &str) {
        Mock::given(method("GET"))
            .and(path(SECTION_DETAILS_PATH))
            .and(query_param("courseReferenceNumber", crn))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "olr": false,
                "responseDisplay": display
            })))
            .mount(&self.server)
            .await;
    }

    /// `addRegistrationItem` accepts the CRN and returns its worksheet row
    pub async fn mock_add_item(&self, crn: &str, row: Value) {
        Mock::given(method("GET"))
            .and(path(ADD_ITEM_PATH))
            .and(query_param("courseReferenceNumber", crn))
            .and(query_param("term", TEST_TERM))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "model": row
            })))
            .mount(&self.server)
            .await;
    }

    /// `addRegistrationItem` refuses the CRN
    pub async fn mock_add_item_rejected(&self, crn: &str, message: &str) {
        Mock::given(method("GET"))
            .and(path(ADD_ITEM_PATH))
            .and(query_param("courseReferenceNumber", crn))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": false,
                "Message": message
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_batch(&self, results: Vec<Value>) {
        Mock::given(method("POST"))
            .and(path(BATCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "update": results }
            })))
            .mount(&self.server)
            .await;
    }

    /// Seat counters for one CRN; `times` limits how often this answer is given
    pub async fn mock_enrollment_info(&self, crn: &str, html: String, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(path(ENROLLMENT_INFO_PATH))
            .and(body_string_contains(format!("courseReferenceNumber={}", crn)))
            .respond_with(ResponseTemplate::new(200).set_body_string(html));

        match times {
            Some(times) => mock.up_to_n_times(times).mount(&self.server).await,
            None => mock.mount(&self.server).await,
        }
    }

    pub async fn mock_enrollment_info_failure(&self, crn: &str, status_code: u16) {
        Mock::given(method("POST"))
            .and(path(ENROLLMENT_INFO_PATH))
            .and(body_string_contains(format!("courseReferenceNumber={}", crn)))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// Requests received on one path, in arrival order
    pub async fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == request_path)
            .collect()
    }

    /// JSON body of the last batch submission
    pub async fn last_batch_body(&self) -> Option<Value> {
        self.requests_to(BATCH_PATH)
            .await
            .last()
            .and_then(|request| request.body_json::<Value>().ok())
    }
}
