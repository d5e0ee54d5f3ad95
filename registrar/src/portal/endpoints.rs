use crate::constants::defaults;

/// Base URLs of the portal and its identity provider
#[derive(Debug, Clone)]
pub struct PortalEndpoints {
    pub base_url: String,
    pub identity_provider_url: String,
    pub sp_alias: String,
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self::new(
            defaults::PORTAL_BASE_URL,
            defaults::IDENTITY_PROVIDER_URL,
            defaults::SP_ALIAS,
        )
    }
}

impl PortalEndpoints {
    pub fn new(base_url: &str, identity_provider_url: &str, sp_alias: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            identity_provider_url: identity_provider_url.trim_end_matches('/').to_string(),
            sp_alias: sp_alias.to_string(),
        }
    }

    fn portal(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn auth_probe(&self) -> String {
        self.portal("/login/authAjax")
    }

    /// Takes `mode=registration` as query
    pub fn register_post_sign_in(&self) -> String {
        self.portal("/ssb/registration/registerPostSignIn")
    }

    pub fn idp_sso(&self) -> String {
        format!("{}/samlsso", self.identity_provider_url)
    }

    pub fn idp_commonauth(&self) -> String {
        format!("{}/commonauth", self.identity_provider_url)
    }

    pub fn sp_assertion(&self) -> String {
        self.portal(&format!("/saml/SSO/alias/{}", self.sp_alias))
    }

    pub fn section_details(&self) -> String {
        self.portal("/ssb/classRegistration/getSectionDetailsFromCRN")
    }

    /// Takes `mode=registration` as query
    pub fn term_search(&self) -> String {
        self.portal("/ssb/term/search")
    }

    pub fn class_registration(&self) -> String {
        self.portal("/ssb/classRegistration/classRegistration")
    }

    pub fn add_registration_item(&self) -> String {
        self.portal("/ssb/classRegistration/addRegistrationItem")
    }

    pub fn submit_batch(&self) -> String {
        self.portal("/ssb/classRegistration/submitRegistration/batch")
    }

    pub fn enrollment_info(&self) -> String {
        self.portal("/ssb/searchResults/getEnrollmentInfo")
    }
}
