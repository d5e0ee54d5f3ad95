//! Central repository for timeouts, intervals and portal wire constants
//!
//! Organized by concern so that timing behavior of the scheduler and the
//! watcher can be read in one place.

use std::time::Duration;

/// HTTP client constants
pub mod http {
    use super::Duration;

    /// Timeout for a single portal request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Desktop browser user agent sent with every portal call
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

    pub const ACCEPT_DOCUMENT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

    pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
}

/// Registration window scheduling
pub mod window {
    use super::Duration;

    /// Pause before rechecking when the server-reported time has already passed
    pub const RECHECK_DELAY: Duration = Duration::from_secs(2);

    /// Session keep-alive period during a long eligibility wait
    pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5 * 60);

    /// Upper bound on eligibility queries per window wait
    pub const MAX_ELIGIBILITY_CHECKS: u32 = 150;

    /// Release mode wakes up this long before the configured registration time
    pub const RELEASE_LEAD: Duration = Duration::from_secs(5 * 60);

    /// `MM/DD/YYYY HH:MM AM|PM`
    pub const TIMESTAMP_PATTERN: &str = r"\d{2}/\d{2}/\d{4} \d{2}:\d{2} [APM]{2}";

    /// chrono format matching [`TIMESTAMP_PATTERN`]
    pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M %p";
}

/// Seat watcher
pub mod watch {
    use super::Duration;

    /// Delay between two enrollment-info polls of one section
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
}

/// Webhook notifications
pub mod notify {
    /// Webhook request timeout
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;
}

/// Portal wire vocabulary
pub mod portal {
    /// Marker returned by the auth probe when the session is gone
    pub const NOT_LOGGED_IN_MARKER: &str = "userNotLoggedIn";

    pub const ACTION_REGISTER: &str = "RW";
    pub const ACTION_WAITLIST: &str = "WL";
    pub const ACTION_WEB_DROP: &str = "DW";

    /// Worksheet row key carrying the client-set action code
    pub const SELECTED_ACTION_KEY: &str = "selectedAction";

    /// Worksheet row key carrying the section CRN
    pub const CRN_KEY: &str = "courseReferenceNumber";

    pub const STATUS_REGISTERED: &str = "Registered";
    pub const STATUS_WAITLISTED: &str = "Waitlisted";
    pub const STATUS_DROPPED: [&str; 3] = ["Deleted", "Dropped", "Web Drop"];
    pub const STATUS_ERRORS: &str = "Errors Preventing Registration";
}

/// Defaults for `config/main.toml`
pub mod defaults {
    pub const PORTAL_BASE_URL: &str = "https://reg.oci.fhda.edu/StudentRegistrationSsb";
    pub const IDENTITY_PROVIDER_URL: &str = "https://eis-prod.ec.fhda.edu";
    pub const SP_ALIAS: &str = "registrationssb-prod-sp";
    pub const PORTAL_TIMEZONE: &str = "America/Los_Angeles";
    pub const CONFIG_DIR: &str = "config";
    pub const CONFIG_DIR_ENV: &str = "REGISTRAR_CONFIG_DIR";

    /// Looked up inside the config directory unless `credentials_file` is set
    pub const CREDENTIALS_FILE: &str = "credentials.toml";

    pub const USERNAME_ENV: &str = "REGISTRAR_USERNAME";
    pub const PASSWORD_ENV: &str = "REGISTRAR_PASSWORD";
    pub const WEBHOOK_ENV: &str = "REGISTRAR_WEBHOOK";
}
