//! Registration window scheduling
//!
//! The portal answers an eligibility query with a list of failure strings.
//! An empty list means the window is open. A failure that embeds an
//! earliest-eligible time (`MM/DD/YYYY HH:MM AM|PM`, portal local time)
//! means we can wait for it:
//!
//! ```text
//! NotChecked ──query──► Open                 (done)
//!                   ├─► Blocked(no time)     (terminal error)
//!                   └─► Blocked(time = T) ──sleep until T, heartbeat running──► NotChecked
//! ```
//!
//! While waiting, a [`Heartbeat`] re-authenticates every five minutes so a
//! wait of several hours does not lose the session. The server clock is
//! authoritative: after every wait the window is queried again, up to a
//! bounded number of checks.

pub mod eligibility;
pub mod heartbeat;
pub mod window;

pub use eligibility::{
    decide, extract_portal_timestamp, parse_portal_timestamp, RegistrationEligibility,
    WindowDecision,
};
pub use heartbeat::Heartbeat;
pub use window::{RegistrationWindowScheduler, WindowOptions};
