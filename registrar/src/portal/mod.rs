//! Portal communication module
//!
//! Everything that talks HTTP to the registration portal or its identity
//! provider goes through [`PortalClient`]. Each task builds its own client,
//! so cookies (and therefore the authenticated session) are never shared
//! between tasks.
//!
//! # Layout
//!
//! ```text
//! PortalEndpoints ──► PortalClient ──► raw text
//!                                        │
//!                     extract (HTML) ◄───┴───► serde_json (JSON)
//! ```

pub mod client;
pub mod endpoints;
pub mod extract;

pub use client::{decode_json, HeaderProfile, PortalClient};
pub use endpoints::PortalEndpoints;
