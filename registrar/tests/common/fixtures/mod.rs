//! This module provides reusable test utilities:
//! - Mock HTTP servers (portal with its identity provider, webhook)
//! - Task and engine settings builders
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_portal;
pub mod mock_webhook;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_portal::MockPortalServer;
pub use mock_webhook::MockWebhookServer;
pub use test_config::{engine_settings, task_settings, TestConfigBuilder};
pub use test_data::*;
