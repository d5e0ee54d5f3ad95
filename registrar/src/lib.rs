//! Automated course registration against a Banner SSB portal
//!
//! A run loads its tasks from `config/main.toml` and drives each one
//! independently: Release tasks sleep until shortly before the configured
//! opening, Signup tasks wait for the portal's registration window and
//! submit one batch of drops and adds, and Watch tasks poll seat counts and
//! enroll as soon as a seat or waitlist slot frees up.

pub mod config;
pub mod constants;
pub mod enrollment;
pub mod errors;
pub mod notify;
pub mod portal;
pub mod scheduler;
pub mod session;
pub mod task;
pub mod watcher;

pub use config::{ConfigManager, EngineSettings, Mode, TaskSettings};
pub use errors::{RegistrarError, Result};
pub use task::{Pipeline, Task};
