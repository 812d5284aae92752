// src/session/mod.rs
//! Session management
//!
//! - **Config**: `start()` options and the target reference
//! - **Manager**: one live session per target, start/drain/stop

pub mod config;
pub mod manager;

pub use config::{MockOptions, SessionConfig};
pub use manager::{Session, SessionManager, SessionState};
