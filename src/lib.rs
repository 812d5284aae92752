// src/lib.rs
//! Record/replay mock engine for browser-driven UI tests
//!
//! The first run against a real backend records every matched HTTP exchange
//! to a file-backed mock store; later runs replay the stored responses
//! without touching the network.
//!
//! # Architecture
//!
//! - **interception**: URL policy, host traits, request/response hooks
//! - **recording**: fingerprinting, mock store, pending-request tracker
//! - **session**: per-target lifecycle with start/drain/stop
//! - **observability**: tracing setup and counters
//! - **utils**: configuration and errors
//!
//! ```text
//! host events → Session hooks → Policy
//!                                  ├─ Bypass      → continue
//!                                  ├─ SyntheticOk → respond 200 "OK"
//!                                  └─ Mockable    → Store.read ─ hit  → respond
//!                                                              └ miss → Tracker.on_dispatch → continue
//! live response → Store.write → Tracker.on_settled → drain waiters
//! ```

pub mod interception;
pub mod observability;
pub mod recording;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use interception::{
    Classification, InterceptedRequest, InterceptedResponse, InterceptionTarget, PolicyConfig,
    RespondSpec, TargetId, UrlList,
};
pub use recording::{Fingerprint, MockStore, PendingTracker, RequestDescriptor};
pub use session::{MockOptions, Session, SessionConfig, SessionManager, SessionState};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
