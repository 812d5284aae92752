// src/recording/mod.rs
//! Mock recording and storage
//!
//! - **Fingerprint**: normalized request → stable identifier
//! - **Record**: stored text format (request line, blank line, body)
//! - **Store**: one file per fingerprint under `<root>/<namespace>`
//! - **Tracker**: in-flight live exchanges and the drain protocol
//!
//! # Layout
//!
//! ```text
//! <root_dir>/<namespace>/<host-and-path>/<method>-<hash8>
//! ```

pub mod fingerprint;
pub mod record;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use fingerprint::{fingerprint, Fingerprint, RequestDescriptor};
pub use record::MockRecord;
pub use store::{MockStore, StoreConfig, StoreStats, WriteOutcome, WriteStatus};
pub use tracker::{PendingTracker, Settlement, TrackerSnapshot};
