// src/main.rs
//! Mock store inspector
//!
//! Lists the records of the configured store (see `EngineConfig::load` for
//! the file and `MOCK_ENGINE_*` environment layers) together with the request
//! line each one was captured from.

use anyhow::Result;
use mock_replay_engine::observability::init_tracing;
use mock_replay_engine::recording::{MockRecord, MockStore, StoreConfig};
use mock_replay_engine::utils::config::EngineConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Mock replay engine v{}", mock_replay_engine::VERSION);

    let store = MockStore::new(StoreConfig::new(config.mocks.work_dir()));
    let stats = store.stats().await?;
    info!(
        "{} mocks ({} bytes) in {:?}",
        stats.records,
        stats.total_size_bytes,
        store.work_dir()
    );

    for path in store.list().await? {
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let record = MockRecord::parse(&raw);
                println!("{}\t{}", path.display(), record.request_line.trim_end());
            }
            Err(e) => warn!("Skipping unreadable mock {:?}: {}", path, e),
        }
    }

    Ok(())
}
