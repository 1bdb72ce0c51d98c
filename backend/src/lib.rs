//! Tier List Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Record store abstraction and implementations
//! - reconcile: Whole-list save as a minimal set of writes
//! - commands: Boundary operations for the surrounding application

use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod repository;
pub mod reconcile;
pub mod commands;

use config::AppConfig;
use domain::DomainResult;
use repository::{MemoryStore, RecordStore, SqliteStore};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    /// Open the configured SQLite database, running migrations
    pub fn open(config: AppConfig) -> DomainResult<Self> {
        let store = SqliteStore::open(&config.db_path)?;
        log::info!("Opened tier list database at {}", config.db_path.display());
        Ok(Self::new(Arc::new(store), config))
    }

    /// Non-persistent state over the in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), AppConfig::default())
    }
}

/// Install the rolling file logger described by `config`
pub fn init_logging(config: &AppConfig) -> Result<rolling_logger::LoggerHandle, rolling_logger::LoggerError> {
    let limits = rolling_logger::LoggerConfig {
        rotation: rolling_logger::rotation_from_name(&config.log_rotation)?,
        keep: config.log_keep,
        ..Default::default()
    };
    let handle = rolling_logger::init_logger_with(&config.log_dir, &config.app_name, limits)?;
    let _ = rolling_logger::info(&format!("{} logging to {}", config.app_name, config.log_dir.display()));
    Ok(handle)
}
