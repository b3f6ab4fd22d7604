use crate::error::PlanError;
use crate::plan::PlanModel;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no plan stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Somewhere a whole plan can be saved and restored. Saves are
/// all-or-nothing; a failed load leaves the caller's plan alone.
pub trait PlanStore {
    fn save_plan(&self, plan: &PlanModel) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<PlanModel>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonPlanStore, load_plan_from_json, save_plan_to_json, save_view_to_csv};
