pub mod block;
pub(crate) mod block_validation;
pub mod calculations;
pub mod calendar;
pub mod config;
pub mod document;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod import;
pub mod persistence;
pub mod plan;
pub mod timeline;
pub mod view;

pub use block::{Block, BlockDraft, BlockMode, CaregiverSlot, MANDATORY_WEEKS};
pub use calculations::coverage::PlanSummary;
pub use calculations::overlap::{BlockRef, OverlapSegment, compute_overlaps};
pub use calendar::{HolidayEvent, LeaveCalendar};
pub use config::{ConfigError, PlannerConfig};
pub use document::{BlockRecord, CaregiverRecord, PlanDocument};
pub use error::{PlanError, PlanResult};
pub use import::{
    load_holidays_from_csv, load_holidays_from_ics, parse_holidays_csv, parse_ics_holidays,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    JsonPlanStore, PersistenceError, PlanStore, load_plan_from_json, save_plan_to_json,
    save_view_to_csv,
};
pub use plan::{BirthDatePolicy, PlanModel};
pub use timeline::{LeaveInterval, Timeline};
pub use view::{Lane, TimelineRow, ViewData, render_view, render_view_with};
