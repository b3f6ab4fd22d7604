use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    BirthDatePolicy, BlockDraft, BlockMode, BlockRecord, CaregiverRecord, CaregiverSlot,
    HolidayEvent, OverlapSegment, PlanDocument, PlanError, PlanModel, ViewData, render_view,
};

/// One planning session shared by every request.
#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<PlanModel>>,
}

impl AppState {
    pub fn new(plan: PlanModel) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
        }
    }

    fn plan(&self) -> Arc<RwLock<PlanModel>> {
        self.plan.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        match value {
            PlanError::InvalidIndex { .. } => ApiError::NotFound(value.to_string()),
            PlanError::ImmutableBlock(_) | PlanError::MandatoryBlockConflict { .. } => {
                ApiError::Conflict(value.to_string())
            }
            PlanError::Validation(_) | PlanError::Deserialization(_) => {
                ApiError::Invalid(value.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct BirthDatePayload {
    birth_date: NaiveDate,
    #[serde(default)]
    policy: BirthDatePolicy,
}

#[derive(Debug, Default, Deserialize)]
struct AddBlockPayload {
    /// Defaults to the last block.
    after_index: Option<usize>,
    weeks: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BlockPayload {
    label: String,
    mode: BlockMode,
    start_date: NaiveDate,
    #[serde(default)]
    duration_weeks: Option<f64>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    is_mandatory: bool,
}

impl BlockPayload {
    fn into_draft(self, caregiver: CaregiverSlot) -> BlockDraft {
        BlockDraft {
            label: self.label,
            mode: self.mode,
            start_date: self.start_date,
            duration_weeks: self.duration_weeks,
            end_date: self.end_date,
            is_mandatory: self.is_mandatory,
            caregiver,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RenamePayload {
    name: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan).put(replace_plan))
        .route("/plan/birth_date", put(set_birth_date))
        .route("/caregivers/:slot", get(get_caregiver))
        .route("/caregivers/:slot/name", put(rename_caregiver))
        .route("/caregivers/:slot/blocks", post(add_block))
        .route(
            "/caregivers/:slot/blocks/:index",
            put(update_block).delete(delete_block),
        )
        .route("/holidays", get(list_holidays).post(import_holidays))
        .route("/overlaps", get(list_overlaps))
        .route("/view", get(get_view))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: PlanModel) -> std::io::Result<()> {
    let state = AppState::new(plan);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn caregiver_record(plan: &PlanModel, slot: CaregiverSlot) -> CaregiverRecord {
    let timeline = plan.timeline(slot);
    CaregiverRecord {
        name: timeline.caregiver_name().to_string(),
        blocks: timeline.blocks().iter().map(BlockRecord::from).collect(),
    }
}

async fn get_plan(State(state): State<AppState>) -> Json<PlanDocument> {
    let plan = state.plan();
    let document = plan.read().to_serializable();
    Json(document)
}

async fn replace_plan(
    State(state): State<AppState>,
    Json(document): Json<PlanDocument>,
) -> Result<Json<PlanDocument>, ApiError> {
    let replacement = PlanModel::from_serializable(document)?;
    let plan = state.plan();
    let document = {
        let mut guard = plan.write();
        *guard = replacement;
        guard.to_serializable()
    };
    Ok(Json(document))
}

async fn set_birth_date(
    State(state): State<AppState>,
    Json(payload): Json<BirthDatePayload>,
) -> Result<Json<PlanDocument>, ApiError> {
    let plan = state.plan();
    let document = {
        let mut guard = plan.write();
        guard.set_birth_date_with(payload.birth_date, payload.policy)?;
        guard.to_serializable()
    };
    Ok(Json(document))
}

async fn get_caregiver(
    State(state): State<AppState>,
    Path(slot): Path<CaregiverSlot>,
) -> Json<CaregiverRecord> {
    let plan = state.plan();
    let record = caregiver_record(&plan.read(), slot);
    Json(record)
}

async fn rename_caregiver(
    State(state): State<AppState>,
    Path(slot): Path<CaregiverSlot>,
    Json(payload): Json<RenamePayload>,
) -> Result<Json<CaregiverRecord>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Invalid("caregiver name must not be empty".into()));
    }
    let plan = state.plan();
    let record = {
        let mut guard = plan.write();
        guard.rename_caregiver(slot, name);
        caregiver_record(&guard, slot)
    };
    Ok(Json(record))
}

async fn add_block(
    State(state): State<AppState>,
    Path(slot): Path<CaregiverSlot>,
    payload: Option<Json<AddBlockPayload>>,
) -> Result<(StatusCode, Json<CaregiverRecord>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let plan = state.plan();
    let record = {
        let mut guard = plan.write();
        let after_index = payload
            .after_index
            .unwrap_or_else(|| guard.timeline(slot).len().saturating_sub(1));
        match payload.weeks {
            Some(weeks) => guard.add_block_with_weeks(slot, after_index, weeks)?,
            None => guard.add_block(slot, after_index)?,
        }
        caregiver_record(&guard, slot)
    };
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_block(
    State(state): State<AppState>,
    Path((slot, index)): Path<(CaregiverSlot, usize)>,
    Json(payload): Json<BlockPayload>,
) -> Result<Json<CaregiverRecord>, ApiError> {
    let plan = state.plan();
    let record = {
        let mut guard = plan.write();
        guard.update_block(slot, index, payload.into_draft(slot))?;
        caregiver_record(&guard, slot)
    };
    Ok(Json(record))
}

async fn delete_block(
    State(state): State<AppState>,
    Path((slot, index)): Path<(CaregiverSlot, usize)>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    plan.write().remove_block(slot, index)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_holidays(State(state): State<AppState>) -> Json<Vec<HolidayEvent>> {
    let plan = state.plan();
    let holidays = plan.read().holidays().to_vec();
    Json(holidays)
}

async fn import_holidays(
    State(state): State<AppState>,
    Json(events): Json<Vec<HolidayEvent>>,
) -> Result<(StatusCode, Json<Vec<HolidayEvent>>), ApiError> {
    let plan = state.plan();
    let holidays = {
        let mut guard = plan.write();
        guard.import_holidays(events)?;
        guard.holidays().to_vec()
    };
    Ok((StatusCode::CREATED, Json(holidays)))
}

async fn list_overlaps(State(state): State<AppState>) -> Json<Vec<OverlapSegment>> {
    let plan = state.plan();
    let overlaps = plan.read().overlaps();
    Json(overlaps)
}

async fn get_view(State(state): State<AppState>) -> Json<ViewData> {
    let plan = state.plan();
    let view = render_view(&plan.read());
    Json(view)
}
