//! Dashboard API route handlers.
//!
//! All endpoints except the report downloads return JSON. State is shared
//! via `Arc<DashboardState>`; every session lives behind its own token in
//! the registry.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{
    BuildVsBuyComparison, DashboardView, QuotationComparison, ScoredDecision, SpendReceipt,
};
use crate::report::{MasterReport, SectorReport};
use crate::session::{SessionPhase, SessionRegistry};
use crate::storage::{self, Snapshot};
use crate::sync::{SyncDispatcher, SyncReport};
use crate::types::{DecisionCategory, LedgerError, Outcome, Sector};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub registry: RwLock<SessionRegistry>,
    pub sync: Option<SyncDispatcher>,
    pub backup_dir: PathBuf,
}

impl DashboardState {
    pub fn new(registry: SessionRegistry, sync: Option<SyncDispatcher>, backup_dir: PathBuf) -> Self {
        Self {
            registry: RwLock::new(registry),
            sync,
            backup_dir,
        }
    }

    /// Backup file for an institution: lowercase alphanumerics, everything
    /// else folded to `_`.
    fn backup_path(&self, institution: &str) -> PathBuf {
        let slug: String = institution
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        self.backup_dir.join(format!("{slug}.json"))
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    NotFound(String),
    Unavailable(String),
    Internal(anyhow::Error),
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        ApiError::Ledger(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Ledger(e) => {
                let status = match e {
                    LedgerError::Unauthenticated | LedgerError::InvalidCredential => {
                        StatusCode::UNAUTHORIZED
                    }
                    LedgerError::AlreadyLocked | LedgerError::NotLocked => StatusCode::CONFLICT,
                    LedgerError::InsufficientCapital { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    LedgerError::MalformedSnapshot(_)
                    | LedgerError::InvalidSector(_)
                    | LedgerError::InvalidCategory(_)
                    | LedgerError::InvalidAmount(_)
                    | LedgerError::InvalidRating(_) => StatusCode::BAD_REQUEST,
                };
                (status, e.kind().to_string(), e.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound".into(), msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "Unavailable".into(), msg),
            ApiError::Internal(e) => {
                warn!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal".into(), format!("{e:#}"))
            }
        };
        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub license_key: String,
    pub institution_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: Uuid,
    pub phase: SessionPhase,
}

#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub total_capital: Decimal,
    pub remaining_capital: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub sector: String,
    pub amount: Decimal,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub sector: String,
    pub category: String,
    #[serde(default)]
    pub amount: Decimal,
    pub favorable: bool,
    pub label: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    pub sector: String,
    pub item: String,
    pub market_rate: Decimal,
    pub vendor_rate: Decimal,
    #[serde(default)]
    pub quality_rating: Option<u8>,
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildVsBuyRequest {
    pub sector: String,
    pub item: String,
    pub in_house_cost: Decimal,
    pub market_price: Decimal,
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupResponse {
    pub path: String,
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// POST /api/sessions
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let mut registry = state.registry.write().await;
    let token = registry.login(&req.license_key, &req.institution_name)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse { token, phase: registry.phase(&token) }),
    ))
}

/// GET /api/sessions/:token
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let registry = state.registry.read().await;
    registry.get(&token)?;
    Ok(Json(SessionResponse { token, phase: registry.phase(&token) }))
}

/// DELETE /api/sessions/:token
pub async fn logout(State(state): State<AppState>, Path(token): Path<Uuid>) -> ApiResult<StatusCode> {
    if state.registry.write().await.logout(&token) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(LedgerError::Unauthenticated.into())
    }
}

// ---------------------------------------------------------------------------
// Engine operations
// ---------------------------------------------------------------------------

/// POST /api/sessions/:token/capital
pub async fn lock_capital(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<LockRequest>,
) -> ApiResult<Json<LockResponse>> {
    let mut registry = state.registry.write().await;
    let engine = registry.get_mut(&token)?;
    engine.lock_capital(req.amount)?;
    Ok(Json(LockResponse {
        total_capital: engine.session().total_capital,
        remaining_capital: engine.remaining_capital(),
    }))
}

/// POST /api/sessions/:token/allocations
pub async fn allocate(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<AllocationRequest>,
) -> ApiResult<Json<SpendReceipt>> {
    let sector: Sector = req.sector.parse()?;
    let mut registry = state.registry.write().await;
    let receipt = registry.get_mut(&token)?.allocate_spend(sector, req.amount, &req.label)?;
    Ok(Json(receipt))
}

/// POST /api/sessions/:token/decisions
pub async fn decide(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<Json<ScoredDecision>> {
    let sector: Sector = req.sector.parse()?;
    let category: DecisionCategory = req.category.parse()?;
    let mut registry = state.registry.write().await;
    let result = registry.get_mut(&token)?.apply_scored_decision(
        sector,
        category,
        req.amount,
        Outcome::from_favorable(req.favorable),
        &req.label,
        &req.notes,
    )?;
    Ok(Json(result))
}

/// POST /api/sessions/:token/quotations
pub async fn compare_quotation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<QuotationRequest>,
) -> ApiResult<Json<ScoredDecision>> {
    let sector: Sector = req.sector.parse()?;
    let quotation = QuotationComparison {
        market_rate: req.market_rate,
        vendor_rate: req.vendor_rate,
        quality_rating: req.quality_rating,
    };
    quotation.validate()?;
    let mut registry = state.registry.write().await;
    let result = registry
        .get_mut(&token)?
        .evaluate_quotation(sector, &req.item, &quotation, req.amount)?;
    Ok(Json(result))
}

/// POST /api/sessions/:token/build-vs-buy
pub async fn compare_build_vs_buy(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<BuildVsBuyRequest>,
) -> ApiResult<Json<ScoredDecision>> {
    let sector: Sector = req.sector.parse()?;
    let comparison = BuildVsBuyComparison {
        in_house_cost: req.in_house_cost,
        market_price: req.market_price,
    };
    let mut registry = state.registry.write().await;
    let result = registry
        .get_mut(&token)?
        .evaluate_build_vs_buy(sector, &req.item, &comparison, req.amount)?;
    Ok(Json(result))
}

/// GET /api/sessions/:token/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<DashboardView>> {
    let registry = state.registry.read().await;
    Ok(Json(registry.get(&token)?.compute_dashboard_summary()))
}

// ---------------------------------------------------------------------------
// Snapshots & backups
// ---------------------------------------------------------------------------

/// GET /api/sessions/:token/snapshot
pub async fn export_snapshot(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<Snapshot>> {
    let registry = state.registry.read().await;
    Ok(Json(registry.get(&token)?.export_snapshot()))
}

/// PUT /api/sessions/:token/snapshot: body is the raw snapshot JSON.
pub async fn restore_snapshot(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    body: String,
) -> ApiResult<Json<DashboardView>> {
    let mut registry = state.registry.write().await;
    let engine = registry.get_mut(&token)?;
    engine.restore_snapshot(&body)?;
    Ok(Json(engine.compute_dashboard_summary()))
}

/// POST /api/sessions/:token/backup
pub async fn save_backup(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<BackupResponse>> {
    let snapshot = state.registry.read().await.get(&token)?.export_snapshot();
    std::fs::create_dir_all(&state.backup_dir)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("Failed to create backup dir")))?;

    let path = state.backup_path(&snapshot.institution_name);
    let path_str = path.to_string_lossy().to_string();
    storage::save_snapshot(&snapshot, Some(&path_str))?;
    info!(%token, path = %path_str, "Backup written");
    Ok(Json(BackupResponse { path: path_str }))
}

/// POST /api/sessions/:token/backup/restore
pub async fn restore_backup(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<DashboardView>> {
    let mut registry = state.registry.write().await;
    let engine = registry.get_mut(&token)?;
    let path = state.backup_path(&engine.session().institution_name);
    let path_str = path.to_string_lossy().to_string();

    let snapshot = match storage::load_snapshot(Some(&path_str))? {
        Some(s) => s,
        None => return Err(ApiError::NotFound(format!("No backup at {path_str}"))),
    };
    engine.restore_from(snapshot)?;
    Ok(Json(engine.compute_dashboard_summary()))
}

// ---------------------------------------------------------------------------
// Reports & sync
// ---------------------------------------------------------------------------

fn text_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        body,
    )
        .into_response()
}

/// GET /api/sessions/:token/report
pub async fn master_report(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Response> {
    let registry = state.registry.read().await;
    let report = MasterReport::build(registry.get(&token)?);
    Ok(text_attachment(report.file_name(), report.to_string()))
}

/// GET /api/sessions/:token/reports/:sector
pub async fn sector_report(
    State(state): State<AppState>,
    Path((token, sector)): Path<(Uuid, String)>,
) -> ApiResult<Response> {
    let sector: Sector = sector.parse()?;
    let registry = state.registry.read().await;
    let report = SectorReport::build(registry.get(&token)?, sector);
    Ok(text_attachment(&report.file_name(), report.to_string()))
}

/// POST /api/sessions/:token/sync
pub async fn sync_remote(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> ApiResult<Json<SyncReport>> {
    let dispatcher = state
        .sync
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Remote sync is not configured".into()))?;
    // Release the registry before any network I/O.
    let snapshot = state.registry.read().await.get(&token)?.export_snapshot();
    Ok(Json(dispatcher.sync(&snapshot).await))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
