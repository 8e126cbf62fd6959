use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::reports::{InventoryUsage, SalesByItem, XReport, ZReport};

use super::AppState;
use crate::auth::ManagerSession;
use crate::error::{PosError, PosResult};
use crate::handlers::ReportHandler;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// Business day named by `?date=YYYY-MM-DD`.
fn report_day(query: Result<Query<DayQuery>, QueryRejection>) -> PosResult<NaiveDate> {
    let Query(query) = query.map_err(|e| PosError::validation(e.body_text()))?;
    let raw = query
        .date
        .ok_or_else(|| PosError::validation("Date parameter is required"))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PosError::validation("Date must be formatted as YYYY-MM-DD"))
}

pub async fn sales_by_item(
    State(state): State<AppState>,
    _manager: ManagerSession,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> PosResult<Json<Vec<SalesByItem>>> {
    let day = report_day(query)?;
    let handler = ReportHandler::new(state.pool, state.timezone);
    Ok(Json(handler.sales_by_item(day).await?))
}

pub async fn inventory_usage(
    State(state): State<AppState>,
    _manager: ManagerSession,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> PosResult<Json<Vec<InventoryUsage>>> {
    let day = report_day(query)?;
    let handler = ReportHandler::new(state.pool, state.timezone);
    Ok(Json(handler.inventory_usage(day).await?))
}

pub async fn x_report(
    State(state): State<AppState>,
    _manager: ManagerSession,
) -> PosResult<Json<XReport>> {
    let handler = ReportHandler::new(state.pool, state.timezone);
    Ok(Json(handler.x_report().await?))
}

pub async fn z_report(
    State(state): State<AppState>,
    ManagerSession(manager): ManagerSession,
) -> PosResult<Json<ZReport>> {
    let handler = ReportHandler::new(state.pool, state.timezone);
    let report = handler.z_report().await?;
    tracing::info!(session = %manager.jti, "Manager closed {}", report.date);
    Ok(Json(report))
}
