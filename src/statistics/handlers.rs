use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::statistics::dto::{
    DepartmentCount, EquipmentUsage, InsuranceCostControl, StatisticsOverview, TrendPoint,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statistics/outpatient-trend", get(outpatient_trend))
        .route("/statistics/overview", get(overview))
        .route(
            "/statistics/department-distribution",
            get(department_distribution),
        )
        .route(
            "/statistics/insurance-cost-control",
            get(insurance_cost_control),
        )
        .route("/statistics/equipment-usage", get(equipment_usage))
}

#[instrument(skip(state))]
pub async fn outpatient_trend(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TrendPoint>>>, ApiError> {
    let points = state.statistics.outpatient_trend().await?;
    Ok(ApiResponse::success(points))
}

#[instrument(skip(state))]
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatisticsOverview>>, ApiError> {
    let overview = state.statistics.overview().await?;
    Ok(ApiResponse::success(overview))
}

#[instrument(skip(state))]
pub async fn department_distribution(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DepartmentCount>>>, ApiError> {
    let distribution = state.statistics.department_distribution().await?;
    Ok(ApiResponse::success(distribution))
}

#[instrument(skip(state))]
pub async fn insurance_cost_control(
    State(state): State<AppState>,
) -> Json<ApiResponse<InsuranceCostControl>> {
    ApiResponse::success(state.statistics.insurance_cost_control())
}

#[instrument(skip(state))]
pub async fn equipment_usage(State(state): State<AppState>) -> Json<ApiResponse<Vec<EquipmentUsage>>> {
    ApiResponse::success(state.statistics.equipment_usage())
}
