use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::patients::model::PatientVisit;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients/list", get(list_patients))
        .route("/patients/:id", get(get_patient))
        .route("/patients/:id/visits", get(get_patient_visits))
}

#[instrument(skip(state))]
pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PatientVisit>>>, ApiError> {
    let patients = state.patients.list().await?;
    Ok(ApiResponse::success(patients))
}

#[instrument(skip(state))]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PatientVisit>>, ApiError> {
    let patient = state.patients.get(id).await?;
    Ok(ApiResponse::success(patient))
}

#[instrument(skip(state))]
pub async fn get_patient_visits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<PatientVisit>>>, ApiError> {
    let visits = state.patients.visits(id).await?;
    Ok(ApiResponse::success(visits))
}
