use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod model;
pub mod service;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
