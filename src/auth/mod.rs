use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod password;
pub mod service;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
