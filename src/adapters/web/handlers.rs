//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::constituent::Constituent;
use crate::domain::holding::{Holding, HoldingId, HoldingUpdate, NewHolding};
use crate::domain::service::HoldingsPage;
use crate::domain::valuation::PortfolioValuation;

use super::{AppState, Caller, WebError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_stocks(
    State(state): State<Arc<AppState>>,
    Caller(role): Caller,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<HoldingsPage>, WebError> {
    let Query(params) = params?;
    let page = state.service.list(role, params.skip, params.limit)?;
    Ok(Json(page))
}

pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    id: Result<Path<HoldingId>, PathRejection>,
) -> Result<Json<Holding>, WebError> {
    let Path(id) = id?;
    Ok(Json(state.service.get(id)?))
}

pub async fn create_stock(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewHolding>, JsonRejection>,
) -> Result<(StatusCode, Json<Holding>), WebError> {
    let Json(new) = body?;
    let created = state.service.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    id: Result<Path<HoldingId>, PathRejection>,
    body: Result<Json<HoldingUpdate>, JsonRejection>,
) -> Result<Json<Holding>, WebError> {
    let Path(id) = id?;
    let Json(update) = body?;
    Ok(Json(state.service.update(id, update).await?))
}

pub async fn delete_stock(
    State(state): State<Arc<AppState>>,
    id: Result<Path<HoldingId>, PathRejection>,
) -> Result<Json<Message>, WebError> {
    let Path(id) = id?;
    state.service.delete(id)?;
    Ok(Json(Message {
        message: "Stock deleted successfully".to_string(),
    }))
}

pub async fn wealth(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioValuation>, WebError> {
    let as_of = Local::now().date_naive();
    Ok(Json(state.service.valuation(as_of).await?))
}

pub async fn refresh_wealth(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioValuation>, WebError> {
    let as_of = Local::now().date_naive();
    Ok(Json(state.service.refresh_and_save(as_of).await?))
}

pub async fn get_constituent(
    State(state): State<Arc<AppState>>,
    symbol: Result<Path<String>, PathRejection>,
) -> Result<Json<Constituent>, WebError> {
    let Path(symbol) = symbol?;
    state
        .constituents
        .get_constituent(&symbol.trim().to_uppercase())?
        .map(Json)
        .ok_or_else(|| WebError::not_found("Constituent not found"))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}
