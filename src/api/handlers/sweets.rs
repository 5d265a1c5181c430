use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::middleware::{AdminOnly, Authenticated};
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery, JSend};
use crate::ledger::{self, SearchCriteria, SweetInput};
use crate::storage::models::Sweet;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SweetRequest {
    pub category: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl From<SweetRequest> for SweetInput {
    fn from(req: SweetRequest) -> Self {
        SweetInput {
            category: req.category,
            name: req.name,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "maxPrice")]
    pub max_price: Option<f64>,
    #[serde(default, rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SweetResponse {
    pub category: String,
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

fn sweet_to_response(sweet: Sweet) -> SweetResponse {
    SweetResponse {
        category: sweet.category,
        id: sweet.id,
        name: sweet.name,
        price: sweet.price,
        quantity: sweet.quantity,
    }
}

fn sweets_to_response(sweets: Vec<Sweet>) -> Vec<SweetResponse> {
    sweets.into_iter().map(sweet_to_response).collect()
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn add_sweet(
    Authenticated(caller): Authenticated,
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SweetRequest>,
) -> Result<(StatusCode, Json<JSend<SweetResponse>>), ApiError> {
    let sweet = ledger::add(&state, req.into()).await?;
    tracing::debug!(id = sweet.id, subject = %caller.subject, "Sweet added via API");
    Ok(JSend::created(sweet_to_response(sweet)))
}

pub async fn list_sweets(
    Authenticated(_): Authenticated,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<SweetResponse>>>, ApiError> {
    let sweets = ledger::list(&state).await?;
    Ok(JSend::success(sweets_to_response(sweets)))
}

pub async fn search_sweets(
    Authenticated(_): Authenticated,
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<JSend<Vec<SweetResponse>>>, ApiError> {
    let criteria = SearchCriteria {
        category: params.category,
        max_price: params.max_price,
        min_price: params.min_price,
        name: params.name,
    };
    let sweets = ledger::search(&state, criteria).await?;
    Ok(JSend::success(sweets_to_response(sweets)))
}

pub async fn get_sweet(
    Authenticated(_): Authenticated,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<SweetResponse>>, ApiError> {
    let sweet = ledger::get(&state, id).await?;
    Ok(JSend::success(sweet_to_response(sweet)))
}

pub async fn update_sweet(
    Authenticated(_): Authenticated,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<SweetRequest>,
) -> Result<Json<JSend<SweetResponse>>, ApiError> {
    let sweet = ledger::update(&state, id, req.into()).await?;
    Ok(JSend::success(sweet_to_response(sweet)))
}

pub async fn delete_sweet(
    AdminOnly(caller): AdminOnly,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    if !ledger::delete(&state, id).await? {
        return Err(ApiError::not_found(format!("Sweet {id} not found")));
    }
    tracing::info!(id, subject = %caller.subject, "Sweet deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purchase_sweet(
    Authenticated(caller): Authenticated,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<SweetResponse>>, ApiError> {
    let sweet = ledger::purchase(&state, id).await?;
    tracing::debug!(id, subject = %caller.subject, remaining = sweet.quantity, "Purchase via API");
    Ok(JSend::success(sweet_to_response(sweet)))
}

pub async fn restock_sweet(
    AdminOnly(caller): AdminOnly,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<RestockRequest>,
) -> Result<Json<JSend<SweetResponse>>, ApiError> {
    let sweet = ledger::restock(&state, id, req.quantity).await?;
    tracing::debug!(id, subject = %caller.subject, quantity = sweet.quantity, "Restock via API");
    Ok(JSend::success(sweet_to_response(sweet)))
}
