use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::RequestId;
use crate::models::{RestaurantSearchRequest, RestaurantSearchResponse};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Search restaurants across the providers selected by `mode`
///
/// Returns 200 with up to five restaurants, possibly none when every provider
/// failed. Invalid query or location is a 400.
pub async fn search_restaurants(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RestaurantSearchRequest>,
) -> AppResult<Json<RestaurantSearchResponse>> {
    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        location = %request.location,
        mode = u8::from(request.mode),
        "Restaurant search requested"
    );

    let restaurants = state
        .search
        .search(&request.query, &request.location, request.mode)
        .await?;

    tracing::info!(
        request_id = %request_id,
        results = restaurants.len(),
        "Restaurant search responded"
    );

    Ok(Json(RestaurantSearchResponse { restaurants }))
}
