use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use shared::*;
use uuid::Uuid;
use crate::error::StockError;
use crate::service::StockService;

#[derive(Clone)]
pub struct AppState {
    pub service: StockService,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/stock/reserve", post(reserve_stock))
        .route("/stock/:product_id", get(get_stock))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn reject<T>(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::failed(status.as_u16(), message)))
}

fn error_status(error: &StockError) -> StatusCode {
    match error {
        StockError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StockError::NotFound(_) => StatusCode::NOT_FOUND,
        StockError::AlreadyTracked(_) => StatusCode::CONFLICT,
        StockError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn reject_error<T>(error: StockError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = error_status(&error);
    if status.is_server_error() {
        tracing::error!("Stock request failed: {}", error);
    }
    reject(status, error.to_string())
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<StockQuantity> {
    let product_id = Uuid::parse_str(&product_id)
        .map_err(|_| reject(StatusCode::BAD_REQUEST, format!("malformed product id: {}", product_id)))?;

    let quantity = state
        .service
        .get_product_stock(product_id)
        .await
        .map_err(reject_error)?;

    Ok(Json(ApiResponse::success(
        "success",
        Some(StockQuantity { product_id, quantity }),
    )))
}

pub async fn reserve_stock(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> ApiResult<()> {
    if request.quantity <= 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "quantity must be positive"));
    }

    let reserved = state
        .service
        .reserve_product(request.product_id, request.quantity)
        .await
        .map_err(reject_error)?;

    if reserved {
        Ok(Json(ApiResponse::success("reserved", None)))
    } else {
        Err(reject(StatusCode::CONFLICT, "insufficient or untracked stock"))
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}
