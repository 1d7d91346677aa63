//! HTTP prediction service for the dashboard.
//!
//! `POST /predict` takes `{"tamano": <size>, "duracion": <months>}` and answers
//! with the predicted monthly defect curve wrapped in the envelope the dashboard
//! expects. `GET /healthz` reports whether a model is loaded.

mod state;

pub use state::ModelHandle;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::{PredictionPayload, PredictionRequest, PredictionResult, ServeConfig};
use crate::error::{AppError, ErrorKind};
use crate::predict::predict;

const MODEL_NAME: &str = "Distribucion de Rayleigh";
const API_VERSION: &str = "1.0";

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: ModelHandle,
}

impl AppState {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[derive(Debug, Serialize)]
struct Meta {
    modelo_utilizado: &'static str,
    version_api: &'static str,
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope {
    status: &'static str,
    meta: Meta,
    data: PredictionResult,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape_parameter: Option<f64>,
}

/// An `AppError` rendered as the error envelope.
struct ApiError(AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorEnvelope {
            status: "error",
            message: self.0.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Predict the monthly defect curve for one project.
async fn predict_curve(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<SuccessEnvelope>, ApiError> {
    let payload: PredictionPayload = serde_json::from_slice(&body).map_err(|e| {
        ApiError(AppError::invalid_request(format!(
            "Request body must be a JSON object with 'tamano' and 'duracion': {e}"
        )))
    })?;
    let request = PredictionRequest::try_from(payload).map_err(|e| {
        warn!(error = %e, "rejected prediction request");
        ApiError(e)
    })?;

    let model = state.model.get_or_load().map_err(|e| {
        error!(error = %e, "predictive model unavailable");
        ApiError(AppError::new(
            e.kind(),
            format!("Predictive model is not available: {}", e.message()),
        ))
    })?;

    let result = predict(&model, &request).map_err(|e| {
        error!(error = %e, "prediction failed");
        ApiError(e)
    })?;

    info!(
        size = request.project_size,
        duration = request.duration_months,
        total = result.total_defects_estimated,
        "prediction served"
    );

    Ok(Json(SuccessEnvelope {
        status: "success",
        meta: Meta {
            modelo_utilizado: MODEL_NAME,
            version_api: API_VERSION,
        },
        data: result,
    }))
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let current = state.model.current();
    let health = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: current.is_some(),
        shape_parameter: current.map(|m| m.shape_parameter),
    };
    (StatusCode::OK, Json(health))
}

/// CORS preflight.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict_curve).options(preflight))
        .route("/healthz", get(healthz))
        .layer(middleware::map_response(add_cors_headers))
        .with_state(state)
}

/// Start the prediction service and run until Ctrl-C.
pub async fn serve(config: ServeConfig) -> Result<(), AppError> {
    let handle = ModelHandle::from_path(config.model_path.clone());
    if let Err(e) = handle.load() {
        warn!(
            path = %config.model_path.display(),
            error = %e,
            "no model loaded at startup; will retry on each request"
        );
    }

    let app = create_router(Arc::new(AppState::new(handle)));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| AppError::io(format!("Failed to bind '{}': {e}", config.bind)))?;
    info!(addr = %config.bind, "starting prediction service");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::io(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down prediction service");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_status_codes() {
        let bad = ApiError(AppError::invalid_request("nope")).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let corrupt = ApiError(AppError::model_corrupt("bad shape")).into_response();
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = ApiError(AppError::io("no file")).into_response();
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cors_headers_are_added() {
        let response = add_cors_headers(StatusCode::OK.into_response()).await;
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
