use axum::{
	Json, Router,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use paper_service::{
	Error as ServiceError, ListRequest, PaperSimilarityRequest, SearchResponse,
	UserTextSimilarityRequest,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/v1/papers", get(list_papers))
		.route("/api/v1/papers/vectorsearch/paper", post(find_similar_to_paper))
		.route("/api/v1/papers/vectorsearch/text", post(find_similar_to_text))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_papers(
	State(state): State<AppState>,
	query: Result<Query<ListRequest>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Query(query) = query?;
	let response = state.service.list_papers(query).await?;

	Ok(Json(response))
}

async fn find_similar_to_paper(
	State(state): State<AppState>,
	payload: Result<Json<PaperSimilarityRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.find_similar_to_paper(payload).await?;

	Ok(Json(response))
}

async fn find_similar_to_text(
	State(state): State<AppState>,
	payload: Result<Json<UserTextSimilarityRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.find_similar_to_text(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Embedding provider failed.");

				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
			ServiceError::Qdrant { message } => {
				tracing::error!(error = %message, "Qdrant request failed.");

				Self::new(StatusCode::BAD_GATEWAY, "QDRANT_ERROR", message)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
