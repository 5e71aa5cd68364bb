use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument};
use warp::{
    filters::{body::BodyDeserializeError, cors::Builder},
    http::StatusCode,
    reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType},
    Filter, Rejection, Reply,
};

use crate::formatter::{PayloadBuilder, Upstream};

const MAX_BODY_BYTES: u64 = 64 * 1024;
const SYSTEM_NAME: &str = "Wealth Query Server";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub upstream: Option<Upstream>,
}

/// Runs the HTTP service until the process is stopped.
pub async fn serve(builder: Arc<PayloadBuilder>, addr: SocketAddr) {
    warp::serve(routes(builder).with(cors())).run(addr).await;
}

/// `POST /query` and `GET /health`, with rejections rendered as JSON.
pub fn routes(
    builder: Arc<PayloadBuilder>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let query = warp::path("query")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_builder(builder))
        .and_then(handle_query);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&json!({
                "status": "Backend is running",
                "system": SYSTEM_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        });

    query.or(health).recover(handle_rejection)
}

/// Any origin may call the service from a browser.
pub fn cors() -> Builder {
    warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"])
}

fn with_builder(
    builder: Arc<PayloadBuilder>,
) -> impl Filter<Extract = (Arc<PayloadBuilder>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&builder))
}

#[instrument(skip_all)]
async fn handle_query(
    request: QueryRequest,
    builder: Arc<PayloadBuilder>,
) -> Result<impl Reply, Infallible> {
    info!(query = %request.query, "Processing query");
    let envelope = builder.build(&request.query, request.upstream.as_ref());
    info!(response_type = envelope.kind.as_str(), "Response type");
    Ok(warp::reply::json(&envelope))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"))
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else if err.find::<LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length required".to_string(),
        )
    } else if err.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if err.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json".to_string(),
        )
    } else {
        error!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Query processing failed".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "detail": detail })),
        status,
    ))
}
