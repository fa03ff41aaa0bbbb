
use crate::store::{ConfigOutcome, ConfigSubmission};
use crate::traits::{CredentialStore, NetworkRecord, NetworkScanner, UiAssetProvider};
use crate::Error;
use axum::body::Body;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Form, Json, Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

// The shared state for our web server.
// By using `Arc<dyn Trait>`, we can inject any implementation
// that satisfies the trait bounds.
pub type WebServerState = State<Arc<AppState>>;

pub struct AppState {
    pub scanner: Arc<dyn NetworkScanner>,
    pub store: Arc<dyn CredentialStore>,
    pub frontend: Arc<dyn UiAssetProvider>,
}

/// Builds the portal's routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/networks", get(api_list_networks))
        .route("/config", post(api_submit_config))
        .route("/cleareeprom", any(api_clear_settings))
        .fallback(serve_static_asset)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the portal on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> crate::Result<()> {
    axum::serve(listener, router(state).into_make_service())
        .await
        .map_err(|e| Error::WebServer(e.into()))
}

/// Starts the Axum web server.
///
/// # Returns
/// A `JoinHandle` for the server task.
pub fn start_web_server(
    bind_addr: SocketAddr,
    state: Arc<AppState>,
) -> JoinHandle<crate::Result<()>> {
    tokio::spawn(async move {
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("🌐 Web server listening on {}", bind_addr);
        serve(listener, state).await
    })
}

// --- Route Handlers ---

/// Runs one scan and returns it in the firmware's JSON shape.
async fn api_list_networks(State(state): WebServerState) -> Response {
    match state.scanner.scan().await {
        Ok(networks) => {
            tracing::debug!("Handling /networks: {} networks", networks.len());
            let records: Vec<NetworkRecord> = networks.into_iter().map(NetworkRecord::from).collect();
            (StatusCode::OK, Json(records)).into_response()
        }
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Applies the settings form.
///
/// 200 when station credentials were stored, 404 when they were missing,
/// 400 for a field that does not fit. A valid device name is kept in every case.
async fn api_submit_config(
    State(state): WebServerState,
    Form(form): Form<ConfigSubmission>,
) -> Response {
    let current = match state.store.load().await {
        Ok(settings) => settings,
        Err(e) => return internal_error(e),
    };

    let (status, body, settings) = match form.apply(current) {
        ConfigOutcome::Saved(settings) => (
            StatusCode::OK,
            serde_json::json!({ "Success": "saved to eeprom... reset to boot into new wifi" }),
            settings,
        ),
        ConfigOutcome::Incomplete(settings) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "Error": "404 not found" }),
            settings,
        ),
        // 名称已经写入 settings，仍需保存
        ConfigOutcome::Rejected { settings, error } => {
            tracing::warn!("Rejected /config submission: {}", error);
            (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "Error": error.to_string() }),
                settings,
            )
        }
    };

    if let Err(e) = state.store.save(settings).await {
        return internal_error(e);
    }
    if status == StatusCode::OK {
        tracing::info!(ssid = %form.ssid, "Station credentials saved, reboot to apply");
    }
    (status, Json(body)).into_response()
}

async fn api_clear_settings(State(state): WebServerState) -> Response {
    match state.store.clear().await {
        Ok(()) => {
            tracing::info!("Stored settings cleared");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                "EEPROM is cleared\r\n",
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// 处理静态资产的 Fallback 处理器
///
/// Answers any method. `/` maps to `index.html`. A `download` query
/// parameter forces `application/octet-stream`.
async fn serve_static_asset(
    State(state): WebServerState,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    let mut path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        path = "index.html";
    }

    match state.frontend.get_asset(path).await {
        Ok((data, mime)) => {
            let mime = if params.contains_key("download") {
                "application/octet-stream".to_string()
            } else {
                mime
            };
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime)
                .body(Body::from(data))
                .unwrap_or_else(|_| {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
                })
        }
        Err(e) => {
            tracing::debug!("Failed to get asset: {} (Error: {})", path, e);
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain")],
                "File Not Found",
            )
                .into_response()
        }
    }
}

fn internal_error(e: Error) -> Response {
    tracing::error!("Settings store failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "Error": e.to_string() })),
    )
        .into_response()
}
