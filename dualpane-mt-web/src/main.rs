use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use dualpane_mt::{
    Config, Credentials, EditorSession, Language, MachineTranslator,
    MemoryKeyStore, MtError, MtResult, Service, SessionView,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// Target language tag: `ja` or `en`
    pub target: String,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated: String,
    pub source: String,
}

#[derive(Serialize, Deserialize)]
pub struct PaneEdit {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct KeyUpdate {
    /// Blank removes the stored key
    pub key: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub session: EditorSession,
    /// Keys entered through the API; consulted before environment variables
    pub keys: Arc<MemoryKeyStore>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(config: &Config, credentials: Credentials) -> MtResult<Self> {
        let keys = Arc::new(MemoryKeyStore::new());
        let credentials = Arc::new(credentials.with_store(keys.clone()));
        let translator = config.build_translator(credentials.clone())?;
        Ok(Self {
            session: EditorSession::new(translator, config),
            keys,
            credentials,
        })
    }
}

fn status_for(err: &MtError) -> StatusCode {
    match err {
        MtError::MissingApiKey(_) => StatusCode::BAD_REQUEST,
        MtError::InvalidCredential(_) => StatusCode::FORBIDDEN,
        MtError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        MtError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
        MtError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(status: StatusCode, error: String) -> ApiError {
    (status, Json(ErrorResponse { error }))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate_text))
        .route("/api/panes", get(get_panes))
        .route("/api/panes/english", put(edit_english))
        .route("/api/panes/japanese", put(edit_japanese))
        .route("/api/keys/{service}", put(set_key))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("DUALPANE_CONFIG").unwrap_or_else(|_| "dualpane.toml".to_string());
    let config = Config::load_from_path(&config_path)?.unwrap_or_default();
    let state = AppState::new(&config, Credentials::new())
        .map_err(|e| format!("Failed to initialize translator: {}", e))?;
    info!(
        provider = state.session.translator().provider_name(),
        "Starting dualpane web server"
    );

    let addr = std::env::var("DUALPANE_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// One-shot translation outside the session
async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let target = Language::from_tag(&request.target).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Unsupported target language: {}", request.target),
        )
    })?;

    if request.text.trim().is_empty() {
        return Ok(Json(TranslateResponse {
            translated: String::new(),
            source: request.text,
        }));
    }

    info!("Translating {} chars to {}", request.text.chars().count(), target);
    let translated = state
        .session
        .translator()
        .translate(&request.text, target.opposite(), target)
        .await
        .map_err(|e| {
            warn!("Translation failed: {}", e);
            api_error(status_for(&e), e.to_string())
        })?;

    Ok(Json(TranslateResponse {
        translated,
        source: request.text,
    }))
}

async fn get_panes(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.view().await)
}

async fn edit_english(
    State(state): State<AppState>,
    Json(edit): Json<PaneEdit>,
) -> (StatusCode, Json<SessionView>) {
    state.session.edit_english(&edit.text).await;
    (StatusCode::ACCEPTED, Json(state.session.view().await))
}

async fn edit_japanese(
    State(state): State<AppState>,
    Json(edit): Json<PaneEdit>,
) -> (StatusCode, Json<SessionView>) {
    state.session.edit_japanese(&edit.text).await;
    (StatusCode::ACCEPTED, Json(state.session.view().await))
}

/// Store or remove an API key for a provider
async fn set_key(
    State(state): State<AppState>,
    Path(service): Path<Service>,
    Json(update): Json<KeyUpdate>,
) -> StatusCode {
    state.keys.set(service, &update.key);
    state.credentials.refresh();
    info!("Updated {} API key", service);
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use dualpane_mt::{CredentialProvider, MockMode, MockTranslator, PaneState, ProviderKind};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(mock: MockTranslator) -> AppState {
        AppState {
            session: EditorSession::with_settings(Arc::new(mock), Duration::from_millis(500), 3),
            keys: Arc::new(MemoryKeyStore::new()),
            credentials: Arc::new(Credentials::new().without_env()),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_route() {
        let app = app(state(MockTranslator::demo()));
        let (status, body) = send(
            app,
            json_request("POST", "/api/translate", json!({"text": "Hello", "target": "ja"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translated"], "こんにちは");
        assert_eq!(body["source"], "Hello");
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_target() {
        let app = app(state(MockTranslator::demo()));
        let (status, body) = send(
            app,
            json_request("POST", "/api/translate", json!({"text": "Hello", "target": "fr"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("fr"));
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_bad_gateway() {
        let app = app(state(MockTranslator::new(MockMode::Error("down".to_string()))));
        let (status, body) = send(
            app,
            json_request("POST", "/api/translate", json!({"text": "Hello", "target": "ja"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Translation provider unavailable: down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pane_edit_is_reconciled_after_debounce() {
        let state = state(MockTranslator::new(MockMode::Suffix));

        let (status, body) = send(
            app(state.clone()),
            json_request("PUT", "/api/panes/english", json!({"text": "Hello\nWorld"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["english_state"], "pending_edit");

        tokio::time::sleep(Duration::from_millis(600)).await;

        let request = Request::builder()
            .uri("/api/panes")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["japanese"], "Hello_ja\nWorld_ja");
        assert_eq!(body["english_state"], "idle");
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_clearing_japanese_clears_english() {
        let state = state(MockTranslator::new(MockMode::Suffix));
        state.session.edit_english("Hello").await;

        let (_, body) = send(
            app(state.clone()),
            json_request("PUT", "/api/panes/japanese", json!({"text": ""})),
        )
        .await;
        assert_eq!(body["english"], "");
        assert_eq!(state.session.view().await.japanese_state, PaneState::Idle);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(status_for(&MtError::MissingApiKey(Service::OpenAi)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&MtError::InvalidCredential("bad".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&MtError::RateLimited("slow down".to_string())),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_key_route_feeds_the_provider() {
        let config = Config {
            provider: ProviderKind::DeepL,
            ..Config::default()
        };
        let state = AppState::new(&config, Credentials::new().without_env()).unwrap();

        // No key yet: the reconciliation fails before any request
        let (status, _) = send(
            app(state.clone()),
            json_request("POST", "/api/translate", json!({"text": "Hello", "target": "ja"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let response = app(state.clone())
            .oneshot(json_request("PUT", "/api/keys/deepl", json!({"key": "  abc  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.credentials.api_key(Service::DeepL).as_deref(), Some("abc"));

        app(state.clone())
            .oneshot(json_request("PUT", "/api/keys/deepl", json!({"key": ""})))
            .await
            .unwrap();
        assert_eq!(state.credentials.api_key(Service::DeepL), None);
    }
}
