//! Axum front end: a minijinja-rendered chat page plus a small JSON API the
//! page polls. The handlers are a thin view over the conversation state
//! machine; all gating (blank input, single-flight) happens in the machine.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::conversation::{Conversation, Filters};
use crate::domain::ChatMessage;
use crate::gemini::{self, GeminiClient};

#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    conversation: Arc<Mutex<Conversation>>,
    gemini: Arc<GeminiClient>,
}

impl AppState {
    pub fn new(gemini: GeminiClient) -> Result<Self> {
        let templates = create_minijinja_env().context("Failed to initialize template engine")?;
        Ok(Self {
            templates: Arc::new(templates),
            conversation: Arc::new(Mutex::new(Conversation::new())),
            gemini: Arc::new(gemini),
        })
    }
}

fn create_minijinja_env() -> Result<AutoReloader> {
    let reloader = AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        notifier.watch_path("templates", true);
        Ok(env)
    });
    Ok(reloader)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    messages: Vec<ChatMessage>,
    awaiting: bool,
    filters: Filters,
}

#[derive(Deserialize)]
struct SendRequest {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    accepted: bool,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageRequest {
    recipe_name: String,
    #[serde(default)]
    image_prompt: String,
}

#[derive(Serialize)]
struct ImageResponse {
    url: String,
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! { title => "الشاف بوط" })
            })
        })
        .map(Html)
        .unwrap_or_else(|e| {
            error!("Failed to get or render template: {}", e);
            Html(format!("Internal Server Error: {}", e))
        })
}

async fn snapshot(conversation: &Mutex<Conversation>) -> Snapshot {
    let conversation = conversation.lock().await;
    Snapshot {
        messages: conversation.messages().to_vec(),
        awaiting: conversation.is_awaiting(),
        filters: conversation.filters.clone(),
    }
}

async fn messages_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(snapshot(&state.conversation).await)
}

/// Runs one full submit/await/apply cycle. The state lock is released across
/// the gateway call so concurrent submissions observe the awaiting phase and
/// no-op instead of queueing.
async fn run_submission(state: &AppState, dispatched: Option<String>, filters: Filters) -> SendResponse {
    let accepted = match dispatched {
        Some(text) => {
            let response = state
                .gemini
                .get_response(
                    &text,
                    filters.cuisine,
                    filters.mood,
                    &filters.health_conditions,
                    filters.fitness_goal,
                    &filters.fitness_profile,
                )
                .await;
            let mut conversation = state.conversation.lock().await;
            conversation.apply_response(response);
            true
        }
        None => false,
    };
    SendResponse {
        accepted,
        snapshot: snapshot(&state.conversation).await,
    }
}

async fn send_handler(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> impl IntoResponse {
    let (dispatched, filters) = {
        let mut conversation = state.conversation.lock().await;
        (conversation.submit(&request.text), conversation.filters.clone())
    };
    Json(run_submission(&state, dispatched, filters).await)
}

async fn random_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (dispatched, filters) = {
        let mut conversation = state.conversation.lock().await;
        (conversation.random_suggestion(), conversation.filters.clone())
    };
    Json(run_submission(&state, dispatched, filters).await)
}

async fn filters_handler(
    State(state): State<AppState>,
    Json(filters): Json<Filters>,
) -> impl IntoResponse {
    let mut conversation = state.conversation.lock().await;
    conversation.filters = filters;
    Json(conversation.filters.clone())
}

/// Per-card image resolution. Image failures are silent: the deterministic
/// placeholder is always a valid answer.
async fn image_handler(
    State(state): State<AppState>,
    Json(request): Json<ImageRequest>,
) -> impl IntoResponse {
    let url =
        gemini::recipe_image_url(&state.gemini, &request.recipe_name, &request.image_prompt).await;
    Json(ImageResponse { url })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/messages", get(messages_handler))
        .route("/api/message", post(send_handler))
        .route("/api/random", post(random_handler))
        .route("/api/filters", post(filters_handler))
        .route("/api/image", post(image_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16) -> Result<()> {
    let state = AppState::new(GeminiClient::from_env())?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
