use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use course_rag_core::{
    CourseAssistant, GroqChatModel, OllamaEmbedder, QdrantStore, RagConfig, SourceMetadata,
    VectorIndex,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type Assistant = CourseAssistant<OllamaEmbedder, QdrantStore, GroqChatModel>;

pub struct AppState {
    assistant: Assistant,
}

pub async fn serve(config: RagConfig, bind: &str) -> anyhow::Result<()> {
    let api_key = config
        .chat_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("chat API key is required to serve (set GROQ_API_KEY)"))?;

    let embedder = OllamaEmbedder::new(
        &config.embedding_url,
        &config.embedding_model,
        config.embedding_dimensions,
    );
    let store = QdrantStore::new(
        &config.qdrant_url,
        &config.collection,
        config.embedding_dimensions,
    );
    store.ensure_collection().await?;

    let model = GroqChatModel::new(
        &config.chat_url,
        api_key,
        &config.chat_model,
        config.temperature,
    );

    let state = Arc::new(AppState {
        assistant: CourseAssistant::new(embedder, store, model, config.top_k),
    });

    let listener = TcpListener::bind(bind).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/get_response", post(get_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct AskForm {
    query: String,
}

#[derive(Serialize)]
struct SourceBody {
    content: String,
    metadata: SourceMetadata,
}

#[derive(Serialize)]
struct AnswerBody {
    answer: String,
    sources: Vec<SourceBody>,
}

async fn get_response(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AskForm>,
) -> Result<Json<AnswerBody>, (StatusCode, Json<serde_json::Value>)> {
    match state.assistant.answer(&form.query).await {
        Ok(result) => Ok(Json(AnswerBody {
            answer: result.answer,
            sources: result
                .sources
                .into_iter()
                .map(|source| SourceBody {
                    content: source.content,
                    metadata: source.metadata,
                })
                .collect(),
        })),
        Err(err) => {
            error!(error = %err, "failed to answer question");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            ))
        }
    }
}
