use crate::cli::ServeArgs;
use crate::config::prompt::PromptConfig;
use crate::llm::chat::ChatClient;
use crate::models::api::ChatResponse;
use crate::models::chat::Message;
use super::error::ProxyError;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    extract::{ rejection::BytesRejection, Request, State },
    http::{ header, Method },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
    Json,
};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use log::{info, warn, error};

pub const CHAT_ROUTE: &str = "/api/chat";

/// Read-only dependencies shared by every request.
#[derive(Clone)]
pub struct AppState {
    chat_client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
}

impl AppState {
    pub fn new(chat_client: Arc<dyn ChatClient>, prompts: Arc<PromptConfig>) -> Self {
        Self { chat_client, prompts }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(CHAT_ROUTE, post(chat_handler).fallback(method_not_allowed_handler))
        .layer(cors)
        .layer(middleware::from_fn(reject_bare_options))
        .with_state(state)
}

/// The CORS layer answers every OPTIONS request on its own. Only a real
/// preflight (Origin plus Access-Control-Request-Method) may reach it;
/// any other OPTIONS gets the usual 405.
async fn reject_bare_options(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let is_preflight = headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if *request.method() == Method::OPTIONS && !is_preflight {
        return ProxyError::MethodNotAllowed(Method::OPTIONS.to_string()).into_response();
    }
    next.run(request).await
}

pub async fn start_http_server(
    addr: SocketAddr,
    state: AppState,
    args: &ServeArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = create_router(state);

    match (args.enable_tls, &args.tls_cert_path, &args.tls_key_path) {
        (true, Some(cert_path), Some(key_path)) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Starting HTTPS server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        (true, _, _) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            return Err("TLS enabled without cert/key".into());
        }
        (false, _, _) => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
            })?;
            info!("Starting HTTP server on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

/// Forwards the final message of the posted history, wrapped in the chat
/// template, as one context-free completion.
async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ProxyError> {
    // oversized or unreadable bodies get the same JSON shape as bad JSON
    let body = body.map_err(|rejection| {
        warn!("Rejected chat request body ({}): {}", rejection.status(), rejection.body_text());
        ProxyError::Internal(rejection.body_text())
    })?;

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unparseable chat request body: {}", e);
        ProxyError::Internal(e.to_string())
    })?;

    let items = match payload.get("messages") {
        Some(Value::Array(items)) => items.clone(),
        _ => return Err(ProxyError::InvalidBody),
    };

    let messages: Vec<Message> = serde_json::from_value(Value::Array(items)).map_err(|e| {
        warn!("Malformed message in chat request: {}", e);
        ProxyError::Internal(e.to_string())
    })?;

    let last = messages
        .last()
        .ok_or_else(|| ProxyError::Internal("messages must not be empty".into()))?;

    info!(
        "Chat request: {} message(s) received, forwarding the last ({} chars) to model {}",
        messages.len(),
        last.content.len(),
        state.chat_client.get_model()
    );

    let prompt = state.prompts.render(&last.content);
    let completion = state.chat_client.complete(&prompt).await.map_err(|e| {
        error!("Completion request failed: {}", e);
        ProxyError::Internal(e.to_string())
    })?;

    Ok(Json(ChatResponse { content: completion.response }))
}

async fn method_not_allowed_handler(method: Method) -> ProxyError {
    ProxyError::MethodNotAllowed(method.to_string())
}
