//! Shared fixtures: a scripted completion service and a router wired to it.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use bujji::config::prompt::PromptConfig;
use bujji::llm::chat::{ ChatClient, CompletionResponse };
use bujji::server::api::{ create_router, AppState };
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::{ Arc, Mutex };

/// Answers every prompt with a fixed reply (or a fixed failure) and
/// remembers what it was asked.
pub struct FakeModel {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self { reply: Err(reason.to_string()), prompts: Mutex::new(Vec::new()) })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeModel {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(CompletionResponse { response: text.clone() }),
            Err(reason) => Err(reason.clone().into()),
        }
    }

    fn get_model(&self) -> String {
        "fake-model".into()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn template() -> PromptConfig {
    PromptConfig { chat_template: "[Java/C++ tutor] {message}".into() }
}

pub fn test_app(model: Arc<FakeModel>) -> Router {
    create_router(AppState::new(model, Arc::new(template())))
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_app(model: Arc<FakeModel>) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let app = test_app(model);
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{}", addr)
}
