pub mod api;
pub mod error;

use crate::cli::ServeArgs;
use crate::config::prompt::PromptConfig;
use crate::llm::chat::ChatClient;
use api::AppState;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Server {
    addr: SocketAddr,
    chat_client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
    args: ServeArgs,
}

impl Server {
    pub fn new(
        addr: SocketAddr,
        chat_client: Arc<dyn ChatClient>,
        prompts: Arc<PromptConfig>,
        args: ServeArgs,
    ) -> Self {
        Self {
            addr,
            chat_client,
            prompts,
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = AppState::new(self.chat_client.clone(), self.prompts.clone());
        api::start_http_server(self.addr, state, &self.args).await
    }
}
