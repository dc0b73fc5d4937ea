pub mod cli;
pub mod client;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;

use cli::ServeArgs;
use config::prompt::resolve_prompts;
use llm::chat::new_client as new_chat_client;
use llm::{ LlmConfig, LlmType };
use log::info;
use server::Server;
use std::error::Error;
use std::net::SocketAddr;

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Max Output Tokens: {}", args.chat_max_tokens);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let llm_type: LlmType = args.chat_llm_type.parse()?;
    let chat_config = LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        max_tokens: Some(args.chat_max_tokens).filter(|n| *n > 0),
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}",
        llm_type,
        chat_client.get_model()
    );

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let addr = args.server_addr.parse::<SocketAddr>()
        .map_err(|e| format!("Invalid server address '{}': {}", args.server_addr, e))?;

    let server = Server::new(addr, chat_client, prompts, args.clone());
    server.run().await?;

    Ok(())
}
