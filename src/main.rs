use bujji::cli::{ Cli, Command };
use bujji::client::repl;
use clap::Parser;
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let cli = Cli::parse();

    // The REPL owns stdout, so only warnings reach the terminal by default.
    let default_filter = match cli.command {
        Command::Serve(_) => "info",
        Command::Chat(_) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Serve(args) => bujji::run(args).await,
        Command::Chat(args) => repl::run(args).await,
    }
}
