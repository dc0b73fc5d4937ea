use std::error::Error;
use std::io::Write;

use chrono::Utc;
use log::info;
use tokio::io::{ AsyncBufReadExt, BufReader };

use super::{ ChatSession, ChatTransport, HttpTransport };
use crate::cli::ChatArgs;
use crate::models::chat::{ Message, Role };
use crate::store::Action;

const HELP: &str = "\
Commands:
  /new              start a new chat
  /save             save the current chat to favorites
  /favorites        show or hide saved chats
  /select <id>      select or deselect a saved chat
  /delete           delete the selected saved chats
  /restore <id>     load a saved chat
  /theme            switch between dark and light mode
  /feedback [text]  send feedback (without text, the next line is the feedback)
  /about            about this app
  /help             show this help
  /quit             exit
Anything else is sent to Bujji. Start a line with // to send a leading /.";

const ABOUT: &str = "\
About This App
This is an AI-powered chatbot application specialized in Java and C++.
Created by Ishank Pujari.";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    New,
    Save,
    Favorites,
    Select(i64),
    Delete,
    Restore(i64),
    Theme,
    Feedback(String),
    OpenFeedback,
    About,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.starts_with("//") {
        return ReplCommand::Send(trimmed[1..].to_string());
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ReplCommand::Send(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let id = || arg.parse::<i64>().map_err(|_| format!("'{}' is not a chat id", arg));

    match name {
        "new" => ReplCommand::New,
        "save" => ReplCommand::Save,
        "favorites" | "fav" => ReplCommand::Favorites,
        "select" => id().map(ReplCommand::Select).unwrap_or_else(ReplCommand::Invalid),
        "delete" => ReplCommand::Delete,
        "restore" => id().map(ReplCommand::Restore).unwrap_or_else(ReplCommand::Invalid),
        "theme" => ReplCommand::Theme,
        "feedback" if !arg.is_empty() => ReplCommand::Feedback(arg.to_string()),
        "feedback" => ReplCommand::OpenFeedback,
        "about" => ReplCommand::About,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("unknown command '/{}', try /help", other)),
    }
}

fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::Assistant => "Bujji",
        Role::User => "You",
    };
    format!("{:>6} │ {}", speaker, message.content.replace('\n', "\n       │ "))
}

fn print_notification<T: ChatTransport>(session: &mut ChatSession<T>) {
    if let Some(note) = session.state().notification() {
        println!("* {}", note);
        session.apply(Action::DismissNotification);
    }
}

fn print_favorites<T: ChatTransport>(session: &ChatSession<T>) {
    let saved = session.state().saved();
    if !saved.is_visible() {
        println!("Favorites hidden.");
        return;
    }
    if saved.is_empty() {
        println!("No saved chats.");
        return;
    }
    for chat in saved.chats() {
        let mark = if saved.is_selected(chat.id) { "[x]" } else { "[ ]" };
        println!("{} Chat {} ({} messages)", mark, chat.id, chat.messages.len());
        for message in &chat.messages {
            println!("    {}", render_message(message));
        }
    }
}

fn print_conversation<T: ChatTransport>(session: &ChatSession<T>) {
    for message in session.state().messages() {
        println!("{}", render_message(message));
    }
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let transport = HttpTransport::new(&args.url);
    info!("Chatting through {}", transport.endpoint());
    let mut session = ChatSession::new(transport);

    print_conversation(&session);
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };

        // an open feedback prompt takes the whole line
        if session.state().feedback().open {
            if line.trim().is_empty() {
                session.apply(Action::CloseFeedback);
                println!("Feedback cancelled.");
            } else {
                session.dispatch(Action::SetFeedback(line)).await;
                session.dispatch(Action::SubmitFeedback).await;
                println!("Thanks for the feedback!");
            }
            continue;
        }

        match parse_line(&line) {
            ReplCommand::Send(text) => {
                let Some(effect) = session.apply(Action::Send(text)) else { continue };
                println!("Typing...");
                session.run(effect).await;
                if let Some(last) = session.state().messages().last() {
                    println!("{}", render_message(last));
                }
            }
            ReplCommand::New => {
                session.apply(Action::NewChat);
                print_conversation(&session);
            }
            ReplCommand::Save => {
                session.apply(Action::SaveChat { id: Utc::now().timestamp_millis() });
            }
            ReplCommand::Favorites => {
                session.apply(Action::ToggleFavorites);
                print_favorites(&session);
            }
            ReplCommand::Select(id) => {
                session.apply(Action::ToggleSelectSaved(id));
            }
            ReplCommand::Delete => {
                session.apply(Action::DeleteSelectedSaved);
            }
            ReplCommand::Restore(id) => {
                if session.state().saved().get(id).is_none() {
                    println!("No saved chat {}.", id);
                    continue;
                }
                session.apply(Action::RestoreSaved(id));
                print_conversation(&session);
            }
            ReplCommand::Theme => {
                session.apply(Action::ToggleTheme);
            }
            ReplCommand::Feedback(text) => {
                session.dispatch(Action::OpenFeedback).await;
                session.dispatch(Action::SetFeedback(text)).await;
                session.dispatch(Action::SubmitFeedback).await;
                println!("Thanks for the feedback!");
            }
            ReplCommand::OpenFeedback => {
                session.apply(Action::OpenFeedback);
                if !session.state().feedback().text.is_empty() {
                    println!("(draft: {})", session.state().feedback().text);
                }
                println!("Your feedback (empty line to cancel):");
            }
            ReplCommand::About => println!("{}", ABOUT),
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(reason) => println!("{}", reason),
        }
        print_notification(&mut session);
    }

    Ok(())
}
