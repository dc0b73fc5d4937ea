//! Client-side conversation state.
//!
//! All state lives in one [`ChatState`] value advanced by [`reduce`]. The
//! reducer never performs I/O; network calls and feedback submission are
//! returned as an [`Effect`] for the caller to run, and their outcome comes
//! back as another [`Action`].
//!
//! Every request carries a [`RequestToken`]. A settlement replaces the
//! placeholder recorded for its token and nothing else, so a late answer to
//! an abandoned exchange can never overwrite a newer message.

pub mod saved;

use crate::models::api::ChatRequest;
use crate::models::chat::Message;
use log::{ debug, warn };
use saved::SavedChats;
use std::fmt;
use uuid::Uuid;

pub const GREETING: &str =
    "Hello! I am Bujji, specialized in Java and C++. How can I assist you with your programming queries today?";
pub const PLACEHOLDER: &str = "...";
pub const ERROR_REPLY: &str = "Sorry, there was an error processing your request.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken(Uuid);

impl RequestToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub open: bool,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    token: RequestToken,
    index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatState {
    messages: Vec<Message>,
    input: String,
    pending: Option<Pending>,
    theme: Theme,
    notification: Option<String>,
    feedback: FeedbackDraft,
    saved: SavedChats,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            input: String::new(),
            pending: None,
            theme: Theme::default(),
            notification: None,
            feedback: FeedbackDraft::default(),
            saved: SavedChats::default(),
        }
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversation as displayed, placeholder included.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The conversation without the in-flight placeholder.
    pub fn committed_messages(&self) -> Vec<Message> {
        let skip = self.pending.map(|p| p.index);
        self.messages
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending.map(|p| p.token)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn feedback(&self) -> &FeedbackDraft {
        &self.feedback
    }

    pub fn saved(&self) -> &SavedChats {
        &self.saved
    }

    fn settle(&mut self, token: RequestToken, reply: String) -> bool {
        match self.pending {
            Some(p) if p.token == token => {
                self.messages[p.index] = Message::assistant(reply);
                self.pending = None;
                true
            }
            _ => {
                debug!("Ignoring settlement for stale request {}", token);
                false
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SetInput(String),
    Send(String),
    ResponseReceived { token: RequestToken, content: String },
    RequestFailed { token: RequestToken, reason: String },
    NewChat,
    SaveChat { id: i64 },
    ToggleFavorites,
    ToggleSelectSaved(i64),
    DeleteSelectedSaved,
    RestoreSaved(i64),
    ToggleTheme,
    DismissNotification,
    OpenFeedback,
    CloseFeedback,
    SetFeedback(String),
    SubmitFeedback,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// POST `request` to the proxy and report back under `token`.
    Dispatch { token: RequestToken, request: ChatRequest },
    SubmitFeedback(String),
}

/// Strips every `*` from a model reply. This is not markup escaping.
pub fn sanitize_reply(text: &str) -> String {
    text.replace('*', "")
}

pub fn reduce(mut state: ChatState, action: Action) -> (ChatState, Option<Effect>) {
    let effect = match action {
        Action::SetInput(text) => {
            state.input = text;
            None
        }
        Action::Send(text) => {
            let text = text.trim();
            if text.is_empty() {
                return (state, None);
            }
            if let Some(pending) = state.pending {
                warn!("Send rejected: request {} is still in flight", pending.token);
                return (state, None);
            }

            let user = Message::user(text);
            let mut history = state.messages.clone();
            history.push(user.clone());

            let token = RequestToken::new();
            state.messages.push(user);
            state.messages.push(Message::assistant(PLACEHOLDER));
            state.pending = Some(Pending { token, index: state.messages.len() - 1 });
            state.input.clear();

            Some(Effect::Dispatch { token, request: ChatRequest { messages: history } })
        }
        Action::ResponseReceived { token, content } => {
            state.settle(token, sanitize_reply(&content));
            None
        }
        Action::RequestFailed { token, reason } => {
            if state.settle(token, ERROR_REPLY.to_string()) {
                debug!("Request {} failed: {}", token, reason);
            }
            None
        }
        Action::NewChat => {
            if let Some(pending) = state.pending.take() {
                debug!("Abandoning request {} for a new chat", pending.token);
            }
            state.messages = vec![Message::assistant(GREETING)];
            state.input.clear();
            None
        }
        Action::SaveChat { id } => {
            let snapshot = state.committed_messages();
            state.saved.save(id, snapshot);
            state.notification = Some("Chat saved!".into());
            None
        }
        Action::ToggleFavorites => {
            state.saved.toggle_visible();
            None
        }
        Action::ToggleSelectSaved(id) => {
            state.saved.toggle_select(id);
            None
        }
        Action::DeleteSelectedSaved => {
            state.saved.delete_selected();
            state.notification = Some("Selected chats deleted!".into());
            None
        }
        Action::RestoreSaved(id) => {
            if state.pending.is_some() {
                return (state, None);
            }
            if let Some(chat) = state.saved.get(id) {
                state.messages = chat.messages.clone();
                state.input.clear();
                state.saved.hide();
            }
            None
        }
        Action::ToggleTheme => {
            state.theme = state.theme.toggled();
            state.notification = Some(match state.theme {
                Theme::Dark => "Switched to Dark Mode!".into(),
                Theme::Light => "Switched to Light Mode!".into(),
            });
            None
        }
        Action::DismissNotification => {
            state.notification = None;
            None
        }
        Action::OpenFeedback => {
            state.feedback.open = true;
            None
        }
        Action::CloseFeedback => {
            state.feedback.open = false;
            None
        }
        Action::SetFeedback(text) => {
            state.feedback.text = text;
            None
        }
        Action::SubmitFeedback => {
            let text = std::mem::take(&mut state.feedback.text);
            state.feedback.open = false;
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(Effect::SubmitFeedback(text.to_string()))
            }
        }
    };
    (state, effect)
}
