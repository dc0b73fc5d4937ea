use log::{ info, warn };

use super::ChatTransport;
use crate::store::{ reduce, Action, ChatState, Effect };

/// Owns the conversation state and runs the effects the reducer asks for.
///
/// Sends take `&mut self` across the network await, so one session can never
/// have two exchanges in flight.
pub struct ChatSession<T: ChatTransport> {
    state: ChatState,
    transport: T,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            state: ChatState::new(),
            transport,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Applies one action and hands back any effect without running it.
    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effect) = reduce(state, action);
        self.state = state;
        effect
    }

    /// Runs an effect and every follow-up it produces.
    pub async fn run(&mut self, effect: Effect) {
        let mut next = Some(effect);
        while let Some(effect) = next.take() {
            if let Some(action) = self.perform(effect).await {
                next = self.apply(action);
            }
        }
    }

    pub async fn dispatch(&mut self, action: Action) {
        if let Some(effect) = self.apply(action) {
            self.run(effect).await;
        }
    }

    pub async fn send_message(&mut self, text: impl Into<String>) {
        self.dispatch(Action::Send(text.into())).await;
    }

    async fn perform(&self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Dispatch { token, request } => {
                match self.transport.send(&request).await {
                    Ok(content) => Some(Action::ResponseReceived { token, content }),
                    Err(e) => {
                        warn!("Error sending message: {}", e);
                        Some(Action::RequestFailed { token, reason: e.to_string() })
                    }
                }
            }
            Effect::SubmitFeedback(text) => {
                info!("Feedback submitted: {}", text);
                None
            }
        }
    }
}
