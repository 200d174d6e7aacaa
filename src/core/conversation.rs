use futures_util::StreamExt;
use tracing::debug;

use crate::core::chat_stream::ModelService;
use crate::core::message::TurnRole;
use crate::core::session::SessionState;
use crate::core::stream_errors::ModelServiceError;

/// Receives streamed output while a turn is in flight.
pub trait ConversationObserver {
    /// Reasoning text, shown to the operator but never kept in history.
    fn reasoning(&mut self, _text: &str) {}

    /// A piece of the answer as it arrives.
    fn answer(&mut self, _text: &str) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl ConversationObserver for Silent {}

/// Owns the session and drives one turn at a time through the model.
pub struct ConversationDriver<S: ModelService> {
    session: SessionState,
    service: S,
}

impl<S: ModelService> ConversationDriver<S> {
    pub fn new(session: SessionState, service: S) -> Self {
        Self { session, service }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Send `user_text` with the whole history and record the answer.
    ///
    /// The user turn is recorded before the request goes out. A model turn
    /// is recorded only when the stream completes with non-empty answer text;
    /// on any failure partial text is discarded.
    pub async fn submit(
        &mut self,
        user_text: &str,
        observer: &mut dyn ConversationObserver,
    ) -> Result<String, ModelServiceError> {
        self.session.append_turn(TurnRole::User, user_text);

        let mut stream = self
            .service
            .stream(self.session.turns(), self.session.generation_config())
            .await?;

        let mut response_text = String::new();
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if fragment.is_reasoning {
                observer.reasoning(&fragment.text);
            } else {
                observer.answer(&fragment.text);
                response_text.push_str(&fragment.text);
            }
        }

        if response_text.is_empty() {
            debug!("model stream ended without answer text");
            return Err(ModelServiceError::empty_response());
        }

        self.session.append_turn(TurnRole::Model, &response_text);
        Ok(response_text)
    }
}
