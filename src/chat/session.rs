use crate::protocol::chat::GenerateContentRequest;
use crate::protocol::models::{Content, GenerationConfig};
use parking_lot::Mutex;
use uuid::Uuid;

/// One persistent conversation with the chat model.
///
/// Model, system instruction and sampling are fixed at creation. History
/// grows by one user and one model turn per completed exchange.
#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    model: String,
    system_instruction: Content,
    generation_config: GenerationConfig,
    history: Mutex<Vec<Content>>,
}

impl ChatSession {
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        system_instruction: &str,
        generation_config: GenerationConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            system_instruction: Content::instruction(system_instruction),
            generation_config,
            history: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    fn history(&self) -> Vec<Content> {
        self.history.lock().clone()
    }

    /// Build the request for the next turn: prior history plus `message`.
    #[must_use]
    pub fn request_for(&self, message: Content) -> GenerateContentRequest {
        let mut contents = self.history.lock().clone();
        contents.push(message);
        GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: Some(self.generation_config.clone()),
        }
    }

    /// Record a finished exchange. Empty replies are not kept.
    pub(crate) fn commit(&self, message: Content, reply: String) {
        if reply.is_empty() {
            tracing::debug!(session = %self.id, "Empty reply, turn not recorded");
            return;
        }
        let mut history = self.history.lock();
        history.push(message);
        history.push(Content::model_text(reply));
    }
}
