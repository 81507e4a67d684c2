//! The chat mediator: one question in, one grounded answer out.

use std::sync::Arc;

use isenior_core::message::Message;
use isenior_core::provider::{Provider, ProviderRequest};
use isenior_core::{Error, Result};
use tracing::{debug, error, info};

use crate::context::ContextAssembler;

/// What the model must say when the context does not cover the question.
pub const FALLBACK_REPLY: &str = "I'm sorry, I don't have enough information to answer.";

/// The instruction that precedes the facility context.
pub const SYSTEM_INSTRUCTION: &str = "You are the iSenior assistant for care-home staff. \
Answer ONLY from the facility data given in the context below. \
Whenever you mention an appointment or a medication, always name the resident it belongs to. \
If the context contains nothing relevant, reply exactly: \
\"I'm sorry, I don't have enough information to answer.\"";

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 2000;

/// Sends a staff question, with the assembled facility context, to the LLM.
pub struct ChatMediator {
    provider: Arc<dyn Provider>,
    assembler: Arc<ContextAssembler>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_message_chars: usize,
    system_instruction: String,
}

impl ChatMediator {
    pub fn new(provider: Arc<dyn Provider>, assembler: Arc<ContextAssembler>) -> Self {
        Self {
            provider,
            assembler,
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: None,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            system_instruction: SYSTEM_INSTRUCTION.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_message_chars(mut self, max: usize) -> Self {
        self.max_message_chars = max;
        self
    }

    /// Replace the built-in instruction. `None` keeps the default.
    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        if let Some(instruction) = instruction.filter(|i| !i.trim().is_empty()) {
            self.system_instruction = instruction;
        }
        self
    }

    /// Answer `message` on behalf of `username`.
    ///
    /// The context is fully assembled before the provider is called, so no
    /// database connection is held across the outbound request.
    pub async fn reply(&self, username: &str, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::validation("message must not be empty"));
        }
        let chars = message.chars().count();
        if chars > self.max_message_chars {
            return Err(Error::validation(format!(
                "message is {chars} characters, the limit is {}",
                self.max_message_chars
            )));
        }

        let context = self.assembler.assemble(username).await.map_err(|e| {
            error!(username, error = %e, "Chat context assembly failed");
            Error::Service("could not assemble the chat context".into())
        })?;
        info!(username, chars, "Chat message received");

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(format!(
                    "{}\n\nContext:\n{}",
                    self.system_instruction, context.text
                )),
                Message::user(message),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await.map_err(|e| {
            error!(provider = %self.provider.name(), error = %e, "LLM request failed");
            Error::from(e)
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM usage"
            );
        }
        info!(username, model = %response.model, "Chat reply generated");
        Ok(response.message.content)
    }
}
