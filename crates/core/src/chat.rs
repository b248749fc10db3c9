//! Free-chat collaborator
//!
//! Once a session's question flow is complete, further user input is routed
//! to a conversational model rather than the selector. The trait keeps the
//! engine decoupled from any particular provider; the OpenAI-compatible
//! implementation covers both OpenAI and compatible gateways, and the mock
//! gives tests and offline development a deterministic stand-in.

use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior exchange in the free-chat history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// A conversational collaborator for post-completion chat.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Produces a reply to the user's message given the prior exchanges.
    async fn reply(&self, history: &[ChatTurn], user_message: &str) -> Result<String>;
}

/// A `ChatClient` backed by any OpenAI-compatible chat-completion API.
pub struct OpenAICompatibleChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAICompatibleChatClient {
    pub fn new(config: OpenAIConfig, model: String, system_prompt: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            system_prompt,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAICompatibleChatClient {
    async fn reply(&self, history: &[ChatTurn], user_message: &str) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()?
                .into()];
        for turn in history {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?
                    .into(),
            };
            messages.push(message);
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message.to_string())
                .build()?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let answer = response
            .choices
            .first()
            .context("No response choice from chat model")?
            .message
            .content
            .as_ref()
            .context("No content in chat model response")?;
        Ok(answer.clone())
    }
}

/// A deterministic `ChatClient` for development and tests.
pub struct MockChatClient;

#[async_trait]
impl ChatClient for MockChatClient {
    async fn reply(&self, _history: &[ChatTurn], user_message: &str) -> Result<String> {
        Ok(format!(
            "Thanks for your message (\"{}\"). The structured consultation is complete; a clinician will review your answers.",
            user_message
        ))
    }
}
