//! OpenAI chat completions provider.
//!
//! Uses [`async_openai`] for request/response handling. The persona
//! instruction arrives as the first message of the request, so messages are
//! mapped one-to-one onto the wire format.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use secrecy::{ExposeSecret, SecretString};

use skynet_core::llm::provider::LlmProvider;
use skynet_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, StopReason, Usage,
};

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const MISSING_KEY: &str = "OPENAI_API_KEY is not set";

/// Connection settings read from the environment.
pub struct OpenAiSettings {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
}

impl OpenAiSettings {
    /// Read `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    pub fn from_env(model: &str) -> Self {
        Self::from_vars(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("OPENAI_BASE_URL").ok(),
            model,
        )
    }

    /// Build settings from raw values. Blank values count as absent.
    pub fn from_vars(api_key: Option<String>, base_url: Option<String>, model: &str) -> Self {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Self {
            api_key,
            base_url,
            model: model.to_string(),
        }
    }
}

/// OpenAI (or compatible) provider.
///
/// Does NOT derive Debug; the client holds the API key.
pub struct OpenAiProvider {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiProvider {
    /// Without an API key the provider still constructs, but every call fails
    /// with [`LlmError::AuthenticationFailed`] before touching the network.
    pub fn new(settings: OpenAiSettings) -> Self {
        let client = settings.api_key.as_ref().map(|key| {
            let config = OpenAIConfig::new()
                .with_api_key(key.expose_secret())
                .with_api_base(&settings.base_url);
            Client::with_config(config)
        });

        Self {
            client,
            model: settings.model,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.client.is_some()
    }

    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request.messages.iter().map(to_wire_message).collect();

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }
}

fn to_wire_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LlmError::AuthenticationFailed(MISSING_KEY.to_string()))?;

        let response = client
            .chat()
            .create(self.build_request(request))
            .await
            .map_err(map_openai_error)?;

        let choice = response.choices.first().ok_or(LlmError::EmptyCompletion)?;
        let content = choice
            .message
            .content
            .clone()
            .ok_or(LlmError::EmptyCompletion)?;

        let stop_reason = match choice.finish_reason {
            Some(FinishReason::Length) => StopReason::MaxTokens,
            Some(FinishReason::ContentFilter) => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        };

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed(api_err.message.clone())
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited
            } else if code == "context_length_exceeded" {
                LlmError::ContextLengthExceeded
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed(err.to_string()),
            Some(429) => LlmError::RateLimited,
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
