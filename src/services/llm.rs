use crate::config::Config;
use crate::error::{BookError, Result};
use crate::models::{Role, StructuredReply};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// One round trip to the generation service.
#[derive(Debug)]
pub struct ChatRequest<'a> {
    pub agent: Role,
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    /// `(name, schema)` when a JSON reply is required.
    pub schema: Option<(&'static str, Value)>,
}

impl ChatRequest<'_> {
    /// Text of the newest user message.
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(&self, request: ChatRequest<'_>) -> Result<String>;
}

pub struct GeminiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        GeminiBackend {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url, &config.api_key)
    }

    fn body(request: &ChatRequest<'_>) -> Value {
        let contents: Vec<Value> = request
            .messages
            .iter()
            .map(|message| {
                let role = match message.sender {
                    Sender::User => "user",
                    Sender::Model => "model",
                };
                json!({ "role": role, "parts": [{ "text": message.text }] })
            })
            .collect();

        let mut body = json!({ "contents": contents });
        if let Some((_, schema)) = &request.schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn generate(&self, request: ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.api_url, request.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::body(&request))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(BookError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(BookError::EmptyReply {
                agent: request.agent.to_string(),
            });
        }
        Ok(text)
    }
}

/// Opens role-bound sessions against one backend and model.
#[derive(Clone)]
pub struct SessionFactory {
    backend: Arc<dyn ChatBackend>,
    model: String,
}

impl SessionFactory {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        SessionFactory {
            backend,
            model: model.into(),
        }
    }

    /// Opens a conversation and sends `instructions` as its first turn.
    pub async fn open(&self, role: Role, instructions: &str) -> Result<Session> {
        let mut session = Session {
            backend: Arc::clone(&self.backend),
            model: self.model.clone(),
            role,
            messages: Vec::new(),
        };
        session.exchange(instructions, None).await?;
        Ok(session)
    }
}

/// One conversation bound to one role.
pub struct Session {
    backend: Arc<dyn ChatBackend>,
    model: String,
    role: Role,
    messages: Vec<ChatMessage>,
}

impl Session {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `prompt` and parses the reply as `T`. A reply that does not
    /// deserialize is a [`BookError::MalformedResponse`].
    pub async fn send<T: StructuredReply>(&mut self, prompt: &str) -> Result<T> {
        let raw = self
            .exchange(prompt, Some((T::NAME, T::schema())))
            .await?;
        serde_json::from_str(&raw).map_err(|source| BookError::MalformedResponse {
            agent: self.role.to_string(),
            schema: T::NAME,
            source,
        })
    }

    async fn exchange(
        &mut self,
        prompt: &str,
        schema: Option<(&'static str, Value)>,
    ) -> Result<String> {
        self.messages.push(ChatMessage {
            sender: Sender::User,
            text: prompt.to_string(),
        });

        let reply = self
            .backend
            .generate(ChatRequest {
                agent: self.role,
                model: &self.model,
                messages: &self.messages,
                schema,
            })
            .await?;

        tracing::info!(agent = %self.role, "{}", reply);
        self.messages.push(ChatMessage {
            sender: Sender::Model,
            text: reply.clone(),
        });
        Ok(reply)
    }
}
