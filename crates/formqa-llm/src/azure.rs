//! Azure OpenAI chat and embedding adapters

use async_trait::async_trait;
use formqa_core::config::AzureSettings;
use formqa_core::error::{FormqaError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::http::{build_client, send_with_retry};
use crate::ports::{Embedder, Generator};

const CHAT_SERVICE: &str = "Azure OpenAI chat";
const EMBEDDING_SERVICE: &str = "Azure OpenAI embeddings";

/// Inputs sent per embeddings request
const EMBEDDING_BATCH_SIZE: usize = 16;

fn deployment_url(settings: &AzureSettings, deployment: &str, operation: &str) -> String {
    format!(
        "{}/openai/deployments/{}/{}?api-version={}",
        settings.endpoint.trim_end_matches('/'),
        deployment,
        operation,
        settings.api_version
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions generator backed by an Azure OpenAI deployment
#[derive(Clone)]
pub struct AzureChatGenerator {
    client: Client,
    url: String,
    api_key: String,
    deployment: String,
    temperature: f32,
}

impl AzureChatGenerator {
    pub fn new(settings: &AzureSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(CHAT_SERVICE, timeout)?,
            url: deployment_url(settings, &settings.chat_deployment, "chat/completions"),
            api_key: settings.api_key.clone(),
            deployment: settings.chat_deployment.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl Generator for AzureChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        tracing::debug!(
            deployment = %self.deployment,
            prompt_chars = prompt.len(),
            "Calling chat model"
        );

        let response = send_with_retry(CHAT_SERVICE, || {
            self.client.post(&self.url).header("api-key", &self.api_key).json(&body)
        })
        .await?;

        let reply: ChatResponse = response.json().await.map_err(|e| FormqaError::Transport {
            service: CHAT_SERVICE.to_string(),
            reason: format!("invalid response body: {}", e),
        })?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FormqaError::Upstream {
                service: CHAT_SERVICE.to_string(),
                status: 200,
                body: "response contained no message content".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by an Azure OpenAI embeddings deployment
#[derive(Debug, Clone)]
pub struct AzureEmbedder {
    client: Client,
    url: String,
    api_key: String,
    deployment: String,
}

impl AzureEmbedder {
    /// Fails with `ConfigMissing` when no embedding deployment is configured
    pub fn new(settings: &AzureSettings, timeout: Duration) -> Result<Self> {
        let deployment = settings.embedding_deployment.clone().ok_or_else(|| {
            FormqaError::ConfigMissing {
                key: "azure.embedding_deployment (AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME)"
                    .to_string(),
            }
        })?;

        Ok(Self {
            client: build_client(EMBEDDING_SERVICE, timeout)?,
            url: deployment_url(settings, &deployment, "embeddings"),
            api_key: settings.api_key.clone(),
            deployment,
        })
    }

    async fn embed_batch(&self, batch: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest { input: batch };

        let response = send_with_retry(EMBEDDING_SERVICE, || {
            self.client.post(&self.url).header("api-key", &self.api_key).json(&body)
        })
        .await?;

        let mut reply: EmbeddingResponse =
            response.json().await.map_err(|e| FormqaError::Transport {
                service: EMBEDDING_SERVICE.to_string(),
                reason: format!("invalid response body: {}", e),
            })?;

        if reply.data.len() != batch.len() {
            return Err(FormqaError::Upstream {
                service: EMBEDDING_SERVICE.to_string(),
                status: 200,
                body: format!("expected {} embeddings, got {}", batch.len(), reply.data.len()),
            });
        }

        reply.data.sort_by_key(|item| item.index);
        Ok(reply.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl Embedder for AzureEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        tracing::debug!(deployment = %self.deployment, count = vectors.len(), "Embedded texts");
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }
}
