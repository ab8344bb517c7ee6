//! Client for the hosted vector-store QA service
//!
//! The service keeps the uploaded corpus under a store identifier and answers
//! questions against it in one call, so it doubles as a [`Generator`].

use async_trait::async_trait;
use formqa_core::config::HostedSettings;
use formqa_core::error::{FormqaError, Result};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::http::{build_client, send_with_retry};
use crate::ports::Generator;

const UPLOAD_SERVICE: &str = "hosted upload";
const QA_SERVICE: &str = "hosted QA";

/// Header carrying the service API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// File name the corpus is uploaded under
pub const CORPUS_FILE_NAME: &str = "converted.txt";

/// Service acknowledgement for an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub store_id: String,
    pub status: u16,
    /// JSON reply when the body parsed, otherwise the raw text as a string
    pub acknowledgement: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRequest<'a> {
    thread_id: &'a str,
    prompt: &'a str,
    temperature: f32,
    store_id: &'a str,
    uploaded_files: [&'a str; 0],
}

#[derive(Clone)]
pub struct HostedClient {
    client: Client,
    upload_url: Option<String>,
    qa_url: String,
    api_key: String,
    store_id: String,
    temperature: f32,
}

impl HostedClient {
    pub fn new(settings: &HostedSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(QA_SERVICE, timeout)?,
            upload_url: settings.upload_url.clone(),
            qa_url: settings.qa_url.clone(),
            api_key: settings.api_key.clone(),
            store_id: settings.store_id.clone(),
            temperature: settings.temperature,
        })
    }

    /// Upload the flattened corpus as `converted.txt` into the configured store
    pub async fn upload(&self, corpus: &str) -> Result<UploadReceipt> {
        if corpus.trim().is_empty() {
            return Err(FormqaError::empty("corpus"));
        }

        let url = self.upload_url.as_deref().ok_or_else(|| FormqaError::ConfigMissing {
            key: "hosted.upload_url (FORMQA_UPLOAD_URL)".to_string(),
        })?;

        tracing::info!(store_id = %self.store_id, bytes = corpus.len(), "Uploading corpus");

        let response = send_with_retry(UPLOAD_SERVICE, || {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            let part =
                Part::text(corpus.to_string()).file_name(CORPUS_FILE_NAME).headers(headers);

            self.client
                .post(url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("storeId", self.store_id.as_str())])
                .multipart(Form::new().part("uploaded_file", part))
        })
        .await?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| FormqaError::Transport {
            service: UPLOAD_SERVICE.to_string(),
            reason: e.to_string(),
        })?;
        let acknowledgement = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(UploadReceipt { store_id: self.store_id.clone(), status, acknowledgement })
    }

    /// Ask the service a question; the reply body is consumed as a stream
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        let body = QuestionRequest {
            thread_id: "",
            prompt,
            temperature: self.temperature,
            store_id: &self.store_id,
            uploaded_files: [],
        };

        tracing::debug!(
            store_id = %self.store_id,
            prompt_chars = prompt.len(),
            "Asking hosted QA"
        );

        let response = send_with_retry(QA_SERVICE, || {
            self.client.post(&self.qa_url).header(API_KEY_HEADER, &self.api_key).json(&body)
        })
        .await?;

        let mut raw = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| FormqaError::Transport {
                service: QA_SERVICE.to_string(),
                reason: format!("stream interrupted: {}", e),
            })?;
            raw.extend_from_slice(&bytes);
        }

        Ok(parse_answer_body(&String::from_utf8_lossy(&raw)))
    }
}

#[async_trait]
impl Generator for HostedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.ask(prompt).await
    }

    fn model_name(&self) -> &str {
        "hosted"
    }
}

/// Pull the answer text out of a QA reply body
///
/// A JSON string is unwrapped; a JSON object yields its first string field
/// among `answer`, `response`, `content`, `message`; anything else is
/// returned verbatim.
pub fn parse_answer_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(map)) => ["answer", "response", "content", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    }
}
