use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const EMBEDDING_PATH: &str = "/api/v1/services/embeddings/text-embedding/text-embedding";

/// DashScope text-embedding API. Issues one request per text so a failure is
/// attributable to a single item.
pub struct DashScopeProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct DashScopeRequest<'a> {
    model: &'a str,
    input: DashScopeInput<'a>,
    parameters: DashScopeParameters,
}

#[derive(Serialize)]
struct DashScopeInput<'a> {
    texts: [&'a str; 1],
}

#[derive(Serialize)]
struct DashScopeParameters {
    text_type: &'static str,
}

#[derive(Deserialize)]
struct DashScopeResponse {
    output: DashScopeOutput,
}

#[derive(Deserialize)]
struct DashScopeOutput {
    embeddings: Vec<DashScopeEmbedding>,
}

#[derive(Deserialize)]
struct DashScopeEmbedding {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct DashScopeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl DashScopeProvider {
    pub fn new(api_key: Option<String>, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| "text-embedding-v1".to_string()),
            base_url: base_url
                .unwrap_or_else(|| "https://dashscope.aliyuncs.com".to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn model_dimension(model: &str) -> usize {
        match model {
            "text-embedding-v1" | "text-embedding-v2" => 1536,
            "text-embedding-v3" => 1024,
            _ => 1536,
        }
    }

    async fn embed_one(&self, api_key: &str, text: &str, input_type: InputType) -> Result<Vec<f32>, DomainError> {
        let text_type = match input_type {
            InputType::Document => "document",
            InputType::Query => "query",
        };

        let resp = self
            .client
            .post(format!("{}{EMBEDDING_PATH}", self.base_url))
            .bearer_auth(api_key)
            .json(&DashScopeRequest {
                model: &self.model,
                input: DashScopeInput { texts: [text] },
                parameters: DashScopeParameters { text_type },
            })
            .send()
            .await
            .map_err(|e| DomainError::Embedding(format!("DashScope API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<DashScopeErrorBody>(&body) {
                Ok(DashScopeErrorBody { code, message: Some(message) }) => match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                },
                _ => body,
            };
            return Err(DomainError::Embedding(format!("DashScope API {status}: {detail}")));
        }

        let result: DashScopeResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("DashScope response: {e}")))?;
        result
            .output
            .embeddings
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| DomainError::Embedding("DashScope returned no embedding".into()))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for DashScopeProvider {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::Configuration("DASHSCOPE_API_KEY is not set".into()))?;

        let mut vectors = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            debug!(index = i, model = %self.model, "embedding text");
            vectors.push(self.embed_one(api_key, text, input_type).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        Self::model_dimension(&self.model)
    }

    fn name(&self) -> &str {
        "dashscope"
    }
}
