//! Pinecone 数据面 REST 客户端

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{VectorDocument, VectorMatch, VectorStore, document_metadata, metadata_uuid};
use crate::config::PineconeConfig;
use crate::errors::{CourseGenError, Result};
use crate::utils::excerpt;

pub struct PineconeVectorStore {
    client: reqwest::Client,
    host: String,
    api_key: String,
    namespace: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl PineconeVectorStore {
    pub fn new(config: &PineconeConfig, timeout_secs: u64) -> Result<Self> {
        if config.api_key.is_empty() || config.index_host.is_empty() {
            return Err(CourseGenError::vector_store(
                "Pinecone api_key and index_host must be configured",
            ));
        }
        let host = if config.index_host.starts_with("http") {
            config.index_host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.index_host.trim_end_matches('/'))
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            host,
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
        })
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(CourseGenError::vector_store(format!(
            "Pinecone returned HTTP {}: {}",
            status,
            excerpt(&text)
        )))
    }
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    fn name(&self) -> &'static str {
        "pinecone"
    }

    async fn upsert(&self, documents: &[VectorDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let vectors: Vec<serde_json::Value> = documents
            .iter()
            .map(|doc| {
                let mut metadata = document_metadata(doc);
                metadata["text"] = serde_json::Value::String(doc.text.clone());
                json!({"id": doc.id, "values": doc.embedding, "metadata": metadata})
            })
            .collect();
        self.post(
            "/vectors/upsert",
            json!({"vectors": vectors, "namespace": self.namespace}),
        )
        .await?;
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        course_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>> {
        let mut body = json!({
            "vector": embedding,
            "topK": top_k.max(1),
            "includeMetadata": true,
            "namespace": self.namespace,
        });
        if let Some(course_id) = course_id {
            body["filter"] = json!({"course_id": {"$eq": course_id.to_string()}});
        }
        let result: QueryResponse = self.post("/query", body).await?.json().await?;
        Ok(result.matches.into_iter().map(into_match).collect())
    }

    async fn delete_course(&self, course_id: Uuid) -> Result<()> {
        self.post(
            "/vectors/delete",
            json!({
                "filter": {"course_id": {"$eq": course_id.to_string()}},
                "namespace": self.namespace,
            }),
        )
        .await?;
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        self.post("/describe_index_stats", json!({})).await?;
        Ok(())
    }
}

fn into_match(m: PineconeMatch) -> VectorMatch {
    let metadata = m.metadata.unwrap_or(serde_json::Value::Null);
    VectorMatch {
        course_id: metadata_uuid(&metadata, "course_id"),
        chapter_id: metadata_uuid(&metadata, "chapter_id"),
        text: metadata
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        id: m.id,
        score: m.score,
        metadata,
    }
}
