//! Chroma REST (v1) 客户端

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::{VectorDocument, VectorMatch, VectorStore, document_metadata, metadata_uuid};
use crate::config::ChromaConfig;
use crate::errors::{CourseGenError, Result};
use crate::utils::excerpt;

pub struct ChromaVectorStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    // 首次访问时解析集合 ID 并缓存
    collection_id: OnceCell<String>,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Value>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl ChromaVectorStore {
    pub fn new(config: &ChromaConfig, timeout_secs: u64) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(CourseGenError::vector_store("Chroma url is not configured"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            collection_id: OnceCell::new(),
        })
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .post(format!("{}/api/v1/collections", self.base_url))
                    .json(&json!({
                        "name": self.collection,
                        "get_or_create": true,
                        "metadata": {"hnsw:space": "cosine"}
                    }))
                    .send()
                    .await?;
                let response = check_response(response).await?;
                let collection: CollectionResponse = response.json().await?;
                Ok::<_, CourseGenError>(collection.id)
            })
            .await?;
        Ok(id.as_str())
    }

    fn collection_url(&self, id: &str, action: &str) -> String {
        format!("{}/api/v1/collections/{}/{}", self.base_url, id, action)
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(CourseGenError::vector_store(format!(
        "Chroma returned HTTP {}: {}",
        status,
        excerpt(&body)
    )))
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    fn name(&self) -> &'static str {
        "chroma"
    }

    async fn upsert(&self, documents: &[VectorDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let id = self.collection_id().await?;
        let body = json!({
            "ids": documents.iter().map(|d| d.id.clone()).collect::<Vec<_>>(),
            "embeddings": documents.iter().map(|d| d.embedding.clone()).collect::<Vec<_>>(),
            "documents": documents.iter().map(|d| d.text.clone()).collect::<Vec<_>>(),
            "metadatas": documents.iter().map(document_metadata).collect::<Vec<_>>(),
        });
        let response = self
            .client
            .post(self.collection_url(id, "upsert"))
            .json(&body)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        course_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>> {
        let id = self.collection_id().await?;
        let mut body = json!({
            "query_embeddings": [embedding],
            "n_results": top_k.max(1),
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(course_id) = course_id {
            body["where"] = json!({"course_id": course_id.to_string()});
        }
        let response = self
            .client
            .post(self.collection_url(id, "query"))
            .json(&body)
            .send()
            .await?;
        let result: QueryResponse = check_response(response).await?.json().await?;
        Ok(parse_query_response(result))
    }

    async fn delete_course(&self, course_id: Uuid) -> Result<()> {
        let id = self.collection_id().await?;
        let response = self
            .client
            .post(self.collection_url(id, "delete"))
            .json(&json!({"where": {"course_id": course_id.to_string()}}))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/v1/heartbeat", self.base_url))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}

// Chroma 按查询向量分组返回；只发送了一个查询向量，取第一组
fn parse_query_response(result: QueryResponse) -> Vec<VectorMatch> {
    let ids = result.ids.into_iter().next().unwrap_or_default();
    let documents = result
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let metadatas = result
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default();
    let distances = result
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();

    ids.into_iter()
        .enumerate()
        .map(|(idx, id)| {
            let metadata = metadatas
                .get(idx)
                .cloned()
                .flatten()
                .unwrap_or(serde_json::Value::Null);
            VectorMatch {
                id,
                course_id: metadata_uuid(&metadata, "course_id"),
                chapter_id: metadata_uuid(&metadata, "chapter_id"),
                text: documents.get(idx).cloned().flatten().unwrap_or_default(),
                // 余弦距离转换为相似度
                score: distances.get(idx).map(|d| 1.0 - d).unwrap_or(0.0),
                metadata,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_response() {
        let course_id = Uuid::new_v4();
        let raw = json!({
            "ids": [["c1", "c2"]],
            "documents": [["first", null]],
            "metadatas": [[{"course_id": course_id.to_string()}, null]],
            "distances": [[0.1, 0.4]]
        });
        let parsed: QueryResponse = serde_json::from_value(raw).unwrap();
        let matches = parse_query_response(parsed);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].course_id, Some(course_id));
        assert_eq!(matches[0].text, "first");
        assert!((matches[0].score - 0.9).abs() < 1e-6);
        assert_eq!(matches[1].text, "");
        assert_eq!(matches[1].course_id, None);
    }

    #[test]
    fn test_rejects_empty_url() {
        let config = ChromaConfig {
            url: " ".to_string(),
            collection: "c".to_string(),
        };
        assert!(ChromaVectorStore::new(&config, 5).is_err());
    }
}
