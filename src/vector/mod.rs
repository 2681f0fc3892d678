//! 向量存储
//!
//! 章节正文的 embedding 写入向量数据库，用于课程内的相似度检索。
//! 所有调用方把这里的错误视为非致命错误，只记录日志。

pub mod chroma;
pub mod memory;
pub mod pinecone;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::VectorConfig;
use crate::errors::Result;

pub use chroma::ChromaVectorStore;
pub use memory::MemoryVectorStore;
pub use pinecone::PineconeVectorStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub course_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub course_id: Option<Uuid>,
    pub chapter_id: Option<Uuid>,
    pub text: String,
    /// 相似度，越大越相近
    pub score: f32,
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upsert(&self, documents: &[VectorDocument]) -> Result<()>;

    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        course_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>>;

    async fn delete_course(&self, course_id: Uuid) -> Result<()>;

    async fn health(&self) -> Result<()>;
}

/// 写入向量库的元数据；Pinecone 不保存正文，因此 text 也放在元数据里
pub(crate) fn document_metadata(doc: &VectorDocument) -> serde_json::Value {
    let mut metadata = match &doc.metadata {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    metadata.insert(
        "course_id".to_string(),
        serde_json::Value::String(doc.course_id.to_string()),
    );
    if let Some(chapter_id) = doc.chapter_id {
        metadata.insert(
            "chapter_id".to_string(),
            serde_json::Value::String(chapter_id.to_string()),
        );
    }
    serde_json::Value::Object(metadata)
}

pub(crate) fn metadata_uuid(metadata: &serde_json::Value, key: &str) -> Option<Uuid> {
    metadata
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// 根据配置创建向量存储；外部后端配置不完整时退回内存实现
pub fn build_vector_store(config: &VectorConfig, timeout_secs: u64) -> Arc<dyn VectorStore> {
    match config.provider.as_str() {
        "chroma" => match ChromaVectorStore::new(&config.chroma, timeout_secs) {
            Ok(store) => {
                info!("Using Chroma vector store at {}", config.chroma.url);
                Arc::new(store)
            }
            Err(e) => {
                warn!("Chroma vector store unavailable ({}), using in-memory store", e);
                Arc::new(MemoryVectorStore::new())
            }
        },
        "pinecone" => match PineconeVectorStore::new(&config.pinecone, timeout_secs) {
            Ok(store) => {
                info!("Using Pinecone vector store at {}", config.pinecone.index_host);
                Arc::new(store)
            }
            Err(e) => {
                warn!("Pinecone vector store unavailable ({}), using in-memory store", e);
                Arc::new(MemoryVectorStore::new())
            }
        },
        "memory" => Arc::new(MemoryVectorStore::new()),
        other => {
            warn!("Unknown vector provider '{}', using in-memory store", other);
            Arc::new(MemoryVectorStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_metadata_contains_ids() {
        let course_id = Uuid::new_v4();
        let chapter_id = Uuid::new_v4();
        let doc = VectorDocument {
            id: "a".to_string(),
            course_id,
            chapter_id: Some(chapter_id),
            text: "text".to_string(),
            embedding: vec![0.1],
            metadata: serde_json::json!({"title": "Intro"}),
        };
        let metadata = document_metadata(&doc);
        assert_eq!(metadata_uuid(&metadata, "course_id"), Some(course_id));
        assert_eq!(metadata_uuid(&metadata, "chapter_id"), Some(chapter_id));
        assert_eq!(metadata["title"], "Intro");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_memory() {
        let config = VectorConfig {
            provider: "faiss".to_string(),
            ..Default::default()
        };
        assert_eq!(build_vector_store(&config, 5).name(), "memory");

        // pinecone 缺少 api key
        let config = VectorConfig {
            provider: "pinecone".to_string(),
            ..Default::default()
        };
        assert_eq!(build_vector_store(&config, 5).name(), "memory");
    }
}
