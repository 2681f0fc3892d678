use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{VectorDocument, VectorMatch, VectorStore, cosine_similarity};
use crate::errors::Result;

/// 进程内向量存储，用于开发与测试
#[derive(Default)]
pub struct MemoryVectorStore {
    documents: DashMap<String, VectorDocument>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, documents: &[VectorDocument]) -> Result<()> {
        for doc in documents {
            self.documents.insert(doc.id.clone(), doc.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        course_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>> {
        let mut matches: Vec<VectorMatch> = self
            .documents
            .iter()
            .filter(|entry| course_id.is_none_or(|id| entry.course_id == id))
            .map(|entry| {
                let doc = entry.value();
                VectorMatch {
                    id: doc.id.clone(),
                    course_id: Some(doc.course_id),
                    chapter_id: doc.chapter_id,
                    text: doc.text.clone(),
                    score: cosine_similarity(embedding, &doc.embedding),
                    metadata: doc.metadata.clone(),
                }
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_course(&self, course_id: Uuid) -> Result<()> {
        self.documents.retain(|_, doc| doc.course_id != course_id);
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, course_id: Uuid, embedding: Vec<f32>) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            course_id,
            chapter_id: None,
            text: format!("text {id}"),
            embedding,
            metadata: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_and_filters_course() {
        let store = MemoryVectorStore::new();
        let course = Uuid::new_v4();
        let other = Uuid::new_v4();
        store
            .upsert(&[
                doc("a", course, vec![1.0, 0.0]),
                doc("b", course, vec![0.7, 0.7]),
                doc("c", other, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 5, Some(course)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "b");

        let results = store.search(&[1.0, 0.0], 1, None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_delete_course() {
        let store = MemoryVectorStore::new();
        let course = Uuid::new_v4();
        store.upsert(&[doc("a", course, vec![1.0])]).await.unwrap();
        store.upsert(&[doc("a", course, vec![0.5])]).await.unwrap();
        assert_eq!(store.len(), 1);

        store.delete_course(course).await.unwrap();
        assert!(store.is_empty());
    }
}
