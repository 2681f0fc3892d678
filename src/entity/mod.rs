//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod chapters;
pub mod courses;
pub mod flashcards;
pub mod generation_tasks;
pub mod questions;
pub mod quizzes;
pub mod subchapters;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

// JSON 列解析失败时退回默认值，避免单行脏数据拖垮整个列表
pub(crate) fn json_or_default<T: DeserializeOwned + Default>(value: sea_orm::prelude::Json) -> T {
    match serde_json::from_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Failed to decode JSON column: {}", e);
            T::default()
        }
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> sea_orm::prelude::Json {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
