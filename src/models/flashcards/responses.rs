use serde::{Deserialize, Serialize};

use super::entities::Flashcard;
use crate::models::common::PaginationInfo;

// 闪卡列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Flashcard>,
}
