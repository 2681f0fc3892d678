#![allow(dead_code, unused_macros)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use rust_coursegen::ai::{AiClient, AiProvider, Completion, CompletionRequest};
use rust_coursegen::cache::ObjectCache;
use rust_coursegen::cache::object_cache::moka::MokaCacheWrapper;
use rust_coursegen::config::{AppConfig, DatabaseConfig, GenerationConfig};
use rust_coursegen::errors::{CourseGenError, Result};
use rust_coursegen::middlewares::MemoryRateLimitStore;
use rust_coursegen::models::courses::entities::CourseStatus;
use rust_coursegen::models::generation::entities::TaskStatus;
use rust_coursegen::runtime::lifetime::startup::StartupContext;
use rust_coursegen::storage::Storage;
use rust_coursegen::vector::MemoryVectorStore;

pub const EMBEDDING_DIM: usize = 8;

/// 章节初稿被拒绝后，重写提示词里附带的说明
pub const REGENERATION_MARKER: &str = "A previous draft was rejected by the quality review";

/// 质量检查必然不通过的章节初稿
pub const WEAK_DRAFT: &str = "Rust is a language.";

/// 按提示词类型返回固定内容的模型
#[derive(Default)]
pub struct ScriptedProvider {
    /// 设置后，结构规划请求会一直等到被通知
    gate: Option<Arc<Notify>>,
    fail_structure: bool,
    /// 首次撰写章节时返回 `WEAK_DRAFT`，带修改意见的重写请求返回完整内容
    weak_first_draft: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_structure: true,
            ..Self::default()
        }
    }

    pub fn drafting() -> Self {
        Self {
            weak_first_draft: true,
            ..Self::default()
        }
    }

    /// 收到的所有提示词，按调用顺序
    pub fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        let prompt = &request.prompt;
        self.prompts.lock().unwrap().push(prompt.clone());
        let text = if prompt.starts_with("Design the chapter structure") {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_structure {
                return Err(CourseGenError::ai_provider("model returned 500"));
            }
            structure_response()
        } else if prompt.starts_with("Write the full content of a chapter") {
            if self.weak_first_draft && !prompt.contains(REGENERATION_MARKER) {
                WEAK_DRAFT.to_string()
            } else {
                chapter_response(prompt)
            }
        } else if prompt.contains("quiz questions") {
            quiz_response()
        } else if prompt.contains("study flashcards") {
            flashcard_response()
        } else {
            return Err(CourseGenError::ai_provider("unexpected prompt"));
        };

        Ok(Completion {
            text,
            provider: "scripted".to_string(),
            model: "scripted-1".to_string(),
            input_tokens: prompt.len() as u32 / 4,
            output_tokens: 100,
        })
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| embed_text(text)).collect())
    }
}

/// 按字母频率生成的确定性向量
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for (idx, ch) in text.to_lowercase().chars().filter(char::is_ascii_alphabetic).enumerate() {
        vector[(ch as usize + idx) % EMBEDDING_DIM] += 1.0;
    }
    vector[0] += 1.0;
    vector
}

fn structure_response() -> String {
    json!({
        "chapters": [
            {
                "title": "Ownership Basics",
                "learning_objectives": ["Understand ownership and borrowing"],
                "content_type": "theory",
                "estimated_duration_minutes": 45,
                "complexity_level": 1.5,
                "key_concepts": ["ownership", "move semantics"]
            },
            {
                "title": "Borrowing in Practice",
                "learning_objectives": ["Write functions that borrow data"],
                "content_type": "practical",
                "estimated_duration_minutes": 60,
                "complexity_level": 2.0,
                "key_concepts": ["references", "lifetimes"]
            }
        ]
    })
    .to_string()
}

pub fn chapter_response(prompt: &str) -> String {
    let title = prompt
        .lines()
        .find_map(|line| line.strip_prefix("Chapter title: "))
        .unwrap_or("Chapter");
    format!(
        "Welcome to {title}. In this chapter you will understand ownership and borrowing step by step.\n\n\
## Key Ideas\n\n\
Every value in Rust has one **owner**. When the owner goes out of scope, the value is dropped. \
You can lend a value with a **reference** instead of moving it.\n\n\
## Example\n\n\
For example, a function can take a string slice and print it. The caller keeps ownership, \
so it can use the string again after the call.\n\n\
## Practice\n\n\
Try this exercise: write a function that borrows a vector and returns its length. \
Then call it twice with the same vector.\n\n\
## Summary\n\n\
- Each value has a single owner.\n\
- Borrowing lets you use data without taking ownership.\n\
- References must not outlive the data they point to.\n"
    )
}

fn quiz_response() -> String {
    json!({
        "questions": [
            {
                "question_type": "multiple_choice",
                "question_text": "What happens when the owner goes out of scope?",
                "options": ["The value is dropped", "The value is copied", "Nothing", "It panics"],
                "correct_answer": "The value is dropped",
                "explanation": "Rust frees the value when its owner leaves scope.",
                "difficulty": "easy",
                "points": 1
            },
            {
                "question_type": "true_false",
                "question_text": "A reference may outlive the data it points to.",
                "options": [],
                "correct_answer": "false",
                "difficulty": "medium",
                "points": 2
            },
            {
                "question_type": "multiple_choice",
                "question_text": "This question has no valid answer.",
                "options": ["A", "B"],
                "correct_answer": "C"
            }
        ]
    })
    .to_string()
}

fn flashcard_response() -> String {
    format!(
        "Here are your flashcards:\n```json\n{}\n```",
        json!({
            "flashcards": [
                {"front": "Owner", "back": "The variable responsible for a value", "difficulty": "easy", "tags": ["Ownership"]},
                {"front": "Borrow", "back": "Using a value through a reference", "tags": ["References", " "]}
            ]
        })
    )
}

pub struct TestContext {
    pub ctx: StartupContext,
    pub vector_store: Arc<MemoryVectorStore>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.generation = GenerationConfig {
        workers: 1,
        queue_capacity: 8,
        max_chapters: 4,
        max_regeneration_attempts: 0,
        quiz_questions_per_chapter: 3,
        flashcards_per_chapter: 3,
    };
    config
}

pub async fn build_context(provider: Option<ScriptedProvider>) -> TestContext {
    build_context_with(test_config(), provider).await
}

pub async fn build_context_with(
    config: AppConfig,
    provider: Option<ScriptedProvider>,
) -> TestContext {
    let database = DatabaseConfig {
        url: ":memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    };
    let storage = rust_coursegen::storage::create_storage_with(&database)
        .await
        .expect("in-memory storage");
    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(1_000, 60));
    let primary = provider.map(|p| Arc::new(p) as Arc<dyn AiProvider>);
    let ai = Arc::new(AiClient::new(primary, None));
    let vector_store = Arc::new(MemoryVectorStore::new());
    let rate_limit_store = Arc::new(MemoryRateLimitStore::new());

    let ctx = StartupContext::assemble(
        &config,
        storage,
        cache,
        ai,
        vector_store.clone(),
        rate_limit_store,
    );
    TestContext { ctx, vector_store }
}

/// 与 main 中相同的 app data 和路由
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(rust_coursegen::utils::query_error_handler),
                )
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(rust_coursegen::utils::json_error_handler),
                )
                .app_data(actix_web::web::Data::new(rust_coursegen::models::AppStartTime {
                    start_datetime: chrono::Utc::now(),
                }))
                .configure(|cfg| $ctx.configure_app_data(cfg))
                .configure(rust_coursegen::routes::configure_api_routes),
        )
        .await
    };
}

pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let bytes = actix_web::test::read_body(resp).await;
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

pub fn course_payload(generate: bool) -> Value {
    json!({
        "title": "Introduction to Rust",
        "description": "A practical course on ownership, borrowing and lifetimes.",
        "subject_domain": "Programming",
        "target_audience": {
            "proficiency_level": "beginner",
            "prerequisites": ["Basic programming"]
        },
        "learning_objectives": ["Understand ownership and borrowing"],
        "estimated_duration_hours": 10.0,
        "difficulty_score": 2.0,
        "generate": generate
    })
}

/// 轮询生成状态直到任务结束
macro_rules! wait_for_task {
    ($app:expr, $course_id:expr) => {{
        let mut last = serde_json::Value::Null;
        for _ in 0..200 {
            let req = actix_web::test::TestRequest::get()
                .uri(&format!("/api/v1/courses/{}/generation-status", $course_id))
                .to_request();
            let resp = actix_web::test::call_service(&$app, req).await;
            last = common::read_json(resp).await;
            let status = last["data"]["status"].as_str().unwrap_or_default().to_string();
            if status == "completed" || status == "failed" || status == "cancelled" {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        last
    }};
}

/// 等到 worker 领取任务并把课程切换为 generating
pub async fn wait_until_generating(ctx: &StartupContext, course_id: uuid::Uuid) -> bool {
    for _ in 0..200 {
        let task_running = matches!(
            ctx.storage.latest_generation_task(course_id).await,
            Ok(Some(task)) if task.status == TaskStatus::Running
        );
        let course_generating = matches!(
            ctx.storage.get_course_by_id(course_id).await,
            Ok(Some(course)) if course.status == CourseStatus::Generating
        );
        if task_running && course_generating {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
