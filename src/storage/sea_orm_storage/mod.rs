//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod chapters;
mod content;
mod courses;
mod flashcards;
mod generation_tasks;
mod quizzes;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{CourseGenError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database).await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", redact_url(&db_url));

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = is_in_memory(url);

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CourseGenError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存数据库每个连接都是独立的库，只能保留单个长期连接
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.pool_size.max(1))
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| CourseGenError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| CourseGenError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CourseGenError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    pub(crate) async fn ping_impl(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| CourseGenError::database_connection(format!("数据库不可用: {e}")))?;
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

// 日志里隐藏连接串中的密码
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.find(':') {
                Some(colon) => format!(
                    "{}{}:***{}",
                    &url[..scheme_end + 3],
                    &credentials[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

/// 唯一约束冲突（SQLite / PostgreSQL / MySQL 的报错文本各不相同）
pub(crate) fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE constraint failed")
        || msg.contains("duplicate key value")
        || msg.contains("Duplicate entry")
}

// Storage trait 实现
use crate::models::{
    chapters::{
        entities::{Chapter, Subchapter},
        requests::{CreateChapterRequest, UpdateChapterRequest},
    },
    courses::{
        entities::{Course, CourseStatus},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    flashcards::{
        entities::Flashcard,
        requests::{CreateFlashcardRequest, FlashcardListQuery, UpdateFlashcardRequest},
        responses::FlashcardListResponse,
    },
    generation::{
        entities::{GeneratedContent, GenerationTask},
        requests::TaskUpdate,
    },
    quizzes::{
        entities::{Question, Quiz},
        requests::{CreateQuestionRequest, CreateQuizRequest, UpdateQuizRequest},
        responses::QuizDetail,
    },
};
use crate::quality::QualityMetrics;
use crate::storage::Storage;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn ping(&self) -> Result<()> {
        self.ping_impl().await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(
        &self,
        id: Uuid,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn set_course_status(&self, id: Uuid, status: CourseStatus) -> Result<bool> {
        self.set_course_status_impl(id, status).await
    }

    async fn complete_course_generation(
        &self,
        id: Uuid,
        metrics: QualityMetrics,
    ) -> Result<Option<Course>> {
        self.complete_course_generation_impl(id, metrics).await
    }

    async fn replace_course_content(
        &self,
        course_id: Uuid,
        content: GeneratedContent,
    ) -> Result<()> {
        self.replace_course_content_impl(course_id, content).await
    }

    // 章节模块
    async fn create_chapter(
        &self,
        course_id: Uuid,
        chapter: CreateChapterRequest,
    ) -> Result<Chapter> {
        self.create_chapter_impl(course_id, chapter).await
    }

    async fn get_chapter_by_id(&self, id: Uuid) -> Result<Option<Chapter>> {
        self.get_chapter_by_id_impl(id).await
    }

    async fn list_chapters(&self, course_id: Uuid) -> Result<Vec<Chapter>> {
        self.list_chapters_impl(course_id).await
    }

    async fn list_subchapters(&self, chapter_id: Uuid) -> Result<Vec<Subchapter>> {
        self.list_subchapters_impl(chapter_id).await
    }

    async fn update_chapter(
        &self,
        id: Uuid,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>> {
        self.update_chapter_impl(id, update).await
    }

    async fn delete_chapter(&self, id: Uuid) -> Result<bool> {
        self.delete_chapter_impl(id).await
    }

    async fn set_chapter_quality_score(&self, id: Uuid, score: f64) -> Result<bool> {
        self.set_chapter_quality_score_impl(id, score).await
    }

    async fn chapter_sequence_taken(
        &self,
        course_id: Uuid,
        sequence_number: i32,
        exclude_chapter: Option<Uuid>,
    ) -> Result<bool> {
        self.chapter_sequence_taken_impl(course_id, sequence_number, exclude_chapter)
            .await
    }

    // 测验模块
    async fn create_quiz(&self, course_id: Uuid, quiz: CreateQuizRequest) -> Result<QuizDetail> {
        self.create_quiz_impl(course_id, quiz).await
    }

    async fn get_quiz_by_id(&self, id: Uuid) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(id).await
    }

    async fn list_quizzes(&self, course_id: Uuid) -> Result<Vec<Quiz>> {
        self.list_quizzes_impl(course_id).await
    }

    async fn count_quizzes(&self, course_id: Uuid) -> Result<u64> {
        self.count_quizzes_impl(course_id).await
    }

    async fn update_quiz(&self, id: Uuid, update: UpdateQuizRequest) -> Result<Option<Quiz>> {
        self.update_quiz_impl(id, update).await
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<bool> {
        self.delete_quiz_impl(id).await
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        self.list_questions_impl(quiz_id).await
    }

    async fn add_question(
        &self,
        quiz_id: Uuid,
        question: CreateQuestionRequest,
    ) -> Result<Question> {
        self.add_question_impl(quiz_id, question).await
    }

    async fn get_question_by_id(&self, id: Uuid) -> Result<Option<Question>> {
        self.get_question_by_id_impl(id).await
    }

    async fn update_question(
        &self,
        id: Uuid,
        question: CreateQuestionRequest,
    ) -> Result<Option<Question>> {
        self.update_question_impl(id, question).await
    }

    async fn delete_question(&self, id: Uuid) -> Result<bool> {
        self.delete_question_impl(id).await
    }

    // 闪卡模块
    async fn create_flashcard(
        &self,
        course_id: Uuid,
        card: CreateFlashcardRequest,
    ) -> Result<Flashcard> {
        self.create_flashcard_impl(course_id, card).await
    }

    async fn get_flashcard_by_id(&self, id: Uuid) -> Result<Option<Flashcard>> {
        self.get_flashcard_by_id_impl(id).await
    }

    async fn list_flashcards_with_pagination(
        &self,
        course_id: Uuid,
        query: FlashcardListQuery,
    ) -> Result<FlashcardListResponse> {
        self.list_flashcards_with_pagination_impl(course_id, query)
            .await
    }

    async fn list_all_flashcards(&self, course_id: Uuid) -> Result<Vec<Flashcard>> {
        self.list_all_flashcards_impl(course_id).await
    }

    async fn count_flashcards(&self, course_id: Uuid) -> Result<u64> {
        self.count_flashcards_impl(course_id).await
    }

    async fn update_flashcard(
        &self,
        id: Uuid,
        update: UpdateFlashcardRequest,
    ) -> Result<Option<Flashcard>> {
        self.update_flashcard_impl(id, update).await
    }

    async fn delete_flashcard(&self, id: Uuid) -> Result<bool> {
        self.delete_flashcard_impl(id).await
    }

    // 生成任务模块
    async fn create_generation_task(&self, course_id: Uuid) -> Result<GenerationTask> {
        self.create_generation_task_impl(course_id).await
    }

    async fn get_generation_task(&self, id: Uuid) -> Result<Option<GenerationTask>> {
        self.get_generation_task_impl(id).await
    }

    async fn latest_generation_task(&self, course_id: Uuid) -> Result<Option<GenerationTask>> {
        self.latest_generation_task_impl(course_id).await
    }

    async fn active_generation_task(&self, course_id: Uuid) -> Result<Option<GenerationTask>> {
        self.active_generation_task_impl(course_id).await
    }

    async fn update_generation_task(
        &self,
        id: Uuid,
        update: TaskUpdate,
    ) -> Result<Option<GenerationTask>> {
        self.update_generation_task_impl(id, update).await
    }

    async fn cancel_pending_task(&self, id: Uuid) -> Result<bool> {
        self.cancel_pending_task_impl(id).await
    }

    async fn claim_pending_task(&self, id: Uuid) -> Result<bool> {
        self.claim_pending_task_impl(id).await
    }

    async fn fail_interrupted_tasks(&self) -> Result<u64> {
        self.fail_interrupted_tasks_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("coursegen.db").unwrap(),
            "sqlite://coursegen.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").is_ok());
        assert!(SeaOrmStorage::build_database_url("oracle://x").is_err());
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://admin:secret@db:5432/courses"),
            "postgres://admin:***@db:5432/courses"
        );
        assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:test?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://coursegen.db?mode=rwc"));
    }
}
