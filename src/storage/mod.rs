use std::sync::Arc;

use uuid::Uuid;

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

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 健康检查
    async fn ping(&self) -> Result<()>;

    /// 课程管理方法
    // 创建课程（状态为 draft，版本为 1）
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    // 通过ID获取课程
    async fn get_course_by_id(&self, id: Uuid) -> Result<Option<Course>>;
    // 分页列出课程
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    // 更新课程，版本号加一
    async fn update_course(&self, id: Uuid, update: UpdateCourseRequest)
    -> Result<Option<Course>>;
    // 删除课程（级联删除章节、测验、闪卡和任务）
    async fn delete_course(&self, id: Uuid) -> Result<bool>;
    // 更新课程状态
    async fn set_course_status(&self, id: Uuid, status: CourseStatus) -> Result<bool>;
    // 生成完成：写入质量指标，状态置为 ready，版本号加一
    async fn complete_course_generation(
        &self,
        id: Uuid,
        metrics: QualityMetrics,
    ) -> Result<Option<Course>>;
    // 在一个事务里用新生成的内容替换课程原有的章节、测验和闪卡
    async fn replace_course_content(&self, course_id: Uuid, content: GeneratedContent)
    -> Result<()>;

    /// 章节管理方法
    async fn create_chapter(&self, course_id: Uuid, chapter: CreateChapterRequest)
    -> Result<Chapter>;
    async fn get_chapter_by_id(&self, id: Uuid) -> Result<Option<Chapter>>;
    // 按序号列出课程的章节
    async fn list_chapters(&self, course_id: Uuid) -> Result<Vec<Chapter>>;
    async fn list_subchapters(&self, chapter_id: Uuid) -> Result<Vec<Subchapter>>;
    async fn update_chapter(
        &self,
        id: Uuid,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>>;
    async fn delete_chapter(&self, id: Uuid) -> Result<bool>;
    async fn set_chapter_quality_score(&self, id: Uuid, score: f64) -> Result<bool>;
    // 检查课程内序号是否已被其他章节占用
    async fn chapter_sequence_taken(
        &self,
        course_id: Uuid,
        sequence_number: i32,
        exclude_chapter: Option<Uuid>,
    ) -> Result<bool>;

    /// 测验管理方法
    // 创建测验，可同时创建题目
    async fn create_quiz(&self, course_id: Uuid, quiz: CreateQuizRequest) -> Result<QuizDetail>;
    async fn get_quiz_by_id(&self, id: Uuid) -> Result<Option<Quiz>>;
    async fn list_quizzes(&self, course_id: Uuid) -> Result<Vec<Quiz>>;
    async fn count_quizzes(&self, course_id: Uuid) -> Result<u64>;
    async fn update_quiz(&self, id: Uuid, update: UpdateQuizRequest) -> Result<Option<Quiz>>;
    async fn delete_quiz(&self, id: Uuid) -> Result<bool>;
    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>>;
    async fn add_question(&self, quiz_id: Uuid, question: CreateQuestionRequest)
    -> Result<Question>;
    async fn get_question_by_id(&self, id: Uuid) -> Result<Option<Question>>;
    // 用合并后的完整数据覆盖题目
    async fn update_question(
        &self,
        id: Uuid,
        question: CreateQuestionRequest,
    ) -> Result<Option<Question>>;
    async fn delete_question(&self, id: Uuid) -> Result<bool>;

    /// 闪卡管理方法
    async fn create_flashcard(
        &self,
        course_id: Uuid,
        card: CreateFlashcardRequest,
    ) -> Result<Flashcard>;
    async fn get_flashcard_by_id(&self, id: Uuid) -> Result<Option<Flashcard>>;
    async fn list_flashcards_with_pagination(
        &self,
        course_id: Uuid,
        query: FlashcardListQuery,
    ) -> Result<FlashcardListResponse>;
    // 导出用，不分页
    async fn list_all_flashcards(&self, course_id: Uuid) -> Result<Vec<Flashcard>>;
    async fn count_flashcards(&self, course_id: Uuid) -> Result<u64>;
    async fn update_flashcard(
        &self,
        id: Uuid,
        update: UpdateFlashcardRequest,
    ) -> Result<Option<Flashcard>>;
    async fn delete_flashcard(&self, id: Uuid) -> Result<bool>;

    /// 生成任务方法
    async fn create_generation_task(&self, course_id: Uuid) -> Result<GenerationTask>;
    async fn get_generation_task(&self, id: Uuid) -> Result<Option<GenerationTask>>;
    // 课程最近一次的任务
    async fn latest_generation_task(&self, course_id: Uuid) -> Result<Option<GenerationTask>>;
    // 课程当前排队中或执行中的任务
    async fn active_generation_task(&self, course_id: Uuid) -> Result<Option<GenerationTask>>;
    async fn update_generation_task(
        &self,
        id: Uuid,
        update: TaskUpdate,
    ) -> Result<Option<GenerationTask>>;
    // 只有 pending 状态的任务可以取消；返回是否取消成功
    async fn cancel_pending_task(&self, id: Uuid) -> Result<bool>;
    // 原子地把 pending 任务切换为 running；返回是否由调用方领取成功
    async fn claim_pending_task(&self, id: Uuid) -> Result<bool>;
    // 启动时把上次进程遗留的未完成任务标记为失败
    async fn fail_interrupted_tasks(&self) -> Result<u64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 使用显式配置创建存储（测试中用于内存 SQLite）
pub async fn create_storage_with(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(config).await?;
    Ok(Arc::new(storage))
}
