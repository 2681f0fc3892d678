pub mod chapters;
pub mod courses;
pub mod flashcards;
pub mod health;
pub mod quality;
pub mod quizzes;
pub mod tasks;

pub use chapters::configure_chapter_routes;
pub use courses::configure_course_routes;
pub use flashcards::configure_flashcard_routes;
pub use health::configure_health_routes;
pub use quality::configure_quality_routes;
pub use quizzes::configure_quiz_routes;
pub use tasks::configure_task_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_course_routes)
        .configure(configure_chapter_routes)
        .configure(configure_quiz_routes)
        .configure(configure_flashcard_routes)
        .configure(configure_task_routes)
        .configure(configure_quality_routes);
}
