//! 预导入模块，方便使用

pub use super::chapters::{
    ActiveModel as ChapterActiveModel, Entity as Chapters, Model as ChapterModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::flashcards::{
    ActiveModel as FlashcardActiveModel, Entity as Flashcards, Model as FlashcardModel,
};
pub use super::generation_tasks::{
    ActiveModel as GenerationTaskActiveModel, Entity as GenerationTasks,
    Model as GenerationTaskModel,
};
pub use super::questions::{
    ActiveModel as QuestionActiveModel, Entity as Questions, Model as QuestionModel,
};
pub use super::quizzes::{ActiveModel as QuizActiveModel, Entity as Quizzes, Model as QuizModel};
pub use super::subchapters::{
    ActiveModel as SubchapterActiveModel, Entity as Subchapters, Model as SubchapterModel,
};
