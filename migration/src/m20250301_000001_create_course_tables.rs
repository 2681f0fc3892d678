use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::SubjectDomain).string().not_null())
                    .col(ColumnDef::new(Courses::TargetAudience).json().not_null())
                    .col(
                        ColumnDef::new(Courses::ProficiencyLevel)
                            .string()
                            .not_null()
                            .default("beginner"),
                    )
                    .col(ColumnDef::new(Courses::LearningObjectives).json().not_null())
                    .col(
                        ColumnDef::new(Courses::EstimatedDurationHours)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::DifficultyScore).double().not_null())
                    .col(ColumnDef::new(Courses::PacingPreference).string().not_null())
                    .col(
                        ColumnDef::new(Courses::Language)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(Courses::Status).string().not_null())
                    .col(
                        ColumnDef::new(Courses::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Courses::QualityMetrics).json().null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建章节表
        manager
            .create_table(
                Table::create()
                    .table(Chapters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Chapters::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Chapters::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Chapters::SequenceNumber).integer().not_null())
                    .col(ColumnDef::new(Chapters::Title).string().not_null())
                    .col(
                        ColumnDef::new(Chapters::LearningObjectives)
                            .json()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Chapters::ContentType).string().not_null())
                    .col(
                        ColumnDef::new(Chapters::EstimatedDurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Chapters::ComplexityLevel).double().not_null())
                    .col(ColumnDef::new(Chapters::Prerequisites).json().not_null())
                    .col(ColumnDef::new(Chapters::Content).text().not_null())
                    .col(ColumnDef::new(Chapters::ContentBlocks).json().not_null())
                    .col(ColumnDef::new(Chapters::QualityScore).double().null())
                    .col(ColumnDef::new(Chapters::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Chapters::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Chapters::Table, Chapters::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建小节表
        manager
            .create_table(
                Table::create()
                    .table(Subchapters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subchapters::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subchapters::ChapterId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subchapters::SequenceNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subchapters::Title).string().not_null())
                    .col(ColumnDef::new(Subchapters::Content).text().not_null())
                    .col(ColumnDef::new(Subchapters::KeyConcepts).json().not_null())
                    .col(ColumnDef::new(Subchapters::Summary).text().null())
                    .col(
                        ColumnDef::new(Subchapters::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subchapters::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Subchapters::Table, Subchapters::ChapterId)
                            .to(Chapters::Table, Chapters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建测验表
        manager
            .create_table(
                Table::create()
                    .table(Quizzes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quizzes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Quizzes::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Quizzes::ChapterId).uuid().null())
                    .col(ColumnDef::new(Quizzes::Title).string().not_null())
                    .col(ColumnDef::new(Quizzes::Description).text().null())
                    .col(ColumnDef::new(Quizzes::QuizType).string().not_null())
                    .col(ColumnDef::new(Quizzes::PassingScore).double().not_null())
                    .col(ColumnDef::new(Quizzes::TimeLimitMinutes).integer().null())
                    .col(ColumnDef::new(Quizzes::MaxAttempts).integer().null())
                    .col(ColumnDef::new(Quizzes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quizzes::Table, Quizzes::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quizzes::Table, Quizzes::ChapterId)
                            .to(Chapters::Table, Chapters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建题目表
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Questions::QuizId).uuid().not_null())
                    .col(
                        ColumnDef::new(Questions::SequenceNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Questions::QuestionType).string().not_null())
                    .col(ColumnDef::new(Questions::QuestionText).text().not_null())
                    .col(ColumnDef::new(Questions::Options).json().not_null())
                    .col(ColumnDef::new(Questions::CorrectAnswer).text().not_null())
                    .col(ColumnDef::new(Questions::Explanation).text().null())
                    .col(ColumnDef::new(Questions::Difficulty).string().not_null())
                    .col(ColumnDef::new(Questions::Points).integer().not_null())
                    .col(ColumnDef::new(Questions::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Questions::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Questions::Table, Questions::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建闪卡表
        manager
            .create_table(
                Table::create()
                    .table(Flashcards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flashcards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flashcards::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Flashcards::ChapterId).uuid().null())
                    .col(ColumnDef::new(Flashcards::Front).text().not_null())
                    .col(ColumnDef::new(Flashcards::Back).text().not_null())
                    .col(ColumnDef::new(Flashcards::Difficulty).string().not_null())
                    .col(ColumnDef::new(Flashcards::Tags).json().not_null())
                    .col(
                        ColumnDef::new(Flashcards::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Flashcards::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Flashcards::Table, Flashcards::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Flashcards::Table, Flashcards::ChapterId)
                            .to(Chapters::Table, Chapters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_chapters_course_sequence")
                    .table(Chapters::Table)
                    .col(Chapters::CourseId)
                    .col(Chapters::SequenceNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subchapters_chapter_id")
                    .table(Subchapters::Table)
                    .col(Subchapters::ChapterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quizzes_course_id")
                    .table(Quizzes::Table)
                    .col(Quizzes::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_questions_quiz_id")
                    .table(Questions::Table)
                    .col(Questions::QuizId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_flashcards_course_id")
                    .table(Flashcards::Table)
                    .col(Flashcards::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_status")
                    .table(Courses::Table)
                    .col(Courses::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Flashcards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quizzes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subchapters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chapters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    Title,
    Description,
    SubjectDomain,
    TargetAudience,
    ProficiencyLevel,
    LearningObjectives,
    EstimatedDurationHours,
    DifficultyScore,
    PacingPreference,
    Language,
    Status,
    Version,
    QualityMetrics,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Chapters {
    #[sea_orm(iden = "chapters")]
    Table,
    Id,
    CourseId,
    SequenceNumber,
    Title,
    LearningObjectives,
    ContentType,
    EstimatedDurationMinutes,
    ComplexityLevel,
    Prerequisites,
    Content,
    ContentBlocks,
    QualityScore,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subchapters {
    #[sea_orm(iden = "subchapters")]
    Table,
    Id,
    ChapterId,
    SequenceNumber,
    Title,
    Content,
    KeyConcepts,
    Summary,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Quizzes {
    #[sea_orm(iden = "quizzes")]
    Table,
    Id,
    CourseId,
    ChapterId,
    Title,
    Description,
    QuizType,
    PassingScore,
    TimeLimitMinutes,
    MaxAttempts,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Questions {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    QuizId,
    SequenceNumber,
    QuestionType,
    QuestionText,
    Options,
    CorrectAnswer,
    Explanation,
    Difficulty,
    Points,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Flashcards {
    #[sea_orm(iden = "flashcards")]
    Table,
    Id,
    CourseId,
    ChapterId,
    Front,
    Back,
    Difficulty,
    Tags,
    CreatedAt,
    UpdatedAt,
}
