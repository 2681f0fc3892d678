use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_course_tables::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建生成任务表
        manager
            .create_table(
                Table::create()
                    .table(GenerationTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GenerationTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GenerationTasks::CourseId).uuid().not_null())
                    .col(ColumnDef::new(GenerationTasks::Status).string().not_null())
                    .col(
                        ColumnDef::new(GenerationTasks::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GenerationTasks::CurrentStep)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GenerationTasks::Error).text().null())
                    .col(
                        ColumnDef::new(GenerationTasks::StartedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GenerationTasks::CompletedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GenerationTasks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GenerationTasks::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GenerationTasks::Table, GenerationTasks::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_generation_tasks_course_id")
                    .table(GenerationTasks::Table)
                    .col(GenerationTasks::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GenerationTasks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GenerationTasks {
    #[sea_orm(iden = "generation_tasks")]
    Table,
    Id,
    CourseId,
    Status,
    Progress,
    CurrentStep,
    Error,
    StartedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
