#[macro_use]
mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use tokio::sync::Notify;

use rust_coursegen::generation::GenerationPipeline;
use rust_coursegen::models::courses::entities::{CourseStatus, ProficiencyLevel};
use rust_coursegen::models::courses::requests::CreateCourseRequest;
use rust_coursegen::models::generation::entities::TaskStatus;
use rust_coursegen::quality::QualityValidator;
use rust_coursegen::storage::Storage;

use common::{
    REGENERATION_MARKER, ScriptedProvider, WEAK_DRAFT, build_context, build_context_with,
    chapter_response, course_payload, read_json, test_config, wait_until_generating,
};

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service(&$app, $req.to_request()).await
    };
}

macro_rules! create_course {
    ($app:expr, $generate:expr) => {{
        let resp = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/courses")
                .set_json(course_payload($generate))
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        read_json(resp).await["data"].clone()
    }};
}

#[actix_web::test]
async fn test_generation_end_to_end() {
    let tc = build_context(Some(ScriptedProvider::new())).await;
    let app = init_app!(tc.ctx);

    let created = create_course!(app, true);
    assert_eq!(created["task"]["status"], "pending");
    let course_id = created["course"]["id"].as_str().unwrap().to_string();

    let status = wait_for_task!(app, course_id);
    assert_eq!(status["data"]["status"], "completed", "{status}");
    assert_eq!(status["data"]["progress"], 100);
    assert!(status["data"]["completed_at"].is_string());

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "ready");
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["chapter_count"], 2);
    assert_eq!(body["data"]["quiz_count"], 2);
    assert_eq!(body["data"]["flashcard_count"], 4);
    assert_eq!(body["data"]["chapters"][0]["title"], "Ownership Basics");
    assert_eq!(body["data"]["chapters"][1]["sequence_number"], 2);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/chapters"))
    );
    let body = read_json(resp).await;
    let first_chapter = body["data"]["items"][0].clone();
    assert!(first_chapter["content"].as_str().unwrap().contains("## Summary"));
    assert!(first_chapter["quality_score"].is_number());
    let chapter_id = first_chapter["id"].as_str().unwrap();

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/chapters/{chapter_id}"))
    );
    let body = read_json(resp).await;
    let subchapters = body["data"]["subchapters"].as_array().unwrap();
    assert!(subchapters.iter().any(|s| s["title"] == "Summary"));

    // 无效题目被丢弃
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/quizzes"))
    );
    let body = read_json(resp).await;
    let quiz = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["title"] == "Ownership Basics Quiz")
        .cloned()
        .expect("quiz for the first chapter");
    assert_eq!(quiz["quiz_type"], "formative");
    assert_eq!(quiz["passing_score"], 70.0);
    let quiz_id = quiz["id"].as_str().unwrap();
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/quizzes/{quiz_id}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["questions"].as_array().map(Vec::len), Some(2));

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/flashcards"))
    );
    let body = read_json(resp).await;
    let tags: Vec<_> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["tags"].clone())
        .collect();
    assert!(tags.contains(&json!(["ownership"])));
    assert!(tags.contains(&json!(["references"])));

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/quality"))
    );
    let body = read_json(resp).await;
    let metrics = &body["data"]["quality_metrics"];
    assert!(metrics.is_object(), "{body}");

    assert_eq!(tc.vector_store.len(), 2);
    let resp = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{course_id}/search?q=ownership&top_k=1"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["course_id"], course_id.as_str());

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/search?q="))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_generation_disabled_without_ai_provider() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let created = create_course!(app, true);
    assert!(created["task"].is_null());
    assert_eq!(created["course"]["status"], "draft");
    let course_id = created["course"]["id"].as_str().unwrap().to_string();

    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/courses/{course_id}/generate"))
    );
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/generation-status"))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_failed_generation_marks_course_and_task() {
    let tc = build_context(Some(ScriptedProvider::failing())).await;
    let app = init_app!(tc.ctx);

    let created = create_course!(app, true);
    let course_id = created["course"]["id"].as_str().unwrap().to_string();

    let status = wait_for_task!(app, course_id);
    assert_eq!(status["data"]["status"], "failed");
    assert!(
        status["data"]["error"]
            .as_str()
            .unwrap_or_default()
            .contains("model returned 500")
    );

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "failed");
    assert_eq!(body["data"]["chapter_count"], 0);
}

#[actix_web::test]
async fn test_active_generation_blocks_conflicting_requests() {
    let gate = Arc::new(Notify::new());
    let tc = build_context(Some(ScriptedProvider::gated(gate.clone()))).await;
    let app = init_app!(tc.ctx);

    let created = create_course!(app, true);
    let course_id = created["course"]["id"].as_str().unwrap().to_string();
    let id = uuid::Uuid::parse_str(&course_id).unwrap();
    assert!(wait_until_generating(&tc.ctx, id).await);

    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/courses/{course_id}/generate"))
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/courses/{course_id}"))
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{course_id}"))
            .set_json(json!({"title": "Renamed while generating"}))
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // 只改节奏不影响生成
    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{course_id}"))
            .set_json(json!({"pacing_preference": "intensive"}))
    );
    assert_eq!(resp.status(), StatusCode::OK);

    gate.notify_one();
    let status = wait_for_task!(app, course_id);
    assert_eq!(status["data"]["status"], "completed");

    // 完成后可以重新生成
    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/courses/{course_id}/generate"))
    );
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    gate.notify_one();
    let status = wait_for_task!(app, course_id);
    assert_eq!(status["data"]["status"], "completed");

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}"))
    );
    let body = read_json(resp).await;
    // 重新生成替换旧内容而不是追加
    assert_eq!(body["data"]["chapter_count"], 2);
    assert_eq!(body["data"]["flashcard_count"], 4);
}

#[actix_web::test]
async fn test_cancel_pending_task() {
    let gate = Arc::new(Notify::new());
    let tc = build_context(Some(ScriptedProvider::gated(gate.clone()))).await;
    let app = init_app!(tc.ctx);

    let first = create_course!(app, true);
    let first_id = uuid::Uuid::parse_str(first["course"]["id"].as_str().unwrap()).unwrap();
    assert!(wait_until_generating(&tc.ctx, first_id).await);

    // 唯一的 worker 被占用，第二个任务停在队列里
    let second = create_course!(app, true);
    let second_course = second["course"]["id"].as_str().unwrap().to_string();
    let task_id = second["task"]["id"].as_str().unwrap().to_string();

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/tasks/{task_id}"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "cancelled");

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/tasks/{task_id}"))
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/tasks/{}", uuid::Uuid::new_v4()))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    gate.notify_one();
    let status = wait_for_task!(app, first_id);
    assert_eq!(status["data"]["status"], "completed");

    // worker 取到已取消的任务后直接跳过
    let resp = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{second_course}/generation-status"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "cancelled");
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{second_course}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "draft");
}

#[actix_web::test]
async fn test_full_queue_rejects_generation() {
    let gate = Arc::new(Notify::new());
    let mut config = test_config();
    config.generation.queue_capacity = 1;
    let tc = build_context_with(config, Some(ScriptedProvider::gated(gate.clone()))).await;
    let app = init_app!(tc.ctx);

    let running = create_course!(app, true);
    let running_id = uuid::Uuid::parse_str(running["course"]["id"].as_str().unwrap()).unwrap();
    assert!(wait_until_generating(&tc.ctx, running_id).await);

    let queued = create_course!(app, true);
    assert_eq!(queued["task"]["status"], "pending");

    let rejected = create_course!(app, false);
    let rejected_id = rejected["course"]["id"].as_str().unwrap().to_string();
    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/courses/{rejected_id}/generate"))
    );
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(resp).await;
    assert_eq!(
        body["code"],
        rust_coursegen::models::ErrorCode::GenerationQueueFull as i32
    );

    // 被拒绝的任务不会一直处于活动状态
    let resp = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{rejected_id}/generation-status"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "failed");

    gate.notify_one();
}

#[actix_web::test]
async fn test_rejected_draft_is_rewritten_with_feedback() {
    let provider = ScriptedProvider::drafting();
    let prompts = provider.prompt_log();
    let mut config = test_config();
    config.generation.max_regeneration_attempts = 1;
    let tc = build_context_with(config, Some(provider)).await;
    let app = init_app!(tc.ctx);

    let created = create_course!(app, true);
    let course_id = uuid::Uuid::parse_str(created["course"]["id"].as_str().unwrap()).unwrap();
    let status = wait_for_task!(app, course_id);
    assert_eq!(status["data"]["status"], "completed");

    let chapter_prompts: Vec<String> = prompts
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.starts_with("Write the full content of a chapter"))
        .filter(|p| p.contains("Chapter title: Ownership Basics"))
        .cloned()
        .collect();
    assert_eq!(chapter_prompts.len(), 2);
    assert!(!chapter_prompts[0].contains(REGENERATION_MARKER));

    // 第二次请求带上初稿的质量问题
    let objectives = vec!["Understand ownership and borrowing".to_string()];
    let validator = QualityValidator::default();
    let first = validator.evaluate(WEAK_DRAFT, ProficiencyLevel::Beginner, &objectives);
    assert!(!first.passed);
    assert!(!first.issues.is_empty());
    assert!(chapter_prompts[1].contains(REGENERATION_MARKER));
    for issue in &first.issues {
        assert!(chapter_prompts[1].contains(issue.as_str()), "missing issue: {issue}");
    }

    // 保存得分更高的一稿
    let rewrite = chapter_response(&chapter_prompts[1]);
    let rewrite = rewrite.trim();
    let second = validator.evaluate(rewrite, ProficiencyLevel::Beginner, &objectives);
    let (best_text, best_score) = if second.overall > first.overall {
        (rewrite, second.overall)
    } else {
        (WEAK_DRAFT, first.overall)
    };

    let chapters = tc.ctx.storage.list_chapters(course_id).await.unwrap();
    let stored = chapters
        .iter()
        .find(|c| c.title == "Ownership Basics")
        .unwrap();
    assert_eq!(stored.content, best_text);
    assert!((stored.quality_score.unwrap() - best_score).abs() < 1e-9);
}

#[actix_web::test]
async fn test_pipeline_leaves_cancelled_task_untouched() {
    let tc = build_context(Some(ScriptedProvider::new())).await;
    let storage = tc.ctx.storage.clone();

    let request: CreateCourseRequest = serde_json::from_value(course_payload(false)).unwrap();
    let course = storage.create_course(request).await.unwrap();
    let task = storage.create_generation_task(course.id).await.unwrap();
    assert!(storage.cancel_pending_task(task.id).await.unwrap());

    // 任务从未入队，直接交给流水线，模拟 worker 取到任务时它已被取消
    let pipeline = GenerationPipeline::new(
        storage.clone(),
        tc.ctx.ai.clone(),
        tc.ctx.vector_store.clone(),
        tc.ctx.cache.clone(),
        (*tc.ctx.validator).clone(),
        test_config().generation,
    );
    assert!(!pipeline.run(course.id, task.id).await.unwrap());

    let task = storage.get_generation_task(task.id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.started_at.is_none());
    let course = storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(course.status, CourseStatus::Draft);
    assert_eq!(course.version, 1);
    assert!(storage.list_chapters(course.id).await.unwrap().is_empty());
    assert_eq!(tc.vector_store.len(), 0);

    // 同一任务不能被领取两次
    let fresh = storage.create_generation_task(course.id).await.unwrap();
    assert!(storage.claim_pending_task(fresh.id).await.unwrap());
    assert!(!storage.claim_pending_task(fresh.id).await.unwrap());
    let fresh = storage.get_generation_task(fresh.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, TaskStatus::Running);
    assert!(fresh.started_at.is_some());
}
