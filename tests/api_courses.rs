#[macro_use]
mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::json;

use common::{build_context, course_payload, read_json};

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service(&$app, $req.to_request()).await
    };
}

macro_rules! create_course {
    ($app:expr) => {{
        let resp = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/courses")
                .set_json(course_payload(false))
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        read_json(resp).await["data"]["course"].clone()
    }};
}

#[actix_web::test]
async fn test_course_crud_lifecycle() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let course = create_course!(app);
    assert_eq!(course["status"], "draft");
    assert_eq!(course["version"], 1);
    assert_eq!(course["language"], "en");
    let id = course["id"].as_str().unwrap().to_string();

    let resp = call!(app, test::TestRequest::get().uri(&format!("/api/v1/courses/{id}")));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["title"], "Introduction to Rust");
    assert_eq!(body["data"]["chapter_count"], 0);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{id}"))
            .set_json(json!({"title": "Rust Ownership", "status": "published"}))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["status"], "published");

    // 更新后详情缓存失效
    let resp = call!(app, test::TestRequest::get().uri(&format!("/api/v1/courses/{id}")));
    let body = read_json(resp).await;
    assert_eq!(body["data"]["title"], "Rust Ownership");

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/courses?page=1&size=10"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], id.as_str());

    let resp = call!(
        app,
        test::TestRequest::get().uri("/api/v1/courses?status=draft")
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    let resp = call!(app, test::TestRequest::delete().uri(&format!("/api/v1/courses/{id}")));
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call!(app, test::TestRequest::get().uri(&format!("/api/v1/courses/{id}")));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_course_reports_all_validation_errors() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let mut payload = course_payload(false);
    payload["title"] = json!("Rs");
    payload["learning_objectives"] = json!([]);
    payload["difficulty_score"] = json!(4.5);

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(payload)
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    let errors = body["data"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("band for beginner")));
}

#[actix_web::test]
async fn test_update_checks_difficulty_band_against_current_level() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);
    let course = create_course!(app);
    let id = course["id"].as_str().unwrap();

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{id}"))
            .set_json(json!({"difficulty_score": 4.0}))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{id}"))
            .set_json(json!({
                "difficulty_score": 4.0,
                "target_audience": {"proficiency_level": "advanced"}
            }))
    );
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_invalid_ids_and_missing_courses() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/courses/not-a-uuid"));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    for uri in [
        format!("/api/v1/courses/{missing}"),
        format!("/api/v1/courses/{missing}/quality"),
        format!("/api/v1/courses/{missing}/export"),
    ] {
        let resp = call!(app, test::TestRequest::get().uri(&uri));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/courses/{missing}"))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{\"title\": ")
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_chapter_management() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);
    let course = create_course!(app);
    let course_id = course["id"].as_str().unwrap();

    let chapter = json!({
        "sequence_number": 1,
        "title": "Getting Started",
        "learning_objectives": ["Install the toolchain"],
        "content": "Rust is a systems language. You will install it and write a first program."
    });
    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/chapters"))
            .set_json(&chapter)
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = read_json(resp).await;
    let chapter_id = created["data"]["id"].as_str().unwrap().to_string();

    // 同一课程内序号唯一
    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/chapters"))
            .set_json(&chapter)
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let mut second = chapter.clone();
    second["sequence_number"] = json!(2);
    second["title"] = json!("Empty Chapter");
    second["content"] = json!("");
    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/chapters"))
            .set_json(&second)
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second_id = read_json(resp).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/chapters/{second_id}"))
            .set_json(json!({"sequence_number": 1}))
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/chapters"))
    );
    let body = read_json(resp).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["sequence_number"], 1);

    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/chapters/{chapter_id}/validate"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    let score = body["data"]["quality_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/chapters/{chapter_id}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["quality_score"].as_f64(), Some(score));
    assert!(body["data"]["subchapters"].is_array());

    let resp = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/chapters/{second_id}/validate"))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/chapters/{second_id}"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/chapters/{second_id}"))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_quiz_and_question_management() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);
    let course = create_course!(app);
    let course_id = course["id"].as_str().unwrap();

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/quizzes"))
            .set_json(json!({
                "title": "Ownership Check",
                "questions": [{
                    "question_type": "true_false",
                    "question_text": "Every value has exactly one owner.",
                    "correct_answer": "true"
                }]
            }))
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["passing_score"], 70.0);
    assert_eq!(body["data"]["questions"][0]["sequence_number"], 1);
    let quiz_id = body["data"]["id"].as_str().unwrap().to_string();

    // 正确答案必须是选项之一
    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/questions"))
            .set_json(json!({
                "question_type": "multiple_choice",
                "question_text": "Which keyword creates a mutable binding?",
                "options": ["let mut", "var"],
                "correct_answer": "mut let"
            }))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/questions"))
            .set_json(json!({
                "question_type": "multiple_choice",
                "question_text": "Which keyword creates a mutable binding?",
                "options": ["let mut", "var"],
                "correct_answer": "let mut",
                "points": 3
            }))
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["sequence_number"], 2);
    let question_id = body["data"]["id"].as_str().unwrap().to_string();

    // 只改选项会让现有答案失效
    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .set_json(json!({"options": ["var", "const"]}))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .set_json(json!({"points": 5}))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["data"]["points"], 5);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/quizzes/{quiz_id}"))
            .set_json(json!({"passing_score": 150.0}))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/quizzes/{quiz_id}"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["questions"].as_array().map(Vec::len), Some(2));

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/questions/{question_id}"))
    );
    assert_eq!(resp.status(), StatusCode::OK);

    // 测验只能关联同一课程的章节
    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/quizzes"))
            .set_json(json!({
                "title": "Wrong Chapter",
                "chapter_id": uuid::Uuid::new_v4()
            }))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/quizzes/{quiz_id}"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/quizzes"))
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_flashcard_management() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);
    let course = create_course!(app);
    let course_id = course["id"].as_str().unwrap();

    for (front, difficulty) in [("Owner", "easy"), ("Borrow", "hard"), ("Lifetime", "hard")] {
        let resp = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/courses/{course_id}/flashcards"))
                .set_json(json!({
                    "front": front,
                    "back": format!("Definition of {front}"),
                    "difficulty": difficulty,
                    "tags": ["Rust", "Basics"]
                }))
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{course_id}/flashcards?difficulty=hard&size=1"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 2);
    assert_eq!(body["data"]["pagination"]["total_pages"], 2);
    let card = body["data"]["items"][0].clone();
    assert_eq!(card["tags"], json!(["rust", "basics"]));
    let card_id = card["id"].as_str().unwrap().to_string();

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/flashcards/{card_id}"))
            .set_json(json!({"back": ""}))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/flashcards/{card_id}"))
            .set_json(json!({"difficulty": "medium"}))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["data"]["difficulty"], "medium");

    let resp = call!(
        app,
        test::TestRequest::delete().uri(&format!("/api/v1/flashcards/{card_id}"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/flashcards/{card_id}"))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_export_formats() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);
    let course = create_course!(app);
    let course_id = course["id"].as_str().unwrap();

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/chapters"))
            .set_json(json!({
                "sequence_number": 1,
                "title": "Getting Started",
                "content": "Install Rust with rustup."
            }))
    );
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/export"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("introduction-to-rust.json"), "{disposition}");
    let body = read_json(resp).await;
    assert_eq!(body["course"]["id"], course_id);
    assert_eq!(body["chapters"][0]["title"], "Getting Started");

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/export?format=markdown"))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/markdown"));
    let text = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(text.starts_with("# Introduction to Rust"));
    assert!(text.contains("Getting Started"));

    let resp = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/courses/{course_id}/export?format=pdf"))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_search_treats_wildcards_literally() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    for title in ["100% Rust", "1000 Rust", "snake_case Rust", "snakeXcase Rust"] {
        let mut payload = course_payload(false);
        payload["title"] = json!(title);
        let resp = call!(
            app,
            test::TestRequest::post().uri("/api/v1/courses").set_json(payload)
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/courses?search=100%25"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "100% Rust");

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/courses?search=snake_case"));
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "snake_case Rust");

    // 普通关键字仍按包含匹配
    let resp = call!(app, test::TestRequest::get().uri("/api/v1/courses?search=Rust"));
    let body = read_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 4);
}

#[actix_web::test]
async fn test_quality_validate_endpoint() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/quality/validate")
            .set_json(json!({
                "content": "## Intro\n\nRust keeps memory safe. For example, the borrow checker rejects dangling references.\n\n## Summary\n\nOwnership matters.",
                "proficiency_level": "beginner",
                "learning_objectives": ["Understand the borrow checker"]
            }))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    let overall = body["data"]["overall"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&overall));
    assert!(body["data"]["passed"].is_boolean());

    let resp = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/quality/validate")
            .set_json(json!({"content": "   "}))
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health_endpoints() {
    let tc = build_context(None).await;
    let app = init_app!(tc.ctx);

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/health"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "ok");

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/health/ready"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["ready"], true);
    assert_eq!(body["data"]["database"]["healthy"], true);
    assert_eq!(body["data"]["ai_providers"], json!([]));

    let resp = call!(app, test::TestRequest::get().uri("/api/v1/health/live"));
    assert_eq!(resp.status(), StatusCode::OK);
}
