//! 路径参数提取器
//!
//! 路径里的 ID 不是合法 UUID 时直接返回 400，而不是交给 actix 默认的 404。

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::models::{ApiResponse, ErrorCode};

fn parse_path_uuid(req: &HttpRequest, name: &str) -> Result<Uuid, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    Uuid::parse_str(raw).map_err(|_| {
        let message = format!("Invalid {name}: '{raw}' is not a valid UUID");
        let response = HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message.clone()));
        InternalError::from_response(message, response).into()
    })
}

macro_rules! define_safe_uuid {
    ($($name:ident => $param:literal),+ $(,)?) => {
        $(
            #[doc = concat!("路径参数 `{", $param, "}`")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub Uuid);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                    ready(parse_path_uuid(req, $param).map($name))
                }
            }
        )+
    };
}

define_safe_uuid! {
    SafeCourseId => "course_id",
    SafeChapterId => "chapter_id",
    SafeQuizId => "quiz_id",
    SafeQuestionId => "question_id",
    SafeFlashcardId => "flashcard_id",
    SafeTaskId => "task_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_uuid_is_extracted() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .param("course_id", id.to_string())
            .to_http_request();
        let extracted = SafeCourseId::extract(&req).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[actix_web::test]
    async fn test_invalid_uuid_is_bad_request() {
        let req = TestRequest::default()
            .param("chapter_id", "not-a-uuid")
            .to_http_request();
        let err = SafeChapterId::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::BAD_REQUEST);
    }
}
