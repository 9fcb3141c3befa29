pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::customization::handlers as customization;
use crate::export::handlers as export;
use crate::guided::handlers as guided;
use crate::intake::handlers as intake;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/situations", get(guided::handle_list_situations))
        // Guided writing
        .route("/api/v1/guided", post(guided::handle_create_conversation))
        .route(
            "/api/v1/guided/:id",
            get(guided::handle_get_conversation).delete(guided::handle_delete_conversation),
        )
        .route(
            "/api/v1/guided/:id/situation",
            post(guided::handle_select_situation),
        )
        .route(
            "/api/v1/guided/:id/messages",
            post(guided::handle_send_message),
        )
        .route(
            "/api/v1/guided/:id/synthesize",
            post(guided::handle_synthesize),
        )
        // JD customization
        .route(
            "/api/v1/customizations",
            post(customization::handle_create_customization),
        )
        .route(
            "/api/v1/customizations/:id",
            get(customization::handle_get_customization)
                .delete(customization::handle_delete_customization),
        )
        .route(
            "/api/v1/customizations/:id/base-resume",
            put(customization::handle_set_base_resume),
        )
        .route(
            "/api/v1/customizations/:id/upload",
            post(intake::handle_upload).layer(upload_limit),
        )
        .route(
            "/api/v1/customizations/:id/submit",
            post(customization::handle_submit),
        )
        .route(
            "/api/v1/customizations/:id/export",
            get(export::handle_export),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::export::ExportSettings;
    use crate::intake::{IntakeError, PageTextSource};
    use crate::llm_client::testing::ScriptedGateway;
    use crate::sessions::SessionRegistry;

    const CUSTOMIZATION_REPLY: &str = r####"{
        "customizedResume": "## Jane Doe\n### Experience\n* Rebuilt the order pipeline",
        "greetingMessage": "您好，对您发布的后端工程师岗位很感兴趣。",
        "companyName": "Acme",
        "positionName": "Backend Engineer"
    }"####;

    struct OnePage;

    impl PageTextSource for OnePage {
        fn page_fragments(&self, _bytes: &[u8]) -> Result<Vec<Vec<String>>, IntakeError> {
            Ok(vec![vec!["Jane Doe".to_string(), "Rust".to_string()]])
        }
    }

    fn test_state(gateway: ScriptedGateway) -> AppState {
        AppState {
            config: Config {
                gemini_api_key: "test-key".to_string(),
                gemini_model: "test-model".to_string(),
                host: "127.0.0.1".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                export_font_path: None,
                max_upload_bytes: 1024 * 1024,
            },
            gateway: Arc::new(gateway),
            text_source: Arc::new(OnePage),
            export: Arc::new(ExportSettings::default()),
            conversations: Arc::new(SessionRegistry::default()),
            customizations: Arc::new(SessionRegistry::default()),
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_upload(uri: &str, content_type: &str) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
             Content-Type: {content_type}\r\n\r\n\
             %PDF-1.7 fake\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn create_customization(router: &Router) -> String {
        let response = send(router, Method::POST, "/api/v1/customizations", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let response = send(&router, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "resume-coach");
    }

    #[tokio::test]
    async fn test_lists_four_situations() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let body = json_body(send(&router, Method::GET, "/api/v1/situations", None).await).await;
        let situations = body.as_array().unwrap();
        assert_eq!(situations.len(), 4);
        assert_eq!(situations[0]["id"], "same_role_job_change");
    }

    #[tokio::test]
    async fn test_guided_flow_end_to_end() {
        let gateway = ScriptedGateway::new()
            .with_reply("你目前的职位是什么？")
            .with_reply("能具体说说你的成果吗？")
            .with_reply("## 张三\n### 工作经历\n* 后端开发");
        let router = build_router(test_state(gateway));

        let created = send(&router, Method::POST, "/api/v1/guided", None).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = json_body(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/guided/{id}/situation"),
            Some(json!({"situation": "career_change"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], "你目前的职位是什么？");
        assert_eq!(body["fallback"], false);

        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/guided/{id}/messages"),
            Some(json!({"text": "我是后端工程师"})),
        )
        .await;
        let body = json_body(response).await;
        assert_eq!(body["session"]["transcript"].as_array().unwrap().len(), 4);
        assert_eq!(body["session"]["can_synthesize"], true);

        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/guided/{id}/synthesize"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["document"]["markdown"]
            .as_str()
            .unwrap()
            .contains("工作经历"));
    }

    #[tokio::test]
    async fn test_blank_message_is_bad_request() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let created = send(&router, Method::POST, "/api/v1/guided", None).await;
        let id = json_body(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/guided/{id}/messages"),
            Some(json!({"text": "   "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let uri = format!("/api/v1/customizations/{}", uuid::Uuid::new_v4());
        let response = send(&router, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_deleted_conversation_is_gone() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let created = send(&router, Method::POST, "/api/v1/guided", None).await;
        let id = json_body(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();
        let uri = format!("/api/v1/guided/{id}");

        let deleted = send(&router, Method::DELETE, &uri, None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        let response = send(&router, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_with_blank_job_description_is_rejected() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let id = create_customization(&router).await;
        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/customizations/{id}/submit"),
            Some(json!({"base_resume": "resume", "job_description": ""})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_then_export_pdf() {
        let router = build_router(test_state(
            ScriptedGateway::new().with_reply(CUSTOMIZATION_REPLY),
        ));
        let id = create_customization(&router).await;

        let response = send(
            &router,
            Method::POST,
            &format!("/api/v1/customizations/{id}/submit"),
            Some(json!({"base_resume": "Jane Doe, Rust", "job_description": "Backend role"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["fallback"], false);
        assert_eq!(body["result"]["companyName"], "Acme");

        let response = send(
            &router,
            Method::GET,
            &format!("/api/v1/customizations/{id}/export"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("filename*=UTF-8''Acme-Backend%20Engineer-"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_export_of_chinese_resume_without_font_is_an_error() {
        let reply = CUSTOMIZATION_REPLY.replace("Jane Doe", "张三");
        let router = build_router(test_state(ScriptedGateway::new().with_reply(reply)));
        let id = create_customization(&router).await;
        send(
            &router,
            Method::POST,
            &format!("/api/v1/customizations/{id}/submit"),
            Some(json!({"base_resume": "张三", "job_description": "后端"})),
        )
        .await;

        let response = send(
            &router,
            Method::GET,
            &format!("/api/v1/customizations/{id}/export"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"]["code"], "EXPORT_ERROR");
    }

    #[test]
    fn test_create_handlers_are_send() {
        fn assert_send<T: Send>(_: T) {}
        let state = test_state(ScriptedGateway::new());
        assert_send(guided::handle_create_conversation(axum::extract::State(
            state.clone(),
        )));
        assert_send(customization::handle_create_customization(
            axum::extract::State(state),
        ));
    }

    #[tokio::test]
    async fn test_export_before_submit_is_not_found() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let id = create_customization(&router).await;
        let response = send(
            &router,
            Method::GET,
            &format!("/api/v1/customizations/{id}/export"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pdf_upload_replaces_base_resume() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let id = create_customization(&router).await;

        let response = router
            .clone()
            .oneshot(multipart_upload(
                &format!("/api/v1/customizations/{id}/upload"),
                "application/pdf",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["text"], "Jane Doe Rust");

        let uri = format!("/api/v1/customizations/{id}");
        let snapshot = json_body(send(&router, Method::GET, &uri, None).await).await;
        assert_eq!(snapshot["base_resume"], "Jane Doe Rust");
        assert_eq!(snapshot["base_resume_source"], "cv.pdf");
    }

    #[tokio::test]
    async fn test_rejected_upload_clears_base_resume() {
        let router = build_router(test_state(ScriptedGateway::new()));
        let id = create_customization(&router).await;
        let uri = format!("/api/v1/customizations/{id}");
        send(
            &router,
            Method::PUT,
            &format!("{uri}/base-resume"),
            Some(json!({"text": "typed resume"})),
        )
        .await;

        let response = router
            .clone()
            .oneshot(multipart_upload(&format!("{uri}/upload"), "image/png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "INTAKE_ERROR");

        let snapshot = json_body(send(&router, Method::GET, &uri, None).await).await;
        assert_eq!(snapshot["base_resume"], "");
    }
}
