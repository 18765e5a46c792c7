pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching & applications
        .route(
            "/api/v1/employees/:employee_id/match/:requirement_id",
            get(matching::handle_score_match),
        )
        .route(
            "/api/v1/applications/validate",
            get(matching::handle_validate_application),
        )
        .route("/api/v1/applications", post(matching::handle_apply))
        .route(
            "/api/v1/requirements/by-skills",
            post(matching::handle_requirements_by_skills),
        )
        .route(
            "/api/v1/requirements/:id/applications",
            get(matching::handle_requirement_applications),
        )
        .route(
            "/api/v1/requirements/:id/matches",
            get(matching::handle_requirement_matches),
        )
        // Search
        .route("/api/v1/search", post(search::handle_structured_search))
        .route("/api/v1/search/natural", post(search::handle_natural_search))
        .route("/api/v1/search/history", get(search::handle_search_history))
        .route(
            "/api/v1/search/saved",
            get(search::handle_saved_searches).post(search::handle_save_search),
        )
        .route(
            "/api/v1/search/saved/:id",
            delete(search::handle_delete_saved_search),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::matching::policy::ScoringPolicy;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{employee, requirement, taxonomy_skill, StubParser};

    fn test_state() -> AppState {
        let store = MemoryStore::new(
            vec![
                employee(1, "Ana", 8.0, &[(1, "Python", 5.0), (2, "AWS", 3.0)]),
                employee(2, "Bo", 4.0, &[(3, "React", 5.0)]),
            ],
            vec![requirement(
                10,
                &[(1, "Python", 3.0, true, 2), (2, "AWS", 5.0, true, 1)],
            )],
        )
        .with_taxonomy(vec![
            taxonomy_skill(1, "Python", "Programming", &[]),
            taxonomy_skill(2, "AWS", "Cloud", &[]),
            taxonomy_skill(3, "React", "Frontend", &[]),
        ]);

        AppState {
            store: Arc::new(store),
            parser: Arc::new(StubParser::unhealthy()),
            config: Config {
                database_url: "postgres://unused".into(),
                db_max_connections: 1,
                nlp_service_url: "http://127.0.0.1:9".into(),
                nlp_timeout_secs: 1,
                port: 0,
                rust_log: "info".into(),
            },
            policy: Arc::new(ScoringPolicy::default()),
        }
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(build_router(test_state()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "talent-api");
    }

    #[tokio::test]
    async fn test_score_match_route() {
        let (status, body) = send(
            build_router(test_state()),
            Method::GET,
            "/api/v1/employees/1/match/10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["match_percentage"], 76.67);
        assert_eq!(body["skill_gaps"][0]["skill_name"], "AWS");
    }

    #[tokio::test]
    async fn test_unknown_employee_is_404_envelope() {
        let (status, body) = send(
            build_router(test_state()),
            Method::GET,
            "/api/v1/employees/404/match/10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validate_route() {
        let (status, body) = send(
            build_router(test_state()),
            Method::GET,
            "/api/v1/applications/validate?employee_id=1&requirement_id=10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendation"], "Good fit");
        assert_eq!(body["ai_score"], 86.0);
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts() {
        let app = build_router(test_state());
        let payload = json!({"employee_id": 1, "requirement_id": 10});

        let (status, _) = send(app.clone(), Method::POST, "/api/v1/applications", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(app.clone(), Method::POST, "/api/v1/applications", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, body) = send(app, Method::GET, "/api/v1/requirements/10/applications", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_natural_search_falls_back_and_records_history() {
        let app = build_router(test_state());
        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/v1/search/natural",
            Some(json!({"query": "react developers", "searched_by_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], true);
        assert_eq!(body["candidates"][0]["employee_id"], 2);

        let (status, body) = send(app, Method::GET, "/api/v1/search/history?user_id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["search_query"], "react developers");
    }

    #[tokio::test]
    async fn test_empty_natural_query_is_400() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/search/natural",
            Some(json!({"query": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_structured_search_route() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/search",
            Some(json!({"skills": ["Python"], "min_years_experience": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["candidates"][0]["match_percentage"], 100.0);
    }

    #[tokio::test]
    async fn test_saved_search_lifecycle() {
        let app = build_router(test_state());
        let (status, saved) = send(
            app.clone(),
            Method::POST,
            "/api/v1/search/saved",
            Some(json!({
                "searched_by_id": 1,
                "saved_search_name": "Cloud folks",
                "search_query": "aws engineers"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = saved["search_id"].as_i64().unwrap();

        let (_, list) = send(app.clone(), Method::GET, "/api/v1/search/saved?user_id=1", None).await;
        assert_eq!(list.as_array().map(Vec::len), Some(1));

        let uri = format!("/api/v1/search/saved/{id}");
        let (status, _) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requirements_by_skills_route() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/requirements/by-skills",
            Some(json!({"skills": ["Python", "AWS"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["coverage_percentage"], 100);
    }
}
