pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/jobs/hiring-filter",
            post(handlers::handle_hiring_filter),
        )
        .route("/api/v1/jobs/filter", post(handlers::handle_filter))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;

    fn app() -> Router {
        let config = Config::from_vars(|_| None).unwrap();
        build_router(AppState::new(config).unwrap())
    }

    async fn post_raw(uri: &str, body: Value) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, text) = post_raw(uri, body).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    fn listing(id: &str, title: &str, description: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "company": "Globex",
            "location": "Lisbon",
            "type": "full-time",
            "description": description,
            "url": format!("https://jobs.example.com/{id}"),
            "source": "indeed",
            "searchRank": 1
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_scores_with_heuristic_and_keeps_extra_fields() {
        let (status, body) = post_json(
            "/api/v1/jobs/analyze",
            json!({
                "listings": [listing("1", "Rust Engineer", "Rust services")],
                "criteria": { "userQuery": "rust", "skills": "rust" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let scored = &body["listings"][0];
        assert_eq!(scored["score"], 100);
        assert_eq!(scored["passes"], true);
        assert_eq!(scored["scoredBy"], "heuristic");
        assert_eq!(scored["searchRank"], 1);
        assert_eq!(body["warnings"], json!([]));
    }

    #[tokio::test]
    async fn test_reanalyzed_listing_repeats_no_derived_key() {
        let (status, text) = post_raw(
            "/api/v1/jobs/analyze",
            json!({
                "listings": [{
                    "id": "1",
                    "title": "Rust Dev",
                    "score": 5,
                    "passes": false,
                    "reasons": ["stale"],
                    "scoredBy": "judge",
                    "isHiringPost": false
                }],
                "criteria": { "userQuery": "rust" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        for key in ["score", "passes", "reasons", "scoredBy"] {
            assert_eq!(text.matches(&format!("\"{key}\":")).count(), 1, "{key} in {text}");
        }
        assert!(!text.contains("isHiringPost"));
        assert!(!text.contains("stale"));

        let (status, text) = post_raw(
            "/api/v1/jobs/hiring-filter",
            json!({
                "listings": [{
                    "id": "1",
                    "title": "Now hiring",
                    "isHiringPost": false,
                    "classifiedBy": "judge"
                }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(text.matches("\"isHiringPost\":").count(), 1, "{text}");
        assert_eq!(text.matches("\"classifiedBy\":").count(), 1, "{text}");
        assert!(text.contains("\"isHiringPost\":true"));
    }

    #[tokio::test]
    async fn test_null_fields_do_not_reject_the_batch() {
        let (status, body) = post_json(
            "/api/v1/jobs/analyze",
            json!({
                "listings": [
                    { "id": "1", "title": "Rust Dev", "company": "Acme" },
                    { "id": "2", "title": "Go Dev", "company": null, "description": null }
                ],
                "criteria": { "userQuery": "dev" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let listings = body["listings"].as_array().unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1]["company"], "");
        assert_eq!(listings[1]["score"], 80);
    }

    #[tokio::test]
    async fn test_invalid_provider_is_rejected() {
        let (status, body) = post_json(
            "/api/v1/jobs/analyze",
            json!({
                "listings": [listing("1", "Rust Engineer", "")],
                "provider": { "provider": "gemini" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "PROVIDER_CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_unreachable_provider_still_returns_scores() {
        let (status, body) = post_json(
            "/api/v1/jobs/analyze",
            json!({
                "listings": [listing("1", "Rust Engineer", "")],
                "criteria": {},
                "provider": { "provider": "ollama", "apiUrl": "http://127.0.0.1:9" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["listings"][0]["score"], 50);
        assert_eq!(body["listings"][0]["scoredBy"], "heuristic");
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hiring_filter_keeps_hiring_posts() {
        let (status, body) = post_json(
            "/api/v1/jobs/hiring-filter",
            json!({
                "listings": [
                    listing("1", "Backend Engineer", "We are hiring!"),
                    listing("2", "Conference recap", "Slides are online.")
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["hiringPosts"], 1);
        assert_eq!(body["listings"].as_array().unwrap().len(), 1);
        assert_eq!(body["listings"][0]["id"], "1");
        assert_eq!(body["listings"][0]["isHiringPost"], true);
    }

    #[tokio::test]
    async fn test_filter_applies_structured_filters() {
        let (status, body) = post_json(
            "/api/v1/jobs/filter",
            json!({
                "listings": [
                    listing("1", "Rust Engineer", "Now hiring"),
                    listing("2", "Rust Engineer", "Apply now")
                ],
                "criteria": { "userQuery": "rust" },
                "hiringOnly": true,
                "filters": { "source": "linkedin" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["kept"], 0);
        assert_eq!(body["listings"], json!([]));
    }

    #[tokio::test]
    async fn test_filter_rejects_bad_date() {
        let (status, body) = post_json(
            "/api/v1/jobs/filter",
            json!({
                "listings": [],
                "filters": { "dateFrom": "soon" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected() {
        let listings: Vec<Value> = (0..=handlers::MAX_LISTINGS)
            .map(|i| listing(&i.to_string(), "Dev", ""))
            .collect();
        let (status, _) = post_json("/api/v1/jobs/analyze", json!({ "listings": listings })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
