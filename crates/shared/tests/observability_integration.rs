//! 可观测性模块集成测试
//!
//! 测试 metrics、middleware 和配置在库外部的使用方式。

mod metrics_tests {
    use gamification_shared::observability::metrics::{
        record_action, record_badge_award, record_http_request, record_points_awarded,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/badges", 200, 0.05);
        record_http_request("POST", "/actions", 201, 0.12);
        record_http_request("POST", "/actions", 400, 0.01);
        record_http_request("GET", "/leaderboard", 503, 0.25);
    }

    #[test]
    fn test_record_action_outcomes() {
        record_action("signalement", "completed", 0.02);
        record_action("validation", "completed", 0.01);
        record_action("inconnu", "rejected", 0.0);
        record_action("collecte", "failed", 5.0);
    }

    #[test]
    fn test_record_points_and_badges() {
        record_points_awarded("signalement", 10);
        record_points_awarded("collecte", 20);
        record_badge_award("DEBUTANT", "awarded");
        record_badge_award("DEBUTANT", "duplicate");
        record_badge_award("CONFIRME", "failed");
    }

    #[test]
    fn test_handle_absent_without_init() {
        // 未调用 init 时不会安装全局 handle
        assert!(gamification_shared::observability::metrics::get_handle().is_none());
    }
}

mod middleware_tests {
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use gamification_shared::observability::middleware::{REQUEST_ID_HEADER, http_tracing, request_id};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_layers_preserve_status() {
        let app = Router::new()
            .route("/missing", get(|| async { (axum::http::StatusCode::NOT_FOUND, "nope") }))
            .layer(middleware::from_fn(http_tracing))
            .layer(middleware::from_fn(request_id));

        let response = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}

mod config_tests {
    use gamification_shared::config::AppConfig;

    #[test]
    fn test_load_without_files_uses_defaults() {
        // SAFETY: CONFIG_DIR 仅在本测试进程中修改
        unsafe {
            std::env::set_var("CONFIG_DIR", "/nonexistent-config-dir");
        }
        let config = AppConfig::load("observability-probe").unwrap();
        assert_eq!(config.service_name, "observability-probe");
        assert_eq!(config.database.max_connections, 10);
        unsafe {
            std::env::remove_var("CONFIG_DIR");
        }
    }
}
