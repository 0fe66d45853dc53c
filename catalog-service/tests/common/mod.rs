//! Shared test harness for catalog-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use catalog_service::config::{
    CatalogConfig, DatabaseConfig, Environment, RateLimitConfig, SecurityConfig,
};
use catalog_service::services::Database;
use catalog_service::startup::build_router;
use catalog_service::AppState;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::util::ServiceExt;

/// Configuration pointing at an in-memory store, permissive enough that
/// individual tests only override what they exercise.
pub fn test_config() -> CatalogConfig {
    CatalogConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        },
        environment: Environment::Dev,
        service_name: "catalog-service".to_string(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        rate_limit: RateLimitConfig {
            max_requests: 200,
            window_seconds: 86_400,
            message: "Rate limit exceeded".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            trust_proxy: true,
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(test_config()).await
    }

    pub async fn spawn_with_config(config: CatalogConfig) -> Self {
        let db = Database::connect(&config.database.url)
            .await
            .expect("failed to open in-memory store");

        create_schema(&db).await;

        let metrics = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState {
            db: db.clone(),
            metrics,
        };

        let app = build_router(state, &config);

        TestApp { app, db }
    }

    /// Drive one request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        self.request(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
    }

    /// GET with a spoofed client address in `x-forwarded-for`.
    pub async fn get_from_ip(&self, path: &str, ip: &str) -> Response<Body> {
        self.request(
            Request::builder()
                .uri(path)
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
    }
}

async fn create_schema(db: &Database) {
    for statement in [
        "CREATE TABLE specialities (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL
        )",
        "CREATE TABLE branches (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            speciality_id INTEGER NOT NULL REFERENCES specialities(id)
        )",
        "CREATE TABLE documents (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            pdf_url TEXT NOT NULL,
            branch_id INTEGER NOT NULL REFERENCES branches(id)
        )",
    ] {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .expect("schema statement failed");
    }
}

/// Two specialities; Engineering has two branches, Computer Science has two
/// documents, Surgery has one, Electrical has none.
pub async fn seed_catalog(db: &Database) {
    for statement in [
        "INSERT INTO specialities (id, title) VALUES
            (1, 'Engineering'),
            (2, 'Medicine')",
        "INSERT INTO branches (id, title, speciality_id) VALUES
            (10, 'Computer Science', 1),
            (11, 'Electrical', 1),
            (20, 'Surgery', 2)",
        "INSERT INTO documents (id, title, pdf_url, branch_id) VALUES
            (100, 'Intro to Algorithms', 'algorithms.pdf', 10),
            (101, 'Compilers', 'compilers.pdf', 10),
            (200, 'Anatomy', 'anatomy.pdf', 20)",
    ] {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .expect("seed statement failed");
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}
