mod error;
mod extractors;
mod sync;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use ledgersync_common::types::ServiceInfo;
use ledgersync_config::{init_tracing, AppConfig};
use ledgersync_db::sync::pg_repository::PgSyncStatusRepository;
use ledgersync_db::sync::repositories::SyncStatusRepository;
use ledgersync_queue::{MessageQueue, RedisQueue};
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub status_repo: Arc<dyn SyncStatusRepository>,
    pub queue: Arc<dyn MessageQueue>,
    pub service_info: ServiceInfo,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.service_info)
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-company-id"),
            header::HeaderName::from_static("x-user-id"),
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .merge(sync::router())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    tracing::info!(service = "ledgersync-api", queue = %config.queue_name, "starting");

    let pool = ledgersync_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    // The producer never nacks, so the delivery budget is irrelevant here.
    let queue = RedisQueue::connect(&config.redis_url, &config.queue_name, 1)
        .await
        .expect("failed to connect to redis");

    let state = AppState {
        status_repo: Arc::new(PgSyncStatusRepository::new(pool)),
        queue: Arc::new(queue),
        service_info: ServiceInfo::new("ledgersync-api", Utc::now()),
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ledgersync_common::error::{LedgerError, LedgerResult};
    use ledgersync_common::request::SyncRequest;
    use ledgersync_db::sync::models::{
        CoarseSyncStatus, CompanySyncStatus, EntitySyncState, EntitySyncStatus, EntityType,
        SyncCheckpoint,
    };
    use ledgersync_queue::{Delivery, Envelope, NackOutcome};
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    /// Read-only status store seeded with one company's rows.
    #[derive(Default)]
    struct SeededStatusRepo {
        coarse: Option<CompanySyncStatus>,
        entities: Vec<EntitySyncState>,
    }

    #[async_trait]
    impl SyncStatusRepository for SeededStatusRepo {
        async fn set_coarse_status(
            &self,
            _company_id: &str,
            _status: CoarseSyncStatus,
            _detail: Option<&str>,
        ) -> LedgerResult<()> {
            Ok(())
        }

        async fn get_coarse_status(
            &self,
            company_id: &str,
        ) -> LedgerResult<Option<CompanySyncStatus>> {
            Ok(self.coarse.clone().filter(|c| c.company_id == company_id))
        }

        async fn set_entity_state(
            &self,
            _user_id: i64,
            _company_id: &str,
            _entity_type: EntityType,
            _status: EntitySyncStatus,
        ) -> LedgerResult<()> {
            Ok(())
        }

        async fn get_entity_state(
            &self,
            _user_id: i64,
            _company_id: &str,
            _entity_type: EntityType,
        ) -> LedgerResult<Option<EntitySyncState>> {
            Ok(None)
        }

        async fn record_checkpoint(
            &self,
            _user_id: i64,
            _company_id: &str,
            _entity_type: EntityType,
            _checkpoint: &SyncCheckpoint,
        ) -> LedgerResult<()> {
            Ok(())
        }

        async fn list_entity_states(&self, company_id: &str) -> LedgerResult<Vec<EntitySyncState>> {
            Ok(self
                .entities
                .iter()
                .filter(|e| e.company_id == company_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingQueue {
        bodies: Mutex<Vec<String>>,
        unavailable: bool,
    }

    #[async_trait]
    impl MessageQueue for RecordingQueue {
        async fn enqueue(&self, body: &str) -> LedgerResult<Envelope> {
            if self.unavailable {
                return Err(LedgerError::Queue("connection refused".to_string()));
            }
            self.bodies.lock().unwrap().push(body.to_string());
            Ok(Envelope::new(body))
        }

        async fn receive(&self, _timeout: Duration) -> LedgerResult<Option<Delivery>> {
            Ok(None)
        }

        async fn ack(&self, _delivery: &Delivery) -> LedgerResult<()> {
            Ok(())
        }

        async fn nack(&self, delivery: &Delivery) -> LedgerResult<NackOutcome> {
            Ok(delivery.envelope.after_failure(1))
        }
    }

    fn state(repo: SeededStatusRepo, queue: Arc<RecordingQueue>) -> AppState {
        AppState {
            status_repo: Arc::new(repo),
            queue,
            service_info: ServiceInfo::new("ledgersync-api", Utc::now()),
        }
    }

    fn seeded_repo() -> SeededStatusRepo {
        let now = Utc::now();
        SeededStatusRepo {
            coarse: Some(CompanySyncStatus {
                company_id: "123".to_string(),
                status: CoarseSyncStatus::PartiallyFailed,
                detail: Some("Bills: upstream error: HTTP 500".to_string()),
                updated_at: now,
            }),
            entities: vec![EntitySyncState {
                id: Uuid::new_v4(),
                user_id: 7,
                company_id: "123".to_string(),
                entity_type: EntityType::Bills,
                last_updated_after: None,
                last_start_position: None,
                last_run_at: Some(now),
                status: EntitySyncStatus::Failed,
                created_at: now,
                updated_at: now,
            }],
        }
    }

    async fn read_body(resp: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = build_router(state(SeededStatusRepo::default(), Arc::default()));
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn info_returns_service_name() {
        let app = build_router(state(SeededStatusRepo::default(), Arc::default()));
        let resp = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await["name"], "ledgersync-api");
    }

    // ── POST /api/sync/full ─────────────────────────────────────────

    #[tokio::test]
    async fn full_sync_request_is_enqueued() {
        let queue = Arc::new(RecordingQueue::default());
        let app = build_router(state(SeededStatusRepo::default(), queue.clone()));
        let resp = app
            .oneshot(
                Request::post("/api/sync/full")
                    .header("X-Company-Id", "123")
                    .header("X-User-Id", "7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body = read_body(resp).await;
        assert!(body["message_id"].as_str().unwrap().parse::<Uuid>().is_ok());

        let bodies = queue.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        let request = SyncRequest::from_json(&bodies[0]).unwrap();
        assert_eq!(request.company_id, "123");
        assert_eq!(request.user_id, "7");
    }

    #[tokio::test]
    async fn full_sync_without_company_is_rejected() {
        let queue = Arc::new(RecordingQueue::default());
        let app = build_router(state(SeededStatusRepo::default(), queue.clone()));
        let resp = app
            .oneshot(
                Request::post("/api/sync/full")
                    .header("X-User-Id", "7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(queue.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_sync_with_blank_user_is_rejected() {
        let queue = Arc::new(RecordingQueue::default());
        let app = build_router(state(SeededStatusRepo::default(), queue.clone()));
        let resp = app
            .oneshot(
                Request::post("/api/sync/full")
                    .header("X-Company-Id", "123")
                    .header("X-User-Id", "  ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(queue.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn queue_outage_is_service_unavailable() {
        let queue = Arc::new(RecordingQueue {
            unavailable: true,
            ..RecordingQueue::default()
        });
        let app = build_router(state(SeededStatusRepo::default(), queue));
        let resp = app
            .oneshot(
                Request::post("/api/sync/full")
                    .header("X-Company-Id", "123")
                    .header("X-User-Id", "7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_body(resp).await["error"], "connection refused");
    }

    // ── GET /api/sync/status ────────────────────────────────────────

    #[tokio::test]
    async fn status_returns_company_and_entities() {
        let app = build_router(state(seeded_repo(), Arc::default()));
        let resp = app
            .oneshot(
                Request::get("/api/sync/status")
                    .header("X-Company-Id", "123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert_eq!(body["data"]["company"]["status"], "PartiallyFailed");
        assert_eq!(
            body["data"]["company"]["detail"],
            "Bills: upstream error: HTTP 500"
        );
        assert_eq!(body["data"]["entities"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["entities"][0]["entity_type"], "Bills");
    }

    #[tokio::test]
    async fn status_for_unknown_company_is_not_found() {
        let app = build_router(state(seeded_repo(), Arc::default()));
        let resp = app
            .oneshot(
                Request::get("/api/sync/status")
                    .header("X-Company-Id", "999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_without_company_header_is_bad_request() {
        let app = build_router(state(seeded_repo(), Arc::default()));
        let resp = app
            .oneshot(
                Request::get("/api/sync/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
