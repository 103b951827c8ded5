//! Biobank Research Registry
//!
//! Server-rendered web application for recording donors, samples and
//! research activity, linking them, and running the analytical reports.
//! Handles:
//! - Data entry and listing per resource
//! - Association links between existing records
//! - Report routines ("operations")
//! - Observability (logging, metrics, request ids)

mod flash;
mod forms;
mod handlers;
mod views;

use axum::{
    body::Body,
    extract::FromRef,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::Key;
use biobank_common::{
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    metrics, Repository,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::handlers::{
    allergies, biological_data, diseases, donors, drugs, experiments, future_works, health,
    links, operations, pages, publications, researchers, treatments,
};
use crate::views::Templates;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub templates: Arc<Templates>,
    /// Signs the flash cookie, derived from `session.secret`
    pub cookie_key: Key,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn flash_cookie(&self) -> &str {
        &self.config.session.flash_cookie
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Biobank Registry v{}",
        biobank_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let metrics_handle = init_metrics(&config.observability)?;

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;

    let state = AppState {
        config: config.clone(),
        repo: Repository::new(db),
        templates: Arc::new(Templates::new()?),
        cookie_key: Key::derive_from(config.session.secret.as_bytes()),
        metrics: metrics_handle,
    };

    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown_timeout = config.shutdown_timeout();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Bound the drain of in-flight requests
            tokio::spawn(async move {
                tokio::time::sleep(shutdown_timeout).await;
                tracing::warn!("Graceful shutdown timed out, exiting");
                std::process::exit(1);
            });
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(metrics::metric_name("report_duration_seconds")),
            metrics::REPORT_BUCKETS,
        )?
        .install_recorder()?;

    metrics::register_metrics();
    Ok(Some(handle))
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        // Navigation
        .route("/", get(pages::index))
        .route("/assignations", get(pages::assignations))

        // Registry resources
        .route("/donors", get(donors::list))
        .route("/donors/add", get(donors::add_form).post(donors::add))
        .route("/researchers", get(researchers::list))
        .route("/researchers/add", get(researchers::add_form).post(researchers::add))
        .route("/diseases", get(diseases::list))
        .route("/diseases/add", get(diseases::add_form).post(diseases::add))
        .route("/biological_data", get(biological_data::list))
        .route("/biological_data/add", get(biological_data::add_form).post(biological_data::add))
        .route("/treatments", get(treatments::list))
        .route("/treatments/add", get(treatments::add_form).post(treatments::add))
        .route("/drugs", get(drugs::list))
        .route("/drugs/add", get(drugs::add_form).post(drugs::add))
        .route("/publications", get(publications::list))
        .route("/publications/add", get(publications::add_form).post(publications::add))
        .route("/allergies", get(allergies::list))
        .route("/allergies/add", get(allergies::add_form).post(allergies::add))
        .route("/experiments", get(experiments::list))
        .route("/experiments/add", get(experiments::add_form).post(experiments::add))
        .route("/future_works", get(future_works::list))
        .route("/future_works/add", get(future_works::add_form).post(future_works::add))

        // Association links
        .route("/assign", get(links::assign_list))
        .route("/assign/add", get(links::assign_add_form).post(links::assign_add))
        .route("/writes", get(links::writes_list))
        .route("/writes/add", get(links::writes_add_form).post(links::writes_add))
        .route("/affected", get(links::affected_list))
        .route("/affected/add", get(links::affected_add_form).post(links::affected_add))
        .route("/cause", get(links::cause_list))
        .route("/cause/add", get(links::cause_add_form).post(links::cause_add))
        .route("/analyze", get(links::analyze_list))
        .route("/analyze/add", get(links::analyze_add_form).post(links::analyze_add))

        // Reports
        .route("/operations", get(pages::operations))
        .route(
            "/operations/op2",
            get(operations::below_density_form).post(operations::below_density),
        )
        .route(
            "/operations/op3",
            get(operations::treatment_info_form).post(operations::treatment_info),
        )
        .route(
            "/operations/op4",
            get(operations::donors_with_disease_form).post(operations::donors_with_disease),
        )
        .route("/operations/op5", get(operations::top_researcher_future_works))

        // Health and metrics
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics))

        .layer(middleware)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use biobank_common::config::{DatabaseConfig, ServerConfig, SessionConfig};
    use biobank_common::db::models::Donor;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    type Row = BTreeMap<&'static str, Value>;

    fn test_state(conn: DatabaseConnection) -> AppState {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            session: SessionConfig {
                secret: "s".repeat(64),
                flash_cookie: "biobank_flash".to_string(),
            },
            observability: ObservabilityConfig::default(),
        };

        AppState {
            cookie_key: Key::derive_from(config.session.secret.as_bytes()),
            config: Arc::new(config),
            repo: Repository::new(DbPool::from_connection(conn)),
            templates: Arc::new(Templates::new().unwrap()),
            metrics: None,
        }
    }

    fn app(db: MockDatabase) -> Router {
        create_router(test_state(db.into_connection()))
    }

    fn empty_db() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn rossi() -> Donor {
        Donor {
            cf: "RSSMRA80A01H501U".into(),
            name: "Mario".into(),
            surname: "Rossi".into(),
            birth: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            sex: "M".into(),
            age: 45,
        }
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(empty_db()).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_ready_pings_database() {
        let db = empty_db().append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }]);
        let response = app(db).oneshot(get_request("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_pages_render() {
        for uri in ["/", "/assignations", "/operations"] {
            let response = app(empty_db()).oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_donor_list_shows_record() {
        let db = empty_db().append_query_results([vec![rossi()]]);
        let response = app(db).oneshot(get_request("/donors")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert_eq!(html.matches("RSSMRA80A01H501U").count(), 1);
        assert!(html.contains("Rossi"));
    }

    #[tokio::test]
    async fn test_add_donor_redirects_with_flash() {
        let db = empty_db().append_query_results([vec![rossi()]]);
        let response = app(db)
            .oneshot(post_form(
                "/donors/add",
                "cf=RSSMRA80A01H501U&name=Mario&surname=Rossi&birth=1980-01-01&sex=M&age=45",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/donors");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("biobank_flash="));
    }

    #[tokio::test]
    async fn test_add_donor_with_blank_fields_keeps_values() {
        let response = app(empty_db())
            .oneshot(post_form("/donors/add", "cf=RSSMRA80A01H501U&name=Mario"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Error adding donor: Required fields missing: age, birth, sex, surname"));
        assert!(html.contains(r#"value="RSSMRA80A01H501U""#));
    }

    #[tokio::test]
    async fn test_link_with_missing_reference_is_reported() {
        let db = empty_db().append_query_results([
            Vec::<Row>::new(), // insert matched nothing
            Vec::<Row>::new(), // drug options
            Vec::<Row>::new(), // allergy options
        ]);
        let response = app(db)
            .oneshot(post_form("/cause/add", "drug_id=3&allergy_id=999"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains(
            "Error adding link: Referenced record not found: drug 3 or allergy 999 does not exist"
        ));
    }

    #[tokio::test]
    async fn test_below_density_with_no_matches() {
        let db = empty_db().append_query_results([Vec::<Row>::new()]);
        let response = app(db)
            .oneshot(post_form("/operations/op2", "threshold=0.0"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("No results found."));
    }

    #[tokio::test]
    async fn test_below_density_requires_threshold() {
        let response = app(empty_db())
            .oneshot(post_form("/operations/op2", "threshold="))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("Please enter a threshold value"));
        assert!(!html.contains("Results"));
    }

    #[tokio::test]
    async fn test_top_researchers_renders_rows() {
        let row: Row = BTreeMap::from([(
            "row_json",
            Value::String(Some(Box::new(
                r#"{"fw_title": "Liver follow-up", "researcher_cf": "BNCLRA75B41F205X"}"#.to_string(),
            ))),
        )]);
        let db = empty_db().append_query_results([vec![row]]);
        let response = app(db).oneshot(get_request("/operations/op5")).await.unwrap();

        let html = body_text(response).await;
        assert!(html.contains("<th>fw_title</th><th>researcher_cf</th>"));
        assert!(html.contains("Liver follow-up"));
    }

    #[tokio::test]
    async fn test_add_experiment_with_unknown_disease_keeps_form() {
        let db = empty_db().append_query_results([
            Vec::<Row>::new(), // insert matched nothing
            Vec::<Row>::new(), // disease options
            Vec::<Row>::new(), // treatment options
        ]);
        let response = assert_ok!(
            app(db)
                .oneshot(post_form(
                    "/experiments/add",
                    "exper_date=2024-05-02&is_positive=on&disease_id=42&treatment_id=1",
                ))
                .await
        );

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains(
            "Error adding experiment: Referenced record not found: \
             disease 42 or treatment 1 does not exist"
        ));
        assert!(html.contains(r#"value="2024-05-02""#));
    }

    #[tokio::test]
    async fn test_add_future_work_with_unknown_publication() {
        let db = empty_db().append_query_results([
            Vec::<Row>::new(), // insert matched nothing
            Vec::<Row>::new(), // experiment options
            Vec::<Row>::new(), // publication options
        ]);
        let response = assert_ok!(
            app(db)
                .oneshot(post_form(
                    "/future_works/add",
                    "title=Follow-up&exp_id=3&pub_doi=10.1000.182",
                ))
                .await
        );

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains(
            "Error adding future work: Referenced record not found: \
             experiment 3 or publication 10.1000.182 does not exist"
        ));
    }

    #[tokio::test]
    async fn test_treatment_info_requires_treatment() {
        let db = empty_db().append_query_results([Vec::<Row>::new()]);
        let response = assert_ok!(
            app(db).oneshot(post_form("/operations/op3", "treatment_id=")).await
        );

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Please select a treatment"));
        assert!(!html.contains("No results found."));
    }

    #[tokio::test]
    async fn test_donors_with_disease_rejects_non_numeric_id() {
        let db = empty_db().append_query_results([Vec::<Row>::new()]);
        let response = assert_ok!(
            app(db).oneshot(post_form("/operations/op4", "disease_id=abc")).await
        );

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Error executing operation: Invalid value for disease_id"));
        assert!(!html.contains("No results found."));
    }

    #[tokio::test]
    async fn test_report_form_renders_when_dropdown_fails() {
        // No query results queued: the treatment lookup errors out
        let response = assert_ok!(app(empty_db()).oneshot(get_request("/operations/op3")).await);

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Error loading treatments"));
        assert!(html.contains(r#"name="treatment_id""#));
    }

    #[tokio::test]
    async fn test_sample_condition_is_a_choice() {
        let db = empty_db().append_query_results([Vec::<Row>::new()]);
        let response = assert_ok!(app(db).oneshot(get_request("/biological_data/add")).await);

        let html = body_text(response).await;
        assert!(html.contains(r#"<select id="condition" name="condition""#));
        assert!(html.contains(r#"<option value="healthy">healthy</option>"#));
        assert!(html.contains(r#"<option value="disease">disease</option>"#));
    }
}
