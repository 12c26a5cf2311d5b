use crate::cli::ServeArgs;
use crate::infra::{load_students, AppState, InMemoryStudentGateway, TracingNotifier};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use taiger::config::AppConfig;
use taiger::error::AppError;
use taiger::telemetry;
use taiger::workflows::student::StudentDashboardService;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let gateway = match args.seed.as_deref() {
        Some(path) => InMemoryStudentGateway::from_students(load_students(path)?),
        None => {
            warn!("no --seed file given; serving an empty student store");
            InMemoryStudentGateway::default()
        }
    };
    let students = gateway.len();
    let dashboard_service = Arc::new(StudentDashboardService::new(
        Arc::new(gateway),
        Arc::new(TracingNotifier),
        config.lock,
        config.features,
    ));

    let policy = dashboard_service.evaluator().policy();
    info!(
        students,
        approval_countries = ?policy.approval_countries().collect::<Vec<_>>(),
        stale_after_days = policy.stale_after_days(),
        vpd_enable = config.features.vpd_enable,
        "student store loaded"
    );

    let app = with_dashboard_routes(dashboard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "taiger dashboard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
