//! ResolveIT server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware};
use resolveit_api::{AppState, middleware::auth_middleware, router as api_router};
use resolveit_common::{Config, JwtKeys};
use resolveit_core::{
    ComplaintService, DatabaseAdminService, EscalationService, FileService, Mailer,
    NotificationService, RecordingMailer, ReportService, SmtpMailer, StaffApplicationService,
    UserService,
};
use resolveit_db::repositories::{
    ComplaintFileRepository, ComplaintRepository, ComplaintStatusRepository, EscalationRepository,
    StaffApplicationRepository, UserRepository,
};
use resolveit_queue::{SweepConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resolveit=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting resolveit-rs server...");

    let config = Config::load()?;

    let db = resolveit_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    resolveit_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let status_repo = ComplaintStatusRepository::new(Arc::clone(&db));
    let file_repo = ComplaintFileRepository::new(Arc::clone(&db));
    let escalation_repo = EscalationRepository::new(Arc::clone(&db));
    let application_repo = StaffApplicationRepository::new(Arc::clone(&db));

    // Outgoing email: SMTP when configured, log-only otherwise
    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email_config) => {
            info!(host = %email_config.smtp_host, "Using SMTP mail transport");
            Arc::new(SmtpMailer::new(email_config)?)
        }
        None => {
            info!("No SMTP configuration; notification emails will only be logged");
            Arc::new(RecordingMailer::new())
        }
    };
    let notifications = NotificationService::new(mailer);

    // Initialize services
    let jwt_keys = JwtKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
    let users = UserService::new(user_repo.clone(), jwt_keys.clone());
    let complaints = ComplaintService::new(
        complaint_repo.clone(),
        status_repo.clone(),
        user_repo.clone(),
        escalation_repo.clone(),
        notifications.clone(),
    );
    let files = FileService::new(
        file_repo.clone(),
        complaint_repo.clone(),
        config.storage.upload_dir.clone(),
    );
    let escalations = EscalationService::new(
        escalation_repo.clone(),
        complaint_repo.clone(),
        status_repo.clone(),
        user_repo.clone(),
        complaints.clone(),
        notifications.clone(),
        &config.escalation,
    )?;
    let applications = StaffApplicationService::new(
        application_repo.clone(),
        user_repo.clone(),
        notifications.clone(),
    );
    let reports = ReportService::new(
        complaint_repo.clone(),
        status_repo.clone(),
        user_repo.clone(),
    );
    let admin = DatabaseAdminService::new(
        user_repo,
        complaint_repo,
        status_repo,
        file_repo,
        escalation_repo,
        application_repo,
        users.clone(),
    );

    let state = AppState {
        users,
        complaints,
        files,
        escalations: escalations.clone(),
        applications,
        reports,
        admin,
        notifications,
        jwt_keys,
    };

    // Periodic sweeps share the service the admin endpoints call
    run_scheduler(
        SweepConfig::from_escalation(&config.escalation),
        Arc::new(escalations),
    );
    info!("Sweep scheduler started");

    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Video uploads go up to 50 MB; leave headroom for multipart framing
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
