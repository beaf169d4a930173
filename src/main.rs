use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campusdesk::config::Config;
use campusdesk::core::Currency;
use campusdesk::fees::{ReceiptBranding, ReceiptFormatter};
use campusdesk::middleware::{json_config, ErrorLogger, RequestId};
use campusdesk::modules;
use campusdesk::records::{MySqlRecordStore, RecordStore};
use campusdesk::reports::{ExportRegistry, ExportSerializer, ReportService};
use campusdesk::schedules::{
    MySqlScheduleRepository, ReportMailer, ScheduleRepository, ScheduleRunner, ScheduleService,
    ScheduleTrigger, SmtpReportMailer,
};

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campusdesk=debug,actix_web=info".into());

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.app.log_format);
    config.validate()?;

    tracing::info!(
        env = %config.app.env,
        bind = %config.server.bind_address(),
        "Starting campusdesk"
    );

    let db_pool = config.database.create_pool().await?;
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!(
        database = %config.database.redacted_url(),
        max_connections = config.database.max_connections,
        "Database pool initialized"
    );

    let currency = Currency::default();
    let branding = ReceiptBranding {
        institute_name: config.app.institute_name.clone(),
        address: config.app.institute_address.clone(),
        contact: config.app.institute_contact.clone(),
        currency,
    };

    let store: Arc<dyn RecordStore> = Arc::new(MySqlRecordStore::new(db_pool.clone()));
    let schedule_repo: Arc<dyn ScheduleRepository> =
        Arc::new(MySqlScheduleRepository::new(db_pool.clone()));
    let mailer: Arc<dyn ReportMailer> = Arc::new(SmtpReportMailer::new(config.mail.clone())?);

    let report_service = Arc::new(ReportService::new(
        store.clone(),
        ExportSerializer::new(currency, config.app.institute_name.clone()),
    ));
    let trigger = Arc::new(ScheduleTrigger::new(
        schedule_repo.clone(),
        report_service.clone(),
        mailer,
        &config.scheduler,
    ));

    let formatter = web::Data::new(ReceiptFormatter::new(branding));
    let registry = web::Data::new(ExportRegistry::new());
    let schedule_service = web::Data::new(ScheduleService::new(schedule_repo));

    let runner = if config.scheduler.enabled {
        let runner = ScheduleRunner::new(
            trigger.clone(),
            Duration::from_secs(config.scheduler.sweep_interval_secs),
        );
        let shutdown = runner.shutdown_token();
        Some((shutdown, tokio::spawn(runner.run())))
    } else {
        tracing::info!("Schedule runner disabled; sweeps only via POST /schedules/sweep");
        None
    };

    let dashboard_origin = config.app.dashboard_origin.clone();
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&dashboard_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .expose_headers(["content-disposition", "x-request-id"])
            .max_age(3600);

        App::new()
            .wrap(ErrorLogger)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(json_config())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::from(report_service.clone()))
            .app_data(web::Data::from(trigger.clone()))
            .app_data(formatter.clone())
            .app_data(registry.clone())
            .app_data(schedule_service.clone())
            .configure(modules::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);
    server.await?;

    if let Some((shutdown, handle)) = runner {
        shutdown.cancel();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Schedule runner task failed");
        }
    }

    Ok(())
}
