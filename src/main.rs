use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;

use presensi::auth::handlers::seed_admin;
use presensi::config::Config;
use presensi::db::{ensure_schema, init_db};
use presensi::docs::ApiDoc;
use presensi::routes;
use presensi::service::AttendanceService;
use presensi::store::{AttendanceStore, MySqlStore, UserStore};
use presensi::utils::clock::SystemClock;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Presensi service is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    ensure_schema(&pool)
        .await
        .context("Failed to prepare database schema")?;

    let store = Arc::new(MySqlStore::new(pool));
    let attendance_store: Arc<dyn AttendanceStore> = store.clone();
    let users: Arc<dyn UserStore> = store;

    if let Some(seed) = &config.admin_seed {
        seed_admin(users.as_ref(), seed)
            .await
            .context("Failed to seed admin account")?;
    }

    let service = Data::new(AttendanceService::new(
        attendance_store,
        Arc::new(SystemClock),
        config.timezone,
    ));
    let users = Data::from(users);

    let server_addr = config.server_addr.clone();
    info!(%server_addr, timezone = %config.timezone, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(service.clone())
            .app_data(users.clone())
            .service(index)
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
