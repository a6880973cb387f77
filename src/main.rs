use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use vibesocial::config::ServerConfig;
use vibesocial::openapi::ApiDoc;
use vibesocial::repo::Repo;
use vibesocial::{config, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping VibeSocial API");
    let cfg = ServerConfig::from_env();

    let repo = build_repo(&cfg).await?;
    let state = AppState { repo };
    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        // the browser client is served from anywhere during development
        let cors = Cors::permissive();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind((cfg.bind_addr.as_str(), cfg.port))?;

    info!("Listening on http://{}:{}", cfg.bind_addr, cfg.port);
    server.run().await?;
    Ok(())
}

#[cfg(feature = "postgres-store")]
async fn build_repo(cfg: &ServerConfig) -> anyhow::Result<Arc<dyn Repo>> {
    use sqlx::postgres::PgPoolOptions;
    use vibesocial::repo::pg::PgRepo;

    let Some(db_url) = cfg.database_url.as_deref() else {
        anyhow::bail!("DATABASE_URL must be set (copy .env.example to .env and configure it)");
    };
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_lazy(db_url)?;
    if cfg.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }
    info!("Using Postgres repository backend");
    Ok(Arc::new(PgRepo::new(pool)))
}

#[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
async fn build_repo(cfg: &ServerConfig) -> anyhow::Result<Arc<dyn Repo>> {
    use vibesocial::repo::inmem::InMemRepo;

    info!("Using in-memory repository backend (snapshot in '{}')", cfg.data_dir.display());
    Ok(Arc::new(InMemRepo::with_snapshot(cfg.data_dir.join("state.json"))))
}
