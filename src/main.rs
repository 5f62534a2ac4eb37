// src/main.rs
use actix_web::{App, HttpServer, middleware::Logger, web};
use education_platform::auth::tokens::TokenService;
use education_platform::{app, config, db, seed};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    tracing::info!("Starting education platform API");

    let config = config::Config::from_env().expect("Failed to load config from environment");

    let pool = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to Postgres");

    if config.run_migrations {
        db::run_migrations(&pool)
            .await
            .expect("Failed to apply database migrations");
    }
    if config.seed_defaults {
        seed::seed_defaults(&pool, &config)
            .await
            .expect("Failed to seed default data");
    }

    let tokens = web::Data::new(TokenService::from_config(&config));
    let pool = web::Data::new(pool);
    let address = config.server_address();
    let origins = config.allowed_origins();
    let config = web::Data::new(config);

    tracing::info!("Listening on {}:{}", address.0, address.1);
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(config.clone())
            .wrap(app::cors(origins.as_deref()))
            .wrap(Logger::default())
            .configure(app::configure)
    })
    .bind(address)?
    .run()
    .await
}
