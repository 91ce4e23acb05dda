use std::sync::Arc;

use app::config::{Invocation, ServerConfig, prepare_sqlite_file, print_usage};
use app::{AppState, build_router};
use services::{AuthService, Clock, GenerationService, LessonService};
use storage::repository::Storage;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match ServerConfig::from_env()?.apply_args(std::env::args().skip(1)) {
        Ok(Invocation::Serve(config)) => config,
        Ok(Invocation::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    prepare_sqlite_file(&config.db_url)?;
    let storage = Storage::sqlite(&config.db_url).await?;
    tracing::info!(db = %config.db_url, "database ready");

    let clock = Clock::default();
    if config.auth.uses_default_secret() {
        tracing::warn!("LESSON_SECRET_KEY is not set; using the development signing secret");
    }
    let auth = AuthService::new(
        clock,
        config.auth.clone(),
        Arc::clone(&storage.users),
        Arc::clone(&storage.reset_tokens),
    );
    if auth.ensure_demo_user().await? {
        tracing::info!("seeded demo account");
    }

    let generator = GenerationService::from_env();
    match generator.model() {
        Some(model) => tracing::info!(model, "text generation enabled"),
        None => tracing::warn!("LESSON_AI_API_KEY is not set; serving placeholder content"),
    }
    let lessons = LessonService::new(clock, Arc::clone(&storage.contents), Arc::new(generator));

    let router = build_router(AppState::new(auth, lessons), &config.cors_origins);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("lesson server listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,sqlx=warn,tower_http=info")
            }),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("{err}");
        std::process::exit(2);
    }
}
