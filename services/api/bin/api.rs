//! Main Entrypoint for the Consultation API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading and validating the question catalog (fail fast).
//! 3. Initializing the database connection pool and running migrations.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use consult_api::{
    config::Config,
    db::{AnswerSink, PostgresAnswerSink},
    router::create_router,
    state::AppState,
};
use consult_core::{
    Catalog, ExportFilter, FlowController, SessionStore,
    chat::{ChatClient, OpenAICompatibleChatClient},
};
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

const CHAT_SYSTEM_PROMPT: &str = "You are a courteous assistant for a medical consultation \
    service. The structured questionnaire is already complete; answer follow-up questions \
    briefly, and never offer a diagnosis. Remind the user that a clinician will review \
    their answers.";

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load the Question Catalog ---
    // A malformed catalog is fatal here, never mid-conversation.
    let catalog = Catalog::load(&config.questions_path).with_context(|| {
        format!(
            "Failed to load question catalog from {}",
            config.questions_path.display()
        )
    })?;
    info!(questions = catalog.len(), "Question catalog loaded and validated.");

    // --- 4. Initialize Database ---
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let sink = Arc::new(PostgresAnswerSink::new(pool));
    sink.run_migrations().await?;
    info!("Database connection established and migrations are up-to-date.");

    // --- 5. Initialize Shared Services ---
    let chat: Option<Arc<dyn ChatClient>> = match &config.openai_api_key {
        Some(api_key) => {
            info!(model = %config.chat_model, "Free chat enabled.");
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            Some(Arc::new(OpenAICompatibleChatClient::new(
                openai_config,
                config.chat_model.clone(),
                CHAT_SYSTEM_PROMPT.to_string(),
            )))
        }
        None => {
            info!("No OPENAI_API_KEY set; free chat after completion is disabled.");
            None
        }
    };

    let app_state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        store: Arc::new(SessionStore::new()),
        controller: FlowController::with_cap(config.available_cap),
        export_filter: ExportFilter::default(),
        sink: sink as Arc<dyn AnswerSink>,
        chat,
        config: Arc::new(config.clone()),
    });

    // --- 6. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 7. Start Server ---
    info!(
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
