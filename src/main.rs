use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use pairlink::config::Settings;
use pairlink::core::Engine;
use pairlink::models::UserId;
use pairlink::routes::{self, events::AppState};
use pairlink::services::{
    self, ProfileStore, RelayDispatcher, ReportStore, SessionStore, WebhookTransport,
};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.logging.level.clone()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Pairlink matchmaking service...");

    // Open the database and run migrations
    let pool = services::connect(&settings.database.path)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to open database: {}", e);
            panic!("Database error: {}", e);
        });

    let store = SessionStore::new(pool.clone());
    let profiles = Arc::new(ProfileStore::new(pool.clone()));
    let reports = Arc::new(ReportStore::new(pool));

    // Rehydrate the engine from the last snapshot before accepting events
    let engine = Engine::restore(store.clone(), Arc::clone(&profiles))
        .await
        .unwrap_or_else(|e| {
            error!("Failed to restore engine state: {}", e);
            panic!("Engine restore error: {}", e);
        });
    let engine = Arc::new(engine);

    // Outbound transport webhook
    let transport = Arc::new(WebhookTransport::new(
        settings.transport.base_url.clone(),
        settings.transport.token.clone(),
    ));
    let relay = RelayDispatcher::new(transport.clone());

    info!("Transport webhook: {}", settings.transport.base_url);

    // Build application state
    let app_state = AppState {
        engine,
        profiles,
        reports,
        store,
        relay,
        transport,
        owner_id: settings.admin.owner_id.map(UserId),
        admin_token: settings.admin.token.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
