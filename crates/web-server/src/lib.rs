use actions::{Authenticator, InvoiceActions};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use configuration::settings::Settings;
use configuration::ApplicationSettings;
use database::DbRepository;
use events::ViewEvents;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod session;
pub mod view_cache;

use session::SessionStore;
use view_cache::ViewCache;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub db_repo: DbRepository,
    pub invoice_actions: InvoiceActions<DbRepository>,
    pub authenticator: Authenticator<DbRepository>,
    pub sessions: SessionStore,
    pub view_cache: ViewCache,
}

impl AppState {
    /// Wires every component to the one repository (and so the one pool).
    pub fn new(db_repo: DbRepository, settings: &ApplicationSettings) -> Self {
        let events = ViewEvents::default();
        let verbose = !settings.environment.is_production();
        Self {
            invoice_actions: InvoiceActions::new(db_repo.clone(), events.clone(), verbose),
            authenticator: Authenticator::new(db_repo.clone(), verbose),
            sessions: SessionStore::new(settings.session_ttl()),
            view_cache: ViewCache::new(&events, settings.view_cache_capacity),
            db_repo,
        }
    }
}

/// Builds the application router. Everything under `/api/dashboard` needs a session.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    let dashboard = Router::new()
        .route("/revenue", get(handlers::get_revenue))
        .route("/latest-invoices", get(handlers::get_latest_invoices))
        .route("/cards", get(handlers::get_card_data))
        .route(
            "/invoices",
            get(handlers::get_invoices).post(handlers::create_invoice),
        )
        .route("/invoices/pages", get(handlers::get_invoices_pages))
        .route(
            "/invoices/:id",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice),
        )
        .route("/customers", get(handlers::get_customers))
        .route("/customers/table", get(handlers::get_customers_table))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .nest("/api/dashboard", dashboard)
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Opens the pool, applies migrations, serves until Ctrl-C, then closes the pool.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.application.address()?;

    let db_pool = database::connect(&settings.database).await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool.clone());

    let app_state = Arc::new(AppState::new(db_repo, &settings.application));
    let app = router(app_state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::close(&db_pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
