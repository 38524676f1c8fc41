//! Bluespace Backend
//!
//! REST backend for the Bluespace freelance marketplace with SQLite
//! persistence, JWT authentication and live analytics.

mod analytics;
mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Bluespace backend");
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!("Database URL: {}", config.database_url);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Require auth: {}", config.require_auth);

    if config.jwt_secret_is_default {
        tracing::warn!(
            "No token secret configured (BLUESPACE_JWT_SECRET). Using the development fallback!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.database_url).await?;
    let repo = Arc::new(Repository::new(pool));

    if config.seed_demo {
        let hash = auth::password::hash_password_blocking(db::DEMO_PASSWORD.to_string()).await?;
        if !repo.seed_demo_data(&hash).await? {
            tracing::info!("Database already populated, skipping demo data");
        }
    }

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let auth_config = state.config.clone();
    let expose = state.config.expose_error_details();

    // Routes that need no token
    let public_routes = Router::new()
        .route("/health", get(api::health_check))
        .route("/auth/login", post(api::login))
        .route("/auth/register", post(api::register));

    let protected_routes = Router::new()
        .route("/auth/me", get(api::current_user))
        // Users
        .route("/users", get(api::list_users).post(api::create_user))
        .route(
            "/users/{id}",
            get(api::get_user).put(api::update_user).delete(api::delete_user),
        )
        .route("/users/role/{role}", get(api::users_by_role))
        // Projects
        .route("/projects", get(api::list_projects).post(api::create_project))
        .route("/projects/client/{client_id}", get(api::projects_by_client))
        .route("/projects/developer/{developer_id}", get(api::projects_by_developer))
        .route(
            "/projects/{id}",
            get(api::get_project)
                .put(api::update_project)
                .delete(api::delete_project),
        )
        .route("/projects/{id}/assign-developer", post(api::assign_developer))
        .route(
            "/projects/{id}/remove-developer/{developer_id}",
            delete(api::remove_developer),
        )
        .route("/projects/{id}/refresh-snapshots", post(api::refresh_snapshots))
        // Notifications
        .route("/notifications", post(api::create_notification))
        .route("/notifications/user/{user_id}", get(api::list_notifications))
        .route("/notifications/user/{user_id}/unread-count", get(api::unread_count))
        .route("/notifications/user/{user_id}/read-all", put(api::mark_all_read))
        .route("/notifications/{id}", delete(api::delete_notification))
        .route("/notifications/{id}/read", put(api::mark_read))
        // Analytics
        .route("/analytics/dashboard", get(api::dashboard_stats))
        .route("/analytics/projects", get(api::project_analytics))
        .route("/analytics/users", get(api::user_analytics))
        .route_layer(middleware::from_fn(move |req, next| {
            auth::token_auth_layer(auth_config.clone(), req, next)
        }));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(errors::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config))
                .layer(middleware::from_fn(move |req, next| {
                    errors::expose_error_details(expose, req, next)
                }))
                .layer(CatchPanicLayer::custom(errors::handle_panic)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
