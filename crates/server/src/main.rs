//! Quill server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use quill_api::{AppState, auth_middleware, router};
use quill_common::{Config, LocalStorage, PageCache};
use quill_core::{CommentService, FollowService, GroupService, PostService, UserService};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(quill_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quill_db::migrate(db.as_ref()).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Storage for uploaded post images
    let storage = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.media_root),
        config.storage.media_url.clone(),
    ));

    // Services
    let user_service = UserService::new(user_repo.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        group_repo.clone(),
        user_repo.clone(),
        follow_repo.clone(),
        comment_repo.clone(),
        storage,
        config.pagination.per_page,
    );
    let comment_service = CommentService::new(comment_repo, post_repo);
    let follow_service = FollowService::new(follow_repo, user_repo);
    let group_service = GroupService::new(group_repo);

    let feed_cache = PageCache::with_ttl(Duration::from_secs(config.cache.feed_ttl_secs));

    let state = AppState {
        user_service,
        post_service,
        comment_service,
        follow_service,
        group_service,
        feed_cache,
        media_url: config.storage.media_url.clone(),
    };

    let media_prefix = config.storage.media_url.trim_end_matches('/').to_string();

    let app = router()
        .nest_service(
            &media_prefix,
            ServeDir::new(&config.storage.media_root),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
