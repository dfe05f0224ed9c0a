//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Per-IP rate limiter, swept periodically
    let rate_limit = middleware::RateLimit {
        limiter: middleware::create_rate_limiter(
            state.config.rate_limit_rps,
            state.config.rate_limit_burst,
        ),
        behind_proxy: state.config.behind_proxy,
    };
    middleware::spawn_rate_limiter_sweep(Arc::clone(&rate_limit.limiter));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no authentication)
    let public = Router::new()
        .route("/healthz", get(handlers::health::health_check))
        .route("/v1/login", post(handlers::users::login))
        .route("/v1/users", post(handlers::users::register));

    // Protected routes (bearer token required)
    let protected = Router::new()
        // Current user
        .route("/v1/me", get(handlers::users::me))
        .route(
            "/v1/me/tokens",
            get(handlers::tokens::list_tokens).post(handlers::tokens::create_token),
        )
        .route("/v1/me/tokens/{id}", delete(handlers::tokens::delete_token))
        .route("/v1/me/friends", get(handlers::friends::list_friends))
        .route(
            "/v1/me/friends/{user_id}",
            put(handlers::friends::add_friend).delete(handlers::friends::remove_friend),
        )
        // Users
        .route("/v1/users", get(handlers::users::list_users))
        .route(
            "/v1/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // Categories
        .route(
            "/v1/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/v1/categories/{id}",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        // Threads
        .route(
            "/v1/threads",
            get(handlers::threads::list_threads).post(handlers::threads::create_thread),
        )
        .route(
            "/v1/threads/{id}",
            get(handlers::threads::get_thread)
                .put(handlers::threads::update_thread)
                .delete(handlers::threads::delete_thread),
        )
        .route(
            "/v1/threads/{id}/tags/{tag_id}",
            put(handlers::threads::attach_tag).delete(handlers::threads::detach_tag),
        )
        // Posts
        .route(
            "/v1/threads/{id}/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route(
            "/v1/posts/{id}",
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        // Reactions
        .route("/v1/posts/{id}/reactions", get(handlers::reactions::get_reactions))
        .route(
            "/v1/posts/{id}/reactions/{emoji}",
            put(handlers::reactions::add_reaction).delete(handlers::reactions::remove_reaction),
        )
        // Tags
        .route(
            "/v1/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/v1/tags/{id}",
            get(handlers::tags::get_tag)
                .put(handlers::tags::update_tag)
                .delete(handlers::tags::delete_tag),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ));

    // Apply middleware; the last layer added runs first
    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            middleware::rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}

/// Turn a handler panic into a JSON 500 instead of a dropped connection.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::http::Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");

    let body = serde_json::json!({
        "error": "internal_error",
        "message": "an internal error occurred",
    })
    .to_string();

    axum::http::Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}
