// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, comments, posts, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public reads: feed, user posts, post detail, registration and login.
/// * Writes sit behind `auth_middleware`; ownership is checked per handler.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let account_routes = Router::new()
        .route("/registration", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/password-change", post(auth::change_password))
                .layer(require_auth.clone()),
        );

    let profile_routes = Router::new()
        .route("/{username}", get(posts::user_posts))
        .merge(
            Router::new()
                .route(
                    "/settings",
                    get(profile::get_settings).put(profile::update_settings),
                )
                .layer(require_auth.clone()),
        );

    let post_routes = Router::new()
        .route("/{slug}", get(posts::post_detail))
        .merge(
            Router::new()
                .route("/", post(posts::add_post))
                .route(
                    "/{slug}",
                    put(posts::update_post).delete(posts::delete_post),
                )
                .route("/{slug}/comments", post(comments::create_comment))
                .layer(require_auth),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/api/feed") }))
        .route("/api/feed", get(posts::feed))
        .nest("/api/accounts", account_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/posts", post_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentOrder, Config};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "router-test-secret".to_string(),
            jwt_expiration: 60,
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origins: vec!["not a header\n".to_string()],
            paginate_by: 5,
            comment_order: CommentOrder::NewestFirst,
            time_display: Default::default(),
        };
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        create_router(AppState { pool, config })
    }

    #[tokio::test]
    async fn root_redirects_to_feed() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/api/feed");
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/profile/settings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
