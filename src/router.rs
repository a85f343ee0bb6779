use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::{
    AppState,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    routes,
};

/// Builds the full application router under the configured base path
pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let mut public_routes =
        Router::new().route("/auth/refresh", post(routes::auth::refresh_token));
    if state.config.mock.enabled {
        public_routes = public_routes.route("/auth/mock-login", post(routes::auth::mock_login));
    }

    let protected_routes = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/status", get(routes::auth::status))
        // Intranet
        .route("/intranet/profile", get(routes::intranet::profile))
        .route("/intranet/schedule", get(routes::intranet::schedule))
        .route(
            "/intranet/schedule/weekly",
            get(routes::intranet::weekly_schedule),
        )
        .route(
            "/intranet/schedule/today",
            get(routes::intranet::today_schedule),
        )
        .route("/intranet/attendance", get(routes::intranet::attendance))
        .route(
            "/intranet/announcements",
            get(routes::intranet::announcements),
        )
        .route("/intranet/refresh", post(routes::intranet::refresh))
        // LMS
        .route("/lms/courses", get(routes::lms::courses))
        .route("/lms/courses/{id}/content", get(routes::lms::content))
        .route("/lms/courses/{id}/assignments", get(routes::lms::assignments))
        .route("/lms/courses/{id}/grades", get(routes::lms::grades))
        .route(
            "/lms/courses/{id}/announcements",
            get(routes::lms::announcements),
        )
        .route("/lms/courses/{id}/refresh", post(routes::lms::refresh_course))
        // Chat
        .route(
            "/chat/sessions",
            post(routes::chat::create_session).get(routes::chat::list_sessions),
        )
        .route(
            "/chat/sessions/{id}/messages",
            post(routes::chat::send_message).get(routes::chat::history),
        )
        // Rewards
        .route("/rewards", get(routes::rewards::list_rewards))
        .route("/rewards/points", get(routes::rewards::points))
        .route("/rewards/redemptions", get(routes::rewards::redemptions))
        .route("/rewards/{id}/redeem", post(routes::rewards::redeem))
        .route("/rewards/activities", get(routes::rewards::activities))
        .route(
            "/rewards/activities/{id}/register",
            post(routes::rewards::register_activity),
        )
        // Events
        .route("/events", get(routes::events::list_events))
        .route(
            "/events/my/registrations",
            get(routes::events::my_registrations),
        )
        .route("/events/{id}", get(routes::events::details))
        .route("/events/{id}/register", post(routes::events::register))
        // Tools
        .route(
            "/tools/room-booking",
            post(routes::tools::book_room).get(routes::tools::my_bookings),
        )
        .route(
            "/tools/print-jobs",
            post(routes::tools::submit_print_job).get(routes::tools::my_print_jobs),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().nest(
        &state.config.api_base_uri,
        Router::new().merge(public_routes).merge(protected_routes),
    );

    // Outermost first: rate limit, then 5xx body logging
    let router = router.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(rate_limiter, rate_limit))
            .layer(axum::middleware::from_fn(log_errors)),
    );

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
