use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    health::{health, HealthState},
    landing::{landing_page, LandingState},
    oauth::{oauth_callback, OAuthState},
    polls::{create_poll, respond_to_poll, PollsState},
    signing::{verify_slack_signature, SigningState},
};

pub struct RouterState {
    pub landing: LandingState,
    pub polls: PollsState,
    pub signing: SigningState,
    pub oauth: OAuthState,
    pub health: HealthState,
}

pub fn router(state: RouterState) -> Router {
    let slack = Router::new()
        .route("/create", post(create_poll))
        .route("/respond", post(respond_to_poll))
        .route_layer(middleware::from_fn_with_state(state.signing, verify_slack_signature))
        .with_state(state.polls);

    Router::new()
        .route("/", get(landing_page))
        .with_state(state.landing)
        .merge(slack)
        .merge(Router::new().route("/oauth", get(oauth_callback)).with_state(state.oauth))
        .merge(Router::new().route("/health", get(health)).with_state(state.health))
        .layer(TraceLayer::new_for_http())
}
