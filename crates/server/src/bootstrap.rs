use std::{sync::Arc, time::Duration};

use axum::Router;
use pollbot_core::config::{AppConfig, ConfigError, LoadOptions};
use pollbot_db::{InMemoryPollRepository, PollRepository};
use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::{
    health::HealthState,
    landing::LandingState,
    oauth::{OAuthState, SlackTokenExchanger},
    polls::PollsState,
    routes::{router, RouterState},
    signing::SigningState,
};

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("landing template failed to load: {0}")]
    Template(#[source] tera::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(config.server.http_timeout_secs))
        .build()
        .map_err(BootstrapError::HttpClient)?;

    let polls: Arc<dyn PollRepository> = Arc::new(InMemoryPollRepository::default());
    let signing = SigningState::new(config.slack.signing_secret.clone());
    info!(
        event_name = "system.bootstrap.request_signing",
        correlation_id = "bootstrap",
        enabled = signing.is_enabled(),
        "slack request signing configured"
    );

    let landing = LandingState::new(&config.slack.authorize_url, &config.slack.client_id)
        .map_err(BootstrapError::Template)?;
    info!(
        event_name = "system.bootstrap.landing_ready",
        correlation_id = "bootstrap",
        install_url = landing.install_url(),
        "landing page template loaded"
    );

    let router = router(RouterState {
        landing,
        polls: PollsState::new(polls.clone()),
        signing,
        oauth: OAuthState {
            exchanger: Arc::new(SlackTokenExchanger::new(
                client,
                config.slack.oauth_access_url.clone(),
            )),
            client_id: config.slack.client_id.clone(),
            client_secret: Arc::new(config.slack.client_secret.clone()),
        },
        health: HealthState::new(polls),
    });

    Ok(Application { config, router })
}
