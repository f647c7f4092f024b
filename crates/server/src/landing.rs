use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use tera::{Context, Tera};
use tracing::error;

const LANDING_TEMPLATE: &str = "landing.html";

#[derive(Clone)]
pub struct LandingState {
    templates: Arc<Tera>,
    install_url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LandingQuery {
    pub state: Option<String>,
    pub team: Option<String>,
}

impl LandingState {
    pub fn new(authorize_url: &str, client_id: &str) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(
            LANDING_TEMPLATE,
            include_str!("../../../templates/landing.html"),
        )?;

        Ok(Self {
            templates: Arc::new(tera),
            install_url: format!("{authorize_url}?scope=commands&client_id={client_id}"),
        })
    }

    pub fn install_url(&self) -> &str {
        &self.install_url
    }
}

/// `GET /`: install page with an optional result banner.
pub async fn landing_page(
    State(state): State<LandingState>,
    Query(query): Query<LandingQuery>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("state", query.state.as_deref().unwrap_or_default());
    context.insert("team", query.team.as_deref().unwrap_or_default());
    context.insert("install_url", &state.install_url);

    state.templates.render(LANDING_TEMPLATE, &context).map(Html).map_err(|error| {
        error!(event_name = "landing.render_failed", error = %error, "landing page render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Template Error</h1>".to_string()))
    })
}
