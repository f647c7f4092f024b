use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::new_correlation_id;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub error: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OAuthAccessResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct TokenExchangeRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<&'a str>,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("token exchange request failed: {0}")]
    Transport(String),
    #[error("token endpoint returned status {0}")]
    Status(u16),
    #[error("failed to decode token response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(
        &self,
        request: TokenExchangeRequest<'_>,
    ) -> Result<OAuthAccessResponse, OAuthError>;
}

/// Calls Slack's `oauth.access`, sending the credentials as a form body so they
/// never appear in a URL.
pub struct SlackTokenExchanger {
    client: Client,
    access_url: String,
}

impl SlackTokenExchanger {
    pub fn new(client: Client, access_url: impl Into<String>) -> Self {
        Self { client, access_url: access_url.into() }
    }
}

#[async_trait]
impl TokenExchanger for SlackTokenExchanger {
    async fn exchange(
        &self,
        request: TokenExchangeRequest<'_>,
    ) -> Result<OAuthAccessResponse, OAuthError> {
        let response = self
            .client
            .post(&self.access_url)
            .form(&request)
            .send()
            .await
            .map_err(|error| OAuthError::Transport(error.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Status(response.status().as_u16()));
        }

        response.json().await.map_err(|error| OAuthError::Decode(error.without_url().to_string()))
    }
}

#[derive(Clone)]
pub struct OAuthState {
    pub exchanger: Arc<dyn TokenExchanger>,
    pub client_id: String,
    pub client_secret: Arc<SecretString>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OAuthOutcome {
    Denied,
    ExchangeFailed,
    Installed { team_name: String },
}

impl OAuthOutcome {
    pub fn location(&self) -> String {
        match self {
            Self::Denied | Self::ExchangeFailed => "/?state=error".to_string(),
            Self::Installed { team_name } => {
                format!("/?state=success&team={}", encode_uri_component(team_name))
            }
        }
    }
}

pub async fn complete_oauth(state: &OAuthState, query: OAuthCallbackQuery) -> OAuthOutcome {
    let correlation_id = new_correlation_id();
    if let Some(error) = query.error {
        info!(
            event_name = "oauth.denied",
            correlation_id = %correlation_id,
            error = %error,
            "slack authorization denied"
        );
        return OAuthOutcome::Denied;
    }

    let Some(code) = query.code else {
        warn!(
            event_name = "oauth.failed",
            correlation_id = %correlation_id,
            reason = "missing_code",
            "oauth callback carried no authorization code"
        );
        return OAuthOutcome::ExchangeFailed;
    };

    let request = TokenExchangeRequest {
        client_id: &state.client_id,
        client_secret: state.client_secret.expose_secret(),
        code: &code,
        redirect_uri: query.redirect_uri.as_deref(),
    };

    match state.exchanger.exchange(request).await {
        Ok(response) if response.ok => {
            let team_name = response.team_name.unwrap_or_default();
            info!(
                event_name = "oauth.installed",
                correlation_id = %correlation_id,
                team_name = %team_name,
                "slack app installed"
            );
            OAuthOutcome::Installed { team_name }
        }
        Ok(response) => {
            warn!(
                event_name = "oauth.failed",
                correlation_id = %correlation_id,
                error = response.error.as_deref().unwrap_or("unknown"),
                "slack rejected the authorization code"
            );
            OAuthOutcome::ExchangeFailed
        }
        Err(error) => {
            warn!(
                event_name = "oauth.failed",
                correlation_id = %correlation_id,
                error = %error,
                "token exchange failed"
            );
            OAuthOutcome::ExchangeFailed
        }
    }
}

/// `GET /oauth`: finishes the install flow and redirects to the landing page.
pub async fn oauth_callback(
    State(state): State<OAuthState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> impl IntoResponse {
    let outcome = complete_oauth(&state, query).await;
    (StatusCode::FOUND, [(header::LOCATION, outcome.location())])
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        extract::{Query, State},
        http::{header, StatusCode},
        response::IntoResponse,
    };
    use reqwest::Client;
    use secrecy::SecretString;

    use super::{
        complete_oauth, encode_uri_component, oauth_callback, OAuthAccessResponse,
        OAuthCallbackQuery, OAuthError, OAuthOutcome, OAuthState, SlackTokenExchanger,
        TokenExchangeRequest, TokenExchanger,
    };

    #[derive(Default)]
    struct StubExchanger {
        response: Option<OAuthAccessResponse>,
        calls: Mutex<Vec<(String, String, String, Option<String>)>>,
    }

    #[async_trait]
    impl TokenExchanger for StubExchanger {
        async fn exchange(
            &self,
            request: TokenExchangeRequest<'_>,
        ) -> Result<OAuthAccessResponse, OAuthError> {
            self.calls.lock().expect("calls lock").push((
                request.client_id.to_string(),
                request.client_secret.to_string(),
                request.code.to_string(),
                request.redirect_uri.map(str::to_string),
            ));
            self.response.clone().ok_or_else(|| OAuthError::Transport("offline".to_string()))
        }
    }

    fn state(exchanger: Arc<StubExchanger>) -> OAuthState {
        OAuthState {
            exchanger,
            client_id: "123.456".to_string(),
            client_secret: Arc::new(SecretString::from("shh".to_string())),
        }
    }

    fn query(code: Option<&str>, error: Option<&str>) -> OAuthCallbackQuery {
        OAuthCallbackQuery {
            error: error.map(str::to_string),
            code: code.map(str::to_string),
            redirect_uri: Some("https://pollbot.example/oauth".to_string()),
        }
    }

    #[tokio::test]
    async fn denied_authorization_redirects_to_error_without_exchange() {
        let exchanger = Arc::new(StubExchanger::default());

        let response = oauth_callback(
            State(state(exchanger.clone())),
            Query(query(None, Some("access_denied"))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|value| value.to_str().ok()),
            Some("/?state=error")
        );
        assert!(exchanger.calls.lock().expect("calls lock").is_empty());
    }

    #[tokio::test]
    async fn successful_exchange_redirects_with_encoded_team() {
        let exchanger = Arc::new(StubExchanger {
            response: Some(OAuthAccessResponse {
                ok: true,
                team_name: Some("Acme & Co".to_string()),
                error: None,
            }),
            ..StubExchanger::default()
        });

        let outcome = complete_oauth(&state(exchanger.clone()), query(Some("abc"), None)).await;

        assert_eq!(outcome, OAuthOutcome::Installed { team_name: "Acme & Co".to_string() });
        assert_eq!(outcome.location(), "/?state=success&team=Acme%20%26%20Co");

        let calls = exchanger.calls.lock().expect("calls lock");
        assert_eq!(
            calls.as_slice(),
            &[(
                "123.456".to_string(),
                "shh".to_string(),
                "abc".to_string(),
                Some("https://pollbot.example/oauth".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn rejected_or_failed_exchange_redirects_to_error() {
        let rejected = Arc::new(StubExchanger {
            response: Some(OAuthAccessResponse {
                ok: false,
                team_name: None,
                error: Some("invalid_code".to_string()),
            }),
            ..StubExchanger::default()
        });
        let offline = Arc::new(StubExchanger::default());

        let first = complete_oauth(&state(rejected), query(Some("abc"), None)).await;
        let second = complete_oauth(&state(offline), query(Some("abc"), None)).await;

        assert_eq!(first, OAuthOutcome::ExchangeFailed);
        assert_eq!(second.location(), "/?state=error");
    }

    #[tokio::test]
    async fn missing_code_fails_without_exchange() {
        let exchanger = Arc::new(StubExchanger::default());

        let outcome = complete_oauth(&state(exchanger.clone()), query(None, None)).await;

        assert_eq!(outcome, OAuthOutcome::ExchangeFailed);
        assert!(exchanger.calls.lock().expect("calls lock").is_empty());
    }

    #[tokio::test]
    async fn callback_without_redirect_uri_omits_it_from_exchange() {
        let exchanger = Arc::new(StubExchanger::default());
        let mut callback = query(Some("abc"), None);
        callback.redirect_uri = None;

        complete_oauth(&state(exchanger.clone()), callback).await;

        let calls = exchanger.calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].3, None);
    }

    #[test]
    fn credentials_travel_in_form_body_not_url() {
        let request = TokenExchangeRequest {
            client_id: "123.456",
            client_secret: "shh",
            code: "abc",
            redirect_uri: None,
        };

        let built = Client::new()
            .post("https://slack.com/api/oauth.access")
            .form(&request)
            .build()
            .expect("request");

        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().query(), None);
        let body = built.body().and_then(|body| body.as_bytes()).expect("form body");
        assert_eq!(body, b"client_id=123.456&client_secret=shh&code=abc");
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_client_secret() {
        let exchanger =
            SlackTokenExchanger::new(Client::new(), "http://127.0.0.1:1/api/oauth.access");

        let error = exchanger
            .exchange(TokenExchangeRequest {
                client_id: "123.456",
                client_secret: "TOP-SECRET-VALUE",
                code: "abc",
                redirect_uri: Some("https://pollbot.example/oauth"),
            })
            .await
            .expect_err("nothing listens on port 1");

        assert!(matches!(error, OAuthError::Transport(_)));
        let message = error.to_string();
        assert!(!message.contains("TOP-SECRET-VALUE"), "secret leaked: {message}");
        assert!(!message.contains("127.0.0.1:1"), "url leaked: {message}");
    }

    #[test]
    fn uri_component_encoding_matches_browser_rules() {
        assert_eq!(encode_uri_component("Acme-Team_1.x"), "Acme-Team_1.x");
        assert_eq!(encode_uri_component("a b/c?d=e"), "a%20b%2Fc%3Fd%3De");
        assert_eq!(encode_uri_component("(it's)!*~"), "(it's)!*~");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }
}
