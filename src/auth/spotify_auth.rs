use std::time::Duration;

use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use url::Url;

use super::callback::wait_for_code;
use super::{AuthError, AuthResult, BearerToken};
use crate::config::{AppConfig, Credentials};

/// Authorization-code login with PKCE. The user consents in the browser and
/// the redirect is caught by a one-shot local listener.
pub struct SpotifyAuth {
    credentials: Credentials,
}

impl SpotifyAuth {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn client(&self) -> AuthResult<BasicClient> {
        let auth_url = AuthUrl::new(AppConfig::SPOTIFY_AUTH_URL.to_string())
            .into_report()
            .change_context(AuthError)?;
        let token_url = TokenUrl::new(AppConfig::SPOTIFY_TOKEN_URL.to_string())
            .into_report()
            .change_context(AuthError)?;
        let redirect_url = RedirectUrl::new(self.credentials.redirect_uri.clone())
            .into_report()
            .change_context(AuthError)
            .attach_printable(format!(
                "Invalid redirect uri {}",
                self.credentials.redirect_uri
            ))?;
        Ok(BasicClient::new(
            ClientId::new(self.credentials.client_id.clone()),
            self.credentials.client_secret.clone().map(ClientSecret::new),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    pub async fn login(&self) -> AuthResult<BearerToken> {
        println!("{}", "Initiating Spotify authentication...".cyan());
        let client = self.client()?;
        let redirect_uri = Url::parse(&self.credentials.redirect_uri)
            .into_report()
            .change_context(AuthError)?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in AppConfig::OAUTH_SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf_token) = request.url();

        println!("Opening browser for authentication...");
        println!(
            "If browser doesn't open, visit: {}",
            auth_url.to_string().blue()
        );
        if webbrowser::open(auth_url.as_str()).is_err() {
            println!("{}", "Failed to open browser automatically".yellow());
        }

        println!(
            "Waiting for authentication callback on {}",
            self.credentials.redirect_uri
        );
        let code = wait_for_code(
            &redirect_uri,
            csrf_token.secret().clone(),
            Duration::from_secs(AppConfig::OAUTH_CALLBACK_TIMEOUT_SECS),
        )
        .await?;

        println!("Exchanging authorization code for access token...");
        let token_response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|err| {
                Report::new(AuthError).attach_printable(format!("Token exchange failed: {}", err))
            })?;

        println!("{}", "Spotify authentication successful".green());
        Ok(BearerToken::new(
            token_response.access_token().secret().to_string(),
        ))
    }
}
