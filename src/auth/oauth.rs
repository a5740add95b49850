use anyhow::{Result, anyhow, bail};
use oauth2::TokenResponse;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, CsrfToken,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenUrl,
};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::auth::client_secret::ClientSecret;

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

const CONSENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Tokens returned by the oauth flow (in-memory)
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

fn build_client(secret: &ClientSecret) -> Result<BasicClient> {
    let client_id = ClientId::new(secret.client_id.clone());
    let client_secret = secret.client_secret.clone().map(OAuthClientSecret::new);
    let auth_url = AuthUrl::new(secret.auth_uri.clone())?;
    let token_url = TokenUrl::new(secret.token_uri.clone())?;

    // Google expects installed-app credentials in the request body.
    Ok(
        BasicClient::new(client_id, client_secret, auth_url, Some(token_url))
            .set_auth_type(AuthType::RequestBody),
    )
}

fn into_tokens<T: TokenResponse<oauth2::basic::BasicTokenType>>(token: &T) -> Tokens {
    Tokens {
        access_token: token.access_token().secret().to_string(),
        refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
        expires_in: token.expires_in().map(|d| d.as_secs()),
    }
}

/// Exchange a refresh token for a new access token using the oauth2 crate
pub fn refresh_access_token(secret: &ClientSecret, refresh_token: &str) -> Result<Tokens> {
    let oauth_client = build_client(secret)?;

    let rt = RefreshToken::new(refresh_token.to_string());
    let token = oauth_client
        .exchange_refresh_token(&rt)
        .request(http_client)?;

    Ok(into_tokens(&token))
}

/// Authorization Code + PKCE flow. Opens the system browser and captures the
/// redirect on a loopback port chosen by the OS.
pub fn perform_pkce_flow(secret: &ClientSecret, scope: &str) -> Result<Tokens> {
    // Listen first so the redirect cannot race the browser
    let server = Server::http((Ipv4Addr::LOCALHOST, 0))
        .map_err(|e| anyhow!("Failed to bind OAuth callback server: {e}"))?;
    let bind_addr = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow!("OAuth callback server is not bound to an IP address"))?;
    let redirect_uri = format!("http://{bind_addr}/");

    let oauth_client =
        build_client(secret)?.set_redirect_uri(RedirectUrl::new(redirect_uri.clone())?);

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (auth_url, csrf_token) = oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(scope.to_string()))
        .add_extra_param("access_type", "offline")
        .set_pkce_challenge(pkce_challenge)
        .url();

    println!("Please visit this URL to authorize this application:\n{auth_url}");
    if let Err(e) = open::that(auth_url.as_str()) {
        log::warn!("could not open browser automatically: {e}");
    }

    let code = wait_for_code(&server, &redirect_uri, csrf_token.secret())?;

    let token = match oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request(http_client)
    {
        Ok(tok) => tok,
        Err(err) => {
            log::debug!("token exchange failed: {err:#?}");
            return Err(anyhow!("Token exchange failed: {err}"));
        }
    };

    Ok(into_tokens(&token))
}

fn wait_for_code(server: &Server, redirect_uri: &str, expected_state: &str) -> Result<String> {
    let wait_until = Instant::now() + CONSENT_TIMEOUT;

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        // request.url() is a path+query like "/?code=...&state=..."
        let full = format!("{}{}", redirect_uri.trim_end_matches('/'), request.url());
        let Ok(parsed) = Url::parse(&full) else {
            let _ = request.respond(Response::from_string("Bad redirect"));
            continue;
        };

        match parse_redirect(&parsed, expected_state) {
            Ok(Some(code)) => {
                let _ = request.respond(Response::from_string(
                    "The authentication flow has completed. You may close this window.",
                ));
                return Ok(code);
            }
            // favicon and other stray requests
            Ok(None) => {
                let _ = request.respond(Response::from_string("Waiting for authorization."));
            }
            Err(e) => {
                let _ = request.respond(Response::from_string(
                    "Authorization failed. You may close this window.",
                ));
                return Err(e);
            }
        }
    }

    Err(anyhow!("No authorization code received within timeout"))
}

/// Extract the authorization code from a redirect. `Ok(None)` means the
/// request carried neither a code nor an error.
fn parse_redirect(url: &Url, expected_state: &str) -> Result<Option<String>> {
    let mut code = None;
    let mut state = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => bail!("Authorization denied: {v}"),
            _ => {}
        }
    }

    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        bail!("OAuth state mismatch in redirect");
    }
    Ok(Some(code))
}
