use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::auth::client_secret::{ClientSecret, load_client_secret};
use crate::auth::oauth::{self, GMAIL_READONLY_SCOPE, Tokens};
use crate::auth::token_file::{self, TokenCache};
use crate::config::AuthConfig;

/// Assumed lifetime when the provider does not report one.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3500;

pub struct TokenManager {
    config: AuthConfig,
}

impl TokenManager {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Returns a valid access token: cached if still fresh, otherwise
    /// refreshed, otherwise obtained through the interactive consent flow.
    /// Any new credential is written back to the token file.
    pub fn get_access_token(&self) -> Result<String> {
        let now = Utc::now();
        let cached = token_file::load_tokens(&self.config.token_file)?;

        if let Some(tf) = &cached
            && let Some(at) = tf.valid_access_token(now)
        {
            log::info!("using cached access token");
            return Ok(at.to_string());
        }

        let secret = load_client_secret(&self.config.client_secret_file)?;
        let previous_refresh = cached.and_then(|tf| tf.refresh_token);

        let tokens = match &previous_refresh {
            Some(rt) => {
                log::info!("access token expired or missing; refreshing");
                match oauth::refresh_access_token(&secret, rt) {
                    Ok(t) => t,
                    Err(e) => {
                        log::warn!("refresh failed ({e}); falling back to interactive auth");
                        oauth::perform_pkce_flow(&secret, GMAIL_READONLY_SCOPE)?
                    }
                }
            }
            None => {
                log::info!("no cached credential; running interactive auth flow");
                oauth::perform_pkce_flow(&secret, GMAIL_READONLY_SCOPE)?
            }
        };

        let cache = cache_from_tokens(&secret, tokens, previous_refresh, now);
        token_file::save_tokens(&self.config.token_file, &cache)?;

        Ok(cache.token.unwrap_or_default())
    }
}

/// Build the cache entry for freshly issued tokens. A refresh response
/// usually omits the refresh token, so the previous one is kept.
fn cache_from_tokens(
    secret: &ClientSecret,
    tokens: Tokens,
    previous_refresh: Option<String>,
    now: DateTime<Utc>,
) -> TokenCache {
    let expires_in = tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    TokenCache {
        token: Some(tokens.access_token),
        refresh_token: tokens.refresh_token.or(previous_refresh),
        token_uri: Some(secret.token_uri.clone()),
        client_id: Some(secret.client_id.clone()),
        client_secret: secret.client_secret.clone(),
        scopes: vec![GMAIL_READONLY_SCOPE.to_string()],
        expiry: Some(now + Duration::seconds(expires_in as i64)),
    }
}
