use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Cached credential, stored as JSON at the configured token-file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenCache {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenCache {
    /// The access token, if present and not about to expire. A token with no
    /// recorded expiry is treated as expired.
    pub fn valid_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let expiry = self.expiry?;
        if now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry {
            return None;
        }
        self.token.as_deref()
    }
}

/// Load the cache if the file exists.
pub fn load_tokens(path: &Path) -> Result<Option<TokenCache>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("cannot read token file {}", path.display()))?;
    let cache: TokenCache = serde_json::from_str(&s)
        .with_context(|| format!("invalid token file {}", path.display()))?;
    Ok(Some(cache))
}

pub fn save_tokens(path: &Path, cache: &TokenCache) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    let s = serde_json::to_string_pretty(cache)?;
    fs::write(path, s).with_context(|| format!("cannot write token file {}", path.display()))?;
    Ok(())
}
