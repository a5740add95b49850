use anyhow::{Result, anyhow};
use std::path::PathBuf;

use crate::batch::DEFAULT_MAX_EMAILS;
use crate::export::DEFAULT_OUTPUT;

pub const CLIENT_SECRET_ENV: &str = "GMAIL_CLIENT_SECRET";
pub const TOKEN_FILE_ENV: &str = "TOKEN_FILE";

/// Paths the authenticator needs.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_secret_file: PathBuf,
    pub token_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_secret_file: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    pub output: PathBuf,
    pub max_emails: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_secret_file: None,
            token_file: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            max_emails: DEFAULT_MAX_EMAILS,
        }
    }
}

impl Config {
    pub fn auth(&self) -> Result<AuthConfig> {
        let client_secret_file = self
            .client_secret_file
            .clone()
            .ok_or_else(|| anyhow!("{CLIENT_SECRET_ENV} is not set"))?;
        let token_file = self
            .token_file
            .clone()
            .ok_or_else(|| anyhow!("{TOKEN_FILE_ENV} is not set"))?;
        Ok(AuthConfig {
            client_secret_file,
            token_file,
        })
    }
}
