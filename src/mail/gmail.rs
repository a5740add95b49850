use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::mail::message::{MessageList, MessageRef, RawMessage};

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com";

const UNREAD_QUERY: &str = "is:unread";
const INBOX_LABEL: &str = "INBOX";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("mail provider rejected the access token (HTTP {0})")]
    Unauthorized(u16),
    #[error("mail provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request to mail provider failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The two read-only calls the exporter needs from a mailbox.
pub trait MailProvider {
    /// Unread inbox messages, in the provider's listing order.
    fn list_unread(&self) -> Result<Vec<MessageRef>, ProviderError>;

    fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError>;
}

pub struct GmailClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .user_agent(concat!("unread_mail_export/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: GMAIL_API_BASE.to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json()?)
    }
}

impl MailProvider for GmailClient {
    fn list_unread(&self) -> Result<Vec<MessageRef>, ProviderError> {
        let list: MessageList = self.get_json(
            "/gmail/v1/users/me/messages",
            &[("labelIds", INBOX_LABEL), ("q", UNREAD_QUERY)],
        )?;
        log::debug!(
            "listing returned {} ids (estimate {:?})",
            list.messages.len(),
            list.result_size_estimate
        );
        Ok(list.messages)
    }

    fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError> {
        log::debug!("fetching message {id}");
        self.get_json(
            &format!("/gmail/v1/users/me/messages/{id}"),
            &[("format", "full")],
        )
    }
}
