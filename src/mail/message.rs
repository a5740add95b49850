use serde::Deserialize;

/// Entry of the message listing; only the id is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default)]
    pub result_size_estimate: Option<u64>,
}

/// Full message as returned by `users.messages.get`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub payload: BodyPayload,
}

impl RawMessage {
    pub fn headers(&self) -> &[Header] {
        &self.payload.headers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node of the MIME tree. The root carries the headers; children live in
/// `parts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPayload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Vec<BodyPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    /// URL-safe base64.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub attachment_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    PlainText,
    Html,
    Other,
}

impl BodyPayload {
    pub fn kind(&self) -> ContentKind {
        match self.mime_type.as_str() {
            "text/plain" => ContentKind::PlainText,
            "text/html" => ContentKind::Html,
            _ => ContentKind::Other,
        }
    }

    pub fn inline_data(&self) -> Option<&str> {
        self.body.data.as_deref()
    }

    /// Leaf node with inline data.
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: PartBody {
                data: Some(data.into()),
                ..PartBody::default()
            },
            ..Self::default()
        }
    }

    /// Container node with no inline data.
    pub fn multipart(mime_type: impl Into<String>, parts: Vec<BodyPayload>) -> Self {
        Self {
            mime_type: mime_type.into(),
            parts,
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = headers;
        self
    }
}
