use serde::{Deserialize, Serialize};

/// An outbound draft produced by the mail merge, one per eligible roster row.
///
/// `recipients` is already deduplicated and keeps first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body_html: String,
}

impl DraftMessage {
    /// Recipients in the comma-joined form the drafting service accepts.
    pub fn recipient_line(&self) -> String {
        self.recipients.join(",")
    }
}

/// Extra options for draft creation. `html_body` overrides the plain body when rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftOptions {
    pub html_body: Option<String>,
}

/// A draft as persisted by the drafting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDraft {
    pub id: String,
    pub recipients: String,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}
