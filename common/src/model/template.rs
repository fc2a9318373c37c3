use serde::{Deserialize, Serialize};

/// Subject and body text carrying `[name]` and `[link]` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailTemplate {
    pub subject: String,
    pub body: String,
}
