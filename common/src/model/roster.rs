use serde::{Deserialize, Serialize};

/// One line of the roster sheet: a name in column A and comma-separated emails in column B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    pub name: String,
    pub emails: Option<String>,
}

impl RosterRow {
    pub fn new(name: impl Into<String>, emails: Option<&str>) -> Self {
        Self {
            name: name.into(),
            emails: emails.map(str::to_string),
        }
    }

    /// A row without a name or without any email text produces nothing.
    pub fn is_inert(&self) -> bool {
        self.name.trim().is_empty()
            || self
                .emails
                .as_deref()
                .map_or(true, |emails| emails.trim().is_empty())
    }
}
