use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

pub const DEFAULT_ACTION: &str = "purchased";

/// One feed row with lowercased header names as keys.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub name: String,
    pub location: String,
    pub product: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Emoji, image URL, or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}

impl NotificationRecord {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            product: product.into(),
            action: default_action(),
            timestamp: None,
            email: None,
            picture: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Build a record from a feed row, rejecting rows without a name,
    /// location or product.
    pub fn from_row(row: &RawRow) -> Result<Self, WidgetError> {
        let name = required(row, "name")?;
        let location = required(row, "location")?;
        let product = required(row, "product")?;

        Ok(Self {
            name,
            location,
            product,
            action: optional(row, "action").unwrap_or_else(default_action),
            timestamp: optional(row, "timestamp"),
            email: optional(row, "email"),
            picture: optional(row, "picture"),
        })
    }

    /// "Name in City purchased Product"
    pub fn message(&self) -> String {
        format!(
            "{} in {} {} {}",
            self.name, self.location, self.action, self.product
        )
    }
}

fn required(row: &RawRow, field: &'static str) -> Result<String, WidgetError> {
    optional(row, field).ok_or(WidgetError::InvalidRecord { field })
}

fn optional(row: &RawRow, field: &str) -> Option<String> {
    row.get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
