//! Response payload models.

use serde::{Deserialize, Serialize};

/// Success payload shared by the DDL and upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    /// Only set by CSV uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_inserted: Option<u64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rows_inserted: None,
        }
    }

    pub fn with_rows_inserted(mut self, rows: u64) -> Self {
        self.rows_inserted = Some(rows);
        self
    }
}

/// Result of comparing a CSV header row with a table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValidation {
    /// True when both sides hold the same set of names, in any order.
    pub matches: bool,
    pub message: String,
    pub csv_columns: Vec<String>,
    pub table_columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only_serialization() {
        let json = serde_json::to_string(&MessageResponse::new("ok")).unwrap();
        assert_eq!(json, r#"{"message":"ok"}"#);
    }

    #[test]
    fn test_rows_inserted_serialization() {
        let response = MessageResponse::new("loaded").with_rows_inserted(2);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rows_inserted"], 2);
    }
}
