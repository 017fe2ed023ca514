//! Response shapes crossing the transport boundary

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::REQUEST_FAILED_MESSAGE;

/// What a transport call yields on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub status: u16,
    pub data: Value,
}

impl TransportResponse {
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }
}

/// The `{success, data, error}` wrapper the API puts around every payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self { success: true, data: Some(data), ..Default::default() }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Default::default() }
    }

    /// Message describing a failed envelope
    pub fn failure_message(&self) -> String {
        [&self.error, &self.message]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string())
    }

    /// `data` on success (or `null` when absent), the failure message otherwise
    pub fn into_result(self) -> Result<Value, String> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(self.failure_message())
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
