// src/api/envelope.rs
//! Cloud Function envelope normalization and page parsing.
//!
//! Parse REST `/functions/<name>` typically returns `{"result": <cloudReturn>}`.
//! The cloud return is usually an object carrying `code`, but some functions
//! return a bare list, and a rejected session often yields `{"result": null}`.
//! [`Envelope`] folds those shapes into one object callers can inspect.

use crate::constants::ENVELOPE_SUCCESS_CODE;
use crate::error::AppError;
use crate::model::{as_integer, RawItem};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    pub fn from_response(response: Value) -> Self {
        let result = response.get("result").cloned().unwrap_or(Value::Null);
        match result {
            Value::Null => Self(json!({
                "code": -1,
                "message": "Parse returned null result",
                "raw": response,
            })),
            Value::Object(_) => Self(result),
            Value::Array(_) => Self(json!({
                "code": ENVELOPE_SUCCESS_CODE,
                "result": result,
            })),
            _ => Self(response),
        }
    }

    /// The envelope `code`; absent or non-numeric codes read as `0`.
    pub fn code(&self) -> i64 {
        self.0.get("code").and_then(as_integer).unwrap_or(0)
    }

    pub fn is_success(&self) -> bool {
        self.code() == ENVELOPE_SUCCESS_CODE
    }

    /// Fails with [`AppError::Application`] unless the code is success.
    pub fn ensure_success(self, operation: &str) -> Result<Self, AppError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::Application {
                operation: operation.to_string(),
                code: self.code(),
                envelope: self.0,
            })
        }
    }

    /// The payload list under `result`, when it is one.
    pub fn result_list(&self) -> Option<&Vec<Value>> {
        self.0.get("result").and_then(Value::as_array)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// One page of `folder-fetchContentWithRelatives`.
///
/// The bundle expects `{ code, result: [...], pageIndex, totalPage, size,
/// fid, ... }`; only the fields the traversal needs are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderPage {
    /// Object rows only; non-object rows are dropped.
    pub items: Vec<RawItem>,
    /// `totalPage`, when the server reports a positive value.
    pub total_pages: Option<u32>,
    /// `pageIndex` as echoed by the server, for diagnostics.
    pub server_page_index: Option<i64>,
}

impl FolderPage {
    pub fn from_envelope(envelope: &Envelope) -> Self {
        let items = envelope
            .result_list()
            .map(|rows| rows.iter().filter_map(RawItem::from_value).collect())
            .unwrap_or_default();
        let total_pages = envelope
            .get("totalPage")
            .and_then(as_integer)
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok());
        let server_page_index = envelope.get("pageIndex").and_then(as_integer);
        Self {
            items,
            total_pages,
            server_page_index,
        }
    }
}
