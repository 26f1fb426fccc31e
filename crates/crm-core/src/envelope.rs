//! # Response Envelopes
//!
//! Every data-source call settles with an [`ApiResponse`]:
//!
//! ```text
//! success → { "success": true,  "data": T,    "message": "Customers retrieved successfully" }
//! failure → { "success": false, "data": null, "message": "Customer not found" }
//! ```
//!
//! Stores look at nothing but `success`, `data` and `message`. A failure
//! message is surfaced verbatim as the lifecycle error.
//!
//! List endpoints with pagination wrap their records in a [`Page`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// The `{success, data, message}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// A failed envelope; `data` is always null.
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Unwraps the payload.
    ///
    /// `success: false` becomes [`CoreError::Rejected`] with the envelope's
    /// message. A success without data is [`CoreError::MissingData`].
    pub fn into_result(self, operation: &str) -> CoreResult<T> {
        if !self.success {
            return Err(CoreError::Rejected(self.message.unwrap_or_default()));
        }
        self.data.ok_or_else(|| CoreError::missing_data(operation))
    }

    /// Like [`into_result`](Self::into_result) for calls whose payload is
    /// null by contract (delete, logout).
    pub fn into_ack(self) -> CoreResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(CoreError::Rejected(self.message.unwrap_or_default()))
        }
    }

    /// Maps the payload, keeping `success` and `message`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

/// One page of a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T: Clone> Page<T> {
    /// Slices `items` into the requested 1-based page.
    ///
    /// `total_pages` is `ceil(len / page_size)`. An empty list still reports
    /// one page so `current_page ≤ total_pages` holds for page 1.
    pub fn slice(items: &[T], page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1) as usize;
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size).max(1) as u32;
        let start = (page as usize - 1).saturating_mul(page_size);
        let data = items.iter().skip(start).take(page_size).cloned().collect();

        Page {
            data,
            current_page: page,
            total_pages,
            total_items: total_items as u64,
        }
    }
}
